//! Display geometry commands.

use std::sync::Arc;

use serde_json::json;
use serde_json::Value;
use tracing::warn;

use crate::command::Command;
use crate::command::CommandCx;

pub(crate) fn handlers() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(Resolution),
        Arc::new(ResolutionSwitch),
        Arc::new(DeviceType),
    ]
}

const DIMENSION_SLOTS: [&str; 4] = [
    "originalWidth",
    "originalHeight",
    "currentWidth",
    "currentHeight",
];

/// Reports the full display geometry in one reply.
struct Resolution;

impl Command for Resolution {
    fn name(&self) -> &'static str {
        "Resolution"
    }

    fn run_get(&self, cx: &mut CommandCx<'_>) {
        let device = &cx.host().device;
        let mut reply = serde_json::Map::new();
        for slot in DIMENSION_SLOTS {
            if let Some(value) = device.get(slot) {
                reply.insert(slot.to_string(), value);
            }
        }
        if let Some(density) = device.get("screenDensity") {
            reply.insert("screenDensity".to_string(), density);
        }
        cx.reply(Value::Object(reply));
    }
}

/// Switches the emulated display to a new size. The four dimension slots
/// and the optional density move in one atomic write so input bounds and
/// frame headers never see a torn geometry.
struct ResolutionSwitch;

fn dimension(cx: &CommandCx<'_>, key: &str) -> Option<i64> {
    cx.arg_i64(key).filter(|v| (1..=7680).contains(v))
}

impl Command for ResolutionSwitch {
    fn name(&self) -> &'static str {
        "ResolutionSwitch"
    }

    fn validate_set(&self, cx: &CommandCx<'_>) -> bool {
        let dims_ok = ["originWidth", "originHeight", "width", "height"]
            .iter()
            .all(|key| dimension(cx, key).is_some());
        let density_ok = match cx.arg("screenDensity") {
            None => true,
            Some(_) => matches!(cx.arg_i64("screenDensity"), Some(d) if (120..=640).contains(&d)),
        };
        dims_ok && density_ok
    }

    fn run_set(&self, cx: &mut CommandCx<'_>) {
        let (Some(origin_w), Some(origin_h), Some(width), Some(height)) = (
            dimension(cx, "originWidth"),
            dimension(cx, "originHeight"),
            dimension(cx, "width"),
            dimension(cx, "height"),
        ) else {
            return;
        };
        let mut pairs = vec![
            ("originalWidth", json!(origin_w)),
            ("originalHeight", json!(origin_h)),
            ("currentWidth", json!(width)),
            ("currentHeight", json!(height)),
        ];
        if let Some(density) = cx.arg_i64("screenDensity") {
            pairs.push(("screenDensity", json!(density)));
        }
        if let Err(e) = cx.host().device.set_many(&pairs) {
            warn!(error = %e, "device state write failed");
            return;
        }
        cx.host()
            .streamer
            .set_original_size(origin_w as i32, origin_h as i32);
        let args = cx.args().clone();
        if let Err(e) = cx.host().runtime.set_device_state("ResolutionSwitch", &args) {
            warn!(error = %e, "runtime rejected resolution switch");
        }
        cx.reply(json!(true));
    }
}

/// Fixed device class string, configured at startup.
struct DeviceType;

impl Command for DeviceType {
    fn name(&self) -> &'static str {
        "DeviceType"
    }

    fn run_get(&self, cx: &mut CommandCx<'_>) {
        let device_type = cx.host().config.device_type.clone();
        cx.reply(json!({ "DeviceType": device_type }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uicast_proto::Verb;
    use uicast_runtime::RuntimeCall;

    use crate::test_support::host_with;
    use uicast_runtime::MockRuntime;

    fn run_verb(
        handler: &dyn Command,
        verb: Verb,
        args: Value,
        host: &crate::context::HostContext,
    ) -> (bool, Option<Value>) {
        let mut cx = CommandCx::new(host, args);
        if !handler.validate(verb, &cx) {
            return (false, None);
        }
        handler.run(verb, &mut cx);
        let (direct, _) = cx.into_outputs();
        (true, direct)
    }

    #[test]
    fn test_resolution_reports_defaults() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let (ok, reply) = run_verb(&Resolution, Verb::Get, Value::Null, &host);
        assert!(ok);
        assert_eq!(
            reply,
            Some(json!({
                "originalWidth": 1080,
                "originalHeight": 2340,
                "currentWidth": 1080,
                "currentHeight": 2340,
                "screenDensity": 480,
            }))
        );
    }

    #[test]
    fn test_switch_updates_all_slots() {
        let (host, runtime) = host_with(MockRuntime::new());
        let args = json!({
            "originWidth": 466,
            "originHeight": 466,
            "width": 466,
            "height": 466,
            "screenDensity": 320,
        });
        let (ok, reply) = run_verb(&ResolutionSwitch, Verb::Set, args.clone(), &host);
        assert!(ok);
        assert_eq!(reply, Some(json!(true)));
        assert_eq!(host.device.get("originalWidth"), Some(json!(466)));
        assert_eq!(host.device.get("currentHeight"), Some(json!(466)));
        assert_eq!(host.device.get("screenDensity"), Some(json!(320)));
        assert_eq!(host.device.screen_bounds(), (466, 466));
        assert_eq!(
            runtime.last_call(),
            Some(RuntimeCall::SetState("ResolutionSwitch".to_string(), args))
        );
    }

    #[test]
    fn test_switch_density_is_optional() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let args = json!({
            "originWidth": 720, "originHeight": 1280, "width": 720, "height": 1280,
        });
        assert!(run_verb(&ResolutionSwitch, Verb::Set, args, &host).0);
        assert_eq!(host.device.get("screenDensity"), Some(json!(480)));
    }

    #[test]
    fn test_switch_rejects_bad_geometry() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let bad = [
            json!({ "originWidth": 0, "originHeight": 1, "width": 1, "height": 1 }),
            json!({ "originWidth": 1, "originHeight": 7681, "width": 1, "height": 1 }),
            json!({ "originWidth": 1, "originHeight": 1, "width": 1 }),
            json!({
                "originWidth": 1, "originHeight": 1, "width": 1, "height": 1,
                "screenDensity": 100,
            }),
        ];
        for args in bad {
            assert!(!run_verb(&ResolutionSwitch, Verb::Set, args, &host).0);
        }
        // nothing was written
        assert_eq!(host.device.get("originalWidth"), Some(json!(1080)));
    }

    #[test]
    fn test_device_type_comes_from_config() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let (ok, reply) = run_verb(&DeviceType, Verb::Get, Value::Null, &host);
        assert!(ok);
        assert_eq!(reply, Some(json!({ "DeviceType": "phone" })));
    }
}
