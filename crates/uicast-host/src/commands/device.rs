//! Device state commands.
//!
//! One generic handler covers every single-slot sensor or setting; the
//! slot name doubles as the command name and the argument key. SET
//! validates against the slot domain, writes the store, and forwards the
//! value to the runtime. GET replies `{ "<slot>": value }`. `Location` is
//! the exception: latitude and longitude travel together and both must be
//! valid before either is written.

use std::sync::Arc;

use serde_json::json;
use serde_json::Value;
use tracing::warn;

use crate::command::Command;
use crate::command::CommandCx;

pub(crate) fn handlers() -> Vec<Arc<dyn Command>> {
    let slots = [
        "Brightness",
        "BrightnessMode",
        "Power",
        "ChargeMode",
        "Volume",
        "HeartRate",
        "StepCount",
        "Barometer",
        "Language",
        "KeepScreenOnState",
        "WearingState",
        "ColorMode",
        "Orientation",
        "FontSelect",
    ];
    let mut handlers: Vec<Arc<dyn Command>> = slots
        .iter()
        .map(|name| Arc::new(DeviceSlot { name }) as Arc<dyn Command>)
        .collect();
    handlers.push(Arc::new(Location));
    handlers
}

/// Forwards a state change to the runtime. Runtime failures are logged
/// and swallowed; the IDE already got its answer from the local store.
fn forward(cx: &CommandCx<'_>, key: &str, value: &Value) {
    if let Err(e) = cx.host().runtime.set_device_state(key, value) {
        warn!(command = key, error = %e, "runtime rejected device state");
    }
}

/// A single device slot exposed as a GET/SET command pair.
struct DeviceSlot {
    name: &'static str,
}

impl Command for DeviceSlot {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate_set(&self, cx: &CommandCx<'_>) -> bool {
        match (cx.host().device.domain(self.name), cx.arg(self.name)) {
            (Some(domain), Some(value)) => domain.admits(value),
            _ => false,
        }
    }

    fn run_set(&self, cx: &mut CommandCx<'_>) {
        let Some(value) = cx.arg(self.name).cloned() else {
            return;
        };
        if let Err(e) = cx.host().device.set(self.name, value.clone()) {
            warn!(command = self.name, error = %e, "device state write failed");
            return;
        }
        forward(cx, self.name, &value);
        cx.reply(json!(true));
    }

    fn run_get(&self, cx: &mut CommandCx<'_>) {
        if let Some(value) = cx.host().device.get(self.name) {
            cx.reply(json!({ self.name: value }));
        }
    }
}

/// Latitude and longitude as one command. Both coordinates are checked
/// before either slot is written so a bad pair cannot half-apply.
struct Location;

impl Command for Location {
    fn name(&self) -> &'static str {
        "Location"
    }

    fn validate_set(&self, cx: &CommandCx<'_>) -> bool {
        let lat = cx.arg_f64("latitude");
        let lon = cx.arg_f64("longitude");
        matches!((lat, lon), (Some(lat), Some(lon))
            if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon))
    }

    fn run_set(&self, cx: &mut CommandCx<'_>) {
        let (Some(lat), Some(lon)) = (cx.arg_f64("latitude"), cx.arg_f64("longitude")) else {
            return;
        };
        let pairs = [("latitude", json!(lat)), ("longitude", json!(lon))];
        if let Err(e) = cx.host().device.set_many(&pairs) {
            warn!(error = %e, "device state write failed");
            return;
        }
        forward(
            cx,
            "Location",
            &json!({ "latitude": lat, "longitude": lon }),
        );
        cx.reply(json!(true));
    }

    fn run_get(&self, cx: &mut CommandCx<'_>) {
        let device = &cx.host().device;
        if let (Some(lat), Some(lon)) = (device.get("latitude"), device.get("longitude")) {
            cx.reply(json!({ "latitude": lat, "longitude": lon }));
        }
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
    fn test_set_writes_store_and_forwards() {
        let (host, runtime) = host_with(MockRuntime::new());
        let handler = DeviceSlot { name: "Brightness" };
        let (ok, reply) = run_verb(&handler, Verb::Set, json!({ "Brightness": 200 }), &host);
        assert!(ok);
        assert_eq!(reply, Some(json!(true)));
        assert_eq!(host.device.get("Brightness"), Some(json!(200)));
        assert_eq!(
            runtime.last_call(),
            Some(RuntimeCall::SetState("Brightness".to_string(), json!(200)))
        );
    }

    #[test]
    fn test_out_of_domain_set_rejected_without_write() {
        let (host, runtime) = host_with(MockRuntime::new());
        let handler = DeviceSlot { name: "Brightness" };
        let (ok, reply) = run_verb(&handler, Verb::Set, json!({ "Brightness": 999 }), &host);
        assert!(!ok);
        assert_eq!(reply, None);
        // default survives, nothing reached the runtime
        assert_eq!(host.device.get("Brightness"), Some(json!(170)));
        assert_eq!(runtime.call_count("set_state"), 0);
    }

    #[test]
    fn test_get_replies_slot_value() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let handler = DeviceSlot { name: "Volume" };
        let (ok, reply) = run_verb(&handler, Verb::Get, Value::Null, &host);
        assert!(ok);
        assert_eq!(reply, Some(json!({ "Volume": 50 })));
    }

    #[test]
    fn test_enum_slot_round_trip() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let handler = DeviceSlot { name: "ColorMode" };
        let (ok, _) = run_verb(&handler, Verb::Set, json!({ "ColorMode": "dark" }), &host);
        assert!(ok);
        assert!(!run_verb(&handler, Verb::Set, json!({ "ColorMode": "sepia" }), &host).0);
        let (_, reply) = run_verb(&handler, Verb::Get, Value::Null, &host);
        assert_eq!(reply, Some(json!({ "ColorMode": "dark" })));
    }

    #[test]
    fn test_missing_arg_key_rejected() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let handler = DeviceSlot { name: "Power" };
        assert!(!run_verb(&handler, Verb::Set, json!({ "power": 40 }), &host).0);
        assert!(!run_verb(&handler, Verb::Set, Value::Null, &host).0);
    }

    #[test]
    fn test_location_sets_both_slots() {
        let (host, runtime) = host_with(MockRuntime::new());
        let args = json!({ "latitude": 39.9, "longitude": 116.4 });
        let (ok, reply) = run_verb(&Location, Verb::Set, args, &host);
        assert!(ok);
        assert_eq!(reply, Some(json!(true)));
        assert_eq!(host.device.get("latitude"), Some(json!(39.9)));
        assert_eq!(host.device.get("longitude"), Some(json!(116.4)));
        match runtime.last_call() {
            Some(RuntimeCall::SetState(key, value)) => {
                assert_eq!(key, "Location");
                assert_eq!(value, json!({ "latitude": 39.9, "longitude": 116.4 }));
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn test_location_rejects_half_valid_pair() {
        let (host, runtime) = host_with(MockRuntime::new());
        let args = json!({ "latitude": 39.9, "longitude": 181.0 });
        assert!(!run_verb(&Location, Verb::Set, args, &host).0);
        assert!(!run_verb(&Location, Verb::Set, json!({ "latitude": 39.9 }), &host).0);
        // neither slot moved off its default
        assert_eq!(host.device.get("latitude"), Some(json!(0.0)));
        assert_eq!(host.device.get("longitude"), Some(json!(0.0)));
        assert_eq!(runtime.call_count("set_state"), 0);
    }

    #[test]
    fn test_location_get_replies_pair() {
        let (host, _runtime) = host_with(MockRuntime::new());
        let (ok, reply) = run_verb(&Location, Verb::Get, Value::Null, &host);
        assert!(ok);
        assert_eq!(reply, Some(json!({ "latitude": 0.0, "longitude": 0.0 })));
    }

    #[test]
    fn test_runtime_failure_keeps_local_write() {
        let (host, runtime) = host_with(MockRuntime::new());
        runtime.set_fail_all(true);
        let handler = DeviceSlot { name: "HeartRate" };
        let (ok, reply) = run_verb(&handler, Verb::Set, json!({ "HeartRate": 120 }), &host);
        assert!(ok);
        assert_eq!(reply, Some(json!(true)));
        assert_eq!(host.device.get("HeartRate"), Some(json!(120)));
    }

    #[test]
    fn test_handlers_cover_every_slot_command() {
        let names: Vec<&str> = handlers().iter().map(|h| h.name()).collect();
        assert_eq!(names.len(), 15);
        assert!(names.contains(&"Barometer"));
        assert!(names.contains(&"Location"));
        assert!(names.contains(&"FontSelect"));
    }
}
