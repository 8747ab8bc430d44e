//! Secondary-channel commands.
//!
//! These read the latest runtime-reported value out of [`NotifyState`]
//! and push it through the secondary output slot, flushed to the IDE as
//! a `{"MessageType": ..., "args": ...}` notification. None of them has
//! a direct reply; a failed validation therefore stays silent.

use std::sync::Arc;

use serde_json::json;

use crate::command::Command;
use crate::command::CommandCx;

pub(crate) fn handlers() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(CurrentRouter),
        Arc::new(FastPreviewMsg),
        Arc::new(LoadContent),
        Arc::new(AvoidAreaChanged),
    ]
}

/// The page router the runtime most recently navigated to.
struct CurrentRouter;

impl Command for CurrentRouter {
    fn name(&self) -> &'static str {
        "CurrentRouter"
    }

    fn replies_directly(&self) -> bool {
        false
    }

    fn run_get(&self, cx: &mut CommandCx<'_>) {
        let router = cx.host().notify.router().unwrap_or_default();
        cx.push(json!(router));
    }
}

/// Result of the latest fast-preview compilation.
struct FastPreviewMsg;

impl Command for FastPreviewMsg {
    fn name(&self) -> &'static str {
        "FastPreviewMsg"
    }

    fn replies_directly(&self) -> bool {
        false
    }

    fn run_get(&self, cx: &mut CommandCx<'_>) {
        let message = cx.host().notify.fast_preview().unwrap_or_default();
        cx.push(json!(message));
    }
}

/// Content descriptor captured when the runtime finished loading.
struct LoadContent;

impl Command for LoadContent {
    fn name(&self) -> &'static str {
        "LoadContent"
    }

    fn replies_directly(&self) -> bool {
        false
    }

    fn run_action(&self, cx: &mut CommandCx<'_>) {
        let content = cx.host().notify.content().unwrap_or_default();
        cx.push(json!(content));
    }
}

/// System inset the preview should keep clear. Unlike the other pushes
/// there is no meaningful empty value, so nothing is sent until the
/// runtime has reported an area.
struct AvoidAreaChanged;

impl Command for AvoidAreaChanged {
    fn name(&self) -> &'static str {
        "AvoidAreaChanged"
    }

    fn replies_directly(&self) -> bool {
        false
    }

    fn run_action(&self, cx: &mut CommandCx<'_>) {
        if let Some(area) = cx.host().notify.avoid_area() {
            cx.push(json!({
                "x": area.x,
                "y": area.y,
                "width": area.width,
                "height": area.height,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_json::Value;
    use uicast_proto::Verb;
    use uicast_runtime::AvoidRect;

    use crate::test_support::host;

    fn run_verb(
        handler: &dyn Command,
        verb: Verb,
        host: &crate::context::HostContext,
    ) -> (Option<Value>, Option<Value>) {
        let mut cx = CommandCx::new(host, Value::Null);
        assert!(handler.validate(verb, &cx));
        handler.run(verb, &mut cx);
        cx.into_outputs()
    }

    #[test]
    fn test_pushes_go_to_secondary_slot() {
        let host = host();
        host.notify.set_router("pages/detail");
        let (direct, secondary) = run_verb(&CurrentRouter, Verb::Get, &host);
        assert_eq!(direct, None);
        assert_eq!(secondary, Some(json!("pages/detail")));
    }

    #[test]
    fn test_unset_values_push_empty_string() {
        let host = host();
        assert_eq!(run_verb(&FastPreviewMsg, Verb::Get, &host).1, Some(json!("")));
        assert_eq!(run_verb(&LoadContent, Verb::Action, &host).1, Some(json!("")));
    }

    #[test]
    fn test_avoid_area_stays_silent_until_reported() {
        let host = host();
        assert_eq!(run_verb(&AvoidAreaChanged, Verb::Action, &host), (None, None));
        host.notify.set_avoid_area(AvoidRect {
            x: 0,
            y: 44,
            width: 1080,
            height: 120,
        });
        let (_, secondary) = run_verb(&AvoidAreaChanged, Verb::Action, &host);
        assert_eq!(
            secondary,
            Some(json!({ "x": 0, "y": 44, "width": 1080, "height": 120 }))
        );
    }

    #[test]
    fn test_no_handler_replies_directly() {
        for handler in handlers() {
            assert!(!handler.replies_directly(), "{}", handler.name());
        }
    }
}
