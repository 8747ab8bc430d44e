//! Stream tuning commands.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::command::Command;
use crate::command::CommandCx;

pub(crate) fn handlers() -> Vec<Arc<dyn Command>> {
    vec![Arc::new(DropFrame), Arc::new(StaticCard)]
}

/// Configures frame thinning. A frequency of N drops every Nth candidate
/// frame before capture sees it; 0 disables thinning.
struct DropFrame;

impl Command for DropFrame {
    fn name(&self) -> &'static str {
        "DropFrame"
    }

    fn validate_set(&self, cx: &CommandCx<'_>) -> bool {
        matches!(cx.arg_i64("frequency"), Some(f) if (0..=1000).contains(&f))
    }

    fn run_set(&self, cx: &mut CommandCx<'_>) {
        let Some(frequency) = cx.arg_i64("frequency") else {
            return;
        };
        cx.host().pipeline.set_drop_frequency(frequency as u32);
        info!(frequency, "drop frequency updated");
        cx.reply(json!(true));
    }
}

/// Toggles static-card mode, narrowing the incoming command surface to
/// the fixed allow table.
struct StaticCard;

impl Command for StaticCard {
    fn name(&self) -> &'static str {
        "StaticCard"
    }

    fn validate_set(&self, cx: &CommandCx<'_>) -> bool {
        cx.arg_bool("StaticCard").is_some()
    }

    fn run_set(&self, cx: &mut CommandCx<'_>) {
        let Some(enabled) = cx.arg_bool("StaticCard") else {
            return;
        };
        cx.host().policy.set_static_card(enabled);
        info!(enabled, "static card mode changed");
        cx.reply(json!(true));
    }
}
