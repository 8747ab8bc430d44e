//! Input-injection commands (ACTION verb).
//!
//! All coordinates are validated against the current screen bounds
//! before anything reaches the runtime. In static-card mode the commands
//! still validate and reply `true`, but forwarding is suppressed.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;
use uicast_runtime::InputEvent;
use uicast_runtime::KeyAction;
use uicast_runtime::KeyEvent;
use uicast_runtime::PointerAction;
use uicast_runtime::PointerEvent;
use uicast_runtime::SourceTool;

use crate::command::Command;
use crate::command::CommandCx;

pub(crate) fn handlers() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(Pointer::touch("TouchPress", PointerAction::Press)),
        Arc::new(Pointer::touch("TouchRelease", PointerAction::Release)),
        Arc::new(Pointer::touch("TouchMove", PointerAction::Move)),
        Arc::new(Pointer::mouse("MousePress", PointerAction::Press)),
        Arc::new(Pointer::mouse("MouseRelease", PointerAction::Release)),
        Arc::new(Pointer::mouse("MouseMove", PointerAction::Move)),
        Arc::new(MouseWheel),
        Arc::new(KeyPress),
        Arc::new(BackClicked),
        Arc::new(CrownRotate),
    ]
}

fn coords(cx: &CommandCx) -> Option<(f64, f64)> {
    Some((cx.arg_f64("x")?, cx.arg_f64("y")?))
}

fn in_bounds(cx: &CommandCx, x: f64, y: f64) -> bool {
    let (width, height) = cx.host().device.screen_bounds();
    x >= 0.0 && x <= width as f64 && y >= 0.0 && y <= height as f64
}

fn valid_coords(cx: &CommandCx) -> bool {
    match coords(cx) {
        Some((x, y)) => in_bounds(cx, x, y),
        None => false,
    }
}

/// Optional `button` arg; when present it must be an integer in [0,7].
fn valid_button(cx: &CommandCx) -> bool {
    match cx.arg("button") {
        None => true,
        Some(v) => matches!(v.as_i64(), Some(b) if (0..=7).contains(&b)),
    }
}

/// Forward the event unless static-card mode suppresses input, then
/// report success either way. Runtime refusal is logged, not surfaced.
fn forward(cx: &mut CommandCx, name: &str, event: InputEvent) {
    if cx.host().policy.static_card() {
        cx.reply(Value::Bool(true));
        return;
    }
    if let Err(e) = cx.host().runtime.deliver_input_event(event) {
        warn!(command = name, error = %e, "input event not delivered");
    }
    cx.reply(Value::Bool(true));
}

/// Touch and mouse press/release/move commands.
struct Pointer {
    name: &'static str,
    action: PointerAction,
    tool: SourceTool,
}

impl Pointer {
    fn touch(name: &'static str, action: PointerAction) -> Self {
        Self {
            name,
            action,
            tool: SourceTool::Finger,
        }
    }

    fn mouse(name: &'static str, action: PointerAction) -> Self {
        Self {
            name,
            action,
            tool: SourceTool::Mouse,
        }
    }
}

impl Command for Pointer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate_action(&self, cx: &CommandCx) -> bool {
        valid_coords(cx) && (self.tool == SourceTool::Finger || valid_button(cx))
    }

    fn run_action(&self, cx: &mut CommandCx) {
        let Some((x, y)) = coords(cx) else { return };
        let event = match self.tool {
            SourceTool::Finger => PointerEvent::touch(x, y, self.action),
            SourceTool::Mouse => {
                let button = cx.arg_i64("button").unwrap_or(0) as i32;
                PointerEvent::mouse(x, y, self.action, button)
            }
        };
        forward(cx, self.name, InputEvent::Pointer(event));
    }
}

struct MouseWheel;

impl Command for MouseWheel {
    fn name(&self) -> &'static str {
        "MouseWheel"
    }

    fn validate_action(&self, cx: &CommandCx) -> bool {
        let delta_ok = matches!(cx.arg_i64("delta"), Some(d) if i32::try_from(d).is_ok());
        valid_coords(cx) && delta_ok
    }

    fn run_action(&self, cx: &mut CommandCx) {
        let Some((x, y)) = coords(cx) else { return };
        let delta = cx.arg_i64("delta").unwrap_or(0) as i32;
        forward(
            cx,
            self.name(),
            InputEvent::Pointer(PointerEvent::wheel(x, y, delta)),
        );
    }
}

struct KeyPress;

impl Command for KeyPress {
    fn name(&self) -> &'static str {
        "KeyPress"
    }

    fn validate_action(&self, cx: &CommandCx) -> bool {
        let code_ok = matches!(cx.arg_i64("keyCode"), Some(c) if (2000..=2999).contains(&c));
        let action_ok = matches!(cx.arg_i64("action"), Some(a) if KeyAction::from_code(a).is_some());
        code_ok && action_ok
    }

    fn run_action(&self, cx: &mut CommandCx) {
        let (Some(code), Some(raw_action)) = (cx.arg_i64("keyCode"), cx.arg_i64("action")) else {
            return;
        };
        let Some(action) = KeyAction::from_code(raw_action) else {
            return;
        };
        let event = KeyEvent {
            code: code as i32,
            action,
            text: cx.arg_str("text").map(str::to_string),
        };
        forward(cx, self.name(), InputEvent::Key(event));
    }
}

struct BackClicked;

impl Command for BackClicked {
    fn name(&self) -> &'static str {
        "BackClicked"
    }

    fn run_action(&self, cx: &mut CommandCx) {
        forward(cx, self.name(), InputEvent::Back);
    }
}

struct CrownRotate;

impl Command for CrownRotate {
    fn name(&self) -> &'static str {
        "CrownRotate"
    }

    fn validate_action(&self, cx: &CommandCx) -> bool {
        matches!(cx.arg_i64("rotate"), Some(r) if (-360..=360).contains(&r))
    }

    fn run_action(&self, cx: &mut CommandCx) {
        let rotation = cx.arg_i64("rotate").unwrap_or(0) as i32;
        forward(cx, self.name(), InputEvent::Crown { rotation });
    }
}
