//! Typed input events delivered to the UI runtime.
//!
//! The command layer parses wire args into these before handing them to
//! [`UiRuntime::deliver_input_event`](crate::UiRuntime::deliver_input_event),
//! so runtimes never see raw JSON for input.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Press,
    Release,
    Move,
    Wheel,
}

/// What produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTool {
    Finger,
    Mouse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub action: PointerAction,
    /// Mouse button index; 0 for touch.
    pub button: i32,
    pub source_tool: SourceTool,
    /// Wheel rotation steps; nonzero only for [`PointerAction::Wheel`].
    pub wheel_delta: i32,
}

impl PointerEvent {
    pub fn touch(x: f64, y: f64, action: PointerAction) -> Self {
        Self {
            x,
            y,
            action,
            button: 0,
            source_tool: SourceTool::Finger,
            wheel_delta: 0,
        }
    }

    pub fn mouse(x: f64, y: f64, action: PointerAction, button: i32) -> Self {
        Self {
            x,
            y,
            action,
            button,
            source_tool: SourceTool::Mouse,
            wheel_delta: 0,
        }
    }

    pub fn wheel(x: f64, y: f64, delta: i32) -> Self {
        Self {
            x,
            y,
            action: PointerAction::Wheel,
            button: 0,
            source_tool: SourceTool::Mouse,
            wheel_delta: delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

impl KeyAction {
    /// Wire encoding: 0 = down, 1 = up.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(KeyAction::Down),
            1 => Some(KeyAction::Up),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: i32,
    pub action: KeyAction,
    /// Text payload for character-producing keys, when the IDE sends one.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    /// Hardware back affordance.
    Back,
    /// Watch crown rotation, in detents.
    Crown { rotation: i32 },
}

/// Dirty rectangle attached to a rendered frame, in capture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Screen region the UI should avoid (notches, system bars).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvoidRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_constructor_zeroes_mouse_fields() {
        let event = PointerEvent::touch(10.0, 20.0, PointerAction::Press);
        assert_eq!(event.button, 0);
        assert_eq!(event.wheel_delta, 0);
        assert_eq!(event.source_tool, SourceTool::Finger);
    }

    #[test]
    fn test_wheel_constructor_sets_action() {
        let event = PointerEvent::wheel(5.0, 5.0, -3);
        assert_eq!(event.action, PointerAction::Wheel);
        assert_eq!(event.wheel_delta, -3);
    }

    #[test]
    fn test_key_action_from_code() {
        assert_eq!(KeyAction::from_code(0), Some(KeyAction::Down));
        assert_eq!(KeyAction::from_code(1), Some(KeyAction::Up));
        assert_eq!(KeyAction::from_code(2), None);
        assert_eq!(KeyAction::from_code(-1), None);
    }
}
