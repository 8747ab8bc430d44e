#![deny(clippy::all)]

mod clock;
mod events;
mod headless;
mod mock;
mod runtime;

pub use clock::monotonic_ns;
pub use events::AvoidRect;
pub use events::DirtyRect;
pub use events::InputEvent;
pub use events::KeyAction;
pub use events::KeyEvent;
pub use events::PointerAction;
pub use events::PointerEvent;
pub use events::SourceTool;
pub use headless::HeadlessRuntime;
pub use headless::PassthroughEncoder;
pub use mock::MockEncoder;
pub use mock::MockRuntime;
pub use mock::RuntimeCall;
pub use runtime::FrameEncoder;
pub use runtime::LoadDocumentRequest;
pub use runtime::RenderedFrame;
pub use runtime::RuntimeCallbacks;
pub use runtime::RuntimeError;
pub use runtime::UiRuntime;
