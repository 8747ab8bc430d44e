//! Concrete command handlers, grouped by surface.

use std::sync::Arc;

use crate::command::Command;

mod device;
mod display;
mod input;
mod lifecycle;
mod notify;
mod stream;

/// The full builtin table, in registration order.
pub(crate) fn all() -> Vec<Arc<dyn Command>> {
    let mut handlers: Vec<Arc<dyn Command>> = Vec::new();
    handlers.extend(input::handlers());
    handlers.extend(device::handlers());
    handlers.extend(display::handlers());
    handlers.extend(lifecycle::handlers());
    handlers.extend(stream::handlers());
    handlers.extend(notify::handlers());
    handlers
}
