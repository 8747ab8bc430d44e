//! Command registry: name → handler, populated once at startup and read
//! concurrently afterward.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::Command;
use crate::commands;

#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full protocol table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for handler in commands::all() {
            registry.register(handler);
        }
        registry
    }

    /// Add a handler under its own name. Duplicate names: last
    /// registration wins.
    pub fn register(&mut self, handler: Arc<dyn Command>) {
        self.handlers.insert(handler.name(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.handlers.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::command::CommandCx;

    #[test]
    fn test_builtin_registers_full_table() {
        let registry = CommandRegistry::builtin();
        assert_eq!(registry.len(), 40);
        for name in [
            "TouchPress",
            "MouseWheel",
            "KeyPress",
            "CrownRotate",
            "Brightness",
            "Location",
            "Resolution",
            "ResolutionSwitch",
            "DeviceType",
            "LoadDocument",
            "Snapshot",
            "Exit",
            "DropFrame",
            "StaticCard",
            "CurrentRouter",
            "AvoidAreaChanged",
        ] {
            assert!(registry.get(name).is_some(), "{name} missing");
        }
        assert!(registry.get("NoSuchCommand").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        struct First;
        impl Command for First {
            fn name(&self) -> &'static str {
                "Same"
            }
        }
        struct Second;
        impl Command for Second {
            fn name(&self) -> &'static str {
                "Same"
            }
            fn run_get(&self, cx: &mut CommandCx) {
                cx.reply(json!("second"));
            }
        }

        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(First));
        registry.register(Arc::new(Second));
        assert_eq!(registry.len(), 1);

        let handler = registry.get("Same").unwrap();
        let host = crate::test_support::host();
        let mut cx = CommandCx::new(&host, serde_json::Value::Null);
        handler.run_get(&mut cx);
        assert_eq!(cx.into_outputs().0, Some(json!("second")));
    }
}
