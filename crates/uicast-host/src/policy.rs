//! Static-card policy gate.
//!
//! When a card (static preview surface) is being displayed, most of the
//! protocol is meaningless; incoming commands not on the allow table are
//! silently discarded before dispatch. Input commands stay on the table
//! so they still validate and reply, but their forwarding is suppressed
//! at execution.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

/// Commands still served while static-card mode is active.
pub const STATIC_CARD_ALLOWED: &[&str] = &[
    "TouchPress",
    "TouchRelease",
    "TouchMove",
    "MousePress",
    "MouseRelease",
    "MouseMove",
    "MouseWheel",
    "KeyPress",
    "BackClicked",
    "CrownRotate",
    "LoadDocument",
    "MemoryRefresh",
    "FastPreviewMsg",
    "LoadContent",
    "CurrentRouter",
    "Snapshot",
    "Resolution",
    "DropFrame",
    "StaticCard",
    "Exit",
];

#[derive(Debug, Default)]
pub struct PolicyGate {
    static_card: AtomicBool,
}

impl PolicyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_static_card(&self, active: bool) {
        self.static_card.store(active, Ordering::Relaxed);
    }

    pub fn static_card(&self) -> bool {
        self.static_card.load(Ordering::Relaxed)
    }

    /// Whether an incoming command may proceed to dispatch.
    pub fn admits(&self, command: &str) -> bool {
        !self.static_card() || STATIC_CARD_ALLOWED.contains(&command)
    }
}
