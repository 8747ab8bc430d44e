//! Collaborator interfaces: the embedded UI runtime and the image codec.
//!
//! uicast does not render or encode anything itself. The embedding
//! application supplies a [`UiRuntime`] (the thing that renders pages and
//! accepts input) and a [`FrameEncoder`] (the image codec); the host
//! drives both and streams whatever comes back.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::events::AvoidRect;
use crate::events::DirtyRect;
use crate::events::InputEvent;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime not ready: {0}")]
    NotReady(String),
    #[error("input rejected: {0}")]
    InputRejected(String),
    #[error("document load failed: {0}")]
    LoadFailed(String),
    #[error("encode failed: {0}")]
    EncodeFailed(String),
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

/// One frame produced by the runtime's render callback.
///
/// `pixels` is tightly packed RGB888, row-major, `width * height * 3`
/// bytes. `timestamp_ns` must come from [`monotonic_ns`](crate::monotonic_ns)
/// so capture timing can compare it against session start times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp_ns: u64,
    /// Changed region, when the runtime tracks one. Used by region-mode
    /// streaming; `None` means the whole frame changed.
    pub dirty: Option<DirtyRect>,
}

impl RenderedFrame {
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Byte length a well-formed RGB888 buffer must have.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Document-load parameters from the IDE.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadDocumentRequest {
    pub url: String,
    pub class_name: Option<String>,
    /// Pass-through preview configuration (size, dpi, locale, ...).
    pub preview_param: Option<Value>,
}

impl LoadDocumentRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            class_name: None,
            preview_param: None,
        }
    }
}

/// Host-side sink the runtime reports into.
///
/// Registered once via [`UiRuntime::register_callbacks`]; the runtime may
/// invoke these from any thread.
pub trait RuntimeCallbacks: Send + Sync {
    /// A frame finished rendering.
    fn on_frame(&self, frame: RenderedFrame);
    /// A render pass completed with nothing new to draw.
    fn on_flush_empty(&self, timestamp_ns: u64);
    /// The page router navigated.
    fn on_router_changed(&self, router: &str);
    /// A document finished loading.
    fn on_content_loaded(&self, content: &str);
    /// The runtime produced a fast-preview (hot reload) report.
    fn on_fast_preview(&self, message: &str);
    /// The system avoid area changed.
    fn on_avoid_area_changed(&self, area: AvoidRect);
}

/// The embedded UI runtime.
pub trait UiRuntime: Send + Sync {
    fn register_callbacks(&self, callbacks: Arc<dyn RuntimeCallbacks>);
    fn deliver_input_event(&self, event: InputEvent) -> Result<(), RuntimeError>;
    /// Mirror a validated device-state write into the runtime.
    fn set_device_state(&self, key: &str, value: &Value) -> Result<(), RuntimeError>;
    fn load_document(&self, request: &LoadDocumentRequest) -> Result<(), RuntimeError>;
    fn reload_page(&self, page: &str) -> Result<(), RuntimeError>;
    fn restart(&self) -> Result<(), RuntimeError>;
    fn exit(&self) -> Result<(), RuntimeError>;
    /// Fast-preview data refresh with an opaque payload.
    fn memory_refresh(&self, payload: &Value) -> Result<(), RuntimeError>;
    /// Render the current page to a frame, outside the normal callback flow.
    fn snapshot(&self) -> Result<RenderedFrame, RuntimeError>;
}

/// External image codec.
pub trait FrameEncoder: Send + Sync {
    /// Encode an RGB888 buffer at the given quality (1..=100).
    fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, RuntimeError>;
}
