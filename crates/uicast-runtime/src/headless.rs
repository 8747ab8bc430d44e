//! Stand-in collaborators for running the host without an embedded runtime.
//!
//! `uicast start` wires these in so the whole pipeline (command loop,
//! capture, streaming) can be driven from an IDE before a real runtime
//! is linked. Loads and reloads emit one synthetic frame followed by a
//! flush-empty, which finalizes a capture session through the normal
//! grace path.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Value;
use tracing::debug;
use tracing::info;
use uicast_common::mutex_lock_or_recover;

use crate::clock::monotonic_ns;
use crate::events::InputEvent;
use crate::runtime::FrameEncoder;
use crate::runtime::LoadDocumentRequest;
use crate::runtime::RenderedFrame;
use crate::runtime::RuntimeCallbacks;
use crate::runtime::RuntimeError;
use crate::runtime::UiRuntime;

const DEFAULT_FRAME_WIDTH: u32 = 360;
const DEFAULT_FRAME_HEIGHT: u32 = 780;

pub struct HeadlessRuntime {
    callbacks: Mutex<Option<Arc<dyn RuntimeCallbacks>>>,
    frame_width: u32,
    frame_height: u32,
    loads: AtomicU64,
}

impl Default for HeadlessRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRuntime {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(None),
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            loads: AtomicU64::new(0),
        }
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_width = width.max(1);
        self.frame_height = height.max(1);
        self
    }

    fn synthetic_frame(&self) -> RenderedFrame {
        let seed = self.loads.load(Ordering::Relaxed) as u8;
        let mut pixels = Vec::with_capacity(self.frame_width as usize * self.frame_height as usize * 3);
        for y in 0..self.frame_height {
            for x in 0..self.frame_width {
                pixels.push(seed.wrapping_mul(31));
                pixels.push((x % 256) as u8);
                pixels.push((y % 256) as u8);
            }
        }
        RenderedFrame {
            pixels,
            width: self.frame_width,
            height: self.frame_height,
            timestamp_ns: monotonic_ns(),
            dirty: None,
        }
    }

    fn emit_render_pass(&self) {
        let sink = mutex_lock_or_recover(&self.callbacks).clone();
        if let Some(cb) = sink {
            cb.on_frame(self.synthetic_frame());
            cb.on_flush_empty(monotonic_ns());
        }
    }
}

impl UiRuntime for HeadlessRuntime {
    fn register_callbacks(&self, callbacks: Arc<dyn RuntimeCallbacks>) {
        *mutex_lock_or_recover(&self.callbacks) = Some(callbacks);
    }

    fn deliver_input_event(&self, event: InputEvent) -> Result<(), RuntimeError> {
        debug!(?event, "headless runtime swallowed input event");
        Ok(())
    }

    fn set_device_state(&self, key: &str, value: &Value) -> Result<(), RuntimeError> {
        debug!(key, %value, "headless runtime observed device state");
        Ok(())
    }

    fn load_document(&self, request: &LoadDocumentRequest) -> Result<(), RuntimeError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(url = %request.url, "headless runtime loading document");
        self.emit_render_pass();
        let sink = mutex_lock_or_recover(&self.callbacks).clone();
        if let Some(cb) = sink {
            cb.on_content_loaded(&request.url);
            cb.on_router_changed(&request.url);
        }
        Ok(())
    }

    fn reload_page(&self, page: &str) -> Result<(), RuntimeError> {
        info!(page, "headless runtime reloading page");
        self.emit_render_pass();
        Ok(())
    }

    fn restart(&self) -> Result<(), RuntimeError> {
        info!("headless runtime restart");
        self.loads.store(0, Ordering::Relaxed);
        Ok(())
    }

    fn exit(&self) -> Result<(), RuntimeError> {
        info!("headless runtime exit");
        Ok(())
    }

    fn memory_refresh(&self, payload: &Value) -> Result<(), RuntimeError> {
        debug!(%payload, "headless runtime memory refresh");
        let sink = mutex_lock_or_recover(&self.callbacks).clone();
        if let Some(cb) = sink {
            cb.on_fast_preview("memory refresh applied");
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<RenderedFrame, RuntimeError> {
        Ok(self.synthetic_frame())
    }
}

/// Encoder that returns the RGB buffer unchanged.
///
/// Real deployments plug in an actual image codec; this keeps the dev
/// loop dependency-free while preserving the streamer's byte handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEncoder;

impl FrameEncoder for PassthroughEncoder {
    fn encode(
        &self,
        pixels: &[u8],
        _width: u32,
        _height: u32,
        _quality: u8,
    ) -> Result<Vec<u8>, RuntimeError> {
        Ok(pixels.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AvoidRect;

    #[derive(Default)]
    struct CountingSink {
        frames: AtomicU64,
        flushes: AtomicU64,
        contents: AtomicU64,
    }

    impl RuntimeCallbacks for CountingSink {
        fn on_frame(&self, frame: RenderedFrame) {
            assert_eq!(frame.pixels.len(), frame.expected_len());
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
        fn on_flush_empty(&self, _timestamp_ns: u64) {
            self.flushes.fetch_add(1, Ordering::Relaxed);
        }
        fn on_router_changed(&self, _router: &str) {}
        fn on_content_loaded(&self, _content: &str) {
            self.contents.fetch_add(1, Ordering::Relaxed);
        }
        fn on_fast_preview(&self, _message: &str) {}
        fn on_avoid_area_changed(&self, _area: AvoidRect) {}
    }

    #[test]
    fn test_load_emits_frame_then_flush() {
        let runtime = HeadlessRuntime::new().with_frame_size(4, 4);
        let sink = Arc::new(CountingSink::default());
        runtime.register_callbacks(sink.clone());
        runtime
            .load_document(&LoadDocumentRequest::new("pages/Index"))
            .unwrap();
        assert_eq!(sink.frames.load(Ordering::Relaxed), 1);
        assert_eq!(sink.flushes.load(Ordering::Relaxed), 1);
        assert_eq!(sink.contents.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unregistered_load_is_harmless() {
        let runtime = HeadlessRuntime::new().with_frame_size(2, 2);
        assert!(runtime.load_document(&LoadDocumentRequest::new("x")).is_ok());
    }

    #[test]
    fn test_snapshot_matches_configured_size() {
        let runtime = HeadlessRuntime::new().with_frame_size(8, 2);
        let frame = runtime.snapshot().unwrap();
        assert_eq!(frame.width, 8);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.pixels.len(), frame.expected_len());
    }

    #[test]
    fn test_passthrough_encoder_is_identity() {
        let out = PassthroughEncoder.encode(&[9, 8, 7], 1, 1, 70).unwrap();
        assert_eq!(out, vec![9, 8, 7]);
    }
}
