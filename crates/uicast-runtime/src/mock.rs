//! Test doubles for the collaborator traits.
//!
//! `MockRuntime` records every call and lets tests fire the registered
//! callbacks, so command handling and capture timing can be exercised
//! without a real runtime behind them.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde_json::Value;

use crate::clock::monotonic_ns;
use crate::events::AvoidRect;
use crate::events::InputEvent;
use crate::runtime::FrameEncoder;
use crate::runtime::LoadDocumentRequest;
use crate::runtime::RenderedFrame;
use crate::runtime::RuntimeCallbacks;
use crate::runtime::RuntimeError;
use crate::runtime::UiRuntime;

/// One recorded call on a [`MockRuntime`].
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeCall {
    Input(InputEvent),
    SetState(String, Value),
    Load(LoadDocumentRequest),
    Reload(String),
    Restart,
    Exit,
    MemoryRefresh(Value),
    Snapshot,
}

impl RuntimeCall {
    fn name(&self) -> &'static str {
        match self {
            RuntimeCall::Input(_) => "input",
            RuntimeCall::SetState(_, _) => "set_state",
            RuntimeCall::Load(_) => "load",
            RuntimeCall::Reload(_) => "reload",
            RuntimeCall::Restart => "restart",
            RuntimeCall::Exit => "exit",
            RuntimeCall::MemoryRefresh(_) => "memory_refresh",
            RuntimeCall::Snapshot => "snapshot",
        }
    }
}

/// A mock `UiRuntime` that records calls for assertions.
///
/// # Example
///
/// ```ignore
/// let runtime = MockRuntime::new();
/// runtime.deliver_input_event(InputEvent::Back).unwrap();
/// assert_eq!(runtime.call_count("input"), 1);
/// ```
#[derive(Clone, Default)]
pub struct MockRuntime {
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
    callbacks: Arc<Mutex<Option<Arc<dyn RuntimeCallbacks>>>>,
    snapshot_frame: Arc<Mutex<Option<RenderedFrame>>>,
    fail_all: Arc<AtomicBool>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent trait call fail with `RuntimeError::NotReady`.
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::Relaxed);
    }

    /// Configure the frame returned by `snapshot()`.
    pub fn set_snapshot(&self, frame: RenderedFrame) {
        *self.snapshot_frame.lock().unwrap() = Some(frame);
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name() == name)
            .count()
    }

    pub fn last_call(&self) -> Option<RuntimeCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Registered callback sink, if any.
    pub fn callbacks(&self) -> Option<Arc<dyn RuntimeCallbacks>> {
        self.callbacks.lock().unwrap().clone()
    }

    /// Drive the registered callbacks as a rendering runtime would.
    pub fn fire_frame(&self, frame: RenderedFrame) {
        if let Some(cb) = self.callbacks() {
            cb.on_frame(frame);
        }
    }

    pub fn fire_flush_empty(&self) {
        if let Some(cb) = self.callbacks() {
            cb.on_flush_empty(monotonic_ns());
        }
    }

    pub fn fire_router_changed(&self, router: &str) {
        if let Some(cb) = self.callbacks() {
            cb.on_router_changed(router);
        }
    }

    pub fn fire_content_loaded(&self, content: &str) {
        if let Some(cb) = self.callbacks() {
            cb.on_content_loaded(content);
        }
    }

    pub fn fire_fast_preview(&self, message: &str) {
        if let Some(cb) = self.callbacks() {
            cb.on_fast_preview(message);
        }
    }

    pub fn fire_avoid_area_changed(&self, area: AvoidRect) {
        if let Some(cb) = self.callbacks() {
            cb.on_avoid_area_changed(area);
        }
    }

    fn record(&self, call: RuntimeCall) -> Result<(), RuntimeError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_all.load(Ordering::Relaxed) {
            Err(RuntimeError::NotReady("mock failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl UiRuntime for MockRuntime {
    fn register_callbacks(&self, callbacks: Arc<dyn RuntimeCallbacks>) {
        *self.callbacks.lock().unwrap() = Some(callbacks);
    }

    fn deliver_input_event(&self, event: InputEvent) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Input(event))
    }

    fn set_device_state(&self, key: &str, value: &Value) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::SetState(key.to_string(), value.clone()))
    }

    fn load_document(&self, request: &LoadDocumentRequest) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Load(request.clone()))
    }

    fn reload_page(&self, page: &str) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Reload(page.to_string()))
    }

    fn restart(&self) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Restart)
    }

    fn exit(&self) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Exit)
    }

    fn memory_refresh(&self, payload: &Value) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::MemoryRefresh(payload.clone()))
    }

    fn snapshot(&self) -> Result<RenderedFrame, RuntimeError> {
        self.record(RuntimeCall::Snapshot)?;
        self.snapshot_frame
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RuntimeError::NotReady("no snapshot configured".to_string()))
    }
}

/// A mock encoder that prefixes the payload with the requested quality,
/// so tests can observe which tier was chosen.
#[derive(Clone, Default)]
pub struct MockEncoder {
    fail: Arc<AtomicBool>,
}

impl MockEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }
}

impl FrameEncoder for MockEncoder {
    fn encode(
        &self,
        pixels: &[u8],
        _width: u32,
        _height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, RuntimeError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(RuntimeError::EncodeFailed("mock encoder failure".to_string()));
        }
        let mut out = Vec::with_capacity(pixels.len() + 1);
        out.push(quality);
        out.extend_from_slice(pixels);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PointerAction;
    use crate::events::PointerEvent;

    #[test]
    fn test_mock_records_calls_in_order() {
        let runtime = MockRuntime::new();
        runtime.restart().unwrap();
        runtime
            .deliver_input_event(InputEvent::Pointer(PointerEvent::touch(
                1.0,
                2.0,
                PointerAction::Press,
            )))
            .unwrap();
        let calls = runtime.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], RuntimeCall::Restart);
        assert_eq!(runtime.call_count("input"), 1);
    }

    #[test]
    fn test_fail_all_still_records() {
        let runtime = MockRuntime::new();
        runtime.set_fail_all(true);
        assert!(runtime.exit().is_err());
        assert_eq!(runtime.call_count("exit"), 1);
    }

    #[test]
    fn test_snapshot_unconfigured_errors() {
        let runtime = MockRuntime::new();
        assert!(runtime.snapshot().is_err());
        let frame = RenderedFrame {
            pixels: vec![0; 3],
            width: 1,
            height: 1,
            timestamp_ns: 7,
            dirty: None,
        };
        runtime.set_snapshot(frame.clone());
        assert_eq!(runtime.snapshot().unwrap(), frame);
    }

    #[test]
    fn test_mock_encoder_tags_quality() {
        let encoder = MockEncoder::new();
        let out = encoder.encode(&[1, 2, 3], 1, 1, 85).unwrap();
        assert_eq!(out, vec![85, 1, 2, 3]);
    }
}
