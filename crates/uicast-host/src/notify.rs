//! Runtime-initiated notification plumbing.
//!
//! The runtime reports navigation, content loads, fast-preview results
//! and avoid-area changes through [`RuntimeCallbacks`]. The bridge stores
//! the latest value in [`NotifyState`] and enqueues the matching
//! secondary-channel command on the tick queue; the command loop drains
//! the queue between transport reads and re-enters the normal dispatch
//! pipeline, so pushes ride the same code path as IDE requests.

use std::sync::mpsc;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;
use uicast_capture::CapturePipeline;
use uicast_common::mutex_lock_or_recover;
use uicast_proto::Verb;
use uicast_runtime::AvoidRect;
use uicast_runtime::RenderedFrame;
use uicast_runtime::RuntimeCallbacks;

/// An internally generated command awaiting the next loop tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickCommand {
    pub name: &'static str,
    pub verb: Verb,
    pub args: Value,
}

#[derive(Default)]
struct NotifyInner {
    router: Option<String>,
    content: Option<String>,
    fast_preview: Option<String>,
    avoid_area: Option<AvoidRect>,
}

/// Latest runtime-reported values served by the secondary-channel commands.
#[derive(Default)]
pub struct NotifyState {
    inner: Mutex<NotifyInner>,
}

impl NotifyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_router(&self, router: &str) {
        mutex_lock_or_recover(&self.inner).router = Some(router.to_string());
    }

    pub fn router(&self) -> Option<String> {
        mutex_lock_or_recover(&self.inner).router.clone()
    }

    pub fn set_content(&self, content: &str) {
        mutex_lock_or_recover(&self.inner).content = Some(content.to_string());
    }

    pub fn content(&self) -> Option<String> {
        mutex_lock_or_recover(&self.inner).content.clone()
    }

    pub fn set_fast_preview(&self, message: &str) {
        mutex_lock_or_recover(&self.inner).fast_preview = Some(message.to_string());
    }

    pub fn fast_preview(&self) -> Option<String> {
        mutex_lock_or_recover(&self.inner).fast_preview.clone()
    }

    pub fn set_avoid_area(&self, area: AvoidRect) {
        mutex_lock_or_recover(&self.inner).avoid_area = Some(area);
    }

    pub fn avoid_area(&self) -> Option<AvoidRect> {
        mutex_lock_or_recover(&self.inner).avoid_area
    }
}

/// The host's [`RuntimeCallbacks`] implementation.
///
/// Frames and flush-empty signals go straight to the capture pipeline;
/// everything else is stored and re-dispatched through the tick queue.
pub struct HostCallbacks {
    pipeline: Arc<CapturePipeline>,
    notify: Arc<NotifyState>,
    tick: Mutex<mpsc::Sender<TickCommand>>,
}

impl HostCallbacks {
    pub fn new(
        pipeline: Arc<CapturePipeline>,
        notify: Arc<NotifyState>,
        tick: mpsc::Sender<TickCommand>,
    ) -> Self {
        Self {
            pipeline,
            notify,
            tick: Mutex::new(tick),
        }
    }

    fn enqueue(&self, name: &'static str, verb: Verb) {
        let command = TickCommand {
            name,
            verb,
            args: Value::Null,
        };
        if mutex_lock_or_recover(&self.tick).send(command).is_err() {
            debug!(command = name, "tick queue closed, notification dropped");
        }
    }
}

impl RuntimeCallbacks for HostCallbacks {
    fn on_frame(&self, frame: RenderedFrame) {
        self.pipeline.on_frame(frame);
    }

    fn on_flush_empty(&self, timestamp_ns: u64) {
        self.pipeline.on_flush_empty(timestamp_ns);
    }

    fn on_router_changed(&self, router: &str) {
        self.notify.set_router(router);
        self.enqueue("CurrentRouter", Verb::Get);
    }

    fn on_content_loaded(&self, content: &str) {
        self.notify.set_content(content);
        self.enqueue("LoadContent", Verb::Action);
    }

    fn on_fast_preview(&self, message: &str) {
        self.notify.set_fast_preview(message);
        self.enqueue("FastPreviewMsg", Verb::Get);
    }

    fn on_avoid_area_changed(&self, area: AvoidRect) {
        self.notify.set_avoid_area(area);
        self.enqueue("AvoidAreaChanged", Verb::Action);
    }
}
