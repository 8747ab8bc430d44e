//! Shared host services, constructed once at startup and passed by
//! `Arc` into the command loop, the callback bridge and the server
//! threads. No process-wide singletons.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::warn;
use uicast_capture::CapturePipeline;
use uicast_capture::FinalizeSink;
use uicast_capture::FrameStreamer;
use uicast_runtime::FrameEncoder;
use uicast_runtime::RenderedFrame;
use uicast_runtime::UiRuntime;

use crate::config::HostConfig;
use crate::device_state::DeviceState;
use crate::metrics::HostMetrics;
use crate::notify::NotifyState;
use crate::policy::PolicyGate;

pub struct HostContext {
    pub config: HostConfig,
    pub device: DeviceState,
    pub runtime: Arc<dyn UiRuntime>,
    pub encoder: Arc<dyn FrameEncoder>,
    pub streamer: Arc<FrameStreamer>,
    pub pipeline: Arc<CapturePipeline>,
    pub policy: PolicyGate,
    pub notify: Arc<NotifyState>,
    pub metrics: Arc<HostMetrics>,
    /// Raised by `Exit` or a termination signal; the server loop polls it.
    pub shutdown: Arc<AtomicBool>,
}

impl HostContext {
    pub fn new(
        config: HostConfig,
        runtime: Arc<dyn UiRuntime>,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Arc<Self> {
        let streamer = Arc::new(FrameStreamer::new(Arc::clone(&encoder)));
        streamer.set_mode(config.stream_mode);
        let metrics = Arc::new(HostMetrics::new());
        let pipeline = CapturePipeline::new(Arc::new(MeteredSink {
            streamer: Arc::clone(&streamer),
            metrics: Arc::clone(&metrics),
        }));
        Arc::new(Self {
            config,
            device: DeviceState::new(),
            runtime,
            encoder,
            streamer,
            pipeline,
            policy: PolicyGate::new(),
            notify: Arc::new(NotifyState::new()),
            metrics,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Finalized frames go to the streamer; outcomes are counted. A failed
/// stream skips the frame and never unwinds into the watchdog.
struct MeteredSink {
    streamer: Arc<FrameStreamer>,
    metrics: Arc<HostMetrics>,
}

impl FinalizeSink for MeteredSink {
    fn deliver(&self, frame: &RenderedFrame) {
        match self.streamer.stream(frame) {
            Ok(()) => self.metrics.record_frame_streamed(),
            Err(e) => {
                self.metrics.record_frame_skipped();
                warn!(error = %e, "finalized frame skipped");
            }
        }
    }
}
