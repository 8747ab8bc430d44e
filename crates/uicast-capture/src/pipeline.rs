//! Capture state machine.
//!
//! One capture session runs per document-load cycle. Render callbacks
//! feed candidate frames in from the runtime's thread; a per-session
//! watchdog thread decides when the session is done and hands exactly
//! one frame (or none) to the [`FinalizeSink`].
//!
//! The flush-empty signal is a best-effort hint that rendering has
//! settled. The watchdog must neither block forever waiting for it nor
//! finalize while content is still changing, which is what the grace
//! and ceiling timeouts below encode.
//!
//! Lock ordering: there is a single session mutex. The render callback,
//! the flush-empty callback, and the watchdog all take it for short
//! critical sections only; the finalize sink is invoked after the lock
//! is released.

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::warn;
use uicast_common::mutex_lock_or_recover;
use uicast_runtime::RenderedFrame;
use uicast_runtime::monotonic_ns;

use crate::drop_filter::DropFilter;
use crate::error::CaptureError;
use crate::sleeper::RealSleeper;
use crate::sleeper::Sleeper;

/// Fixed capture policy. Not exposed to callers of the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTiming {
    /// After flush-empty, how long to wait for a later frame.
    pub flush_grace: Duration,
    /// Without flush-empty, how long before a lone candidate is
    /// considered static content and shipped.
    pub static_finalize: Duration,
    /// Absolute bound on a session's lifetime.
    pub hard_ceiling: Duration,
    /// Watchdog poll interval.
    pub tick: Duration,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            flush_grace: Duration::from_millis(100),
            static_finalize: Duration::from_millis(300),
            hard_ceiling: Duration::from_millis(9000),
            tick: Duration::from_millis(10),
        }
    }
}

/// Receives the single finalized frame of a session.
///
/// Delivery failures are the sink's problem (the streamer logs and skips);
/// the pipeline treats delivery as fire-and-forget.
pub trait FinalizeSink: Send + Sync {
    fn deliver(&self, frame: &RenderedFrame);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Capturing,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinalizeReason {
    /// A candidate rendered after the flush-empty watermark.
    PostFlushCandidate,
    /// Flush-empty seen, grace elapsed with no later candidate.
    FlushGraceExpired,
    /// No flush-empty, but a candidate sat unchanged long enough.
    StaticContent,
    /// Session hit the hard ceiling.
    HardCeiling,
}

impl FinalizeReason {
    fn as_str(self) -> &'static str {
        match self {
            FinalizeReason::PostFlushCandidate => "post-flush candidate",
            FinalizeReason::FlushGraceExpired => "flush grace expired",
            FinalizeReason::StaticContent => "static content",
            FinalizeReason::HardCeiling => "hard ceiling",
        }
    }
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    generation: u64,
    start_ns: u64,
    candidate: Option<RenderedFrame>,
    flush_seen: bool,
    /// Observation time of the flush-empty signal, not the signal's own
    /// timestamp.
    flush_ns: u64,
}

impl SessionState {
    fn reset_for(&mut self, generation: u64, start_ns: u64) {
        self.phase = SessionPhase::Capturing;
        self.generation = generation;
        self.start_ns = start_ns;
        self.candidate = None;
        self.flush_seen = false;
        self.flush_ns = 0;
    }
}

pub struct CapturePipeline {
    state: Mutex<SessionState>,
    drop_filter: DropFilter,
    sink: Arc<dyn FinalizeSink>,
    sleeper: Arc<dyn Sleeper>,
    timing: CaptureTiming,
}

impl CapturePipeline {
    pub fn new(sink: Arc<dyn FinalizeSink>) -> Arc<Self> {
        Self::with_timing(sink, Arc::new(RealSleeper), CaptureTiming::default())
    }

    pub fn with_timing(
        sink: Arc<dyn FinalizeSink>,
        sleeper: Arc<dyn Sleeper>,
        timing: CaptureTiming,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SessionState {
                phase: SessionPhase::Idle,
                generation: 0,
                start_ns: 0,
                candidate: None,
                flush_seen: false,
                flush_ns: 0,
            }),
            drop_filter: DropFilter::new(),
            sink,
            sleeper,
            timing,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        mutex_lock_or_recover(&self.state).phase
    }

    pub fn generation(&self) -> u64 {
        mutex_lock_or_recover(&self.state).generation
    }

    /// Reconfigure the every-Nth drop policy. Persists across sessions.
    pub fn set_drop_frequency(&self, frequency: u32) {
        self.drop_filter.configure(frequency);
    }

    pub fn drop_frequency(&self) -> u32 {
        self.drop_filter.frequency()
    }

    /// Start a capture session for a new document-load cycle.
    ///
    /// Any in-flight session is cancelled: its watchdog sees the bumped
    /// generation and exits without finalizing. Session state is fully
    /// reset under the lock before this returns, so no stale candidate
    /// can leak across sessions.
    pub fn begin_session(self: &Arc<Self>) -> Result<u64, CaptureError> {
        let generation = {
            let mut state = mutex_lock_or_recover(&self.state);
            let generation = state.generation + 1;
            state.reset_for(generation, monotonic_ns());
            generation
        };

        let pipeline = Arc::clone(self);
        let spawn = thread::Builder::new()
            .name(format!("capture-watchdog-{generation}"))
            .spawn(move || pipeline.watchdog_loop(generation));
        match spawn {
            Ok(_) => {
                info!(generation, "capture session started");
                Ok(generation)
            }
            Err(e) => {
                let mut state = mutex_lock_or_recover(&self.state);
                if state.generation == generation {
                    state.phase = SessionPhase::Idle;
                }
                Err(CaptureError::WatchdogSpawn(e))
            }
        }
    }

    /// Cancel whatever session is active without finalizing it.
    pub fn cancel(&self) {
        let mut state = mutex_lock_or_recover(&self.state);
        state.generation += 1;
        state.phase = SessionPhase::Idle;
        state.candidate = None;
        state.flush_seen = false;
    }

    /// Render callback entry point. Runs on the runtime's thread.
    ///
    /// The drop filter counts every incoming frame, session or not.
    pub fn on_frame(&self, frame: RenderedFrame) {
        if !self.drop_filter.admit() {
            debug!(
                timestamp_ns = frame.timestamp_ns,
                "frame suppressed by drop policy"
            );
            return;
        }
        let mut state = mutex_lock_or_recover(&self.state);
        if state.phase != SessionPhase::Capturing {
            debug!(phase = ?state.phase, "frame outside capture session ignored");
            return;
        }
        if frame.timestamp_ns < state.start_ns {
            debug!(
                timestamp_ns = frame.timestamp_ns,
                start_ns = state.start_ns,
                "stale frame predates session"
            );
            return;
        }
        state.candidate = Some(frame);
    }

    /// Flush-empty hint from the runtime: the render queue drained.
    pub fn on_flush_empty(&self, timestamp_ns: u64) {
        let mut state = mutex_lock_or_recover(&self.state);
        if state.phase != SessionPhase::Capturing || timestamp_ns < state.start_ns {
            return;
        }
        state.flush_seen = true;
        state.flush_ns = monotonic_ns();
    }

    fn watchdog_loop(&self, generation: u64) {
        loop {
            self.sleeper.sleep(self.timing.tick);

            let finalized = {
                let mut state = mutex_lock_or_recover(&self.state);
                if state.generation != generation {
                    debug!(generation, "watchdog superseded, exiting");
                    return;
                }
                if state.phase != SessionPhase::Capturing {
                    return;
                }
                match finalize_reason(&state, monotonic_ns(), &self.timing) {
                    Some(reason) => {
                        state.phase = SessionPhase::Finalized;
                        Some((reason, state.candidate.take()))
                    }
                    None => None,
                }
            };

            if let Some((reason, candidate)) = finalized {
                match candidate {
                    Some(frame) => {
                        info!(
                            generation,
                            reason = reason.as_str(),
                            width = frame.width,
                            height = frame.height,
                            "capture finalized"
                        );
                        self.sink.deliver(&frame);
                    }
                    None => {
                        warn!(
                            generation,
                            reason = reason.as_str(),
                            "capture finalized with no buffer to send"
                        );
                    }
                }
                return;
            }
        }
    }
}

fn as_ns(d: Duration) -> u64 {
    d.as_nanos() as u64
}

/// Decide whether the session should finalize now.
///
/// Precedence: a post-flush candidate wins, then the flush grace, then
/// the static-content timeout, then the hard ceiling.
fn finalize_reason(
    state: &SessionState,
    now_ns: u64,
    timing: &CaptureTiming,
) -> Option<FinalizeReason> {
    let elapsed = now_ns.saturating_sub(state.start_ns);

    if state.flush_seen {
        if let Some(candidate) = &state.candidate {
            if candidate.timestamp_ns > state.flush_ns {
                return Some(FinalizeReason::PostFlushCandidate);
            }
        }
        if now_ns.saturating_sub(state.flush_ns) > as_ns(timing.flush_grace) {
            return Some(FinalizeReason::FlushGraceExpired);
        }
    } else if state.candidate.is_some() && elapsed > as_ns(timing.static_finalize) {
        return Some(FinalizeReason::StaticContent);
    }

    if elapsed > as_ns(timing.hard_ceiling) {
        return Some(FinalizeReason::HardCeiling);
    }
    None
}
