//! Host counters, logged once at shutdown.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Instant;

use serde_json::json;
use serde_json::Value;
use uicast_common::poison_recovery_count;

#[derive(Debug)]
pub struct HostMetrics {
    requests: AtomicU64,
    dropped: AtomicU64,
    gated: AtomicU64,
    unsupported: AtomicU64,
    validation_failures: AtomicU64,
    frames_streamed: AtomicU64,
    frames_skipped: AtomicU64,
    start: Instant,
}

impl Default for HostMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl HostMetrics {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            gated: AtomicU64::new(0),
            unsupported: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            frames_streamed: AtomicU64::new(0),
            frames_skipped: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Envelope failed decode and was dropped without a reply.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Command discarded by the static-card gate.
    pub fn record_gated(&self) {
        self.gated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsupported(&self) {
        self.unsupported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_streamed(&self) {
        self.frames_streamed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_skipped(&self) {
        self.frames_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn gated(&self) -> u64 {
        self.gated.load(Ordering::Relaxed)
    }

    pub fn unsupported(&self) -> u64 {
        self.unsupported.load(Ordering::Relaxed)
    }

    pub fn validation_failures(&self) -> u64 {
        self.validation_failures.load(Ordering::Relaxed)
    }

    pub fn frames_streamed(&self) -> u64 {
        self.frames_streamed.load(Ordering::Relaxed)
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped.load(Ordering::Relaxed)
    }

    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn snapshot(&self) -> Value {
        json!({
            "requests_total": self.requests(),
            "envelopes_dropped": self.dropped(),
            "gated_commands": self.gated(),
            "unsupported_commands": self.unsupported(),
            "validation_failures": self.validation_failures(),
            "frames_streamed": self.frames_streamed(),
            "frames_skipped": self.frames_skipped(),
            "poison_recoveries": poison_recovery_count(),
            "uptime_ms": self.uptime_ms(),
        })
    }
}
