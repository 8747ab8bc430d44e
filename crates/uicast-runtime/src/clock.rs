//! Process-wide monotonic clock.
//!
//! Capture timing compares render-callback timestamps against session
//! start times, so both sides must share one clock. Embedders are
//! expected to stamp [`RenderedFrame`](crate::RenderedFrame) values with
//! this function; the in-tree runtimes do.

use std::sync::OnceLock;
use std::time::Instant;

fn anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

/// Nanoseconds elapsed since the clock anchor (first call in the process).
pub fn monotonic_ns() -> u64 {
    anchor().elapsed().as_nanos() as u64
}
