//! Every-Nth frame suppression.
//!
//! Applied to render callbacks before they reach the capture state
//! machine. The frequency survives across capture sessions; the counter
//! resets only when the frequency is reconfigured.

use std::sync::Mutex;

use uicast_common::mutex_lock_or_recover;

#[derive(Debug)]
struct DropState {
    frequency: u32,
    counter: u64,
}

#[derive(Debug)]
pub struct DropFilter {
    inner: Mutex<DropState>,
}

impl Default for DropFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DropFilter {
    /// Starts disabled (frequency 0: admit everything).
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DropState {
                frequency: 0,
                counter: 0,
            }),
        }
    }

    /// Set the drop frequency and reset the counter.
    ///
    /// Frequency N suppresses every Nth frame; 1 suppresses all frames,
    /// 0 disables dropping.
    pub fn configure(&self, frequency: u32) {
        let mut state = mutex_lock_or_recover(&self.inner);
        state.frequency = frequency;
        state.counter = 0;
    }

    pub fn frequency(&self) -> u32 {
        mutex_lock_or_recover(&self.inner).frequency
    }

    /// Count one frame; returns false if this one should be dropped.
    pub fn admit(&self) -> bool {
        let mut state = mutex_lock_or_recover(&self.inner);
        if state.frequency == 0 {
            return true;
        }
        state.counter += 1;
        state.counter % u64::from(state.frequency) != 0
    }
}
