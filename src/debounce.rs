//! Lock-free debounce filter for one input line.
//!
//! The ISR asks [`DebounceFilter::accept`] whether an edge is a genuine
//! transition. The decision and the timestamp update are a single
//! compare-and-swap, so two near-simultaneous firings can never both pass.
//!
//! An edge is accepted when strictly more than the window has elapsed
//! since the last accepted edge; an edge exactly one window later is
//! still treated as bounce.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;

use crate::events::LineId;

/// Sentinel for "no edge accepted yet".
const NEVER: u64 = u64::MAX;

pub struct DebounceFilter {
    line: LineId,
    window_us: u64,
    last_accepted_us: AtomicU64,
}

impl DebounceFilter {
    pub const fn new(line: LineId, window: Duration) -> Self {
        Self {
            line,
            window_us: window.as_micros() as u64,
            last_accepted_us: AtomicU64::new(NEVER),
        }
    }

    /// Line this filter guards.
    pub fn line(&self) -> LineId {
        self.line
    }

    /// Decide whether an edge observed at `now_us` is genuine, recording it
    /// as the latest accepted edge if so. ISR-safe.
    pub fn accept(&self, now_us: u64) -> bool {
        let mut last = self.last_accepted_us.load(Ordering::Acquire);
        loop {
            // A timestamp older than the last accepted one counts as zero
            // elapsed time: a racing firing already claimed this window.
            if last != NEVER && now_us.saturating_sub(last) <= self.window_us {
                return false;
            }
            match self.last_accepted_us.compare_exchange_weak(
                last,
                now_us,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(current) => last = current,
            }
        }
    }

    /// Timestamp of the last accepted edge, if any.
    pub fn last_accepted_us(&self) -> Option<u64> {
        match self.last_accepted_us.load(Ordering::Acquire) {
            NEVER => None,
            t => Some(t),
        }
    }
}
