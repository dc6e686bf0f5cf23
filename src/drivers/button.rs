//! ISR-debounced button driver.
//!
//! ## Hardware
//!
//! Momentary switch on a line configured for interrupts on both edges.
//! The ISR samples the line and the monotonic clock, runs the debounce
//! filter, and hands accepted edges to the controller through the event
//! channel. Presses and releases travel the same path; the controller
//! decides what a release means.
//!
//! ## Interrupt-context rules
//!
//! [`ButtonIsr::on_edge`] never blocks, never allocates and never logs.
//! Everything it knows was captured when it was constructed; it only
//! touches the debounce timestamp, its counters and the channel.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::app::ports::{EdgeHandler, LinePort, MonotonicClock};
use crate::debounce::DebounceFilter;
use crate::events::{EnqueueResult, EventChannel, LineId, RawEdgeEvent};

/// What the ISR did with one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Inside the debounce window.
    Bounce,
    Enqueued,
    /// Accepted, but the channel was full.
    Dropped,
}

/// Counters updated from interrupt context.
#[derive(Debug, Default)]
pub struct EdgeStats {
    accepted: AtomicU32,
    bounces: AtomicU32,
    dropped: AtomicU32,
}

/// Plain copy of [`EdgeStats`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct EdgeCounts {
    pub accepted: u32,
    pub bounces: u32,
    pub dropped: u32,
}

impl EdgeStats {
    pub fn snapshot(&self) -> EdgeCounts {
        EdgeCounts {
            accepted: self.accepted.load(Ordering::Relaxed),
            bounces: self.bounces.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

pub struct ButtonIsr<L, C, const N: usize> {
    lines: Arc<L>,
    clock: C,
    filter: DebounceFilter,
    channel: &'static EventChannel<N>,
    stats: EdgeStats,
}

impl<L, C, const N: usize> ButtonIsr<L, C, N>
where
    L: LinePort,
    C: MonotonicClock,
{
    pub fn new(
        lines: Arc<L>,
        clock: C,
        filter: DebounceFilter,
        channel: &'static EventChannel<N>,
    ) -> Self {
        Self {
            lines,
            clock,
            filter,
            channel,
            stats: EdgeStats::default(),
        }
    }

    /// GPIO this handler is attached to.
    pub fn line(&self) -> LineId {
        self.filter.line()
    }

    pub fn stats(&self) -> EdgeCounts {
        self.stats.snapshot()
    }

    /// Debounce one raw edge and forward it if genuine.
    pub fn process(&self, raw: RawEdgeEvent) -> EdgeOutcome {
        if !self.filter.accept(raw.timestamp_us) {
            self.stats.bounces.fetch_add(1, Ordering::Relaxed);
            return EdgeOutcome::Bounce;
        }
        self.stats.accepted.fetch_add(1, Ordering::Relaxed);
        match self.channel.try_enqueue(raw.into()) {
            EnqueueResult::Enqueued => EdgeOutcome::Enqueued,
            EnqueueResult::Dropped => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                EdgeOutcome::Dropped
            }
        }
    }
}

impl<L, C, const N: usize> EdgeHandler for ButtonIsr<L, C, N>
where
    L: LinePort,
    C: MonotonicClock,
{
    /// ISR entry point. Register this on the button GPIO.
    fn on_edge(&self) {
        let raw = RawEdgeEvent {
            source_line: self.filter.line(),
            observed_level: self.lines.read_line(self.filter.line()),
            timestamp_us: self.clock.now_us(),
        };
        let _ = self.process(raw);
    }
}
