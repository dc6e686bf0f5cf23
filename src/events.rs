//! Interrupt-to-task event channel.
//!
//! Confirmed edges are produced by the button ISR and consumed by the
//! controller task, one at a time, in the order the debounce filter
//! accepted them.
//!
//! ```text
//! ┌─────────────┐ try_enqueue ┌──────────────┐  dequeue   ┌──────────────┐
//! │ Button ISR  │────────────▶│ EventChannel │───────────▶│  Controller  │
//! │ (never      │             │  (bounded,   │ (suspends) │  task        │
//! │  blocks)    │             │   FIFO)      │            │              │
//! └─────────────┘             └──────────────┘            └──────────────┘
//! ```
//!
//! The producer side never blocks: a full queue drops the event and bumps
//! an overflow counter. The consumer side suspends until an event arrives
//! or [`EventChannel::shutdown`] is called.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::error::{Error, Result};

/// Logic level on a digital line.
pub type Level = embedded_hal::digital::PinState;

/// GPIO number identifying a digital line.
pub type LineId = i32;

/// Maximum number of pending confirmed edges.
pub const EVENT_QUEUE_CAP: usize = 16;

/// An edge as seen inside the interrupt handler, before debouncing.
/// Never leaves the ISR invocation that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEdgeEvent {
    pub source_line: LineId,
    pub observed_level: Level,
    /// Monotonic microseconds since boot.
    pub timestamp_us: u64,
}

/// Payload carried from the ISR to the controller task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedPressEvent {
    pub line: LineId,
    pub level: Level,
}

impl From<RawEdgeEvent> for ConfirmedPressEvent {
    fn from(raw: RawEdgeEvent) -> Self {
        Self {
            line: raw.source_line,
            level: raw.observed_level,
        }
    }
}

/// Outcome of a non-blocking enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EnqueueResult {
    Enqueued,
    Dropped,
}

impl EnqueueResult {
    /// `Dropped` as [`Error::ChannelOverflow`], for callers that propagate.
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Enqueued => Ok(()),
            Self::Dropped => Err(Error::ChannelOverflow),
        }
    }
}

/// Bounded FIFO mailbox from interrupt context to the controller task.
pub struct EventChannel<const N: usize> {
    queue: Channel<CriticalSectionRawMutex, ConfirmedPressEvent, N>,
    shutdown: Signal<CriticalSectionRawMutex, ()>,
    stopped: AtomicBool,
    overflow: AtomicU32,
}

impl<const N: usize> Default for EventChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventChannel<N> {
    pub const fn new() -> Self {
        Self {
            queue: Channel::new(),
            shutdown: Signal::new(),
            stopped: AtomicBool::new(false),
            overflow: AtomicU32::new(0),
        }
    }

    /// Push an event without blocking.
    /// Safe to call from ISR context; on a full queue the event is dropped
    /// and the overflow counter incremented.
    pub fn try_enqueue(&self, event: ConfirmedPressEvent) -> EnqueueResult {
        match self.queue.try_send(event) {
            Ok(()) => EnqueueResult::Enqueued,
            Err(_) => {
                self.overflow.fetch_add(1, Ordering::Relaxed);
                EnqueueResult::Dropped
            }
        }
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once [`shutdown`](Self::shutdown) has been requested
    /// and the queue is empty, and keeps returning `None` on every later
    /// call. Pending events are always delivered first.
    pub async fn dequeue(&self) -> Option<ConfirmedPressEvent> {
        if let Ok(event) = self.queue.try_receive() {
            return Some(event);
        }
        if self.stopped.load(Ordering::Acquire) {
            return None;
        }
        // The wake-up itself is one-shot; `stopped` is what stays set.
        futures_lite::future::or(async { Some(self.queue.receive().await) }, async {
            self.shutdown.wait().await;
            None
        })
        .await
    }

    /// Pop the next event if one is pending.
    pub fn try_dequeue(&self) -> Option<ConfirmedPressEvent> {
        self.queue.try_receive().ok()
    }

    /// Ask the consumer to stop once the queue is drained.
    pub fn shutdown(&self) {
        self.stopped.store(true, Ordering::Release);
        self.shutdown.signal(());
    }

    /// Total events dropped on overflow since boot.
    pub fn overflow_count(&self) -> u32 {
        self.overflow.load(Ordering::Relaxed)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
