//! Fuzz target: debounce filter + event channel
//!
//! Interprets the input as a stream of (gap, level) edges, runs them
//! through the same debounce-then-enqueue path the button ISR uses, and
//! checks that accepted edges are spaced by more than the window, the
//! channel never exceeds capacity, and every accepted edge is either
//! queued or counted as dropped.
//!
//! cargo fuzz run fuzz_edge_stream

#![no_main]

use core::time::Duration;

use ledcycle::debounce::DebounceFilter;
use ledcycle::events::{ConfirmedPressEvent, EnqueueResult, EventChannel, Level};
use libfuzzer_sys::fuzz_target;

const WINDOW_US: u64 = 50_000;
const CAP: usize = 8;

fuzz_target!(|data: &[u8]| {
    let filter = DebounceFilter::new(21, Duration::from_micros(WINDOW_US));
    let channel: EventChannel<CAP> = EventChannel::new();

    let mut now = 0u64;
    let mut last_accepted: Option<u64> = None;
    let mut accepted = 0u32;
    let mut queued = 0u32;

    for chunk in data.chunks_exact(3) {
        let gap = u64::from(u16::from_le_bytes([chunk[0], chunk[1]])) * 4;
        now += gap;
        let level = Level::from(chunk[2] & 1 == 1);

        // High bit of the level byte: consumer drains one event first.
        if chunk[2] & 0x80 != 0 && channel.try_dequeue().is_some() {
            queued -= 1;
        }

        if !filter.accept(now) {
            continue;
        }
        if let Some(prev) = last_accepted {
            assert!(now - prev > WINDOW_US, "accepted edges {prev} and {now} too close");
        }
        last_accepted = Some(now);
        accepted += 1;

        let event = ConfirmedPressEvent { line: 21, level };
        if channel.try_enqueue(event) == EnqueueResult::Enqueued {
            queued += 1;
        }
        assert!(channel.len() <= CAP);
        assert_eq!(channel.len() as u32, queued);
    }

    let delivered_or_pending = accepted - channel.overflow_count();
    assert!(delivered_or_pending >= queued);
});
