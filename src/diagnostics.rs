//! Runtime diagnostics snapshot.
//!
//! Gathers the counters scattered across the ISR, the event channel, the
//! toggle timer and the controller into one serializable record. Collected
//! on demand; nothing here is updated on the hot path.

use serde::Serialize;

use crate::app::controller::ControllerStats;
use crate::drivers::button::EdgeCounts;
use crate::mode::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub uptime_secs: u64,
    pub mode: Mode,
    pub presses: u32,
    pub releases_ignored: u32,
    pub reprogram_failures: u32,
    pub edges_accepted: u32,
    pub edges_bounced: u32,
    /// Confirmed edges the ISR could not enqueue.
    pub edges_dropped: u32,
    /// Channel-side overflow total; matches `edges_dropped` when the
    /// button ISR is the only producer.
    pub events_dropped: u32,
    pub led_flips: u32,
}

impl Diagnostics {
    pub fn collect(
        uptime_us: u64,
        mode: Mode,
        stats: ControllerStats,
        edges: EdgeCounts,
        events_dropped: u32,
        led_flips: u32,
    ) -> Self {
        Self {
            uptime_secs: uptime_us / 1_000_000,
            mode,
            presses: stats.presses,
            releases_ignored: stats.releases_ignored,
            reprogram_failures: stats.reprogram_failures,
            edges_accepted: edges.accepted,
            edges_bounced: edges.bounces,
            edges_dropped: edges.dropped,
            events_dropped,
            led_flips,
        }
    }

    /// Edges that reached the controller as neither bounce nor drop.
    pub fn edges_delivered(&self) -> u32 {
        self.edges_accepted.saturating_sub(self.edges_dropped)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
