//! Outbound controller events.
//!
//! The [`Controller`](super::controller::Controller) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them.

use crate::error::Error;
use crate::mode::Mode;

/// Structured events emitted by the controller task.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The controller has started (carries initial mode).
    Started(Mode),

    /// A press was confirmed and the timer reprogrammed.
    ModeChanged { from: Mode, to: Mode },

    /// A release edge arrived; it never advances the mode.
    ReleaseIgnored,

    /// The timer could not be reprogrammed. The LED was forced off and the
    /// mode stays at `current`, so the next press retries `intended`.
    ReprogramFailed {
        current: Mode,
        intended: Mode,
        error: Error,
    },

    /// The event channel has dropped events since the last report.
    EventsDropped { total: u32 },

    /// The run loop exited after a shutdown request.
    Stopped(Mode),
}
