//! Port traits — the boundary between the controller core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller / ISR / toggle timer
//! ```
//!
//! Driven adapters (GPIO, interrupt service, hardware alarm, clock, event
//! sinks) implement these traits. The core consumes them via generics, so
//! it never touches registers directly and runs unchanged against the
//! host simulation in [`adapters::sim`](crate::adapters::sim).
//!
//! ## Execution contexts
//!
//! - [`LinePort::read_line`] / [`LinePort::write_line`] and
//!   [`MonotonicClock::now_us`] are called from interrupt and alarm
//!   context: implementations must not block or allocate.
//! - [`EdgeHandler::on_edge`] and [`AlarmHandler::on_alarm`] *run* in
//!   those contexts.
//! - Everything else is called from the controller task or at setup.

use core::time::Duration;
use std::sync::Arc;

use crate::error::Result;
use crate::events::{Level, LineId};

// ───────────────────────────────────────────────────────────────
// Digital lines
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Pull {
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Edge {
    None,
    Rising,
    Falling,
    Both,
}

impl Edge {
    /// Whether a transition into `level` should raise an interrupt.
    pub fn fires_on(self, level: Level) -> bool {
        match self {
            Self::None => false,
            Self::Rising => level == Level::High,
            Self::Falling => level == Level::Low,
            Self::Both => true,
        }
    }
}

/// Electrical setup for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    pub direction: Direction,
    pub pull: Pull,
    pub edge: Edge,
}

impl LineConfig {
    /// Push-pull output, no pull resistor, no interrupt.
    pub const OUTPUT: Self = Self {
        direction: Direction::Output,
        pull: Pull::None,
        edge: Edge::None,
    };

    pub const fn input(pull: Pull, edge: Edge) -> Self {
        Self {
            direction: Direction::Input,
            pull,
            edge,
        }
    }
}

/// Raw digital I/O. Shared by every context, so all methods take `&self`;
/// each output line has exactly one writer at a time by convention.
pub trait LinePort: Send + Sync {
    /// Configure direction, pull and interrupt edge. Setup-time only.
    fn configure_line(&self, line: LineId, config: LineConfig) -> Result<()>;

    /// Sample the current level. ISR-safe.
    fn read_line(&self, line: LineId) -> Level;

    /// Drive an output. ISR-safe.
    fn write_line(&self, line: LineId, level: Level);
}

// ───────────────────────────────────────────────────────────────
// Interrupts
// ───────────────────────────────────────────────────────────────

/// Code that runs in interrupt context when a configured edge occurs.
pub trait EdgeHandler: Send + Sync {
    fn on_edge(&self);
}

/// Installs edge handlers. The handler is captured once at setup and
/// invoked directly by the interrupt; it is never looked up at run time.
pub trait InterruptPort {
    fn register_interrupt(&self, line: LineId, handler: Arc<dyn EdgeHandler>) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// Monotonic microsecond clock. ISR-safe.
pub trait MonotonicClock: Send + Sync {
    fn now_us(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Periodic alarm
// ───────────────────────────────────────────────────────────────

/// Code that runs in alarm context on every expiry.
/// Must not block, allocate, or call anything that suspends.
pub trait AlarmHandler: Send + Sync {
    fn on_alarm(&self);
}

/// One auto-reload hardware alarm.
///
/// The three-step protocol lets callers fail early without disturbing an
/// alarm that is already running:
///
/// 1. [`acquire`](Self::acquire) reserves the hardware for `period`.
///    Failure leaves any armed alarm untouched.
/// 2. [`disarm`](Self::disarm) stops the current alarm. On return no
///    firing is running and none is pending.
/// 3. [`arm`](Self::arm) starts firing `handler` every `period`.
pub trait AlarmPort {
    fn acquire(&mut self, period: Duration) -> Result<()>;

    fn arm(&mut self, period: Duration, handler: Arc<dyn AlarmHandler>) -> Result<()>;

    fn disarm(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: controller → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`ControllerEvent`]s through this
/// port. Adapters decide where they go (serial log, test recorder).
///
/// [`ControllerEvent`]: super::events::ControllerEvent
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ControllerEvent);
}
