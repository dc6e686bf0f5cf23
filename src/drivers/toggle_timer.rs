//! Periodic LED toggle driven by an auto-reload hardware alarm.
//!
//! ```text
//!              reprogram(Some(p))              reprogram(Some(p'))
//!   Disabled ─────────────────────▶ Armed(p) ──────────────────────▶ Armed(p')
//!      ▲                               │
//!      └──────── reprogram(None) ──────┘   (line forced LOW)
//! ```
//!
//! While armed, every alarm expiry flips the LED. Reprogramming follows a
//! disable-before-reconfigure discipline: the old alarm is disarmed (no
//! firing running or pending) before the line is touched or a new alarm is
//! armed. [`AlarmPort::disarm`] must leave the alarm quiescent; that is
//! what keeps the LED line single-writer. Each armed program also carries
//! a generation number, and a firing whose generation is stale does
//! nothing. The check runs before the flip, not atomically with it, so it
//! only backs up a disarm that fails to cancel a queued expiry.
//!
//! [`AlarmPort::disarm`]: crate::app::ports::AlarmPort::disarm

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use core::time::Duration;
use std::sync::Arc;

use log::{error, info};

use crate::app::ports::{AlarmHandler, AlarmPort, LinePort};
use crate::error::Result;
use crate::events::{Level, LineId};
use crate::mode::TimerProgram;

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Disabled,
    Armed { period: Duration },
}

/// State shared between the alarm context and the controller task.
pub struct ToggleOutput {
    line: LineId,
    /// Last level written by a firing.
    level: AtomicBool,
    /// Bumped on every reprogram; firings from older programs are ignored.
    generation: AtomicU32,
    flips: AtomicU32,
}

impl ToggleOutput {
    fn new(line: LineId) -> Self {
        Self {
            line,
            level: AtomicBool::new(false),
            generation: AtomicU32::new(0),
            flips: AtomicU32::new(0),
        }
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    /// Level most recently driven onto the line.
    pub fn level(&self) -> Level {
        Level::from(self.level.load(Ordering::Acquire))
    }

    /// Total flips since boot.
    pub fn flips(&self) -> u32 {
        self.flips.load(Ordering::Relaxed)
    }
}

/// Alarm-context handler for one armed program.
struct ToggleFiring<L> {
    lines: Arc<L>,
    output: Arc<ToggleOutput>,
    generation: u32,
}

impl<L: LinePort> AlarmHandler for ToggleFiring<L> {
    fn on_alarm(&self) {
        if self.output.generation.load(Ordering::Acquire) != self.generation {
            return;
        }
        // Sole writer while armed, so a plain load/store pair is enough.
        let high = !self.output.level.load(Ordering::Relaxed);
        self.lines.write_line(self.output.line, Level::from(high));
        self.output.level.store(high, Ordering::Release);
        self.output.flips.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct PeriodicToggleTimer<L, A> {
    lines: Arc<L>,
    alarm: A,
    output: Arc<ToggleOutput>,
    state: TimerState,
}

impl<L, A> PeriodicToggleTimer<L, A>
where
    L: LinePort + 'static,
    A: AlarmPort,
{
    /// Create a disabled timer for `line`. Does not touch the line.
    pub fn new(lines: Arc<L>, line: LineId, alarm: A) -> Self {
        Self {
            lines,
            alarm,
            output: Arc::new(ToggleOutput::new(line)),
            state: TimerState::Disabled,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn output(&self) -> &ToggleOutput {
        &self.output
    }

    /// Apply `program`, replacing whatever was running.
    ///
    /// If the alarm hardware cannot be acquired the timer is left exactly
    /// as it was and `ResourceUnavailable` is returned. If arming fails
    /// after the old alarm was stopped, the timer falls back to `Disabled`
    /// with the line low.
    pub fn reprogram(&mut self, program: TimerProgram) -> Result<()> {
        let Some(period) = program.period() else {
            self.disable();
            return Ok(());
        };

        self.alarm.acquire(period)?;
        self.stop_and_force_low();

        let handler = Arc::new(ToggleFiring {
            lines: self.lines.clone(),
            output: self.output.clone(),
            generation: self.output.generation.load(Ordering::Acquire),
        });
        if let Err(e) = self.alarm.arm(period, handler) {
            error!("toggle_timer: arm failed ({}), LED held low", e);
            self.state = TimerState::Disabled;
            return Err(e);
        }

        self.state = TimerState::Armed { period };
        info!(
            "toggle_timer: GPIO {} toggling every {} ms",
            self.output.line,
            period.as_millis()
        );
        Ok(())
    }

    /// Stop toggling and force the line low. Never fails.
    pub fn disable(&mut self) {
        self.stop_and_force_low();
        if self.state != TimerState::Disabled {
            info!("toggle_timer: GPIO {} disabled", self.output.line);
        }
        self.state = TimerState::Disabled;
    }

    fn stop_and_force_low(&mut self) {
        self.alarm.disarm();
        // Turns away expiries queued before disarm; running ones are the
        // port's job to wait out.
        self.output.generation.fetch_add(1, Ordering::AcqRel);
        // The alarm is quiescent, so this task owns the line until re-armed.
        self.output.level.store(false, Ordering::Release);
        self.lines.write_line(self.output.line, Level::Low);
    }
}
