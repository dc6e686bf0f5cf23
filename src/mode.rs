//! LED mode state machine.
//!
//! Each confirmed press advances the mode one step around the cycle and
//! yields the program for the toggle timer:
//!
//! | Current   | Next      | Toggle period      |
//! |-----------|-----------|--------------------|
//! | `Off`     | `Freq1Hz` | 500 ms (1 Hz blink)|
//! | `Freq1Hz` | `Freq2Hz` | 250 ms             |
//! | `Freq2Hz` | `Freq4Hz` | 125 ms             |
//! | `Freq4Hz` | `Off`     | disabled           |

use core::num::NonZeroU32;
use core::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Off,
    Freq1Hz,
    Freq2Hz,
    Freq4Hz,
}

impl Mode {
    /// Cyclic successor.
    pub const fn next(self) -> Self {
        match self {
            Self::Off => Self::Freq1Hz,
            Self::Freq1Hz => Self::Freq2Hz,
            Self::Freq2Hz => Self::Freq4Hz,
            Self::Freq4Hz => Self::Off,
        }
    }

    /// Timer program that realises this mode.
    pub const fn program(self) -> TimerProgram {
        match self {
            Self::Off => TimerProgram::OFF,
            Self::Freq1Hz => TimerProgram::every_us(500_000),
            Self::Freq2Hz => TimerProgram::every_us(250_000),
            Self::Freq4Hz => TimerProgram::every_us(125_000),
        }
    }
}

/// Toggle timer program: a non-zero period, or disabled with the line low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerProgram {
    period_us: Option<NonZeroU32>,
}

impl TimerProgram {
    pub const OFF: Self = Self { period_us: None };

    /// Periodic program. A zero period is a programming error caught at
    /// compile time for constants; use [`TimerProgram::periodic`] for
    /// run-time values.
    const fn every_us(us: u32) -> Self {
        match NonZeroU32::new(us) {
            Some(p) => Self { period_us: Some(p) },
            None => panic!("toggle period must be non-zero"),
        }
    }

    /// Periodic program from a run-time duration. Returns `None` for
    /// durations that round to zero microseconds or overflow `u32`.
    pub fn periodic(period: Duration) -> Option<Self> {
        let us = u32::try_from(period.as_micros()).ok()?;
        NonZeroU32::new(us).map(|p| Self { period_us: Some(p) })
    }

    pub fn period(&self) -> Option<Duration> {
        self.period_us.map(|p| Duration::from_micros(p.get() as u64))
    }

    pub fn is_enabled(&self) -> bool {
        self.period_us.is_some()
    }
}

/// Advance one step: the next mode and the program to apply for it.
pub const fn advance(current: Mode) -> (Mode, TimerProgram) {
    let next = current.next();
    (next, next.program())
}
