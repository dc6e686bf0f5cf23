//! Piezo buzzer confirmation pulse.
//!
//! The controller task owns the buzzer line outright. A pulse drives it
//! HIGH, blocks for the configured length, then drives it LOW. Blocking
//! is fine here: the ISR keeps queueing edges in the meantime.

use core::time::Duration;
use std::sync::Arc;

use embedded_hal::delay::DelayNs;

use crate::app::ports::LinePort;
use crate::events::{Level, LineId};

pub struct Buzzer<L, D> {
    lines: Arc<L>,
    line: LineId,
    delay: D,
    pulse_ms: u32,
    pulses: u32,
}

impl<L: LinePort, D: DelayNs> Buzzer<L, D> {
    pub fn new(lines: Arc<L>, line: LineId, delay: D, pulse: Duration) -> Self {
        Self {
            lines,
            line,
            delay,
            pulse_ms: u32::try_from(pulse.as_millis()).unwrap_or(u32::MAX),
            pulses: 0,
        }
    }

    /// Sound one confirmation pulse. Blocks for the pulse length.
    pub fn pulse(&mut self) {
        self.lines.write_line(self.line, Level::High);
        self.delay.delay_ms(self.pulse_ms);
        self.lines.write_line(self.line, Level::Low);
        self.pulses = self.pulses.wrapping_add(1);
    }

    pub fn off(&mut self) {
        self.lines.write_line(self.line, Level::Low);
    }

    /// Pulses sounded since boot.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}
