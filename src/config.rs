//! Controller configuration parameters
//!
//! Wiring and timing for the button, LED and buzzer. Defaults match the
//! reference board; a JSON overlay can override any subset of fields.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::{Edge, Pull};
use crate::error::{ConfigError, Result};
use crate::events::{Level, LineId};
use crate::mode::Mode;
use crate::pins;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Lines ---
    pub button_gpio: LineId,
    pub buzzer_gpio: LineId,
    pub led_gpio: LineId,

    // --- Button wiring ---
    /// Internal pull resistor on the button line
    pub button_pull: Pull,
    /// Interrupt edge(s); `Both` delivers releases as their own events
    pub button_edge: Edge,
    /// `true` when a pressed button reads HIGH
    pub active_high: bool,

    // --- Timing ---
    /// Minimum spacing between accepted edges (milliseconds)
    pub debounce_window_ms: u32,
    /// Buzzer confirmation pulse length (milliseconds)
    pub buzzer_pulse_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            button_gpio: pins::BUTTON_GPIO,
            buzzer_gpio: pins::BUZZER_GPIO,
            led_gpio: pins::LED_GPIO,

            // External pull-down, button drives HIGH
            button_pull: Pull::None,
            button_edge: Edge::Both,
            active_high: true,

            debounce_window_ms: 50,
            buzzer_pulse_ms: 100,
        }
    }
}

impl ControllerConfig {
    /// Overlay a JSON document on the defaults. Missing fields keep their
    /// default value. The result is validated.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject wiring or timing that cannot work. Call before the run loop.
    pub fn validate(&self) -> Result<()> {
        let lines = [self.button_gpio, self.buzzer_gpio, self.led_gpio];
        for (i, &line) in lines.iter().enumerate() {
            if !(0..=pins::MAX_GPIO).contains(&line) {
                return Err(ConfigError::InvalidLine(line).into());
            }
            if lines[..i].contains(&line) {
                return Err(ConfigError::DuplicateLine(line).into());
            }
        }

        if self.button_edge == Edge::None {
            return Err(ConfigError::MissingEdge.into());
        }
        let pull_holds_pressed = matches!(
            (self.button_pull, self.active_high),
            (Pull::Up, true) | (Pull::Down, false)
        );
        if pull_holds_pressed {
            return Err(ConfigError::PullHoldsPressed.into());
        }

        if self.debounce_window_ms == 0 {
            return Err(ConfigError::ZeroDuration("debounce_window_ms").into());
        }
        if self.buzzer_pulse_ms == 0 {
            return Err(ConfigError::ZeroDuration("buzzer_pulse_ms").into());
        }
        let limit_ms = slowest_half_period_ms();
        if self.buzzer_pulse_ms >= limit_ms {
            return Err(ConfigError::PulseTooLong {
                pulse_ms: self.buzzer_pulse_ms,
                limit_ms,
            }
            .into());
        }
        Ok(())
    }

    /// Level the button line reads while pressed.
    pub fn pressed_level(&self) -> Level {
        Level::from(self.active_high)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms as u64)
    }

    pub fn buzzer_pulse(&self) -> Duration {
        Duration::from_millis(self.buzzer_pulse_ms as u64)
    }
}

/// Half-period of the slowest blink mode. The buzzer pulse blocks the
/// controller, so it has to finish well inside one LED phase.
fn slowest_half_period_ms() -> u32 {
    Mode::Freq1Hz
        .program()
        .period()
        .map_or(u32::MAX, |p| u32::try_from(p.as_millis()).unwrap_or(u32::MAX))
}
