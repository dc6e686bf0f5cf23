//! GPIO pin assignments for the ledcycle board.
//!
//! Single source of truth for the default wiring. [`ControllerConfig`]
//! starts from these and may override them.
//!
//! [`ControllerConfig`]: crate::config::ControllerConfig

use crate::events::LineId;

// ---------------------------------------------------------------------------
// User button (active-high with external pull-down)
// ---------------------------------------------------------------------------

/// Momentary push-button that cycles the LED mode.
pub const BUTTON_GPIO: LineId = 21;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Piezo buzzer driven HIGH for the confirmation pulse.
pub const BUZZER_GPIO: LineId = 13;
/// Indicator LED toggled by the periodic alarm.
pub const LED_GPIO: LineId = 9;

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: LineId = 48;
