//! Unified error types for the ledcycle firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! controller task handles failures uniformly. All variants are `Copy`
//! so they can cross the interrupt/task boundary without allocation.

use core::fmt;

use crate::events::LineId;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A hardware resource (timer, interrupt slot) could not be allocated.
    ResourceUnavailable(Resource),
    /// The event channel was full and an event was dropped.
    ChannelOverflow,
    /// Invalid line, pull/edge combination, or config value.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable(r) => write!(f, "resource unavailable: {r}"),
            Self::ChannelOverflow => write!(f, "event channel overflow"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Hardware resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// General-purpose hardware timer backing the toggle alarm.
    Timer,
    /// Per-line interrupt handler slot.
    InterruptSlot,
    /// Shared GPIO interrupt service.
    IsrService,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer => write!(f, "hardware timer"),
            Self::InterruptSlot => write!(f, "interrupt slot"),
            Self::IsrService => write!(f, "GPIO ISR service"),
        }
    }
}

impl From<Resource> for Error {
    fn from(r: Resource) -> Self {
        Self::ResourceUnavailable(r)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Setup-time configuration failures. Fatal before the run loop starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// GPIO number does not exist on this chip.
    InvalidLine(LineId),
    /// Two roles were assigned the same GPIO.
    DuplicateLine(LineId),
    /// The button has no interrupt edge, so presses would never be seen.
    MissingEdge,
    /// The pull resistor holds the button line at its pressed level.
    PullHoldsPressed,
    /// Outputs take neither pull resistors nor interrupt edges.
    OutputWithPullOrEdge(LineId),
    /// A duration that must be positive was zero.
    ZeroDuration(&'static str),
    /// The buzzer pulse would outlast an LED blink phase.
    PulseTooLong { pulse_ms: u32, limit_ms: u32 },
    /// A JSON config overlay could not be parsed.
    Parse,
    /// The platform refused the GPIO configuration.
    Rejected { line: LineId, code: i32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLine(line) => write!(f, "GPIO {line} does not exist"),
            Self::DuplicateLine(line) => write!(f, "GPIO {line} assigned twice"),
            Self::MissingEdge => write!(f, "button has no interrupt edge"),
            Self::PullHoldsPressed => write!(f, "pull resistor holds button at pressed level"),
            Self::OutputWithPullOrEdge(line) => {
                write!(f, "output GPIO {line} cannot take a pull or interrupt edge")
            }
            Self::ZeroDuration(what) => write!(f, "{what} must be non-zero"),
            Self::PulseTooLong { pulse_ms, limit_ms } => {
                write!(f, "buzzer pulse {pulse_ms} ms must be shorter than {limit_ms} ms")
            }
            Self::Parse => write!(f, "config overlay is not valid JSON"),
            Self::Rejected { line, code } => {
                write!(f, "GPIO {line} config rejected (rc={code})")
            }
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
