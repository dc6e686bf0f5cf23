//! Application core — the controller task and its port boundary.
//!
//! The controller owns the mode state machine and drives the buzzer and
//! toggle timer. All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod controller;
pub mod events;
pub mod ports;
