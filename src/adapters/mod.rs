//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements                | Connects to               |
//! |------------|---------------------------|---------------------------|
//! | `hardware` | LinePort, InterruptPort   | ESP32 GPIO + ISR service  |
//! |            | AlarmPort                 | ESP32 gptimer             |
//! | `log_sink` | EventSink                 | Serial log output         |
//! | `sim`      | LinePort, InterruptPort   | In-memory GPIO bank       |
//! |            | AlarmPort, MonotonicClock | Host threads and clocks   |
//! | `time`     | MonotonicClock            | ESP32 system timer        |

pub mod hardware;
pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod time;
