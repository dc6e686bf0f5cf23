//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing controller events to the `log`
//! facade (ESP-IDF logger on device, which goes to UART / USB-CDC).

use log::{error, info, warn};

use crate::app::events::ControllerEvent;
use crate::app::ports::EventSink;
use crate::error::Error;

/// Adapter that logs every [`ControllerEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Started(mode) => {
                info!("START | mode={:?}", mode);
            }
            ControllerEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            ControllerEvent::ReleaseIgnored => {
                info!("BUTTON | released");
            }
            ControllerEvent::ReprogramFailed {
                current,
                intended,
                error: e,
            } => {
                error!(
                    "MODE | {:?} -> {:?} failed: {} | LED forced off",
                    current, intended, e
                );
            }
            ControllerEvent::EventsDropped { total } => {
                warn!("QUEUE | {}, {} events dropped since boot", Error::ChannelOverflow, total);
            }
            ControllerEvent::Stopped(mode) => {
                info!("STOP | mode={:?}", mode);
            }
        }
    }
}
