//! Controller task — the only owner of [`Mode`].
//!
//! [`Controller`] drains the event channel and, for every confirmed
//! press, sounds the buzzer, advances the mode, and reprograms the LED
//! toggle timer. Releases are acknowledged and ignored. All I/O flows
//! through port traits, so the whole task runs against mock adapters.
//!
//! ```text
//!  EventChannel ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                   │        Controller        │
//!  Buzzer ◀──────── │  Mode · advance()        │ ──▶ PeriodicToggleTimer
//!                   └──────────────────────────┘
//! ```
//!
//! A mode is committed only once its timer program is running. When
//! reprogramming fails the LED is forced off, the press is still
//! confirmed by the buzzer, and the mode stays where it was so the next
//! press retries the same transition.

use std::sync::Arc;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::app::events::ControllerEvent;
use crate::app::ports::{AlarmPort, EventSink, LinePort};
use crate::config::ControllerConfig;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::toggle_timer::PeriodicToggleTimer;
use crate::error::Result;
use crate::events::{ConfirmedPressEvent, EventChannel, Level};
use crate::mode::{Mode, advance};

/// Counters kept by the controller task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ControllerStats {
    pub presses: u32,
    pub releases_ignored: u32,
    pub reprogram_failures: u32,
}

pub struct Controller<L, A, D, S> {
    mode: Mode,
    pressed_level: Level,
    timer: PeriodicToggleTimer<L, A>,
    buzzer: Buzzer<L, D>,
    sink: S,
    stats: ControllerStats,
    /// Overflow count last reported through the sink.
    reported_drops: u32,
}

impl<L, A, D, S> Controller<L, A, D, S>
where
    L: LinePort + 'static,
    A: AlarmPort,
    D: DelayNs,
    S: EventSink,
{
    /// Build the controller. Does **not** touch the outputs; call
    /// [`start`](Self::start) next.
    pub fn new(config: &ControllerConfig, lines: Arc<L>, alarm: A, delay: D, sink: S) -> Self {
        let timer = PeriodicToggleTimer::new(lines.clone(), config.led_gpio, alarm);
        let buzzer = Buzzer::new(lines, config.buzzer_gpio, delay, config.buzzer_pulse());
        Self {
            mode: Mode::Off,
            pressed_level: config.pressed_level(),
            timer,
            buzzer,
            sink,
            stats: ControllerStats::default(),
            reported_drops: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put both outputs in their known-off state and report the initial mode.
    pub fn start(&mut self) {
        self.timer.disable();
        self.buzzer.off();
        self.mode = Mode::Off;
        self.sink.emit(&ControllerEvent::Started(self.mode));
        info!("Controller started in {:?}", self.mode);
    }

    /// Run until the channel is shut down and drained.
    pub async fn run<const N: usize>(&mut self, channel: &EventChannel<N>) {
        while let Some(event) = channel.dequeue().await {
            if let Err(e) = self.handle_event(event) {
                warn!("Controller: press not applied ({})", e);
            }
            self.report_drops(channel.overflow_count());
        }
        self.timer.disable();
        self.buzzer.off();
        self.sink.emit(&ControllerEvent::Stopped(self.mode));
        info!("Controller stopped in {:?}", self.mode);
    }

    // ── Per-event handling ────────────────────────────────────

    /// Handle one dequeued edge.
    ///
    /// Presses pulse the buzzer and then apply the next mode. Returns the
    /// reprogram error, if any, after the LED has been forced off.
    pub fn handle_event(&mut self, event: ConfirmedPressEvent) -> Result<()> {
        if event.level != self.pressed_level {
            self.stats.releases_ignored += 1;
            self.sink.emit(&ControllerEvent::ReleaseIgnored);
            return Ok(());
        }

        self.stats.presses += 1;
        self.buzzer.pulse();

        let (next, program) = advance(self.mode);
        match self.timer.reprogram(program) {
            Ok(()) => {
                let from = self.mode;
                self.mode = next;
                self.sink.emit(&ControllerEvent::ModeChanged { from, to: next });
                Ok(())
            }
            Err(error) => {
                self.stats.reprogram_failures += 1;
                self.timer.disable();
                self.sink.emit(&ControllerEvent::ReprogramFailed {
                    current: self.mode,
                    intended: next,
                    error,
                });
                Err(error)
            }
        }
    }

    fn report_drops(&mut self, total: u32) {
        if total != self.reported_drops {
            self.reported_drops = total;
            self.sink.emit(&ControllerEvent::EventsDropped { total });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn timer(&self) -> &PeriodicToggleTimer<L, A> {
        &self.timer
    }

    pub fn buzzer_pulses(&self) -> u32 {
        self.buzzer.pulses()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
