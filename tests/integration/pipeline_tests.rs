//! Full pipeline: simulated GPIO edge → ButtonIsr → EventChannel →
//! Controller task → buzzer and toggle timer.

use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;

use futures_lite::future::block_on;
use ledcycle::adapters::sim::{SimAlarm, SimClock, SimLines, StdDelay};
use ledcycle::app::controller::Controller;
use ledcycle::app::ports::InterruptPort;
use ledcycle::config::ControllerConfig;
use ledcycle::debounce::DebounceFilter;
use ledcycle::diagnostics::Diagnostics;
use ledcycle::drivers::button::{ButtonIsr, EdgeCounts};
use ledcycle::drivers::hw_init;
use ledcycle::drivers::toggle_timer::TimerState;
use ledcycle::events::{EVENT_QUEUE_CAP, EventChannel, Level};
use ledcycle::mode::Mode;

use crate::mock_hw::RecordingSink;

type Isr<const N: usize> = ButtonIsr<SimLines, SimClock, N>;
type SimController = Controller<SimLines, SimAlarm, StdDelay, RecordingSink>;

struct Board<const N: usize> {
    config: ControllerConfig,
    lines: Arc<SimLines>,
    clock: SimClock,
    isr: Arc<Isr<N>>,
    channel: &'static EventChannel<N>,
}

impl<const N: usize> Board<N> {
    fn new() -> Self {
        let config = ControllerConfig::default();
        let lines = Arc::new(SimLines::new());
        hw_init::configure_lines(lines.as_ref(), &config).unwrap();

        let channel: &'static EventChannel<N> = Box::leak(Box::new(EventChannel::new()));
        let clock = SimClock::new();
        let isr = Arc::new(ButtonIsr::new(
            lines.clone(),
            clock.clone(),
            DebounceFilter::new(config.button_gpio, config.debounce_window()),
            channel,
        ));
        lines
            .register_interrupt(config.button_gpio, isr.clone())
            .unwrap();
        Self {
            config,
            lines,
            clock,
            isr,
            channel,
        }
    }

    fn spawn_controller(&self, sink: RecordingSink) -> JoinHandle<SimController> {
        let mut controller = Controller::new(
            &self.config,
            self.lines.clone(),
            SimAlarm::new(),
            StdDelay,
            sink,
        );
        let channel = self.channel;
        std::thread::spawn(move || {
            controller.start();
            block_on(controller.run(channel));
            controller
        })
    }

    /// Press and release cleanly, well outside the debounce window.
    fn click(&self) {
        self.lines.inject_edge(self.config.button_gpio, Level::High);
        self.clock.advance(Duration::from_millis(80));
        self.lines.inject_edge(self.config.button_gpio, Level::Low);
        self.clock.advance(Duration::from_millis(80));
    }

    /// Press with contact chatter inside the debounce window.
    fn bouncy_press(&self) {
        let button = self.config.button_gpio;
        self.lines.inject_edge(button, Level::High);
        for _ in 0..3 {
            self.clock.advance(Duration::from_millis(2));
            self.lines.inject_edge(button, Level::Low);
            self.clock.advance(Duration::from_millis(2));
            self.lines.inject_edge(button, Level::High);
        }
        self.clock.advance(Duration::from_millis(80));
    }
}

#[test]
fn four_clicks_walk_the_cycle_end_to_end() {
    let board: Board<EVENT_QUEUE_CAP> = Board::new();
    let sink = RecordingSink::new();
    let handle = board.spawn_controller(sink.clone());

    for _ in 0..4 {
        board.click();
    }
    board.channel.shutdown();
    let controller = handle.join().unwrap();

    assert_eq!(
        sink.mode_changes(),
        vec![Mode::Freq1Hz, Mode::Freq2Hz, Mode::Freq4Hz, Mode::Off]
    );
    assert_eq!(controller.mode(), Mode::Off);
    assert_eq!(controller.stats().presses, 4);
    assert_eq!(controller.stats().releases_ignored, 4);
    assert_eq!(controller.timer().state(), TimerState::Disabled);
    assert_eq!(board.lines.level(board.config.led_gpio), Level::Low);
}

/// Real-time walk through every mode. The buzzer pulses split the LED
/// write log into one segment per mode; within a segment consecutive LED
/// writes must be one half-period apart.
#[test]
fn led_blinks_at_each_mode_frequency_then_goes_dark() {
    const DWELL: Duration = Duration::from_millis(1300);
    let board: Board<EVENT_QUEUE_CAP> = Board::new();
    let sink = RecordingSink::new();
    let handle = board.spawn_controller(sink.clone());

    for _ in 0..4 {
        board.click();
        std::thread::sleep(DWELL);
    }
    let led = board.lines.writes(board.config.led_gpio);
    board.channel.shutdown();
    handle.join().unwrap();

    assert_eq!(
        sink.mode_changes(),
        vec![Mode::Freq1Hz, Mode::Freq2Hz, Mode::Freq4Hz, Mode::Off]
    );

    // (rising, falling) timestamps of each buzzer pulse.
    let pulses: Vec<(u64, u64)> = board
        .lines
        .writes(board.config.buzzer_gpio)
        .windows(2)
        .filter(|w| w[0].level == Level::High && w[1].level == Level::Low)
        .map(|w| (w[0].at_us, w[1].at_us))
        .collect();
    assert_eq!(pulses.len(), 4);

    let half_periods_us = [500_000u64, 250_000, 125_000];
    for (i, &half) in half_periods_us.iter().enumerate() {
        let (from, until) = (pulses[i].1, pulses[i + 1].0);
        let stamps: Vec<u64> = led
            .iter()
            .filter(|w| (from..until).contains(&w.at_us))
            .map(|w| w.at_us)
            .collect();
        assert!(stamps.len() >= 3, "mode {i}: only {} LED writes", stamps.len());
        for gap in stamps.windows(2).map(|p| p[1] - p[0]) {
            assert!(
                gap.abs_diff(half) <= half / 4,
                "mode {i}: LED write gap {gap} us, expected ~{half} us"
            );
        }
    }

    // Off: forced low right after the last pulse, then silence.
    let settle_us = pulses[3].1 + 50_000;
    let dark: Vec<_> = led.iter().filter(|w| w.at_us >= pulses[3].1).collect();
    assert_eq!(dark.last().map(|w| w.level), Some(Level::Low));
    assert!(
        dark.iter().all(|w| w.at_us < settle_us),
        "LED kept toggling in Off: {dark:?}"
    );
}

#[test]
fn each_press_sounds_one_full_buzzer_pulse() {
    let board: Board<EVENT_QUEUE_CAP> = Board::new();
    let handle = board.spawn_controller(RecordingSink::new());

    board.click();
    board.click();
    board.channel.shutdown();
    let controller = handle.join().unwrap();

    let highs: Vec<_> = board
        .lines
        .writes(board.config.buzzer_gpio)
        .windows(2)
        .filter(|w| w[0].level == Level::High && w[1].level == Level::Low)
        .map(|w| w[1].at_us - w[0].at_us)
        .collect();
    assert_eq!(highs.len(), 2);
    for width in highs {
        assert!(width >= 100_000, "buzzer pulse only {width} us");
    }
    assert_eq!(controller.buzzer_pulses(), 2);
    assert_eq!(board.lines.level(board.config.buzzer_gpio), Level::Low);
}

#[test]
fn contact_bounce_yields_a_single_press() {
    let board: Board<EVENT_QUEUE_CAP> = Board::new();
    let sink = RecordingSink::new();
    let handle = board.spawn_controller(sink.clone());

    board.bouncy_press();
    board.channel.shutdown();
    let controller = handle.join().unwrap();

    assert_eq!(sink.mode_changes(), vec![Mode::Freq1Hz]);
    assert_eq!(
        board.isr.stats(),
        EdgeCounts {
            accepted: 1,
            bounces: 6,
            dropped: 0,
        }
    );
    assert_eq!(controller.stats().presses, 1);
}

#[test]
fn full_queue_drops_and_counts_without_blocking_the_isr() {
    let board: Board<4> = Board::new();

    // No consumer yet: 3 clicks = 6 accepted edges into 4 slots.
    for _ in 0..3 {
        board.click();
    }
    assert_eq!(board.isr.stats().dropped, 2);
    assert_eq!(board.channel.overflow_count(), 2);

    let sink = RecordingSink::new();
    let handle = board.spawn_controller(sink.clone());
    board.channel.shutdown();
    let controller = handle.join().unwrap();

    // press, release, press, release survived.
    assert_eq!(controller.mode(), Mode::Freq2Hz);

    let diag = Diagnostics::collect(
        0,
        controller.mode(),
        controller.stats(),
        board.isr.stats(),
        board.channel.overflow_count(),
        controller.timer().output().flips(),
    );
    assert_eq!(diag.edges_accepted, 6);
    assert_eq!(diag.edges_delivered(), 4);
    assert_eq!(diag.events_dropped, 2);
}
