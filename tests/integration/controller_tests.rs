//! Controller + toggle timer against a hand-fired alarm.

use std::sync::Arc;

use ledcycle::adapters::sim::{SimClock, SimDelay, SimLines};
use ledcycle::app::controller::Controller;
use ledcycle::app::events::ControllerEvent;
use ledcycle::config::ControllerConfig;
use ledcycle::drivers::hw_init;
use ledcycle::drivers::toggle_timer::TimerState;
use ledcycle::error::{Error, Resource};
use ledcycle::events::{ConfirmedPressEvent, Level};
use ledcycle::mode::Mode;

use crate::mock_hw::{ManualAlarm, RecordingSink};

type TestController = Controller<SimLines, ManualAlarm, SimDelay, RecordingSink>;

struct Rig {
    config: ControllerConfig,
    lines: Arc<SimLines>,
    alarm: ManualAlarm,
    sink: RecordingSink,
    controller: TestController,
}

fn rig() -> Rig {
    let config = ControllerConfig::default();
    let clock = SimClock::new();
    let lines = Arc::new(SimLines::with_clock(clock.clone()));
    hw_init::configure_lines(lines.as_ref(), &config).unwrap();

    let alarm = ManualAlarm::new();
    let sink = RecordingSink::new();
    let mut controller = Controller::new(
        &config,
        lines.clone(),
        alarm.clone(),
        SimDelay::new(clock),
        sink.clone(),
    );
    controller.start();
    Rig {
        config,
        lines,
        alarm,
        sink,
        controller,
    }
}

fn press(config: &ControllerConfig) -> ConfirmedPressEvent {
    ConfirmedPressEvent {
        line: config.button_gpio,
        level: config.pressed_level(),
    }
}

fn release(config: &ControllerConfig) -> ConfirmedPressEvent {
    ConfirmedPressEvent {
        line: config.button_gpio,
        level: !config.pressed_level(),
    }
}

fn led_levels(rig: &Rig) -> Vec<Level> {
    rig.lines
        .writes(rig.config.led_gpio)
        .iter()
        .map(|w| w.level)
        .collect()
}

#[test]
fn each_mode_arms_its_own_period() {
    let mut rig = rig();
    let expected = [
        (Mode::Freq1Hz, Some(500)),
        (Mode::Freq2Hz, Some(250)),
        (Mode::Freq4Hz, Some(125)),
        (Mode::Off, None),
    ];
    for (mode, period_ms) in expected {
        let p = press(&rig.config);
        rig.controller.handle_event(p).unwrap();
        assert_eq!(rig.controller.mode(), mode);
        assert_eq!(rig.alarm.period().map(|d| d.as_millis() as u64), period_ms);
    }
    assert_eq!(
        rig.sink.mode_changes(),
        vec![Mode::Freq1Hz, Mode::Freq2Hz, Mode::Freq4Hz, Mode::Off]
    );
}

#[test]
fn alarm_expiries_alternate_the_led() {
    let mut rig = rig();
    let p = press(&rig.config);
    rig.controller.handle_event(p).unwrap();
    let before = led_levels(&rig).len();

    rig.alarm.fire(4);

    let toggles = &led_levels(&rig)[before..];
    assert_eq!(toggles, [Level::High, Level::Low, Level::High, Level::Low]);
    assert_eq!(rig.controller.timer().output().flips(), 4);
}

#[test]
fn off_mode_forces_led_low_and_stays_quiet() {
    let mut rig = rig();
    for _ in 0..3 {
        let p = press(&rig.config);
        rig.controller.handle_event(p).unwrap();
    }
    // Leave the LED high in 4 Hz, then press into Off.
    rig.alarm.fire(1);
    assert_eq!(rig.lines.level(rig.config.led_gpio), Level::High);

    let p = press(&rig.config);
    rig.controller.handle_event(p).unwrap();
    assert_eq!(rig.controller.mode(), Mode::Off);
    assert_eq!(rig.lines.level(rig.config.led_gpio), Level::Low);

    let writes = led_levels(&rig).len();
    rig.alarm.fire(10);
    assert_eq!(led_levels(&rig).len(), writes);
}

#[test]
fn late_expiry_from_replaced_program_is_ignored() {
    let mut rig = rig();
    let p = press(&rig.config);
    rig.controller.handle_event(p).unwrap();
    let p = press(&rig.config);
    rig.controller.handle_event(p).unwrap();
    let flips = rig.controller.timer().output().flips();

    // Replays both the 1 Hz and the 2 Hz handler; only the live one acts.
    rig.alarm.fire_history();

    assert_eq!(rig.controller.timer().output().flips(), flips + 1);
}

#[test]
fn releases_are_counted_not_applied() {
    let mut rig = rig();
    for _ in 0..3 {
        let r = release(&rig.config);
        rig.controller.handle_event(r).unwrap();
    }
    assert_eq!(rig.controller.mode(), Mode::Off);
    assert_eq!(rig.controller.stats().releases_ignored, 3);
    assert_eq!(rig.controller.buzzer_pulses(), 0);
    assert_eq!(
        rig.sink.count(|e| *e == ControllerEvent::ReleaseIgnored),
        3
    );
}

#[test]
fn acquire_failure_leaves_running_program_alone_then_forces_off() {
    let mut rig = rig();
    let p = press(&rig.config);
    rig.controller.handle_event(p).unwrap();

    rig.alarm.set_fail_acquire(true);
    let p = press(&rig.config);
    assert_eq!(
        rig.controller.handle_event(p),
        Err(Error::ResourceUnavailable(Resource::Timer))
    );

    assert_eq!(rig.controller.mode(), Mode::Freq1Hz);
    assert_eq!(rig.controller.timer().state(), TimerState::Disabled);
    assert_eq!(rig.lines.level(rig.config.led_gpio), Level::Low);
    assert_eq!(rig.controller.buzzer_pulses(), 2);
}

#[test]
fn arm_failure_is_reported_and_retried() {
    let mut rig = rig();
    rig.alarm.set_fail_arm(true);
    let p = press(&rig.config);
    assert!(rig.controller.handle_event(p).is_err());
    assert_eq!(rig.controller.mode(), Mode::Off);
    assert_eq!(rig.controller.stats().reprogram_failures, 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, ControllerEvent::ReprogramFailed { .. })),
        1
    );

    rig.alarm.set_fail_arm(false);
    let p = press(&rig.config);
    rig.controller.handle_event(p).unwrap();
    assert_eq!(rig.controller.mode(), Mode::Freq1Hz);
}

#[test]
fn active_low_button_treats_low_as_press() {
    let config = ControllerConfig {
        active_high: false,
        ..ControllerConfig::default()
    };
    let clock = SimClock::new();
    let lines = Arc::new(SimLines::with_clock(clock.clone()));
    let mut controller = Controller::new(
        &config,
        lines,
        ManualAlarm::new(),
        SimDelay::new(clock),
        RecordingSink::new(),
    );
    controller.start();

    controller
        .handle_event(ConfirmedPressEvent {
            line: config.button_gpio,
            level: Level::High,
        })
        .unwrap();
    assert_eq!(controller.mode(), Mode::Off);

    controller
        .handle_event(ConfirmedPressEvent {
            line: config.button_gpio,
            level: Level::Low,
        })
        .unwrap();
    assert_eq!(controller.mode(), Mode::Freq1Hz);
}
