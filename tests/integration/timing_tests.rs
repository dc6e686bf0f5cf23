//! Toggle timer against the thread-driven simulated alarm.
//!
//! These run in real time, so bounds are loose enough for a busy CI host
//! while still catching a wrong period or a runaway alarm.

use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use ledcycle::adapters::sim::{SimAlarm, SimLines};
use ledcycle::drivers::toggle_timer::{PeriodicToggleTimer, TimerState};
use ledcycle::events::Level;
use ledcycle::mode::TimerProgram;

const LED: i32 = 9;

fn timer() -> (Arc<SimLines>, PeriodicToggleTimer<SimLines, SimAlarm>) {
    let lines = Arc::new(SimLines::new());
    let timer = PeriodicToggleTimer::new(lines.clone(), LED, SimAlarm::new());
    (lines, timer)
}

#[test]
fn toggle_count_tracks_elapsed_time() {
    let period = Duration::from_millis(25);
    let run = Duration::from_millis(250);
    let (_, mut timer) = timer();

    let started = Instant::now();
    timer.reprogram(TimerProgram::periodic(period).unwrap()).unwrap();
    std::thread::sleep(run);
    timer.disable();
    let elapsed = started.elapsed();

    let flips = u128::from(timer.output().flips());
    let lower = run.as_micros() / period.as_micros() - 1;
    let upper = elapsed.as_micros() / period.as_micros() + 1;
    assert!(
        (lower..=upper).contains(&flips),
        "{flips} flips in {elapsed:?}, expected {lower}..={upper}"
    );
}

#[test]
fn no_writes_after_disable() {
    let (lines, mut timer) = timer();
    timer
        .reprogram(TimerProgram::periodic(Duration::from_millis(1)).unwrap())
        .unwrap();
    std::thread::sleep(Duration::from_millis(20));
    timer.disable();

    let settled = lines.writes(LED).len();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(lines.writes(LED).len(), settled);
    assert_eq!(lines.level(LED), Level::Low);
    assert_eq!(timer.state(), TimerState::Disabled);
}

#[test]
fn rapid_reprogramming_never_leaves_led_toggling() {
    let (lines, mut timer) = timer();
    let fast = TimerProgram::periodic(Duration::from_millis(1)).unwrap();

    for i in 0..50 {
        timer.reprogram(fast).unwrap();
        std::thread::sleep(Duration::from_micros(500 + (i % 5) * 300));
        timer.reprogram(TimerProgram::OFF).unwrap();
        assert_eq!(lines.level(LED), Level::Low, "iteration {i}");
    }

    let settled = lines.writes(LED).len();
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(lines.writes(LED).len(), settled);
}

#[test]
fn toggles_alternate_within_one_program() {
    let (lines, mut timer) = timer();
    timer
        .reprogram(TimerProgram::periodic(Duration::from_millis(2)).unwrap())
        .unwrap();
    let start = lines.writes(LED).len();
    std::thread::sleep(Duration::from_millis(30));
    timer.disable();

    let writes = lines.writes(LED);
    // Drop the final forced-low write from disable().
    let toggles = &writes[start..writes.len() - 1];
    assert!(!toggles.is_empty());
    for (i, w) in toggles.iter().enumerate() {
        let expected = if i % 2 == 0 { Level::High } else { Level::Low };
        assert_eq!(w.level, expected, "toggle {i}");
    }
}
