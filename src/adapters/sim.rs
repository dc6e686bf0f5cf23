//! Host simulation adapters.
//!
//! Stand-ins for the ESP-IDF adapters so the full ISR → channel →
//! controller → timer pipeline runs on a workstation:
//!
//! | Adapter    | Implements                  | Behaviour                         |
//! |------------|-----------------------------|-----------------------------------|
//! | `SimLines` | LinePort, InterruptPort     | in-memory levels + write log      |
//! | `SimAlarm` | AlarmPort                   | thread-driven auto-reload alarm   |
//! | `SimClock` | MonotonicClock              | manually advanced microseconds    |
//! | `SimDelay` | DelayNs                     | advances a `SimClock`             |
//! | `StdDelay` | DelayNs                     | `std::thread::sleep`              |

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use core::time::Duration;
use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Instant;

use embedded_hal::delay::DelayNs;

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::{
    AlarmHandler, AlarmPort, Direction, Edge, EdgeHandler, InterruptPort, LineConfig, LinePort,
    MonotonicClock, Pull,
};
use crate::error::{ConfigError, Resource, Result};
use crate::events::{Level, LineId};
use crate::pins;

/// Interrupt handler slots available on the simulated GPIO matrix.
pub const MAX_ISR_SLOTS: usize = 4;

// ── SimLines ──────────────────────────────────────────────────

/// One recorded output write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWrite {
    pub line: LineId,
    pub level: Level,
    pub at_us: u64,
}

#[derive(Default)]
struct LineState {
    levels: HashMap<LineId, Level>,
    configs: HashMap<LineId, LineConfig>,
    writes: Vec<LineWrite>,
    handlers: heapless::Vec<(LineId, Arc<dyn EdgeHandler>), MAX_ISR_SLOTS>,
}

/// In-memory GPIO bank that records every write with a timestamp.
pub struct SimLines {
    clock: Box<dyn MonotonicClock>,
    state: Mutex<LineState>,
}

impl Default for SimLines {
    fn default() -> Self {
        Self::new()
    }
}

impl SimLines {
    /// Lines stamped with wall-clock microseconds since creation.
    pub fn new() -> Self {
        Self::with_clock(Esp32TimeAdapter::new())
    }

    pub fn with_clock(clock: impl MonotonicClock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            state: Mutex::new(LineState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LineState> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Set an input level without raising an interrupt.
    pub fn set_level(&self, line: LineId, level: Level) {
        self.lock().levels.insert(line, level);
    }

    /// Change an input level the way a physical edge would: if the level
    /// actually changes and the line's edge config matches, every handler
    /// registered on the line runs (outside the lock, like a real ISR).
    pub fn inject_edge(&self, line: LineId, level: Level) {
        let mut to_run: heapless::Vec<Arc<dyn EdgeHandler>, MAX_ISR_SLOTS> = heapless::Vec::new();
        {
            let mut st = self.lock();
            let previous = st.levels.insert(line, level).unwrap_or(Level::Low);
            let edge = st.configs.get(&line).map_or(Edge::None, |c| c.edge);
            if previous != level && edge.fires_on(level) {
                for (l, h) in &st.handlers {
                    if *l == line {
                        let _ = to_run.push(h.clone());
                    }
                }
            }
        }
        for h in &to_run {
            h.on_edge();
        }
    }

    /// Current level of a line (LOW if never driven).
    pub fn level(&self, line: LineId) -> Level {
        self.lock().levels.get(&line).copied().unwrap_or(Level::Low)
    }

    /// Every write to `line`, oldest first.
    pub fn writes(&self, line: LineId) -> Vec<LineWrite> {
        self.lock()
            .writes
            .iter()
            .filter(|w| w.line == line)
            .copied()
            .collect()
    }

    pub fn config(&self, line: LineId) -> Option<LineConfig> {
        self.lock().configs.get(&line).copied()
    }
}

impl LinePort for SimLines {
    fn configure_line(&self, line: LineId, config: LineConfig) -> Result<()> {
        if !(0..=pins::MAX_GPIO).contains(&line) {
            return Err(ConfigError::InvalidLine(line).into());
        }
        if config.direction == Direction::Output
            && (config.pull != Pull::None || config.edge != Edge::None)
        {
            return Err(ConfigError::OutputWithPullOrEdge(line).into());
        }
        self.lock().configs.insert(line, config);
        Ok(())
    }

    fn read_line(&self, line: LineId) -> Level {
        self.level(line)
    }

    fn write_line(&self, line: LineId, level: Level) {
        let at_us = self.clock.now_us();
        let mut st = self.lock();
        st.levels.insert(line, level);
        st.writes.push(LineWrite { line, level, at_us });
    }
}

impl InterruptPort for SimLines {
    fn register_interrupt(&self, line: LineId, handler: Arc<dyn EdgeHandler>) -> Result<()> {
        let mut st = self.lock();
        let edge = st.configs.get(&line).map_or(Edge::None, |c| c.edge);
        if edge == Edge::None {
            return Err(ConfigError::MissingEdge.into());
        }
        st.handlers
            .push((line, handler))
            .map_err(|_| Resource::InterruptSlot.into())
    }
}

// ── SimAlarm ──────────────────────────────────────────────────

struct AlarmWorker {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

/// Auto-reload alarm backed by a dedicated thread.
///
/// Expiries are scheduled against absolute deadlines so jitter does not
/// accumulate. `disarm` joins the thread, so no firing outlives it.
pub struct SimAlarm {
    worker: Option<AlarmWorker>,
    available: Arc<AtomicBool>,
}

impl Default for SimAlarm {
    fn default() -> Self {
        Self::new()
    }
}

impl SimAlarm {
    pub fn new() -> Self {
        Self {
            worker: None,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Switch that makes `acquire` fail while `false`. Kept by tests after
    /// the alarm has been moved into a timer.
    pub fn availability(&self) -> Arc<AtomicBool> {
        self.available.clone()
    }

    pub fn is_armed(&self) -> bool {
        self.worker.is_some()
    }
}

impl AlarmPort for SimAlarm {
    fn acquire(&mut self, _period: Duration) -> Result<()> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Resource::Timer.into())
        }
    }

    fn arm(&mut self, period: Duration, handler: Arc<dyn AlarmHandler>) -> Result<()> {
        self.disarm();
        let (stop, stopped) = mpsc::channel::<()>();
        let thread = std::thread::Builder::new()
            .name("sim-alarm".into())
            .spawn(move || {
                let mut deadline = Instant::now() + period;
                loop {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match stopped.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            handler.on_alarm();
                            deadline += period;
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            })
            .map_err(|_| Resource::Timer)?;
        self.worker = Some(AlarmWorker { stop, thread });
        Ok(())
    }

    fn disarm(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop.send(());
            let _ = worker.thread.join();
        }
    }
}

impl Drop for SimAlarm {
    fn drop(&mut self) {
        self.disarm();
    }
}

// ── Clocks and delays ─────────────────────────────────────────

/// Manually advanced monotonic clock. Clones share the same time.
#[derive(Clone, Default)]
pub struct SimClock {
    now_us: Arc<AtomicU64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now_us.fetch_add(by.as_micros() as u64, Ordering::AcqRel);
    }
}

impl MonotonicClock for SimClock {
    fn now_us(&self) -> u64 {
        self.now_us.load(Ordering::Acquire)
    }
}

/// Delay that advances a [`SimClock`] instead of sleeping.
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: SimClock) -> Self {
        Self { clock }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(Duration::from_nanos(ns as u64));
    }
}

/// Blocking delay on the host thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}
