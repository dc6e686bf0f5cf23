//! ledcycle firmware — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  EspLines          EspAlarm        Esp32TimeAdapter          │
//! │  (Line+Interrupt)  (gptimer)       (MonotonicClock)          │
//! │  FreeRtos delay    LogEventSink                              │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ButtonIsr ──▶ EventChannel ──▶ Controller                   │
//! │  (debounce)    (bounded FIFO)   (Mode · Buzzer · Timer)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup failures (bad pin config, no interrupt slot) are fatal and
//! returned from `main`. After that the controller task runs forever.

use std::sync::Arc;

use anyhow::Result;
use log::info;

use ledcycle::adapters::hardware::{EspAlarm, EspLines};
use ledcycle::adapters::log_sink::LogEventSink;
use ledcycle::adapters::time::Esp32TimeAdapter;
use ledcycle::app::controller::Controller;
use ledcycle::app::ports::InterruptPort;
use ledcycle::config::ControllerConfig;
use ledcycle::debounce::DebounceFilter;
use ledcycle::drivers::button::ButtonIsr;
use ledcycle::drivers::hw_init;
use ledcycle::events::{EVENT_QUEUE_CAP, EventChannel};

static EVENTS: EventChannel<EVENT_QUEUE_CAP> = EventChannel::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ledcycle v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Lines ──────────────────────────────────────────────
    let config = ControllerConfig::default();
    let lines = Arc::new(EspLines::new());
    hw_init::configure_lines(lines.as_ref(), &config)?;

    // ── 3. Button interrupt ───────────────────────────────────
    let button = Arc::new(ButtonIsr::new(
        lines.clone(),
        Esp32TimeAdapter::new(),
        DebounceFilter::new(config.button_gpio, config.debounce_window()),
        &EVENTS,
    ));
    lines.register_interrupt(config.button_gpio, button)?;

    // ── 4. Controller task ────────────────────────────────────
    let mut controller = Controller::new(
        &config,
        lines,
        EspAlarm::new(),
        esp_idf_hal::delay::FreeRtos,
        LogEventSink::new(),
    );
    controller.start();

    info!("System ready. Waiting for button presses.");
    // Woken from the button ISR: the waker must be interrupt-safe.
    // Nothing on the device shuts the channel down, so this never returns.
    esp_idf_hal::task::block_on(controller.run(&EVENTS));
    Ok(())
}
