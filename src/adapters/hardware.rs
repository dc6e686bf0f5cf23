//! Hardware adapter — bridges ESP32 peripherals to the port traits.
//!
//! - [`EspLines`] implements [`LinePort`] and [`InterruptPort`] over the
//!   raw GPIO driver and the shared GPIO ISR service.
//! - [`EspAlarm`] implements [`AlarmPort`] over one general-purpose timer
//!   (gptimer) in auto-reload mode.
//!
//! This is the only module that touches actual hardware. It only exists
//! on `target_os = "espidf"`; host builds use `adapters::sim` instead.
//!
//! [`LinePort`]: crate::app::ports::LinePort
//! [`InterruptPort`]: crate::app::ports::InterruptPort
//! [`AlarmPort`]: crate::app::ports::AlarmPort

#![cfg(target_os = "espidf")]

use core::ffi::c_void;
use core::time::Duration;
use std::sync::Arc;

use esp_idf_svc::sys::*;
use log::{info, warn};

use crate::app::ports::{
    AlarmHandler, AlarmPort, Direction, Edge, EdgeHandler, InterruptPort, LineConfig, LinePort,
    Pull,
};
use crate::error::{ConfigError, Resource, Result};
use crate::events::{Level, LineId};

const OK: esp_err_t = ESP_OK as esp_err_t;

// ── GPIO ──────────────────────────────────────────────────────

/// Raw GPIO access. Stateless; every call goes straight to the driver.
#[derive(Debug, Default)]
pub struct EspLines;

impl EspLines {
    pub fn new() -> Self {
        Self
    }
}

impl LinePort for EspLines {
    fn configure_line(&self, line: LineId, config: LineConfig) -> Result<()> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << line,
            mode: match config.direction {
                Direction::Input => gpio_mode_t_GPIO_MODE_INPUT,
                Direction::Output => gpio_mode_t_GPIO_MODE_OUTPUT,
            },
            pull_up_en: if config.pull == Pull::Up {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: if config.pull == Pull::Down {
                gpio_pulldown_t_GPIO_PULLDOWN_ENABLE
            } else {
                gpio_pulldown_t_GPIO_PULLDOWN_DISABLE
            },
            intr_type: match config.edge {
                Edge::None => gpio_int_type_t_GPIO_INTR_DISABLE,
                Edge::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
                Edge::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
                Edge::Both => gpio_int_type_t_GPIO_INTR_ANYEDGE,
            },
            ..Default::default()
        };
        // SAFETY: gpio_config only reads `cfg`; called from the setup path.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != OK {
            return Err(ConfigError::Rejected { line, code: ret }.into());
        }
        Ok(())
    }

    fn read_line(&self, line: LineId) -> Level {
        // SAFETY: read-only register access on a configured pin; IRAM-safe.
        Level::from(unsafe { gpio_get_level(line) } != 0)
    }

    fn write_line(&self, line: LineId, level: Level) {
        // SAFETY: register write on a configured output; IRAM-safe.
        unsafe {
            gpio_set_level(line, u32::from(level == Level::High));
        }
    }
}

unsafe extern "C" fn edge_trampoline(arg: *mut c_void) {
    // SAFETY: `arg` is the leaked `Box<Arc<dyn EdgeHandler>>` installed by
    // `register_interrupt`; it lives for the rest of the program.
    let handler = unsafe { &*(arg as *const Arc<dyn EdgeHandler>) };
    handler.on_edge();
}

impl InterruptPort for EspLines {
    fn register_interrupt(&self, line: LineId, handler: Arc<dyn EdgeHandler>) -> Result<()> {
        // SAFETY: installing the shared ISR service is idempotent; a second
        // install reports ESP_ERR_INVALID_STATE, which is not an error here.
        let ret = unsafe { gpio_install_isr_service(0) };
        if ret != OK && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            return Err(Resource::IsrService.into());
        }

        // The handler is captured here, once, and never looked up again.
        let arg = Box::into_raw(Box::new(handler)).cast::<c_void>();
        // SAFETY: `arg` stays valid for the program lifetime (leaked above).
        let ret = unsafe { gpio_isr_handler_add(line, Some(edge_trampoline), arg) };
        if ret != OK {
            // SAFETY: the service rejected `arg`, so nothing else holds it.
            drop(unsafe { Box::from_raw(arg.cast::<Arc<dyn EdgeHandler>>()) });
            return Err(Resource::InterruptSlot.into());
        }
        info!("hardware: ISR registered on GPIO {}", line);
        Ok(())
    }
}

// ── gptimer alarm ─────────────────────────────────────────────

/// 1 MHz timer resolution: one tick per microsecond.
const TIMER_RESOLUTION_HZ: u32 = 1_000_000;

unsafe extern "C" fn alarm_trampoline(
    _timer: gptimer_handle_t,
    _edata: *const gptimer_alarm_event_data_t,
    user_ctx: *mut c_void,
) -> bool {
    // SAFETY: `user_ctx` is the boxed handler installed by `arm`; `disarm`
    // stops and disables the timer before freeing it.
    let handler = unsafe { &*(user_ctx as *const Arc<dyn AlarmHandler>) };
    handler.on_alarm();
    false
}

/// One gptimer, created lazily and reused across programs.
pub struct EspAlarm {
    timer: gptimer_handle_t,
    running: bool,
    ctx: *mut Arc<dyn AlarmHandler>,
}

impl Default for EspAlarm {
    fn default() -> Self {
        Self::new()
    }
}

impl EspAlarm {
    pub fn new() -> Self {
        Self {
            timer: core::ptr::null_mut(),
            running: false,
            ctx: core::ptr::null_mut(),
        }
    }

    fn free_ctx(&mut self) {
        if !self.ctx.is_null() {
            // SAFETY: created by Box::into_raw in `arm`; the timer is
            // disabled, so the ISR can no longer observe it.
            drop(unsafe { Box::from_raw(self.ctx) });
            self.ctx = core::ptr::null_mut();
        }
    }
}

impl AlarmPort for EspAlarm {
    fn acquire(&mut self, period: Duration) -> Result<()> {
        if period.as_micros() == 0 || period.as_micros() > u128::from(u64::MAX) {
            return Err(Resource::Timer.into());
        }
        if !self.timer.is_null() {
            return Ok(());
        }
        let cfg = gptimer_config_t {
            clk_src: soc_periph_gptimer_clk_src_t_GPTIMER_CLK_SRC_DEFAULT,
            direction: gptimer_count_direction_t_GPTIMER_COUNT_UP,
            resolution_hz: TIMER_RESOLUTION_HZ,
            ..Default::default()
        };
        // SAFETY: `self.timer` is only written here, from the controller task.
        let ret = unsafe { gptimer_new_timer(&cfg, &mut self.timer) };
        if ret != OK {
            self.timer = core::ptr::null_mut();
            warn!("hardware: gptimer_new_timer failed (rc={})", ret);
            return Err(Resource::Timer.into());
        }
        Ok(())
    }

    fn arm(&mut self, period: Duration, handler: Arc<dyn AlarmHandler>) -> Result<()> {
        self.disarm();
        if self.timer.is_null() {
            return Err(Resource::Timer.into());
        }

        self.ctx = Box::into_raw(Box::new(handler));
        let cbs = gptimer_event_callbacks_t {
            on_alarm: Some(alarm_trampoline),
        };
        let mut alarm = gptimer_alarm_config_t {
            alarm_count: period.as_micros() as u64,
            reload_count: 0,
            ..Default::default()
        };
        alarm.flags.set_auto_reload_on_alarm(1);

        // SAFETY: the timer is disabled (disarm above), which is the state
        // gptimer requires for callback registration and alarm setup.
        let ok = unsafe {
            gptimer_register_event_callbacks(self.timer, &cbs, self.ctx.cast::<c_void>()) == OK
                && gptimer_set_raw_count(self.timer, 0) == OK
                && gptimer_set_alarm_action(self.timer, &alarm) == OK
                && gptimer_enable(self.timer) == OK
        };
        if !ok {
            self.free_ctx();
            return Err(Resource::Timer.into());
        }
        // SAFETY: timer enabled above.
        if unsafe { gptimer_start(self.timer) } != OK {
            // SAFETY: undo the enable so the ISR cannot see a freed ctx.
            unsafe { gptimer_disable(self.timer) };
            self.free_ctx();
            return Err(Resource::Timer.into());
        }
        self.running = true;
        Ok(())
    }

    fn disarm(&mut self) {
        if self.running {
            // SAFETY: stop + disable on a started timer. gptimer_disable
            // waits out an in-flight alarm ISR on this core.
            unsafe {
                gptimer_stop(self.timer);
                gptimer_disable(self.timer);
            }
            self.running = false;
        }
        self.free_ctx();
    }
}

impl Drop for EspAlarm {
    fn drop(&mut self) {
        self.disarm();
        if !self.timer.is_null() {
            // SAFETY: timer is disabled; deleting releases the hardware slot.
            unsafe { gptimer_del_timer(self.timer) };
        }
    }
}
