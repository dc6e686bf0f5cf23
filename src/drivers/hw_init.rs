//! One-shot line initialization.
//!
//! Configures the button input (pull + interrupt edge) and the LED and
//! buzzer outputs, then drives both outputs LOW. Called once from
//! `main()` before the interrupt is registered and the run loop starts.
//! Any failure here is a `ConfigurationError` and is fatal at startup.

use log::info;

use crate::app::ports::{LineConfig, LinePort};
use crate::config::ControllerConfig;
use crate::error::Result;
use crate::events::Level;

pub fn configure_lines(lines: &impl LinePort, config: &ControllerConfig) -> Result<()> {
    config.validate()?;

    lines.configure_line(
        config.button_gpio,
        LineConfig::input(config.button_pull, config.button_edge),
    )?;

    for gpio in [config.led_gpio, config.buzzer_gpio] {
        lines.configure_line(gpio, LineConfig::OUTPUT)?;
        lines.write_line(gpio, Level::Low);
    }

    info!(
        "hw_init: button=GPIO{} ({:?}, {:?}) led=GPIO{} buzzer=GPIO{}",
        config.button_gpio, config.button_pull, config.button_edge, config.led_gpio, config.buzzer_gpio
    );
    Ok(())
}
