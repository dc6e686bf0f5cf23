//! Button ISR, output drivers, and line initialisation.

pub mod button;
pub mod buzzer;
pub mod hw_init;
pub mod toggle_timer;
