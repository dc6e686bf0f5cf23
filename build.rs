fn main() {
    // Firmware builds need the ESP-IDF link arguments; host builds have nothing to do.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
