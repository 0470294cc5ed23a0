use anyhow::Result;
use esp_idf_hal::gpio::{Gpio10, Output, PinDriver, Pins};

/// Pumpe: GPIO10 (Relais-Eingang, active high) am XIAO ESP32C3
pub fn init_hw(pins: Pins) -> Result<PinDriver<'static, Gpio10, Output>> {
    let mut pump = PinDriver::output(pins.gpio10)?;
    pump.set_low()?;
    Ok(pump)
}
