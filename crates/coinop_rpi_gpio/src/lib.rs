//!This library provides access to the Raspberry Pi GPIO pins and I2C buses. It is a wrapper
//! around the rppal library.
//!
//! `get_bus` returns an I2C bus that can be handed to the sensor builders in `coinop_devices`.

//internal error type for rpi gpio
pub mod error;

//the push button, debounced
pub mod button;

pub use button::{GpioButton, GpioButtonConfig};
pub use rppal;
pub use rppal::i2c::I2c;

use error::GpioError;

pub fn open_gpio() -> Result<rppal::gpio::Gpio, GpioError> {
    Ok(rppal::gpio::Gpio::new()?)
}

//get i2c bus by id
pub fn get_bus(bus: u8) -> Result<I2c, GpioError> {
    Ok(I2c::with_bus(bus)?)
}
