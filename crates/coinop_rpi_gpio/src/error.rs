use coinop_core::error::BuildError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpioError {
    #[error("RpiGpioError - Cause: {0}")]
    Gpio(#[from] rppal::gpio::Error),
    #[error("RpiI2cError - Cause: {0}")]
    I2c(#[from] rppal::i2c::Error),
}

impl From<GpioError> for BuildError {
    fn from(err: GpioError) -> Self {
        BuildError::from_string(err.to_string())
    }
}
