//!The boundary to distance sensors used for coin detection.
use thiserror::Error;

///A failed distance read. The sampler treats this as fatal.
#[derive(Debug, Error)]
#[error("distance sensor error: {message}")]
pub struct SensorError {
    message: String,
}

impl SensorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///A blocking range sensor, polled at tens of Hz from a blocking task.
pub trait DistanceSensor: Send + 'static {
    ///Reads one range sample in millimetres.
    fn read_mm(&mut self) -> Result<u16, SensorError>;
}

impl DistanceSensor for Box<dyn DistanceSensor> {
    fn read_mm(&mut self) -> Result<u16, SensorError> {
        (**self).read_mm()
    }
}
