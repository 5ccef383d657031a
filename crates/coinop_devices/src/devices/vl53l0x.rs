use std::fmt::Debug;

use coinop_core::error::BuildError;
use coinop_core::sensor::{DistanceSensor, SensorError};
use embedded_hal_0::blocking::i2c;
use serde::Deserialize;
use tracing::{debug, info};

use ::vl53l0x::VL53L0x;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Vl53l0xConfig {
    pub bus: u8,
    ///time spent on each range measurement. 20000 gives about 50 readings a second.
    pub timing_budget_us: u32,
}

impl Default for Vl53l0xConfig {
    fn default() -> Self {
        Self {
            bus: 1,
            timing_budget_us: 20000,
        }
    }
}

///A VL53L0X in continuous ranging mode.
pub struct Vl53l0xSensor<I2C> {
    device: VL53L0x<I2C>,
}

impl<I2C, E> Vl53l0xSensor<I2C>
where
    E: Debug,
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E> + Send + 'static,
{
    pub fn try_build(cfg: &Vl53l0xConfig, i2c: I2C) -> Result<Self, SensorError> {
        let mut device = VL53L0x::new(i2c)
            .map_err(|err| SensorError::new(format!("vl53l0x init failed: {:?}", err)))?;
        device
            .set_measurement_timing_budget(cfg.timing_budget_us)
            .map_err(|err| SensorError::new(format!("vl53l0x timing budget: {:?}", err)))?;
        device
            .start_continuous(0)
            .map_err(|err| SensorError::new(format!("vl53l0x start: {:?}", err)))?;

        info!(
            "vl53l0x ranging on bus {} every {}us",
            cfg.bus, cfg.timing_budget_us
        );
        Ok(Self { device })
    }
}

impl<I2C, E> DistanceSensor for Vl53l0xSensor<I2C>
where
    E: Debug,
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E> + Send + 'static,
{
    fn read_mm(&mut self) -> Result<u16, SensorError> {
        self.device
            .read_range_continuous_millimeters_blocking()
            .map_err(|err| SensorError::new(format!("vl53l0x read failed: {:?}", err)))
    }
}

pub struct Vl53l0xSensorBuilder<F> {
    i2c_bus_provider: F,
}

impl<F> Vl53l0xSensorBuilder<F> {
    pub fn new(i2c_bus_provider: F) -> Self {
        Vl53l0xSensorBuilder { i2c_bus_provider }
    }

    pub fn try_build<I2C, E>(&self, cfg: &Vl53l0xConfig) -> Result<Vl53l0xSensor<I2C>, BuildError>
    where
        E: Debug,
        I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E> + Send + 'static,
        F: Fn(u8) -> Result<I2C, BuildError>,
    {
        debug!("opening i2c bus {} for vl53l0x ...", cfg.bus);
        let i2c = (self.i2c_bus_provider)(cfg.bus)?;
        Vl53l0xSensor::try_build(cfg, i2c).map_err(|err| {
            BuildError::from_string(format!("Error building vl53l0x sensor: {}", err))
        })
    }
}
