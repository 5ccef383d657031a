use coinop_core::error::BuildError;
use coinop_core::sensor::DistanceSensor;
use serde::Deserialize;

#[cfg(feature = "rpi")]
use coinop_devices::devices::vl53l0x::{Vl53l0xConfig, Vl53l0xSensorBuilder};
#[cfg(feature = "rpi")]
use coinop_rpi_gpio::I2c;

#[cfg(feature = "sims")]
use coinop_sims::{SimulatedDistance, SimulatedDistanceConfig};

#[cfg(feature = "rpi")]
fn i2c_bus_provider(bus: u8) -> Result<I2c, BuildError> {
    Ok(coinop_rpi_gpio::get_bus(bus)?)
}

///The range sensor watching the coin chute.
#[derive(Deserialize, Debug)]
pub enum DistanceSensorConfig {
    #[cfg(feature = "rpi")]
    Vl53l0x(Vl53l0xConfig),

    #[cfg(feature = "sims")]
    Simulated(SimulatedDistanceConfig),
}

impl DistanceSensorConfig {
    pub fn build(&self) -> Result<Box<dyn DistanceSensor>, BuildError> {
        match self {
            #[cfg(feature = "rpi")]
            Self::Vl53l0x(vl53l0x_config) => Vl53l0xSensorBuilder::new(i2c_bus_provider)
                .try_build(vl53l0x_config)
                .map(|sensor| Box::new(sensor) as Box<dyn DistanceSensor>),

            #[cfg(feature = "sims")]
            Self::Simulated(sim_config) => Ok(Box::new(SimulatedDistance::new(sim_config))),
        }
    }
}
