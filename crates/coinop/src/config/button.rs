use coinop_core::error::BuildError;
use coinop_core::Input;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::error;

#[cfg(feature = "rpi")]
use coinop_rpi_gpio::{GpioButton, GpioButtonConfig};

#[cfg(feature = "sims")]
use coinop_sims::{SimulatedButton, SimulatedButtonConfig};

///Where the "pressed" level comes from.
#[derive(Deserialize, Debug)]
pub enum ButtonConfig {
    #[cfg(feature = "rpi")]
    Gpio(GpioButtonConfig),

    #[cfg(feature = "sims")]
    Simulated(SimulatedButtonConfig),
}

///A running button. Keep it alive for as long as its input is read.
pub enum Button {
    #[cfg(feature = "rpi")]
    Gpio(GpioButton),

    #[cfg(feature = "sims")]
    Simulated(SimulatedButton),
}

impl ButtonConfig {
    pub fn build(&self, cancel_token: CancellationToken) -> Result<Button, BuildError> {
        match self {
            #[cfg(feature = "rpi")]
            Self::Gpio(gpio_config) => {
                let gpio = coinop_rpi_gpio::open_gpio()?;
                let button = GpioButton::try_build(&gpio, gpio_config, cancel_token)?;
                Ok(Button::Gpio(button))
            }

            #[cfg(feature = "sims")]
            Self::Simulated(sim_config) => Ok(Button::Simulated(SimulatedButton::spawn(
                sim_config,
                cancel_token,
            ))),
        }
    }
}

impl Button {
    pub fn input(&self) -> Input<bool> {
        match self {
            #[cfg(feature = "rpi")]
            Self::Gpio(button) => button.input(),

            #[cfg(feature = "sims")]
            Self::Simulated(button) => button.input(),
        }
    }

    ///waits for the button task to stop, then releases the hardware
    pub async fn join(self) {
        let joined = match self {
            #[cfg(feature = "rpi")]
            Self::Gpio(button) => button.handle.await,

            #[cfg(feature = "sims")]
            Self::Simulated(button) => button.handle.await,
        };
        if let Err(err) = joined {
            error!("button task failed: {}", err);
        }
    }
}
