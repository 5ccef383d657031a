use std::time::Duration;

use coinop_core::Input;
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::error::GpioError;

fn default_pull_up() -> bool {
    true
}

fn default_bounce_ms() -> u64 {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct GpioButtonConfig {
    ///BCM pin number
    pub pin: u8,
    ///with the pull-up on, the switch shorts the pin to ground when pressed
    #[serde(default = "default_pull_up")]
    pub pull_up: bool,
    #[serde(default = "default_bounce_ms")]
    pub bounce_ms: u64,
}

///A push button on a GPIO pin, read through edge interrupts.
///
/// The interrupt thread reports every level it sees; a small task debounces those into the
/// `Input` the rest of coinop reads. The interrupt is cleared when the button is dropped.
pub struct GpioButton {
    pub handle: JoinHandle<()>,
    _pin: InterruptPin,
    input: Input<bool>,
}

//clears the interrupt on drop, which also stops rppal's interrupt thread
struct InterruptPin(InputPin);

impl GpioButton {
    pub fn try_build(
        gpio: &Gpio,
        cfg: &GpioButtonConfig,
        cancel_token: CancellationToken,
    ) -> Result<Self, GpioError> {
        let pin = gpio.get(cfg.pin)?;
        let mut pin = if cfg.pull_up {
            pin.into_input_pullup()
        } else {
            pin.into_input_pulldown()
        };

        let pressed_level = if cfg.pull_up { Level::Low } else { Level::High };
        let (raw_tx, raw) = watch::channel(pin.read() == pressed_level);
        pin.set_async_interrupt(Trigger::Both, move |level| {
            raw_tx.send_replace(level == pressed_level);
        })?;

        let (input, handle) =
            spawn_debouncer(raw, Duration::from_millis(cfg.bounce_ms), cancel_token);
        info!(
            "button on pin {} ready, pressed: {}",
            cfg.pin,
            input.current()
        );

        Ok(Self {
            handle,
            _pin: InterruptPin(pin),
            input,
        })
    }

    pub fn input(&self) -> Input<bool> {
        self.input.clone()
    }
}

impl Drop for InterruptPin {
    fn drop(&mut self) {
        match self.0.clear_async_interrupt() {
            Ok(()) => debug!("button pin {} released", self.0.pin()),
            Err(err) => error!("error clearing interrupt on pin {}: {}", self.0.pin(), err),
        }
    }
}

///Publishes the first edge right away, then ignores edges for `bounce` and publishes wherever
/// the level settled. A press shorter than `bounce` can therefore be missed, but the published
/// level never stays stale once the contacts are still.
fn spawn_debouncer(
    mut raw: watch::Receiver<bool>,
    bounce: Duration,
    cancel_token: CancellationToken,
) -> (Input<bool>, JoinHandle<()>) {
    let (input, tx) = Input::new(*raw.borrow_and_update());

    let handle = tokio::spawn(async move {
        let publish = |pressed: bool| {
            let modified = tx.send_if_modified(|current| {
                let modified = *current != pressed;
                *current = pressed;
                modified
            });
            if modified {
                trace!("button pressed: {}", pressed);
            }
        };

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                changed = raw.changed() => {
                    if changed.is_err() {
                        debug!("button interrupt closed");
                        break;
                    }
                    publish(*raw.borrow_and_update());
                    if bounce.is_zero() {
                        continue;
                    }

                    tokio::select! {
                        _ = cancel_token.cancelled() => break,
                        _ = sleep(bounce) => {},
                    }
                    publish(*raw.borrow_and_update());
                }
            }
        }
        debug!("button debouncer shutting down");
    });

    (input, handle)
}
