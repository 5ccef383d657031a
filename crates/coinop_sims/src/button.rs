use std::time::Duration;

use coinop_core::Input;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimulatedButtonConfig {
    ///time from one press to the next
    pub period_ms: u64,
    ///how long each press is held
    pub hold_ms: u64,
}

impl Default for SimulatedButtonConfig {
    fn default() -> Self {
        Self {
            period_ms: 3000,
            hold_ms: 400,
        }
    }
}

///A button that presses itself on a fixed schedule.
pub struct SimulatedButton {
    pub handle: JoinHandle<()>,
    input: Input<bool>,
}

impl SimulatedButton {
    pub fn spawn(cfg: &SimulatedButtonConfig, cancel_token: CancellationToken) -> Self {
        let (input, tx) = Input::new(false);
        let hold = Duration::from_millis(cfg.hold_ms);
        let released = Duration::from_millis(cfg.period_ms.saturating_sub(cfg.hold_ms).max(1));
        info!(
            "simulated button pressing for {:?} every {:?}",
            hold,
            hold + released
        );

        let handle = tokio::spawn(async move {
            let mut pressed = false;
            loop {
                let wait = if pressed { hold } else { released };
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = sleep(wait) => {
                        pressed = !pressed;
                        if tx.send(pressed).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("simulated button shutting down");
        });

        Self { handle, input }
    }

    pub fn input(&self) -> Input<bool> {
        self.input.clone()
    }
}
