use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{CoinDetector, CoinParams, CoinPulse};
use crate::sensor::{DistanceSensor, SensorError};
use crate::StatePublisher;

///Spawns the blocking read loop for a distance sensor.
///
/// Every sample goes through a `CoinDetector`; a trigger fires `pulse`, which publishes through
/// `publisher`. A read error stops the loop and is returned from the task, so a dead sensor shows
/// up as a finished task rather than a silently frozen `coin`.
pub fn spawn_coin_sampler<S: DistanceSensor>(
    mut sensor: S,
    params: &CoinParams,
    pulse: CoinPulse,
    publisher: Arc<dyn StatePublisher>,
    cancel_token: CancellationToken,
) -> JoinHandle<Result<(), SensorError>> {
    let runtime = Handle::current();
    let mut detector = CoinDetector::new(params);
    let period = params.sample_period();

    tokio::task::spawn_blocking(move || {
        while !cancel_token.is_cancelled() {
            let distance = match sensor.read_mm() {
                Ok(distance) => distance,
                Err(err) => {
                    error!("coin sampler stopping: {}", err);
                    return Err(err);
                }
            };

            if detector.observe(distance, Instant::now()) {
                info!("coin drop detected: {} mm", distance);
                pulse.fire(&runtime, &publisher);
            }

            if !period.is_zero() {
                std::thread::sleep(period);
            }
        }
        debug!("coin sampler shutting down");
        Ok(())
    })
}
