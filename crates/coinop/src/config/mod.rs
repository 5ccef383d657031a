pub mod button;
pub mod distance;

use std::sync::Arc;

use button::ButtonConfig;
use distance::DistanceSensorConfig;

use coinop_core::coin::{spawn_coin_sampler, CoinParams};
use coinop_core::error::BuildError;
use coinop_core::sensor::SensorError;
use coinop_core::Composer;
use coinop_server::{SafetyNetConfig, Server, ServerConfig};
use serde::Deserialize;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Deserialize, Debug, Default)]
pub struct CoinopMetadataConfig {
    pub name: Option<String>,
    pub description: Option<String>,
}

///Coin detection: the tuning and the sensor it reads.
#[derive(Deserialize, Debug)]
pub struct CoinConfig {
    #[serde(flatten)]
    pub params: CoinParams,
    pub sensor: DistanceSensorConfig,
}

#[derive(Deserialize, Debug)]
pub struct CoinopConfig {
    #[serde(default)]
    pub metadata: CoinopMetadataConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub safety_net: SafetyNetConfig,
    pub button: ButtonConfig,
    ///leave out for a button-only machine
    pub coin: Option<CoinConfig>,
}

type SamplerHandle = JoinHandle<Result<(), SensorError>>;

enum Stop {
    Signal,
    Sampler(Result<Result<(), SensorError>, JoinError>),
    Server,
}

impl CoinopConfig {
    ///Builds everything, then runs until a shutdown signal, a sensor failure or the server
    /// stopping. All tasks are cancelled and joined before this returns.
    pub async fn start(self) -> Result<(), BuildError> {
        let cancel_token = CancellationToken::new();

        debug!("building button ...");
        let button = self.button.build(cancel_token.clone())?;

        let coin = match self.coin {
            Some(coin_config) => {
                debug!("building distance sensor ...");
                let sensor = coin_config.sensor.build().map_err(|err| {
                    cancel_token.cancel();
                    err
                })?;
                let pulse = coin_config.params.build_pulse();
                Some((sensor, pulse, coin_config.params))
            }
            None => {
                info!("no coin section, running button only");
                None
            }
        };

        let composer = Composer::new(
            button.input(),
            coin.as_ref().map(|(_, pulse, _)| pulse.clone()),
        );

        debug!("building server ...");
        let server = Server::try_build(
            &self.server,
            &self.safety_net,
            composer,
            cancel_token.clone(),
        )
        .await
        .map_err(|err| {
            cancel_token.cancel();
            err
        })?;

        let mut sampler: Option<SamplerHandle> = coin.map(|(sensor, pulse, params)| {
            spawn_coin_sampler(
                sensor,
                &params,
                pulse,
                Arc::new(server.hub.clone()),
                cancel_token.clone(),
            )
        });
        let mut server_handle = server.handle;
        info!("coinop up on {}", server.local_addr);

        let stop = tokio::select! {
            _ = shutdown_signal() => Stop::Signal,
            result = sampler_done(&mut sampler) => Stop::Sampler(result),
            _ = &mut server_handle => Stop::Server,
        };

        let mut server_running = true;
        let outcome = match stop {
            Stop::Signal => {
                info!("shutdown requested");
                Ok(())
            }
            Stop::Sampler(result) => {
                sampler = None;
                match result {
                    Ok(Ok(())) => Err(BuildError::message("coin sampler stopped")),
                    Ok(Err(err)) => Err(BuildError::from(err)),
                    Err(err) => Err(BuildError::from_string(format!(
                        "coin sampler panicked: {}",
                        err
                    ))),
                }
            }
            Stop::Server => {
                server_running = false;
                Err(BuildError::message("server stopped unexpectedly"))
            }
        };

        debug!("cancelling tasks ...");
        cancel_token.cancel();
        if server_running {
            if let Err(err) = server_handle.await {
                error!("server task failed: {}", err);
            }
        }
        if let Some(handle) = sampler {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!("coin sampler ended with: {}", err),
                Err(err) => error!("coin sampler task failed: {}", err),
            }
        }
        button.join().await;

        outcome
    }
}

async fn sampler_done(
    sampler: &mut Option<SamplerHandle>,
) -> Result<Result<(), SensorError>, JoinError> {
    match sampler {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
