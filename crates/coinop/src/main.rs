pub mod config;

use std::process::ExitCode;

use config::CoinopConfig;
use config_rs::{Config, File};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(not(any(feature = "rpi", feature = "sims")))]
compile_error!("enable at least one of the `rpi` or `sims` features");

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinop=debug,coinop_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let Some(cfg_name) = args.get(1).filter(|_| args.len() == 2) else {
        warn!("only one parameter, the config file, is expected.");
        warn!("got {}", args.join(","));
        return ExitCode::FAILURE;
    };

    let config_res = Config::builder()
        .add_source(File::with_name(cfg_name))
        .build()
        .and_then(|config| config.try_deserialize::<CoinopConfig>());

    match config_res {
        Ok(config) => {
            info!("coinop starting up!");
            if let Some(ref name) = config.metadata.name {
                info!("name: {name}")
            }
            if let Some(ref descrip) = config.metadata.description {
                info!("description: {descrip}")
            }
            match config.start().await {
                Ok(_) => {
                    info!("coinop shut down!");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    error!("coinop exited with an error: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            error!("Error starting coinop. Failed to parse config: {}", err);
            ExitCode::FAILURE
        }
    }
}
