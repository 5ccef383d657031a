//!Serves the composed button/coin state to viewers: a web socket that pushes every change, a
//! plain `GET` for pollers and, optionally, the static viewer front-end.
pub(crate) mod server;

use std::net::SocketAddr;
use std::time::Duration;

use coinop_core::error::BuildError;
use coinop_core::Composer;
use serde::Deserialize;
use tokio::join;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::DefaultMakeSpan;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::server::endpoint::Endpoint;

pub use crate::server::hub::{Payload, StateHub, Subscription};
pub use crate::server::relay::spawn_edge_relay;
pub use crate::server::safety_net::spawn_safety_net;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    ///directory the viewer front-end is served from. `None` serves only the api and web socket.
    pub static_dir: Option<String>,
    ///messages queued per viewer before it is considered stalled and dropped
    pub subscriber_buffer: usize,
    pub send_timeout_ms: u64,
    pub keepalive_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            static_dir: Some("public".to_string()),
            subscriber_buffer: 32,
            send_timeout_ms: 5000,
            keepalive_timeout_ms: 60000,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SafetyNetConfig {
    pub interval_ms: u64,
}

impl Default for SafetyNetConfig {
    fn default() -> Self {
        Self { interval_ms: 10 }
    }
}

pub struct Server {
    pub handle: JoinHandle<()>,
    pub hub: StateHub,
    pub local_addr: SocketAddr,
}

impl Server {
    ///Binds the listener and starts the hub's background tasks. Everything stops once
    /// `cancel_token` is cancelled; `handle` completes after the last of them has.
    pub async fn try_build(
        cfg: &ServerConfig,
        safety_net: &SafetyNetConfig,
        composer: Composer,
        cancel_token: CancellationToken,
    ) -> Result<Self, BuildError> {
        debug!("building state hub ...");
        let hub = StateHub::new(composer, cfg.subscriber_buffer);

        let relay_handle = spawn_edge_relay(hub.clone(), cancel_token.clone());
        let safety_net_handle = spawn_safety_net(
            hub.clone(),
            Duration::from_millis(safety_net.interval_ms.max(1)),
            cancel_token.clone(),
        );

        //build router service from the endpoints
        debug!("building routers ...");
        let mut router_service = axum::routing::Router::new();
        for (key, endpoint) in Endpoint::build_all(&hub, cfg) {
            debug!("building router {} ...", key);
            router_service = endpoint.apply(key, router_service);
        }
        router_service = router_service.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        );

        //bind to 0.0.0.0 on the given port
        let socket_addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
        let server = axum::Server::try_bind(&socket_addr)
            .map_err(|err| {
                cancel_token.cancel();
                BuildError::from_string(format!("could not bind {}: {}", socket_addr, err))
            })?
            .serve(router_service.into_make_service());
        let local_addr = server.local_addr();
        info!("listening on {}", local_addr);

        //start handling requests
        let shutdown = cancel_token.clone().cancelled_owned();
        let server_handle = tokio::spawn(async move {
            if let Err(err) = server.with_graceful_shutdown(shutdown).await {
                error!("server stopped: {}", err);
            }
        });

        let join_handle = tokio::spawn(async move {
            let _ = join!(server_handle, relay_handle, safety_net_handle);
            debug!("server shut down");
        });

        Ok(Server {
            handle: join_handle,
            hub,
            local_addr,
        })
    }
}
