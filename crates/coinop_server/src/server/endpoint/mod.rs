pub(crate) mod state_api;
pub(crate) mod static_dir;
pub(crate) mod web_socket;

use crate::server::hub::StateHub;
use crate::ServerConfig;
use axum::Router;
use state_api::StateApiEndpoint;
use static_dir::StaticDirEndpoint;
use web_socket::WebSocketEndpoint;

pub(crate) const STATE_PATH: &str = "/api/state";
pub(crate) const WEB_SOCKET_PATH: &str = "/ws";

pub(crate) enum Endpoint {
    StateApi(StateApiEndpoint),
    WebSocket(WebSocketEndpoint),
    Static(StaticDirEndpoint),
}

impl Endpoint {
    ///every endpoint the configuration asks for, keyed by route
    pub fn build_all(hub: &StateHub, config: &ServerConfig) -> Vec<(&'static str, Endpoint)> {
        let mut endpoints = vec![
            (STATE_PATH, Endpoint::StateApi(StateApiEndpoint::new(hub))),
            (
                WEB_SOCKET_PATH,
                Endpoint::WebSocket(WebSocketEndpoint::new(hub, config)),
            ),
        ];
        if let Some(directory) = &config.static_dir {
            endpoints.push(("/", Endpoint::Static(StaticDirEndpoint::new(directory))));
        }
        endpoints
    }

    pub fn apply(self, key: &str, router: Router) -> Router {
        match self {
            Self::StateApi(endpoint) => endpoint.apply(key, router),
            Self::WebSocket(endpoint) => endpoint.apply(key, router),
            Self::Static(endpoint) => endpoint.apply(key, router),
        }
    }
}
