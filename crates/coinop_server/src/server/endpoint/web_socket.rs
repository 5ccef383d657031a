pub(crate) mod connection;

use std::time::Duration;

use crate::server::hub::StateHub;
use crate::ServerConfig;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use connection::{ConnectionTimeouts, WebSocketConnection};

#[derive(Clone)]
struct WebSocketState {
    hub: StateHub,
    timeouts: ConnectionTimeouts,
}

///Pushes one JSON snapshot on connect and one per state change after that.
pub(crate) struct WebSocketEndpoint {
    state: WebSocketState,
}

impl WebSocketEndpoint {
    pub fn new(hub: &StateHub, config: &ServerConfig) -> Self {
        Self {
            state: WebSocketState {
                hub: hub.clone(),
                timeouts: ConnectionTimeouts {
                    send: Duration::from_millis(config.send_timeout_ms),
                    keepalive: Duration::from_millis(config.keepalive_timeout_ms),
                },
            },
        }
    }

    pub fn apply(self, key: &str, router: Router) -> Router {
        router.route(key, get(handle_ws_upgrade).with_state(self.state))
    }
}

async fn handle_ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<WebSocketState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        WebSocketConnection::new(state.hub, state.timeouts)
            .run(socket)
            .await
    })
}
