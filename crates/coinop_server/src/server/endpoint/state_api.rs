use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use coinop_core::StateSnapshot;

use crate::server::hub::StateHub;

///`GET` the current state, for clients that poll instead of holding a web socket.
pub(crate) struct StateApiEndpoint {
    hub: StateHub,
}

impl StateApiEndpoint {
    pub fn new(hub: &StateHub) -> Self {
        Self { hub: hub.clone() }
    }

    pub fn apply(self, key: &str, router: Router) -> Router {
        router.route(key, get(handle_state).with_state(self.hub))
    }
}

async fn handle_state(State(hub): State<StateHub>) -> Json<StateSnapshot> {
    Json(hub.compose())
}

#[cfg(test)]
mod tests {
    use axum::extract::State;
    use coinop_core::{Composer, Input, StateSnapshot};

    use super::handle_state;
    use crate::server::hub::StateHub;

    #[tokio::test]
    async fn returns_composed_state() {
        let (button, button_tx) = Input::new(false);
        let pulse = coinop_core::coin::CoinParams::default().build_pulse();
        let hub = StateHub::new(Composer::new(button, Some(pulse)), 4);

        button_tx.send(true).unwrap();
        let response = handle_state(State(hub)).await;
        assert_eq!(response.0, StateSnapshot::new(true, false));
        assert_eq!(
            serde_json::to_value(&response.0).unwrap(),
            serde_json::json!({"pressed": true, "raw": 0, "coin": false})
        );
    }
}
