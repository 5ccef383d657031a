use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::hub::StateHub;

///Broadcasts the composed state every time the button input reports an edge.
pub fn spawn_edge_relay(hub: StateHub, cancel_token: CancellationToken) -> JoinHandle<()> {
    let mut edges = hub.composer().button().source();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                changed = edges.changed() => {
                    if changed.is_err() {
                        debug!("button source closed");
                        break;
                    }
                    let delivered = hub.broadcast_current();
                    trace!("button edge sent to {} subscribers", delivered);
                }
            }
        }
        debug!("edge relay shutting down");
    })
}
