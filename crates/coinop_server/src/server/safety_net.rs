use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::hub::StateHub;

///Re-composes the state every `period` and broadcasts it when it differs from the last value this
/// loop saw. Covers edges or pulses whose own broadcast got lost, with at most `period` of delay.
pub fn spawn_safety_net(
    hub: StateHub,
    period: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = hub.compose();

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = ticker.tick() => {
                    if hub.broadcast_if_changed(&mut last) {
                        trace!("safety net caught up to {:?}", last);
                    }
                }
            }
        }
        debug!("safety net shutting down");
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use coinop_core::{Composer, Input, StateSnapshot};
    use tokio::time::sleep;
    use tokio_util::sync::CancellationToken;

    use super::spawn_safety_net;
    use crate::server::hub::StateHub;

    #[tokio::test(start_paused = true)]
    async fn broadcasts_changes_once() {
        let (button, button_tx) = Input::new(false);
        let hub = StateHub::new(Composer::new(button, None), 16);
        let mut sub = hub.subscribe();
        assert!(sub.rx.try_recv().is_ok());

        let cancel_token = CancellationToken::new();
        let handle = spawn_safety_net(
            hub.clone(),
            Duration::from_millis(10),
            cancel_token.clone(),
        );

        //nothing changed, nothing sent
        sleep(Duration::from_millis(55)).await;
        assert!(sub.rx.try_recv().is_err());

        //an edge nobody reported
        button_tx.send(true).unwrap();
        sleep(Duration::from_millis(15)).await;
        assert_eq!(
            &*sub.rx.try_recv().unwrap(),
            StateSnapshot::button_only(true).to_json().unwrap()
        );

        //and only once
        sleep(Duration::from_millis(100)).await;
        assert!(sub.rx.try_recv().is_err());

        cancel_token.cancel();
        handle.await.unwrap();
    }
}
