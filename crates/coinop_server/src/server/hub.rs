use coinop_core::{Composer, StatePublisher, StateSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

///An encoded snapshot, shared by every subscriber it is sent to.
pub type Payload = Arc<str>;

///What a connection gets back from `StateHub::subscribe`.
///
/// The first message in `rx` is the state at subscribe time.
#[derive(Debug)]
pub struct Subscription {
    pub id: Uuid,
    pub rx: mpsc::Receiver<Payload>,
}

struct HubInner {
    composer: Composer,
    buffer: usize,
    subscribers: Mutex<HashMap<Uuid, mpsc::Sender<Payload>>>,
    //held from compose until the sends are queued, so composed states go out in compose order
    ordering: Mutex<()>,
}

///Fans composed state out to every connected viewer.
///
/// Each subscriber has a bounded buffer and every send is a `try_send`, so a stalled viewer can
/// never hold up the others. A subscriber whose buffer is closed or full is pruned after the
/// broadcast that found it.
///
/// Everything that composes on the hub's behalf (`subscribe`, `broadcast_current`,
/// `broadcast_if_changed`) composes and queues in one step, so a stale composition can never be
/// delivered after a newer one.
#[derive(Clone)]
pub struct StateHub {
    inner: Arc<HubInner>,
}

impl StateHub {
    pub fn new(composer: Composer, buffer: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                composer,
                buffer: buffer.max(1),
                subscribers: Mutex::new(HashMap::new()),
                ordering: Mutex::new(()),
            }),
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.inner.composer
    }

    pub fn compose(&self) -> StateSnapshot {
        self.inner.composer.compose()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        let id = Uuid::new_v4();

        //compose while holding the set so no broadcast slips in ahead of the initial state
        let _order = self.order();
        let mut subscribers = self.lock();
        match encode(&self.compose()) {
            Ok(payload) => {
                if let Err(err) = tx.try_send(payload) {
                    error!("could not queue initial state for {}: {}", id, err);
                }
            }
            Err(err) => error!("could not encode initial state for {}: {}", id, err),
        }
        subscribers.insert(id, tx);
        debug!("subscriber {} added, {} connected", id, subscribers.len());

        Subscription { id, rx }
    }

    ///Returns whether `id` was still subscribed.
    pub fn unsubscribe(&self, id: &Uuid) -> bool {
        let mut subscribers = self.lock();
        let removed = subscribers.remove(id).is_some();
        if removed {
            debug!("subscriber {} removed, {} connected", id, subscribers.len());
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    ///Sends `snapshot` to every subscriber and returns how many accepted it.
    pub fn broadcast(&self, snapshot: &StateSnapshot) -> usize {
        let payload = match encode(snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                error!("could not encode {:?}: {}", snapshot, err);
                return 0;
            }
        };

        let targets: Vec<(Uuid, mpsc::Sender<Payload>)> = self
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("subscriber {} is not keeping up, dropping it", id);
                    dead.push(id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("subscriber {} has gone away", id);
                    dead.push(id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.lock();
            for id in &dead {
                subscribers.remove(id);
            }
            debug!("pruned {} subscribers, {} connected", dead.len(), subscribers.len());
        }

        delivered
    }

    pub fn broadcast_current(&self) -> usize {
        let _order = self.order();
        self.broadcast(&self.compose())
    }

    ///Composes and broadcasts only when the result differs from `last`, which is then updated.
    /// Returns whether anything was sent.
    pub fn broadcast_if_changed(&self, last: &mut StateSnapshot) -> bool {
        let _order = self.order();
        let current = self.compose();
        if current == *last {
            return false;
        }
        trace!("broadcasting changed state {:?}", current);
        self.broadcast(&current);
        *last = current;
        true
    }

    fn order(&self) -> MutexGuard<'_, ()> {
        self.inner
            .ordering
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, mpsc::Sender<Payload>>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatePublisher for StateHub {
    fn publish_current(&self) {
        self.broadcast_current();
    }
}

fn encode(snapshot: &StateSnapshot) -> Result<Payload, serde_json::Error> {
    snapshot.to_json().map(Payload::from)
}
