use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::StatePublisher;

///What the deferred "off" of a pulse does when a newer pulse started in the meantime.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PulseRelease {
    ///Only the newest pulse may switch the flag off. An older pulse's off does nothing.
    #[default]
    Generation,
    ///Every off clears the flag, even if it truncates a newer pulse. This matches the legacy
    /// server, for front-ends that were tuned against it.
    Unconditional,
}

#[derive(Debug, Default)]
struct PulseState {
    active: bool,
    generation: u64,
}

///The `coin` flag: true for a fixed duration after each detected drop.
#[derive(Clone)]
pub struct CoinPulse {
    state: Arc<Mutex<PulseState>>,
    duration: Duration,
    release: PulseRelease,
}

impl CoinPulse {
    pub fn new(duration: Duration, release: PulseRelease) -> Self {
        Self {
            state: Arc::new(Mutex::new(PulseState::default())),
            duration,
            release,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    ///Switches the flag on, publishes, and schedules the off on `runtime`.
    ///
    /// The returned handle is only useful to tests; nothing cancels a pending off.
    pub fn fire(&self, runtime: &Handle, publisher: &Arc<dyn StatePublisher>) -> JoinHandle<()> {
        let generation = self.start();
        publisher.publish_current();

        let pulse = self.clone();
        let publisher = publisher.clone();
        runtime.spawn(async move {
            sleep(pulse.duration).await;
            if pulse.finish(generation) {
                publisher.publish_current();
            } else {
                trace!("pulse {} superseded, leaving coin flag alone", generation);
            }
        })
    }

    fn start(&self) -> u64 {
        let mut state = self.lock();
        state.active = true;
        state.generation = state.generation.wrapping_add(1);
        debug!("coin pulse {} on", state.generation);
        state.generation
    }

    //returns whether the flag was cleared
    fn finish(&self, generation: u64) -> bool {
        let mut state = self.lock();
        match self.release {
            PulseRelease::Generation if state.generation != generation => false,
            _ => {
                state.active = false;
                debug!("coin pulse {} off", generation);
                true
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, PulseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
