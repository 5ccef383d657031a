use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use coinop_core::sensor::{DistanceSensor, SensorError};

#[derive(Debug)]
struct Script {
    queue: VecDeque<u16>,
    last: u16,
    fail: bool,
}

///A distance sensor that reads back whatever a test feeds it.
///
/// Queued samples are returned in order. Once the queue is empty the last sample repeats, or
/// every read fails if `ScriptFeed::fail` was called.
pub struct ScriptedDistance {
    script: Arc<Mutex<Script>>,
}

///The test side of a `ScriptedDistance`.
#[derive(Clone)]
pub struct ScriptFeed {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDistance {
    pub fn new(start_mm: u16) -> (Self, ScriptFeed) {
        let script = Arc::new(Mutex::new(Script {
            queue: VecDeque::new(),
            last: start_mm,
            fail: false,
        }));
        (
            Self {
                script: script.clone(),
            },
            ScriptFeed { script },
        )
    }
}

impl ScriptFeed {
    pub fn push(&self, samples: impl IntoIterator<Item = u16>) {
        lock(&self.script).queue.extend(samples);
    }

    ///reads fail once the queued samples are used up
    pub fn fail(&self) {
        lock(&self.script).fail = true;
    }

    pub fn pending(&self) -> usize {
        lock(&self.script).queue.len()
    }
}

impl DistanceSensor for ScriptedDistance {
    fn read_mm(&mut self) -> Result<u16, SensorError> {
        let mut script = lock(&self.script);
        match script.queue.pop_front() {
            Some(sample) => {
                script.last = sample;
                Ok(sample)
            }
            None if script.fail => Err(SensorError::new("scripted sensor failure")),
            None => Ok(script.last),
        }
    }
}

fn lock(script: &Mutex<Script>) -> MutexGuard<'_, Script> {
    script.lock().unwrap_or_else(PoisonError::into_inner)
}
