//!This is the core library for coinop. It holds the composed button/coin state, the coin-drop
//! detector and the traits that connect hardware adapters to whatever pushes state out to viewers.

use tokio::sync::watch;

pub mod coin;
pub mod compose;
pub mod error;
pub mod sensor;
pub mod snapshot;

pub use compose::Composer;
pub use snapshot::StateSnapshot;

///A value that can be read at any time and watched for changes.
///
/// Hardware adapters hold the matching `watch::Sender` and write to it from whatever context they
/// are notified in (an interrupt thread, a polling task, ...).
pub struct Input<T> {
    rx: watch::Receiver<T>,
}

impl<T> Input<T> {
    pub fn new(start: T) -> (Self, watch::Sender<T>) {
        let (tx, rx) = watch::channel(start);
        (Self { rx }, tx)
    }
    pub fn source(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }
}

impl<T: Copy> Input<T> {
    ///the latest value written by the adapter
    pub fn current(&self) -> T {
        *self.rx.borrow()
    }
}

impl<T> Clone for Input<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

///Something that can push the currently composed state to whoever is listening.
///
/// The coin pulse calls this when it switches on and again when it switches off.
pub trait StatePublisher: Send + Sync + 'static {
    fn publish_current(&self);
}
