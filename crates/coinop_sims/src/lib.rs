//!Stand-ins for the button and the distance sensor, for running coinop away from the hardware
//! and for driving it deterministically in tests.
pub mod button;
pub mod distance;
pub mod scripted;

pub use button::{SimulatedButton, SimulatedButtonConfig};
pub use distance::{SimulatedDistance, SimulatedDistanceConfig};
pub use scripted::{ScriptFeed, ScriptedDistance};
