//!Coin-drop detection from a proximity sensor.
//!
//! A coin falling past the sensor perturbs the range for several consecutive samples. The
//! `CoinDetector` turns that into a single trigger, the `CoinPulse` holds `coin: true` for a short
//! while, and `spawn_coin_sampler` runs the blocking read loop that ties both to a sensor.

pub mod detector;
pub mod pulse;
pub mod sampler;

use serde::Deserialize;
use std::time::Duration;

pub use detector::CoinDetector;
pub use pulse::{CoinPulse, PulseRelease};
pub use sampler::spawn_coin_sampler;

///Tuning for coin detection. Every field has a default.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CoinParams {
    ///a range change larger than this (in mm) between two samples is a coin
    pub threshold_mm: u16,
    ///triggers closer together than this are ignored
    pub cooldown_ms: u64,
    ///how long `coin` stays true
    pub pulse_ms: u64,
    ///pause between sensor reads
    pub sample_period_ms: u64,
    pub release: PulseRelease,
}

impl Default for CoinParams {
    fn default() -> Self {
        Self {
            threshold_mm: 5,
            cooldown_ms: 500,
            pulse_ms: 200,
            sample_period_ms: 5,
            release: PulseRelease::Generation,
        }
    }
}

impl CoinParams {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    ///a pulse configured from these params
    pub fn build_pulse(&self) -> CoinPulse {
        CoinPulse::new(self.pulse_duration(), self.release)
    }
}
