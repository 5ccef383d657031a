use std::time::{Duration, Instant};

use coinop_core::sensor::{DistanceSensor, SensorError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimulatedDistanceConfig {
    ///range to the far wall of the coin chute
    pub baseline_mm: u16,
    ///noise added to every sample, +/-
    pub jitter_mm: u16,
    ///a coin passes once per period. 0 never drops one.
    pub drop_every_ms: u64,
    ///how long a passing coin is in view
    pub drop_ms: u64,
    ///how much closer the coin is than the baseline
    pub drop_depth_mm: u16,
    ///fixed seed for repeatable noise
    pub seed: Option<u64>,
}

impl Default for SimulatedDistanceConfig {
    fn default() -> Self {
        Self {
            baseline_mm: 80,
            jitter_mm: 2,
            drop_every_ms: 5000,
            drop_ms: 30,
            drop_depth_mm: 40,
            seed: None,
        }
    }
}

///A chute with periodic coin drops and a little noise on every reading.
pub struct SimulatedDistance {
    cfg: SimulatedDistanceConfig,
    rng: StdRng,
    start: Instant,
}

impl SimulatedDistance {
    pub fn new(cfg: &SimulatedDistanceConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            cfg: cfg.clone(),
            rng,
            start: Instant::now(),
        }
    }

    ///the reading `elapsed` after the simulation started
    pub fn sample_at(&mut self, elapsed: Duration) -> u16 {
        let elapsed_ms = elapsed.as_millis() as u64;
        let every = self.cfg.drop_every_ms;
        let coin_in_view =
            every > 0 && elapsed_ms >= every && elapsed_ms % every < self.cfg.drop_ms;

        let mut distance = i32::from(self.cfg.baseline_mm);
        if coin_in_view {
            distance -= i32::from(self.cfg.drop_depth_mm);
        }
        let jitter = i32::from(self.cfg.jitter_mm);
        if jitter > 0 {
            distance += self.rng.gen_range(-jitter..=jitter);
        }
        distance.clamp(0, i32::from(u16::MAX)) as u16
    }
}

impl DistanceSensor for SimulatedDistance {
    fn read_mm(&mut self) -> Result<u16, SensorError> {
        let elapsed = self.start.elapsed();
        Ok(self.sample_at(elapsed))
    }
}
