use std::time::{Duration, Instant};

use super::CoinParams;

///Delta-threshold + cooldown trigger over a stream of range samples.
pub struct CoinDetector {
    threshold_mm: u16,
    cooldown: Duration,
    prev: Option<u16>, //the previous sample, updated on every observation
    last_trigger: Option<Instant>,
}

impl CoinDetector {
    pub fn new(params: &CoinParams) -> Self {
        Self {
            threshold_mm: params.threshold_mm,
            cooldown: params.cooldown(),
            prev: None,
            last_trigger: None,
        }
    }

    ///Feeds one sample taken at `now`. Returns true when it counts as a coin drop.
    pub fn observe(&mut self, sample_mm: u16, now: Instant) -> bool {
        let Some(prev) = self.prev.replace(sample_mm) else {
            //nothing to compare the first sample with
            return false;
        };

        if prev.abs_diff(sample_mm) <= self.threshold_mm {
            return false;
        }

        let cooled_down = match self.last_trigger {
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
            None => true,
        };
        if cooled_down {
            self.last_trigger = Some(now);
        }
        cooled_down
    }
}
