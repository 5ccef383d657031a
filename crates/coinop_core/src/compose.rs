use crate::coin::CoinPulse;
use crate::{Input, StateSnapshot};

///Merges the latest button level and the coin pulse flag into a `StateSnapshot`.
///
/// Cheap to clone. `compose` takes no lock other than the coin pulse's and can be called from any
/// thread or task.
#[derive(Clone)]
pub struct Composer {
    button: Input<bool>,
    coin: Option<CoinPulse>,
}

impl Composer {
    pub fn new(button: Input<bool>, coin: Option<CoinPulse>) -> Self {
        Self { button, coin }
    }

    pub fn compose(&self) -> StateSnapshot {
        let pressed = self.button.current();
        match &self.coin {
            Some(pulse) => StateSnapshot::new(pressed, pulse.is_active()),
            None => StateSnapshot::button_only(pressed),
        }
    }

    pub fn button(&self) -> &Input<bool> {
        &self.button
    }

    pub fn coin_pulse(&self) -> Option<&CoinPulse> {
        self.coin.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Composer;
    use crate::coin::{CoinPulse, PulseRelease};
    use crate::{Input, StateSnapshot};

    #[test]
    fn compose_follows_button_level() {
        let (button, tx) = Input::new(false);
        let pulse = CoinPulse::new(Duration::from_millis(200), PulseRelease::Generation);
        let composer = Composer::new(button, Some(pulse));

        assert_eq!(composer.compose(), StateSnapshot::new(false, false));
        tx.send(true).unwrap();
        assert_eq!(composer.compose(), StateSnapshot::new(true, false));
        assert_eq!(composer.compose().raw(), 0);
    }

    #[test]
    fn compose_without_coin_pulse_omits_coin() {
        let (button, _tx) = Input::new(true);
        let composer = Composer::new(button, None);
        assert_eq!(composer.compose(), StateSnapshot::button_only(true));
        assert_eq!(composer.compose().coin(), None);
    }
}
