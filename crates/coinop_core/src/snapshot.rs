use serde::Serialize;

///One consistent view of the button and the coin pulse, as sent to viewers.
///
/// `raw` is the inverted legacy encoding of `pressed` (0 pressed, 1 released) that existing
/// front-ends read. It is only ever derived from `pressed`. `coin` is absent when coin detection
/// is not configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateSnapshot {
    pressed: bool,
    raw: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    coin: Option<bool>,
}

impl StateSnapshot {
    pub fn new(pressed: bool, coin: bool) -> Self {
        Self {
            pressed,
            raw: raw_level(pressed),
            coin: Some(coin),
        }
    }

    ///a snapshot for a machine without a coin sensor
    pub fn button_only(pressed: bool) -> Self {
        Self {
            pressed,
            raw: raw_level(pressed),
            coin: None,
        }
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    pub fn raw(&self) -> u8 {
        self.raw
    }

    pub fn coin(&self) -> Option<bool> {
        self.coin
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn raw_level(pressed: bool) -> u8 {
    if pressed {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::StateSnapshot;

    #[test]
    fn raw_is_inverted_pressed() {
        for pressed in [true, false] {
            for coin in [true, false] {
                let snapshot = StateSnapshot::new(pressed, coin);
                assert_eq!(snapshot.raw() == 0, snapshot.pressed());
            }
            assert_eq!(StateSnapshot::button_only(pressed).raw() == 0, pressed);
        }
    }

    #[test]
    fn json_matches_legacy_wire_format() {
        assert_eq!(
            StateSnapshot::new(true, false).to_json().unwrap(),
            r#"{"pressed":true,"raw":0,"coin":false}"#
        );
        assert_eq!(
            StateSnapshot::new(false, true).to_json().unwrap(),
            r#"{"pressed":false,"raw":1,"coin":true}"#
        );
        assert_eq!(
            StateSnapshot::button_only(false).to_json().unwrap(),
            r#"{"pressed":false,"raw":1}"#
        );
    }

    #[test]
    fn equality_covers_every_field() {
        assert_eq!(StateSnapshot::new(true, true), StateSnapshot::new(true, true));
        assert_ne!(StateSnapshot::new(true, true), StateSnapshot::new(true, false));
        assert_ne!(StateSnapshot::new(true, true), StateSnapshot::new(false, true));
        assert_ne!(StateSnapshot::new(false, false), StateSnapshot::button_only(false));
    }
}
