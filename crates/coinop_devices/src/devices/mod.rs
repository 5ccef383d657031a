
///The VL53L0X is an i2c time-of-flight ranging sensor from STMicroelectronics, good for 30 to
/// 1200 mm.
///
/// coinop points one across the coin chute and watches for a coin cutting the beam.
#[cfg(feature = "vl53l0x")]
pub mod vl53l0x;
