//!Drivers for the i2c devices coinop can read. Each device sits behind a cargo feature so the
//! crate builds without any of them on machines that are not a Raspberry Pi.
pub mod devices;
