//! Transport capabilities the sensor drivers are built on.
//!
//! Each adapter is owned by exactly one driver. Opening an adapter never panics:
//! callers get a `Result` and turn a failure into an unavailable sensor.

use anyhow::Result;

pub mod bitbang;
pub mod linux;

pub use {
    bitbang::{BitBangDht, BitBangOneWire},
    linux::{OpenDrainPin, SpinDelay},
};

/// Compensated values as produced by a BME280 measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bme280Sample {
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity in percent
    pub humidity: f32,
    /// Pascals
    pub pressure: f32,
}

/// An I2C-attached BME280
pub trait BarometricDevice {
    /// Checks the chip answers and loads its calibration data
    fn detect(&mut self) -> Result<()>;

    /// Forces one measurement and returns the compensated values
    fn sample(&mut self) -> Result<Bme280Sample>;
}

/// The single-wire link of a DHT22
pub trait DhtLink {
    /// Issues a start signal and reads back the 40-bit frame
    fn read_frame(&mut self) -> Result<[u8; 5]>;
}

/// Byte-level access to a Dallas 1-Wire bus
pub trait OneWire {
    /// Sends a reset pulse, returning whether any device answered with a presence pulse
    fn reset(&mut self) -> Result<bool>;

    /// Writes a byte, least significant bit first
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    fn read_byte(&mut self) -> Result<u8>;
}
