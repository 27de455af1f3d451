use {
    crate::{
        clock::Clock,
        reading::{Metric, Reading, SensorId},
    },
    log::warn,
};

mod bme280;
mod dht22;
mod ds18b20;

pub use {
    self::bme280::Bme280,
    dht22::{Dht22, Dht22Sample},
    ds18b20::{Ds18b20, CONVERSION_TIME},
};

/// A physical sensor behind a small capability interface
pub trait Sensor {
    fn id(&self) -> SensorId;

    /// Metrics this sensor supports, in report order
    fn metrics(&self) -> &'static [Metric];

    /// Whether initialization found the sensor. Fixed for the lifetime of the driver.
    fn available(&self) -> bool {
        true
    }

    /// Performs one blocking read of `metric`, yielding the invalid sentinel on failure
    fn read(&mut self, metric: Metric, clock: &mut dyn Clock) -> Reading;

    /// Reads every supported metric in report order
    fn measure(&mut self, clock: &mut dyn Clock) -> Vec<Reading> {
        let metrics = self.metrics();
        metrics
            .iter()
            .map(|&metric| self.read(metric, clock))
            .collect()
    }
}

/// Reading returned when a driver is asked for a metric it does not support
fn unsupported(sensor: SensorId, metric: Metric) -> Reading {
    warn!("{} does not measure {}", sensor, metric);
    Reading::invalid(sensor, metric)
}
