use {
    anyhow::Result,
    log::warn,
    std::fmt,
};

/// Sensors known to the node, declared in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorId {
    Bme280,
    Dht22,
    Ds18b20,
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SensorId::Bme280 => "BME280",
            SensorId::Dht22 => "DHT22",
            SensorId::Ds18b20 => "DS18B20",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
}

impl Metric {
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Pressure => "hPa",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::Pressure => "Pressure",
        };

        f.write_str(name)
    }
}

/// A single measurement taken during one cycle.
///
/// Failed or unavailable measurements are carried as the invalid sentinel: `value`
/// is NaN and `valid` is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub sensor: SensorId,
    pub metric: Metric,
    pub value: f32,
    pub unit: &'static str,
    pub valid: bool,
}

impl Reading {
    pub fn new(sensor: SensorId, metric: Metric, value: f32) -> Self {
        Self {
            sensor,
            metric,
            value,
            unit: metric.unit(),
            valid: value.is_finite(),
        }
    }

    pub fn invalid(sensor: SensorId, metric: Metric) -> Self {
        Self {
            sensor,
            metric,
            value: f32::NAN,
            unit: metric.unit(),
            valid: false,
        }
    }

    /// Collapses a measurement attempt into a reading, logging the failure if any
    pub fn from_result(sensor: SensorId, metric: Metric, result: Result<f32>) -> Self {
        match result {
            Ok(value) => Self::new(sensor, metric, value),
            Err(e) => {
                warn!("{} {} read failed: {:#}", sensor, metric, e);
                Self::invalid(sensor, metric)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorStatus {
    pub sensor: SensorId,
    pub available: bool,
}
