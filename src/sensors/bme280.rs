use {
    crate::{
        bus::{BarometricDevice, Bme280Sample},
        clock::Clock,
        reading::{Metric, Reading, SensorId},
        sensors::{unsupported, Sensor},
    },
    anyhow::{anyhow, Result},
    bme280::BME280,
    embedded_hal::blocking::{
        delay::DelayMs,
        i2c::{Read, Write, WriteRead},
    },
    linux_embedded_hal::{Delay, I2cdev},
    log::{info, warn},
    std::fmt::Debug,
};

const METRICS: &[Metric] = &[Metric::Temperature, Metric::Humidity, Metric::Pressure];

impl<I2C, D, E> BarometricDevice for BME280<I2C, D>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u8>,
    E: Debug,
{
    fn detect(&mut self) -> Result<()> {
        self.init()
            .or_else(|e| Err(anyhow!("Failed to initialize BME280: {:?}", e)))
    }

    fn sample(&mut self) -> Result<Bme280Sample> {
        let m = self
            .measure()
            .or_else(|e| Err(anyhow!("Failed to read from BME280: {:?}", e)))?;

        Ok(Bme280Sample {
            temperature: m.temperature,
            humidity: m.humidity,
            pressure: m.pressure,
        })
    }
}

/// Temperature, humidity and pressure over I2C.
///
/// A device that failed to open or be detected is dropped at construction and every
/// later read returns the invalid sentinel without bus traffic.
pub struct Bme280<B> {
    device: Option<B>,
}

impl<B: BarometricDevice> Bme280<B> {
    pub fn new(mut device: B) -> Self {
        match device.detect() {
            Ok(()) => {
                info!("BME280 initialized");
                Self {
                    device: Some(device),
                }
            }
            Err(e) => {
                warn!("{:#}", e);
                Self::absent()
            }
        }
    }

    pub fn absent() -> Self {
        Self { device: None }
    }

    fn read_metric(&mut self, metric: Metric) -> Result<f32> {
        let device = self
            .device
            .as_mut()
            .ok_or_else(|| anyhow!("BME280 unavailable"))?;
        let sample = device.sample()?;

        Ok(match metric {
            Metric::Temperature => sample.temperature,
            Metric::Humidity => sample.humidity,
            Metric::Pressure => sample.pressure / 100.0,
        })
    }
}

impl Bme280<BME280<I2cdev, Delay>> {
    /// Opens the chip on the given I2C character device
    pub fn open(path: &str, address: u8) -> Self {
        match I2cdev::new(path) {
            Ok(dev) => Self::new(BME280::new(dev, address, Delay)),
            Err(e) => {
                warn!("Failed to open {}: {}", path, e);
                Self::absent()
            }
        }
    }
}

impl<B: BarometricDevice> Sensor for Bme280<B> {
    fn id(&self) -> SensorId {
        SensorId::Bme280
    }

    fn metrics(&self) -> &'static [Metric] {
        METRICS
    }

    fn available(&self) -> bool {
        self.device.is_some()
    }

    fn read(&mut self, metric: Metric, _clock: &mut dyn Clock) -> Reading {
        if !self.available() {
            return Reading::invalid(SensorId::Bme280, metric);
        }
        if !METRICS.contains(&metric) {
            return unsupported(SensorId::Bme280, metric);
        }

        Reading::from_result(SensorId::Bme280, metric, self.read_metric(metric))
    }
}
