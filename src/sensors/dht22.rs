use {
    crate::{
        bus::{BitBangDht, DhtLink, OpenDrainPin, SpinDelay},
        clock::Clock,
        reading::{Metric, Reading, SensorId},
        sensors::{unsupported, Sensor},
    },
    anyhow::{anyhow, bail, Result},
    log::warn,
    std::{ops::RangeInclusive, time::Duration},
};

const METRICS: &[Metric] = &[Metric::Temperature, Metric::Humidity];

const HUMIDITY_RANGE: RangeInclusive<f32> = 0.0..=100.0;
const TEMPERATURE_RANGE: RangeInclusive<f32> = -40.0..=80.0;

/// The sensor needs this long between transfers
pub const MIN_SAMPLE_PERIOD: Duration = Duration::from_secs(2);

/// Values decoded from one checksummed DHT22 frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dht22Sample {
    pub humidity: f32,
    pub temperature: f32,
}

impl Dht22Sample {
    /// Decodes a 40-bit frame: humidity and temperature in tenths, sign in bit 15 of
    /// the temperature, then an 8-bit additive checksum.
    pub fn decode(frame: [u8; 5]) -> Result<Self> {
        let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        if sum != frame[4] {
            bail!(
                "DHT22 checksum mismatch: computed {:#04x}, received {:#04x}",
                sum,
                frame[4]
            );
        }

        let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
        let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
        let temperature = if frame[2] & 0x80 != 0 {
            -magnitude
        } else {
            magnitude
        };

        Ok(Self {
            humidity,
            temperature,
        })
    }
}

/// Temperature and humidity over a single-wire link.
///
/// The sensor has no startup handshake, so it is only unavailable when its data
/// pin could not be opened. Other failures show up per read.
pub struct Dht22<L> {
    link: Option<L>,
    /// Last good sample and the clock time it was taken at
    last: Option<(Duration, Dht22Sample)>,
}

impl<L: DhtLink> Dht22<L> {
    pub fn new(link: L) -> Self {
        Self {
            link: Some(link),
            last: None,
        }
    }

    pub fn absent() -> Self {
        Self {
            link: None,
            last: None,
        }
    }

    /// Returns the cached sample while it is younger than the sensor's minimum
    /// sampling period, otherwise runs a new transfer. Failed transfers are not cached.
    fn sample(&mut self, clock: &mut dyn Clock) -> Result<Dht22Sample> {
        let now = clock.now();
        if let Some((taken_at, sample)) = self.last {
            if now.saturating_sub(taken_at) < MIN_SAMPLE_PERIOD {
                return Ok(sample);
            }
        }

        let link = self
            .link
            .as_mut()
            .ok_or_else(|| anyhow!("DHT22 data pin unavailable"))?;
        let sample = Dht22Sample::decode(link.read_frame()?)?;
        self.last = Some((now, sample));

        Ok(sample)
    }

    fn read_metric(&mut self, metric: Metric, clock: &mut dyn Clock) -> Result<f32> {
        let (value, range) = match metric {
            Metric::Temperature => (self.sample(clock)?.temperature, TEMPERATURE_RANGE),
            Metric::Humidity => (self.sample(clock)?.humidity, HUMIDITY_RANGE),
            Metric::Pressure => bail!("DHT22 does not measure pressure"),
        };
        if !range.contains(&value) {
            bail!("DHT22 {} out of range: {}", metric, value);
        }

        Ok(value)
    }
}

impl Dht22<BitBangDht<OpenDrainPin, SpinDelay>> {
    /// Bit-bangs the sensor on a sysfs GPIO
    pub fn open(pin: u64) -> Self {
        match OpenDrainPin::open(pin) {
            Ok(pin) => Self::new(BitBangDht::new(pin, SpinDelay)),
            Err(e) => {
                warn!("{:#}", e);
                Self::absent()
            }
        }
    }
}

impl<L: DhtLink> Sensor for Dht22<L> {
    fn id(&self) -> SensorId {
        SensorId::Dht22
    }

    fn metrics(&self) -> &'static [Metric] {
        METRICS
    }

    fn available(&self) -> bool {
        self.link.is_some()
    }

    fn read(&mut self, metric: Metric, clock: &mut dyn Clock) -> Reading {
        if !self.available() {
            return Reading::invalid(SensorId::Dht22, metric);
        }
        if !METRICS.contains(&metric) {
            return unsupported(SensorId::Dht22, metric);
        }

        Reading::from_result(SensorId::Dht22, metric, self.read_metric(metric, clock))
    }
}
