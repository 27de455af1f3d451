use {
    crate::{
        bus::{BitBangOneWire, OneWire, OpenDrainPin, SpinDelay},
        clock::Clock,
        reading::{Metric, Reading, SensorId},
        sensors::{unsupported, Sensor},
    },
    anyhow::{anyhow, bail, Result},
    log::warn,
    std::time::Duration,
};

/// Worst-case conversion latency at the power-on 12-bit resolution
pub const CONVERSION_TIME: Duration = Duration::from_millis(750);

const SKIP_ROM: u8 = 0xCC;
const CONVERT_T: u8 = 0x44;
const READ_SCRATCHPAD: u8 = 0xBE;

const METRICS: &[Metric] = &[Metric::Temperature];

/// Dallas/Maxim CRC-8 (polynomial x^8 + x^5 + x^4 + 1, reflected)
fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0, |mut crc, &byte| {
        let mut byte = byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
        crc
    })
}

fn decode_scratchpad(scratchpad: &[u8; 9]) -> Result<f32> {
    if scratchpad.iter().all(|&b| b == 0) {
        bail!("DS18B20 disconnected");
    }
    let crc = crc8(&scratchpad[..8]);
    if crc != scratchpad[8] {
        bail!(
            "DS18B20 scratchpad CRC mismatch: computed {:#04x}, received {:#04x}",
            crc,
            scratchpad[8]
        );
    }

    Ok(f32::from(i16::from_le_bytes([scratchpad[0], scratchpad[1]])) / 16.0)
}

/// Temperature from the first device on a 1-Wire bus.
///
/// Devices are addressed with SKIP ROM, so only a single device per bus is supported
/// and it stands in for index 0.
pub struct Ds18b20<B> {
    bus: Option<B>,
}

impl<B: OneWire> Ds18b20<B> {
    pub fn new(bus: B) -> Self {
        Self { bus: Some(bus) }
    }

    pub fn absent() -> Self {
        Self { bus: None }
    }

    /// Reset and address every device on the bus
    fn select_all(bus: &mut B) -> Result<()> {
        if !bus.reset()? {
            bail!("No presence pulse on the 1-Wire bus");
        }

        bus.write_byte(SKIP_ROM)
    }

    /// Converts, waits out the conversion on `clock`, then reads back the scratchpad
    pub fn read_temperature(&mut self, clock: &mut dyn Clock) -> Result<f32> {
        let bus = self
            .bus
            .as_mut()
            .ok_or_else(|| anyhow!("1-Wire bus unavailable"))?;

        Self::select_all(bus)?;
        bus.write_byte(CONVERT_T)?;
        clock.sleep(CONVERSION_TIME);

        Self::select_all(bus)?;
        bus.write_byte(READ_SCRATCHPAD)?;
        let mut scratchpad = [0u8; 9];
        for byte in scratchpad.iter_mut() {
            *byte = bus.read_byte()?;
        }

        decode_scratchpad(&scratchpad)
    }
}

impl Ds18b20<BitBangOneWire<OpenDrainPin, SpinDelay>> {
    /// Bit-bangs the 1-Wire bus on a sysfs GPIO
    pub fn open(pin: u64) -> Self {
        match OpenDrainPin::open(pin) {
            Ok(pin) => Self::new(BitBangOneWire::new(pin, SpinDelay)),
            Err(e) => {
                warn!("{:#}", e);
                Self::absent()
            }
        }
    }
}

impl<B: OneWire> Sensor for Ds18b20<B> {
    fn id(&self) -> SensorId {
        SensorId::Ds18b20
    }

    fn metrics(&self) -> &'static [Metric] {
        METRICS
    }

    fn available(&self) -> bool {
        self.bus.is_some()
    }

    fn read(&mut self, metric: Metric, clock: &mut dyn Clock) -> Reading {
        if !self.available() {
            return Reading::invalid(SensorId::Ds18b20, metric);
        }
        if metric != Metric::Temperature {
            return unsupported(SensorId::Ds18b20, metric);
        }

        Reading::from_result(SensorId::Ds18b20, metric, self.read_temperature(clock))
    }
}
