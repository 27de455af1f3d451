use {
    anyhow::{anyhow, Result},
    embedded_hal::{
        blocking::delay::DelayUs,
        digital::v2::{InputPin, OutputPin},
    },
    linux_embedded_hal::{
        sysfs_gpio::{self, Direction},
        SysfsPin,
    },
    std::{
        hint,
        thread,
        time::{Duration, Instant},
    },
};

/// Delays up to this long are busy-waited; the scheduler cannot sleep for less
/// than roughly 50us.
const SPIN_LIMIT_US: u16 = 1_000;

/// Microsecond delay precise enough for 1-Wire and DHT22 slot timing.
///
/// Short waits spin on `Instant`, longer ones sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinDelay;

impl DelayUs<u16> for SpinDelay {
    fn delay_us(&mut self, us: u16) {
        let duration = Duration::from_micros(u64::from(us));
        if us > SPIN_LIMIT_US {
            thread::sleep(duration);
            return;
        }

        let start = Instant::now();
        while start.elapsed() < duration {
            hint::spin_loop();
        }
    }
}

/// Sysfs GPIO emulating an open-drain output.
///
/// Driving low switches the pin to an output at logic low; driving high switches it
/// back to an input so the external pull-up owns the line.
pub struct OpenDrainPin {
    pin: SysfsPin,
}

impl OpenDrainPin {
    pub fn open(number: u64) -> Result<Self> {
        let pin = SysfsPin::new(number);
        pin.export()
            .or_else(|e| Err(anyhow!("Failed to export GPIO {}: {:?}", number, e)))?;
        pin.set_direction(Direction::In)
            .or_else(|e| Err(anyhow!("Failed to configure GPIO {}: {:?}", number, e)))?;

        Ok(Self { pin })
    }
}

impl OutputPin for OpenDrainPin {
    type Error = sysfs_gpio::Error;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_direction(Direction::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_direction(Direction::In)
    }
}

impl InputPin for OpenDrainPin {
    type Error = sysfs_gpio::Error;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.pin.get_value()? != 0)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self.pin.get_value()? == 0)
    }
}
