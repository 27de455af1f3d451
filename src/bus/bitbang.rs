use {
    crate::bus::{DhtLink, OneWire},
    anyhow::{anyhow, Result},
    embedded_hal::{
        blocking::delay::DelayUs,
        digital::v2::{InputPin, OutputPin},
    },
    std::fmt::Debug,
};

/// Upper bound on polling iterations while waiting for a DHT22 level change
const PULSE_TIMEOUT: u32 = 10_000;

/// An open-drain data line: driving high releases it to the pull-up
struct Line<P, D> {
    pin: P,
    delay: D,
}

impl<P, D, E> Line<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    D: DelayUs<u16>,
    E: Debug,
{
    fn drive_low(&mut self) -> Result<()> {
        self.pin
            .set_low()
            .or_else(|e| Err(anyhow!("Failed to drive line low: {:?}", e)))
    }

    fn release(&mut self) -> Result<()> {
        self.pin
            .set_high()
            .or_else(|e| Err(anyhow!("Failed to release line: {:?}", e)))
    }

    fn is_high(&self) -> Result<bool> {
        self.pin
            .is_high()
            .or_else(|e| Err(anyhow!("Failed to sample line: {:?}", e)))
    }

    fn wait_us(&mut self, us: u16) {
        self.delay.delay_us(us);
    }

    /// Counts polling iterations for as long as the line stays at `level`
    fn pulse(&self, level: bool) -> Result<u32> {
        let mut count = 0;
        while self.is_high()? == level {
            count += 1;
            if count >= PULSE_TIMEOUT {
                return Err(anyhow!(
                    "Timed out waiting for line to leave {} level",
                    if level { "high" } else { "low" }
                ));
            }
        }

        Ok(count)
    }
}

/// DHT22 link driven by toggling a GPIO
pub struct BitBangDht<P, D> {
    line: Line<P, D>,
}

impl<P, D, E> BitBangDht<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    D: DelayUs<u16>,
    E: Debug,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            line: Line { pin, delay },
        }
    }
}

impl<P, D, E> DhtLink for BitBangDht<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    D: DelayUs<u16>,
    E: Debug,
{
    fn read_frame(&mut self) -> Result<[u8; 5]> {
        let line = &mut self.line;

        // Start signal, then the sensor answers with ~80us low and ~80us high
        line.drive_low()?;
        line.wait_us(1_100);
        line.release()?;
        line.wait_us(40);
        line.pulse(false)?;
        line.pulse(true)?;

        // Every bit is a fixed low gap followed by a high pulse whose width is the bit value
        let mut frame = [0u8; 5];
        for bit in 0..40 {
            let low = line.pulse(false)?;
            let high = line.pulse(true)?;
            if high > low {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }

        Ok(frame)
    }
}

/// 1-Wire master driven by toggling a GPIO, using standard-speed slot timings
pub struct BitBangOneWire<P, D> {
    line: Line<P, D>,
}

impl<P, D, E> BitBangOneWire<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    D: DelayUs<u16>,
    E: Debug,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            line: Line { pin, delay },
        }
    }

    fn write_bit(&mut self, bit: bool) -> Result<()> {
        let line = &mut self.line;
        line.drive_low()?;
        if bit {
            line.wait_us(6);
            line.release()?;
            line.wait_us(64);
        } else {
            line.wait_us(60);
            line.release()?;
            line.wait_us(10);
        }

        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool> {
        let line = &mut self.line;
        line.drive_low()?;
        line.wait_us(6);
        line.release()?;
        line.wait_us(9);
        let bit = line.is_high()?;
        line.wait_us(55);

        Ok(bit)
    }
}

impl<P, D, E> OneWire for BitBangOneWire<P, D>
where
    P: InputPin<Error = E> + OutputPin<Error = E>,
    D: DelayUs<u16>,
    E: Debug,
{
    fn reset(&mut self) -> Result<bool> {
        let line = &mut self.line;
        line.drive_low()?;
        line.wait_us(480);
        line.release()?;
        line.wait_us(70);
        let presence = !line.is_high()?;
        line.wait_us(410);

        Ok(presence)
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }

        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = 0;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }

        Ok(byte)
    }
}
