use {
    crate::{
        camera::Camera,
        reading::{Reading, SensorStatus},
    },
    anyhow::{anyhow, Result},
    std::{fmt::Write as _, io::Write},
};

pub const HEADER: &str = "----- Sensor Readings -----";

/// Largest magnitude the serial console prints as a number
const PRINT_LIMIT: f32 = 4_294_967_040.0;

/// Formats a value the way the serial console prints floats: two decimals, `nan`,
/// `inf` for either infinity and `ovf` past the printable range.
pub fn format_value(value: f32) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        "inf".to_string()
    } else if value.abs() > PRINT_LIMIT {
        "ovf".to_string()
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_reading(reading: &Reading) -> String {
    format!(
        "{} {}: {} {}",
        reading.sensor,
        reading.metric,
        format_value(reading.value),
        reading.unit
    )
}

/// Writes startup diagnostics and per-cycle reports to a text sink
pub struct Reporter<W> {
    sink: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// One line per sensor that could not be found, then the camera setup line
    pub fn startup(&mut self, statuses: &[SensorStatus], camera: &Camera) -> Result<()> {
        let mut text = String::new();
        for status in statuses.iter().filter(|s| !s.available) {
            writeln!(text, "Could not find {} sensor!", status.sensor)?;
        }
        writeln!(text, "{}", camera.setup_line())?;

        self.emit(&text)
    }

    /// Emits the report for one cycle as a single write
    pub fn report(&mut self, readings: &[Reading], camera: &mut Camera) -> Result<()> {
        let mut text = String::new();
        writeln!(text, "{}", HEADER)?;
        for reading in readings {
            writeln!(text, "{}", format_reading(reading))?;
        }
        writeln!(text, "{}", camera.report_line())?;

        self.emit(&text)
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.sink
            .write_all(text.as_bytes())
            .and_then(|_| self.sink.flush())
            .or_else(|e| Err(anyhow!("Failed to write to output: {}", e)))
    }
}
