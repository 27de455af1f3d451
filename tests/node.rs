use {
    anyhow::{anyhow, Result},
    std::collections::VecDeque,
    weather_node::{
        bus::{BarometricDevice, Bme280Sample, DhtLink, OneWire},
        camera::Camera,
        clock::{Clock, ManualClock},
        orchestrator::Orchestrator,
        reading::{Metric, Reading, SensorId},
        registry::SensorRegistry,
        reporter::{Reporter, HEADER},
        sensors::{Bme280, Dht22, Ds18b20, Sensor, CONVERSION_TIME},
        INTERVAL,
    },
};

/// Sensor that always returns the same values, one per supported metric
struct Fixed {
    id: SensorId,
    metrics: &'static [Metric],
    values: &'static [f32],
}

impl Sensor for Fixed {
    fn id(&self) -> SensorId {
        self.id
    }

    fn metrics(&self) -> &'static [Metric] {
        self.metrics
    }

    fn read(&mut self, metric: Metric, _clock: &mut dyn Clock) -> Reading {
        let index = self.metrics.iter().position(|m| *m == metric).unwrap();
        Reading::new(self.id, metric, self.values[index])
    }
}

struct MissingBme280;

impl BarometricDevice for MissingBme280 {
    fn detect(&mut self) -> Result<()> {
        Err(anyhow!("chip id mismatch"))
    }

    fn sample(&mut self) -> Result<Bme280Sample> {
        panic!("unavailable sensor must not be sampled");
    }
}

/// DHT22 link replaying frames, failing once the script runs out
struct ScriptedDht(VecDeque<Result<[u8; 5]>>);

impl DhtLink for ScriptedDht {
    fn read_frame(&mut self) -> Result<[u8; 5]> {
        self.0
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no response")))
    }
}

/// One DS18B20 holding a fixed scratchpad
struct SingleDevice {
    scratchpad: [u8; 9],
    cursor: usize,
}

impl OneWire for SingleDevice {
    fn reset(&mut self) -> Result<bool> {
        self.cursor = 0;
        Ok(true)
    }

    fn write_byte(&mut self, _byte: u8) -> Result<()> {
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let byte = self.scratchpad[self.cursor];
        self.cursor += 1;
        Ok(byte)
    }
}

fn dht_frame(humidity: u16, temperature: u16) -> [u8; 5] {
    let h = humidity.to_be_bytes();
    let t = temperature.to_be_bytes();
    let sum = h[0]
        .wrapping_add(h[1])
        .wrapping_add(t[0])
        .wrapping_add(t[1]);

    [h[0], h[1], t[0], t[1], sum]
}

fn scratchpad(sixteenths: i16) -> [u8; 9] {
    let t = sixteenths.to_le_bytes();
    let mut pad = [t[0], t[1], 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0];
    pad[8] = pad[..8].iter().fold(0u8, |mut crc, &byte| {
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
    });

    pad
}

fn output(orchestrator: &Orchestrator<ManualClock, Vec<u8>>) -> String {
    String::from_utf8(orchestrator.reporter().sink().clone()).unwrap()
}

#[test]
fn healthy_node_prints_full_report() {
    let mut registry = SensorRegistry::new();
    registry
        .register(Box::new(Fixed {
            id: SensorId::Bme280,
            metrics: &[Metric::Temperature, Metric::Humidity, Metric::Pressure],
            values: &[22.5, 45.0, 1013.2],
        }))
        .unwrap();
    registry
        .register(Box::new(Fixed {
            id: SensorId::Dht22,
            metrics: &[Metric::Temperature, Metric::Humidity],
            values: &[22.0, 44.0],
        }))
        .unwrap();
    registry
        .register(Box::new(Fixed {
            id: SensorId::Ds18b20,
            metrics: &[Metric::Temperature],
            values: &[21.8],
        }))
        .unwrap();

    let mut orchestrator = Orchestrator::new(
        &mut registry,
        Reporter::new(Vec::new()),
        ManualClock::new(),
        Camera::Placeholder,
        INTERVAL,
    );
    orchestrator.announce().unwrap();
    orchestrator.run_cycles(1);

    assert_eq!(
        output(&orchestrator),
        "Camera module setup placeholder...\n\
         ----- Sensor Readings -----\n\
         BME280 Temperature: 22.50 °C\n\
         BME280 Humidity: 45.00 %\n\
         BME280 Pressure: 1013.20 hPa\n\
         DHT22 Temperature: 22.00 °C\n\
         DHT22 Humidity: 44.00 %\n\
         DS18B20 Temperature: 21.80 °C\n\
         Camera: Cloud cover estimation logic to be added.\n"
    );
}

#[test]
fn missing_bme280_is_reported_once_and_reads_invalid() {
    let mut registry = SensorRegistry::new();
    registry
        .register(Box::new(Bme280::new(MissingBme280)))
        .unwrap();
    registry
        .register(Box::new(Dht22::new(ScriptedDht(
            vec![
                Ok(dht_frame(440, 220)),
                Err(anyhow!("checksum timing")),
                Ok(dht_frame(450, 221)),
            ]
            .into(),
        ))))
        .unwrap();
    registry
        .register(Box::new(Ds18b20::new(SingleDevice {
            scratchpad: scratchpad(349),
            cursor: 0,
        })))
        .unwrap();

    let mut orchestrator = Orchestrator::new(
        &mut registry,
        Reporter::new(Vec::new()),
        ManualClock::new(),
        Camera::Placeholder,
        INTERVAL,
    );
    orchestrator.announce().unwrap();
    let cycles = orchestrator.run_cycles(2);

    for cycle in &cycles {
        assert_eq!(cycle.readings.len(), 6);
        assert!(cycle.readings[..3].iter().all(|r| !r.valid));
    }
    // First cycle: one transfer serves both metrics
    assert!(cycles[0].readings[3].valid && cycles[0].readings[4].valid);
    // Second cycle: temperature transfer failed, humidity unaffected
    assert!(!cycles[1].readings[3].valid);
    assert!(cycles[1].readings[4].valid);
    assert!(cycles[1].readings[5].valid);

    // The DS18B20 conversion wait is part of the cycle's blocking time
    assert_eq!(
        cycles[1].started_at - cycles[0].started_at,
        INTERVAL + CONVERSION_TIME
    );
    assert_eq!(orchestrator.clock().now(), (INTERVAL + CONVERSION_TIME) * 2);

    let text = output(&orchestrator);
    assert_eq!(text.matches("Could not find BME280 sensor!").count(), 1);
    assert!(text.starts_with("Could not find BME280 sensor!\nCamera module setup placeholder...\n"));

    let reports: Vec<&str> = text.split(HEADER).skip(1).collect();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        let lines: Vec<&str> = report.trim_start_matches('\n').lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "BME280 Temperature: nan °C");
        assert_eq!(lines[1], "BME280 Humidity: nan %");
        assert_eq!(lines[2], "BME280 Pressure: nan hPa");
        assert_eq!(lines[5], "DS18B20 Temperature: 21.81 °C");
        assert_eq!(lines[6], "Camera: Cloud cover estimation logic to be added.");
    }
    assert!(reports[1].contains("DHT22 Temperature: nan °C\nDHT22 Humidity: 45.00 %\n"));
}

#[test]
fn sensors_without_a_bus_are_unavailable_and_announced() {
    let mut registry = SensorRegistry::new();
    registry
        .register(Box::new(Bme280::new(MissingBme280)))
        .unwrap();
    registry
        .register(Box::new(Dht22::<ScriptedDht>::absent()))
        .unwrap();
    registry
        .register(Box::new(Ds18b20::<SingleDevice>::absent()))
        .unwrap();
    assert!(registry.statuses().iter().all(|s| !s.available));

    let mut orchestrator = Orchestrator::new(
        &mut registry,
        Reporter::new(Vec::new()),
        ManualClock::new(),
        Camera::Placeholder,
        INTERVAL,
    );
    orchestrator.announce().unwrap();
    let cycles = orchestrator.run_cycles(1);

    assert!(cycles[0].readings.iter().all(|r| !r.valid));
    assert_eq!(orchestrator.clock().now(), INTERVAL);
    assert!(output(&orchestrator).starts_with(
        "Could not find BME280 sensor!\n\
         Could not find DHT22 sensor!\n\
         Could not find DS18B20 sensor!\n\
         Camera module setup placeholder...\n"
    ));
}
