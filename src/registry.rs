use {
    crate::{
        reading::{SensorId, SensorStatus},
        sensors::Sensor,
    },
    anyhow::{bail, Result},
    log::info,
};

/// The configured sensors and their availability, fixed once startup is over.
///
/// Sensors are kept in report order no matter the order they are registered in.
#[derive(Default)]
pub struct SensorRegistry {
    sensors: Vec<Box<dyn Sensor>>,
    statuses: Vec<SensorStatus>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an initialized driver, recording its availability
    pub fn register(&mut self, sensor: Box<dyn Sensor>) -> Result<()> {
        let id = sensor.id();
        if self.status(id).is_some() {
            bail!("{} is already registered", id);
        }

        let status = SensorStatus {
            sensor: id,
            available: sensor.available(),
        };
        info!(
            "Registered {} ({})",
            id,
            if status.available {
                "available"
            } else {
                "unavailable"
            }
        );

        let index = self.statuses.partition_point(|s| s.sensor < id);
        self.sensors.insert(index, sensor);
        self.statuses.insert(index, status);

        Ok(())
    }

    pub fn statuses(&self) -> &[SensorStatus] {
        &self.statuses
    }

    pub fn status(&self, id: SensorId) -> Option<SensorStatus> {
        self.statuses.iter().find(|s| s.sensor == id).copied()
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub(crate) fn sensors_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Sensor>> {
        self.sensors.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            clock::Clock,
            reading::{Metric, Reading},
        },
    };

    struct Stub {
        id: SensorId,
        available: bool,
    }

    impl Sensor for Stub {
        fn id(&self) -> SensorId {
            self.id
        }

        fn metrics(&self) -> &'static [Metric] {
            &[Metric::Temperature]
        }

        fn available(&self) -> bool {
            self.available
        }

        fn read(&mut self, metric: Metric, _clock: &mut dyn Clock) -> Reading {
            Reading::invalid(self.id, metric)
        }
    }

    fn stub(id: SensorId, available: bool) -> Box<dyn Sensor> {
        Box::new(Stub { id, available })
    }

    #[test]
    fn keeps_report_order() {
        let mut registry = SensorRegistry::new();
        registry.register(stub(SensorId::Ds18b20, true)).unwrap();
        registry.register(stub(SensorId::Bme280, false)).unwrap();
        registry.register(stub(SensorId::Dht22, true)).unwrap();

        let order: Vec<_> = registry.sensors_mut().map(|s| s.id()).collect();
        assert_eq!(order, [SensorId::Bme280, SensorId::Dht22, SensorId::Ds18b20]);
        let statuses: Vec<_> = registry.statuses().iter().map(|s| s.sensor).collect();
        assert_eq!(statuses, order);
        assert_eq!(registry.status(SensorId::Bme280).map(|s| s.available), Some(false));
    }

    #[test]
    fn rejects_duplicate_sensor() {
        let mut registry = SensorRegistry::new();
        registry.register(stub(SensorId::Dht22, true)).unwrap();

        assert!(registry.register(stub(SensorId::Dht22, true)).is_err());
        assert_eq!(registry.len(), 1);
    }
}
