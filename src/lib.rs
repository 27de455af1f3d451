use {
    crate::{
        camera::Camera,
        clock::{Clock, SystemClock},
        orchestrator::Orchestrator,
        registry::SensorRegistry,
        reporter::Reporter,
        sensors::{Bme280, Dht22, Ds18b20},
    },
    anyhow::Result,
    log::info,
    std::{io, time::Duration},
};

pub mod bus;
pub mod camera;
pub mod clock;
pub mod orchestrator;
pub mod reading;
pub mod registry;
pub mod reporter;
pub mod sensors;

const I2C_DEV: &str = "/dev/i2c-1";
/// BME280 with SDO tied to ground
pub const BME280_ADDRESS: u8 = 0x76;
/// GPIO carrying the DHT22 data line
pub const DHT22_PIN: u64 = 4;
/// GPIO carrying the DS18B20 1-Wire bus
pub const ONE_WIRE_PIN: u64 = 5;

/// Settling time before the sensors are brought up
pub const STARTUP_DELAY: Duration = Duration::from_secs(1);
pub const INTERVAL: Duration = Duration::from_secs(5);

/// Brings up every sensor. Failures leave the sensor registered but unavailable.
pub fn init_sensors() -> Result<SensorRegistry> {
    let mut registry = SensorRegistry::new();

    registry.register(Box::new(Bme280::open(I2C_DEV, BME280_ADDRESS)))?;
    registry.register(Box::new(Dht22::open(DHT22_PIN)))?;
    registry.register(Box::new(Ds18b20::open(ONE_WIRE_PIN)))?;

    Ok(registry)
}

/// Runs the node, reporting on stdout until the process is killed
pub fn node() -> Result<()> {
    pretty_env_logger::init();
    color_backtrace::install();

    let mut clock = SystemClock::new();
    clock.sleep(STARTUP_DELAY);

    let mut registry = init_sensors()?;
    let mut orchestrator = Orchestrator::new(
        &mut registry,
        Reporter::new(io::stdout()),
        clock,
        Camera::default(),
        INTERVAL,
    );
    orchestrator.announce()?;

    info!("Initialization complete");

    orchestrator.run()
}
