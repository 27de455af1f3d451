use {
    crate::{
        camera::Camera,
        clock::Clock,
        reading::Reading,
        registry::SensorRegistry,
        reporter::Reporter,
    },
    anyhow::Result,
    log::{debug, error},
    std::{io::Write, time::Duration},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting out the interval between cycles
    Idle,
    /// Visiting the sensors
    Cycling,
}

/// One completed pass over every registered sensor
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Clock time at which the first read started
    pub started_at: Duration,
    pub readings: Vec<Reading>,
}

/// Drives the sample-and-report loop over a borrowed registry.
///
/// Everything runs on the caller's thread: reads block, and the interval is
/// measured from the end of one cycle to the start of the next.
pub struct Orchestrator<'a, C, W> {
    registry: &'a mut SensorRegistry,
    reporter: Reporter<W>,
    clock: C,
    camera: Camera,
    interval: Duration,
    state: State,
    cycles: u64,
}

impl<'a, C: Clock, W: Write> Orchestrator<'a, C, W> {
    pub fn new(
        registry: &'a mut SensorRegistry,
        reporter: Reporter<W>,
        clock: C,
        camera: Camera,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            reporter,
            clock,
            camera,
            interval,
            state: State::Idle,
            cycles: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Number of cycles completed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }

    /// Emits the one-time startup diagnostics
    pub fn announce(&mut self) -> Result<()> {
        self.reporter
            .startup(self.registry.statuses(), &self.camera)
    }

    /// Reads every sensor in report order and hands the batch to the reporter.
    ///
    /// The readings are returned even when writing the report fails.
    pub fn cycle(&mut self) -> (Cycle, Result<()>) {
        self.state = State::Cycling;
        let started_at = self.clock.now();

        let clock = &mut self.clock;
        let readings: Vec<Reading> = self
            .registry
            .sensors_mut()
            .flat_map(|sensor| sensor.measure(&mut *clock))
            .collect();
        let result = self.reporter.report(&readings, &mut self.camera);

        self.state = State::Idle;
        self.cycles += 1;
        debug!(
            "Cycle {} complete: {}/{} readings valid",
            self.cycles,
            readings.iter().filter(|r| r.valid).count(),
            readings.len()
        );

        (
            Cycle {
                started_at,
                readings,
            },
            result,
        )
    }

    /// Runs `count` cycles, sleeping the interval after each one
    pub fn run_cycles(&mut self, count: u64) -> Vec<Cycle> {
        (0..count).map(|_| self.step()).collect()
    }

    /// Cycles forever. Report failures are logged and the loop carries on.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    fn step(&mut self) -> Cycle {
        let (cycle, result) = self.cycle();
        if let Err(e) = result {
            error!("{:#}", e);
        }
        self.clock.sleep(self.interval);

        cycle
    }
}
