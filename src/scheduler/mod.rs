//! Fixed rate execution of the control loop.

mod timer;
pub use timer::{LoopTimer, MAX_DT, MIN_DT};

use crate::command::Command;
use crate::copter::Copter;
use crate::hal::{FlightServices, SetpointSink, StateSource};
use crate::trajectory::TrajectoryGenerator;
use crate::{Error, Result};
use nalgebra::Vector3;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Shortest loop period the scheduler runs at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Period of a loop running at `rate_hz`.
///
/// Fails unless the rate is positive and the period is at least [`MIN_PERIOD`].
pub fn loop_period(rate_hz: f32) -> Result<Duration> {
    let period = Duration::try_from_secs_f32(1. / rate_hz)
        .map_err(|_| Error::Config(format!("loop rate must be positive, got {rate_hz}")))?;

    if period < MIN_PERIOD {
        return Err(Error::Config(format!(
            "loop rate must give a period of at least {MIN_PERIOD:?}, got {rate_hz} hz"
        )));
    }
    Ok(period)
}

/// Runs the control loop at a fixed rate on the tokio runtime.
pub struct Scheduler {
    loop_rate_hz: f32,
    period: Duration,
    start: Instant,
}

impl Scheduler {
    pub fn new(loop_rate_hz: f32) -> Result<Self> {
        Ok(Self {
            loop_rate_hz,
            period: loop_period(loop_rate_hz)?,
            start: Instant::now(),
        })
    }

    pub fn loop_period(&self) -> Duration {
        self.period
    }

    /// Seconds since the scheduler was created.
    pub fn now(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    fn interval(&self) -> Interval {
        let mut interval = time::interval(self.period);

        // A late cycle is run once, the missed ones are not made up in a burst
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Read `cycles` state samples at the loop rate and return the last position.
    /// This lets the estimator settle before the takeoff origin is taken from it.
    pub async fn capture_origin<S: StateSource>(
        &self,
        source: &mut S,
        cycles: u32,
    ) -> Vector3<f32> {
        let mut interval = self.interval();
        let mut position = source.state().position;

        for _ in 1..cycles {
            interval.tick().await;
            position = source.state().position;
        }

        info!(origin = ?position, "takeoff origin captured");
        position
    }

    /// Run `copter` with the latest command in `commands` until `shutdown` completes.
    /// Returns the number of cycles run.
    pub async fn run<L, T, F>(
        &self,
        copter: &mut Copter<L, T>,
        commands: watch::Receiver<Command>,
        shutdown: F,
    ) -> u64
    where
        L: StateSource + SetpointSink + FlightServices,
        T: TrajectoryGenerator,
        F: Future<Output = ()>,
    {
        let mut interval = self.interval();
        tokio::pin!(shutdown);

        info!(rate = self.loop_rate_hz, "control loop started");

        let mut cycles = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    let command = commands.borrow().clone();
                    let cycle = copter.cycle(self.now(), &command);
                    debug!(mode = ?cycle.mode, id = command.id, "cycle");
                    cycles += 1;
                }
            }
        }

        info!(cycles, "control loop stopped");
        cycles
    }
}
