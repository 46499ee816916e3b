//! The offboard position control loop.
//!
//! Every cycle the [`Copter`] reads the vehicle state, lets the [`Commander`] arbitrate the
//! mode and synthesize the reference, runs the position controller on that reference
//! and dispatches the result to the flight stack.

mod builder;
pub use builder::Builder;

pub mod commander;
pub use commander::{Commander, Cycle, Directive};

pub mod landing;
pub use landing::{DisarmRequest, LandingSequencer};

use crate::command::Command;
use crate::config::OutputMode;
use crate::control::{AttitudeMapping, AttitudeReference, PositionControl, ThrustToAttitude};
use crate::hal::{FlightServices, Setpoint, SetpointSink, StateSource, Telemetry};
use crate::scheduler::LoopTimer;
use crate::trajectory::{CircleTrajectory, TrajectoryGenerator};
use tracing::debug;

/// Offboard controller for a multi-copter connected through the link `L`.
pub struct Copter<L, T = CircleTrajectory> {
    pub commander: Commander<T>,
    pub controller: Box<dyn PositionControl + Send>,
    pub mapping: ThrustToAttitude,
    pub output: OutputMode,
    pub link: L,
    timer: LoopTimer,
    start_time: f32,

    /// Last attitude reference computed by the position controller.
    attitude: AttitudeReference,

    /// Status of the last arming response.
    disarm_ack: bool,
}

impl<L> Copter<L> {
    /// Start building a copter that flies the circle trajectory.
    /// Use [`Builder::default`] for other trajectory generators.
    pub fn builder() -> Builder<L, CircleTrajectory> {
        Builder::default()
    }
}

impl<L, T> Copter<L, T>
where
    L: StateSource + SetpointSink + FlightServices,
    T: TrajectoryGenerator,
{
    /// Run one control cycle at `now` seconds with the latest `command`.
    pub fn cycle(&mut self, now: f32, command: &Command) -> Cycle {
        let dt = self.timer.tick(now);

        let mut state = self.link.state();
        state.stamp = now;
        state.time_from_start = now - self.start_time;

        let cycle = self.commander.update(&state, command, dt);
        match &cycle.directive {
            Directive::Idle => self.link.send_setpoint(&Setpoint::Idle),
            Directive::Track(reference) => {
                let accel = self.controller.accel(&state, reference, dt);
                self.attitude = self.mapping.to_attitude(&accel, reference.yaw);

                debug!(
                    mode = ?cycle.mode,
                    law = self.controller.name(),
                    reference = ?reference.position,
                    position = ?state.position,
                    accel = ?accel,
                    throttle = self.attitude.throttle,
                    dt,
                    "tracking"
                );

                let setpoint = match self.output {
                    OutputMode::Acceleration => Setpoint::Acceleration {
                        accel,
                        yaw: reference.yaw,
                    },
                    OutputMode::Attitude => Setpoint::Attitude(self.attitude.clone()),
                };
                self.link.send_setpoint(&setpoint);
            }
            Directive::Disarm(request) => {
                self.disarm_ack = landing::execute(&mut self.link, *request, self.disarm_ack);
            }
            Directive::Standby => {}
        }

        self.link.publish_telemetry(&Telemetry {
            command: self.commander.outgoing().clone(),
            attitude: self.attitude.clone(),
        });

        cycle
    }
}

impl<L, T> Copter<L, T> {
    /// The last attitude reference computed by the position controller.
    pub fn attitude(&self) -> &AttitudeReference {
        &self.attitude
    }

    /// Whether the last disarm request was acknowledged.
    pub fn disarm_ack(&self) -> bool {
        self.disarm_ack
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }
}
