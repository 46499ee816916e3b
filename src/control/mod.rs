//! Position control laws.
//!
//! Every law turns the vehicle state and the reference for this cycle into a desired
//! acceleration in the inertial (ENU) frame, gravity compensation included.
//! The law is chosen once at startup with [`ControlLaw`] and then called through
//! [`PositionControl`] on every cycle that tracks a reference.

use crate::command::{ReferenceState, Tracking};
use crate::state::VehicleState;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub mod attitude;
pub use attitude::{AttitudeMapping, AttitudeReference, ThrustToAttitude};

mod cascade_pid;
pub use cascade_pid::CascadePid;

mod ne;
pub use ne::NonlinearEstimator;

mod passivity;
pub use passivity::Passivity;

mod pid;
pub use pid::{Pid, Pid3};

mod ude;
pub use ude::Ude;

/// A position control law.
pub trait PositionControl {
    /// Calculate the desired acceleration (in meters/second^2) to track `reference`.
    fn accel(&mut self, state: &VehicleState, reference: &ReferenceState, dt: f32) -> Vector3<f32>;

    /// Short name of the law for diagnostics.
    fn name(&self) -> &'static str;
}

impl<P: PositionControl + ?Sized> PositionControl for Box<P> {
    fn accel(&mut self, state: &VehicleState, reference: &ReferenceState, dt: f32) -> Vector3<f32> {
        (**self).accel(state, reference, dt)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Available position control laws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ControlLaw {
    #[default]
    CascadePid,
    Pid,
    Ude,
    Passivity,
    Ne,
}

impl ControlLaw {
    /// Build the selected control law.
    /// `origin` is the takeoff position, used to initialise estimator based laws.
    pub fn build(
        self,
        gains: &Gains,
        gravity: f32,
        origin: Vector3<f32>,
    ) -> Box<dyn PositionControl + Send> {
        match self {
            ControlLaw::CascadePid => Box::new(CascadePid::new(gains.clone(), gravity)),
            ControlLaw::Pid => Box::new(Pid::new(gains.clone(), gravity)),
            ControlLaw::Ude => Box::new(Ude::new(gains.clone(), gravity)),
            ControlLaw::Passivity => Box::new(Passivity::new(gains.clone(), gravity)),
            ControlLaw::Ne => Box::new(NonlinearEstimator::new(gains.clone(), gravity, origin)),
        }
    }
}

/// Gains shared by the position control laws.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gains {
    /// Proportional gain on position error.
    pub kp: Vector3<f32>,

    /// Proportional gain on velocity error.
    pub kv: Vector3<f32>,

    /// Integral gain.
    pub ki: Vector3<f32>,

    /// Derivative gain on velocity error (cascade inner loop).
    pub kd: Vector3<f32>,

    /// Limit of the integrator output in meters/second^2.
    pub integral_limit: Vector3<f32>,

    /// Velocity limit of the cascade outer loop in meters/second.
    pub max_velocity: Vector3<f32>,

    /// Limit of the commanded acceleration (before gravity compensation) in meters/second^2.
    pub max_acceleration: Vector3<f32>,

    /// Cutoff frequency of derivative filters in hz.
    pub derivative_cutoff_hz: f32,

    /// Time constant of the uncertainty and disturbance estimator in seconds.
    pub ude_time_constant: f32,

    /// Time constant of the nonlinear state estimator in seconds.
    pub ne_time_constant: f32,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            kp: Vector3::new(1.0, 1.0, 1.5),
            kv: Vector3::new(1.5, 1.5, 2.0),
            ki: Vector3::new(0.2, 0.2, 0.3),
            kd: Vector3::new(0.05, 0.05, 0.05),
            integral_limit: Vector3::new(1.0, 1.0, 1.0),
            max_velocity: Vector3::new(1.0, 1.0, 0.5),
            max_acceleration: Vector3::new(3.0, 3.0, 3.0),
            derivative_cutoff_hz: 20.,
            ude_time_constant: 1.0,
            ne_time_constant: 0.1,
        }
    }
}

/// Position and velocity error of `state` from `reference`.
/// The position error is zero on axis groups that only track velocity.
pub(crate) fn tracking_errors(
    state: &VehicleState,
    reference: &ReferenceState,
) -> (Vector3<f32>, Vector3<f32>) {
    let mut position_error = reference.position - state.position;
    if reference.xy == Tracking::Velocity {
        position_error.x = 0.;
        position_error.y = 0.;
    }
    if reference.z == Tracking::Velocity {
        position_error.z = 0.;
    }

    (position_error, reference.velocity - state.velocity)
}

/// Constrain each component of `v` to `[-limit, limit]`.
pub(crate) fn constrain(v: Vector3<f32>, limit: &Vector3<f32>) -> Vector3<f32> {
    v.zip_map(limit, |n, l| n.max(-l).min(l))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const G: f32 = 9.81;

    fn hovering_at(position: Vector3<f32>) -> VehicleState {
        VehicleState {
            position,
            ..VehicleState::default()
        }
    }

    #[test]
    fn velocity_tracking_masks_position_error() {
        let state = hovering_at(Vector3::new(1., 1., 1.));
        let reference = ReferenceState {
            xy: Tracking::Velocity,
            velocity: Vector3::new(0.5, 0., 0.),
            ..ReferenceState::default()
        };

        let (position_error, velocity_error) = tracking_errors(&state, &reference);
        assert_eq!(position_error, Vector3::new(0., 0., -1.));
        assert_eq!(velocity_error, Vector3::new(0.5, 0., 0.));
    }

    #[test]
    fn every_law_hovers_on_target() {
        let state = hovering_at(Vector3::new(0., 0., 1.));
        let reference = ReferenceState::position(Vector3::new(0., 0., 1.), 0.);

        for law in [
            ControlLaw::CascadePid,
            ControlLaw::Pid,
            ControlLaw::Ude,
            ControlLaw::Passivity,
            ControlLaw::Ne,
        ] {
            let mut control = law.build(&Gains::default(), G, Vector3::new(0., 0., 1.));
            let accel = control.accel(&state, &reference, 0.02);
            assert_relative_eq!(accel, Vector3::new(0., 0., G), epsilon = 1e-4);
        }
    }

    #[test]
    fn every_law_pushes_toward_the_target() {
        let state = hovering_at(Vector3::new(0., 0., 1.));
        let reference = ReferenceState::position(Vector3::new(1., -1., 2.), 0.);

        for law in [
            ControlLaw::CascadePid,
            ControlLaw::Pid,
            ControlLaw::Ude,
            ControlLaw::Passivity,
            ControlLaw::Ne,
        ] {
            let mut control = law.build(&Gains::default(), G, Vector3::new(0., 0., 1.));
            let accel = control.accel(&state, &reference, 0.02);
            assert!(accel.x > 0., "{}: {accel}", control.name());
            assert!(accel.y < 0., "{}: {accel}", control.name());
            assert!(accel.z > G, "{}: {accel}", control.name());
        }
    }
}
