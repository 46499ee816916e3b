use super::{constrain, tracking_errors, Gains, Pid3, PositionControl};
use crate::command::ReferenceState;
use crate::state::VehicleState;
use nalgebra::Vector3;
use tracing::trace;

/// Cascade controller: a proportional position loop commands a velocity
/// which is tracked by an inner PID velocity loop.
pub struct CascadePid {
    kp: Vector3<f32>,
    max_velocity: Vector3<f32>,
    max_acceleration: Vector3<f32>,
    velocity_pid: Pid3,
    gravity: f32,
    limited: bool,
}

impl CascadePid {
    pub fn new(gains: Gains, gravity: f32) -> Self {
        Self {
            kp: gains.kp,
            max_velocity: gains.max_velocity,
            max_acceleration: gains.max_acceleration,
            velocity_pid: Pid3::new(
                gains.kv,
                gains.ki,
                gains.kd,
                gains.integral_limit,
                gains.derivative_cutoff_hz,
            ),
            gravity,
            limited: false,
        }
    }
}

impl PositionControl for CascadePid {
    fn accel(&mut self, state: &VehicleState, reference: &ReferenceState, dt: f32) -> Vector3<f32> {
        let (position_error, _) = tracking_errors(state, reference);

        // Outer loop, velocity feed forward is added on every axis
        let velocity_cmd = constrain(
            self.kp.component_mul(&position_error) + reference.velocity,
            &self.max_velocity,
        );

        // Inner loop
        let velocity_error = velocity_cmd - state.velocity;
        let accel =
            self.velocity_pid.update(velocity_error, dt, self.limited) + reference.acceleration;

        let constrained = constrain(accel, &self.max_acceleration);
        self.limited = constrained != accel;
        trace!(?velocity_cmd, ?velocity_error, limited = self.limited, "cascade pid");

        constrained + Vector3::z() * self.gravity
    }

    fn name(&self) -> &'static str {
        "cascade_pid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Tracking;

    #[test]
    fn velocity_command_is_limited() {
        let gains = Gains {
            ki: Vector3::zeros(),
            kd: Vector3::zeros(),
            ..Gains::default()
        };
        let mut control = CascadePid::new(gains.clone(), 9.81);

        // A far away target saturates the outer loop at max velocity
        let reference = ReferenceState::position(Vector3::new(100., 0., 0.), 0.);
        let accel = control.accel(&VehicleState::default(), &reference, 0.02);
        assert!((accel.x - gains.kv.x * gains.max_velocity.x).abs() < 1e-5);
    }

    #[test]
    fn tracks_velocity_reference() {
        let mut control = CascadePid::new(Gains::default(), 9.81);
        let reference = ReferenceState {
            xy: Tracking::Velocity,
            z: Tracking::Velocity,
            velocity: Vector3::new(0.5, 0., 0.),
            ..ReferenceState::default()
        };

        let state = VehicleState {
            position: Vector3::new(3., 3., 3.),
            velocity: Vector3::new(0.5, 0., 0.),
            ..VehicleState::default()
        };
        let accel = control.accel(&state, &reference, 0.02);
        assert!(accel.x.abs() < 1e-5 && accel.y.abs() < 1e-5);
    }
}
