use super::{tracking_errors, Gains, PositionControl, Ude};
use crate::command::ReferenceState;
use crate::state::VehicleState;
use nalgebra::Vector3;
use tracing::trace;

/// UDE control on top of a nonlinear estimator (NE) of position and velocity.
///
/// The estimator only uses the measured position and the previously commanded
/// acceleration, which suits motion capture setups without a velocity estimate.
/// It starts at rest at the takeoff position.
pub struct NonlinearEstimator {
    ude: Ude,
    time_constant: f32,
    gravity: f32,
    position: Vector3<f32>,
    velocity: Vector3<f32>,
    last_accel: Vector3<f32>,
}

impl NonlinearEstimator {
    pub fn new(gains: Gains, gravity: f32, initial_position: Vector3<f32>) -> Self {
        Self {
            time_constant: gains.ne_time_constant.max(f32::EPSILON),
            ude: Ude::new(gains, gravity),
            gravity,
            position: initial_position,
            velocity: Vector3::zeros(),
            last_accel: Vector3::z() * gravity,
        }
    }

    /// Estimated position and velocity.
    pub fn estimate(&self) -> (Vector3<f32>, Vector3<f32>) {
        (self.position, self.velocity)
    }

    fn update_estimate(&mut self, measured: Vector3<f32>, dt: f32) {
        // Critically damped second order observer driven by the position residual
        let t = self.time_constant;
        let residual = measured - self.position;
        let motion = self.last_accel - Vector3::z() * self.gravity;

        self.position += (self.velocity + residual * (2. / t)) * dt;
        self.velocity += (motion + residual / (t * t)) * dt;
    }
}

impl PositionControl for NonlinearEstimator {
    fn accel(&mut self, state: &VehicleState, reference: &ReferenceState, dt: f32) -> Vector3<f32> {
        self.update_estimate(state.position, dt);

        let estimated = VehicleState {
            velocity: self.velocity,
            ..state.clone()
        };
        let (position_error, velocity_error) = tracking_errors(&estimated, reference);
        let (nominal, disturbance) =
            self.ude
                .terms(position_error, velocity_error, reference.acceleration, dt);
        trace!(position = ?self.position, velocity = ?self.velocity, "ne");

        self.last_accel = self.ude.output(nominal, disturbance);
        self.last_accel
    }

    fn name(&self) -> &'static str {
        "ne"
    }
}
