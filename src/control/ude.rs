use super::{constrain, tracking_errors, Gains, PositionControl};
use crate::command::ReferenceState;
use crate::state::VehicleState;
use nalgebra::Vector3;
use tracing::trace;

/// Uncertainty and disturbance estimator (UDE) based position control.
///
/// A nominal PD law with acceleration feed forward is augmented by an estimate of the
/// lumped disturbance, filtered with the UDE time constant.
pub struct Ude {
    gains: Gains,
    gravity: f32,
    integral: Vector3<f32>,
}

impl Ude {
    pub fn new(gains: Gains, gravity: f32) -> Self {
        Self {
            gains,
            gravity,
            integral: Vector3::zeros(),
        }
    }

    /// Nominal and disturbance terms for the given errors.
    pub(crate) fn terms(
        &mut self,
        position_error: Vector3<f32>,
        velocity_error: Vector3<f32>,
        acceleration_ff: Vector3<f32>,
        dt: f32,
    ) -> (Vector3<f32>, Vector3<f32>) {
        let nominal = acceleration_ff
            + self.gains.kp.component_mul(&position_error)
            + self.gains.kv.component_mul(&velocity_error);

        self.integral += position_error * dt;

        let t = self.gains.ude_time_constant.max(f32::EPSILON);
        let disturbance = -(self.gains.kp.component_mul(&self.integral)
            + self.gains.kv.component_mul(&position_error)
            + velocity_error)
            / t;
        let disturbance = constrain(disturbance, &self.gains.max_acceleration);

        (nominal, disturbance)
    }

    pub(crate) fn output(&self, nominal: Vector3<f32>, disturbance: Vector3<f32>) -> Vector3<f32> {
        constrain(nominal - disturbance, &self.gains.max_acceleration) + Vector3::z() * self.gravity
    }
}

impl PositionControl for Ude {
    fn accel(&mut self, state: &VehicleState, reference: &ReferenceState, dt: f32) -> Vector3<f32> {
        let (position_error, velocity_error) = tracking_errors(state, reference);
        let (nominal, disturbance) =
            self.terms(position_error, velocity_error, reference.acceleration, dt);
        trace!(?nominal, ?disturbance, "ude");

        self.output(nominal, disturbance)
    }

    fn name(&self) -> &'static str {
        "ude"
    }
}
