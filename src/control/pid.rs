use super::{constrain, tracking_errors, Gains, PositionControl};
use crate::command::ReferenceState;
use crate::filter::LowPassFilter;
use crate::state::VehicleState;
use nalgebra::Vector3;
use tracing::trace;

/// Three axis PID controller with a filtered derivative and a limited integrator.
#[derive(Clone, Debug)]
pub struct Pid3 {
    pub kp: Vector3<f32>,
    pub ki: Vector3<f32>,
    pub kd: Vector3<f32>,
    pub ki_max: Vector3<f32>,
    pub integrator: Vector3<f32>,
    error: Option<Vector3<f32>>,
    derivative: LowPassFilter,
}

impl Pid3 {
    pub fn new(
        kp: Vector3<f32>,
        ki: Vector3<f32>,
        kd: Vector3<f32>,
        ki_max: Vector3<f32>,
        derivative_cutoff_hz: f32,
    ) -> Self {
        Self {
            kp,
            ki,
            kd,
            ki_max,
            integrator: Vector3::zeros(),
            error: None,
            derivative: LowPassFilter::with_cutoff(derivative_cutoff_hz),
        }
    }

    /// Update the integral part of this PID.
    /// If the limit flag is set the integral is only allowed to shrink.
    pub fn update_integral(&mut self, error: Vector3<f32>, dt: f32, limit: bool) {
        for i in 0..3 {
            if self.ki[i] == 0. {
                self.integrator[i] = 0.;
                continue;
            }

            let shrinking = (self.integrator[i] >= 0. && error[i] < 0.)
                || (self.integrator[i] < 0. && error[i] >= 0.);
            if !limit || shrinking {
                self.integrator[i] += error[i] * self.ki[i] * dt;
            }
        }
        self.integrator = constrain(self.integrator, &self.ki_max);
    }

    /// Calculate the output for `error` sampled `dt` seconds after the last update.
    pub fn update(&mut self, error: Vector3<f32>, dt: f32, limit: bool) -> Vector3<f32> {
        let derivative = match self.error {
            Some(last) if dt > 0. => self.derivative.apply((error - last) / dt, dt),
            _ => {
                self.derivative.reset(Vector3::zeros());
                Vector3::zeros()
            }
        };
        self.error = Some(error);

        self.update_integral(error, dt, limit);

        self.kp.component_mul(&error) + self.integrator + self.kd.component_mul(&derivative)
    }
}

/// PID on position with velocity damping and acceleration feed forward.
pub struct Pid {
    gains: Gains,
    gravity: f32,
    integral: Vector3<f32>,
}

impl Pid {
    pub fn new(gains: Gains, gravity: f32) -> Self {
        Self {
            gains,
            gravity,
            integral: Vector3::zeros(),
        }
    }
}

impl PositionControl for Pid {
    fn accel(&mut self, state: &VehicleState, reference: &ReferenceState, dt: f32) -> Vector3<f32> {
        let (position_error, velocity_error) = tracking_errors(state, reference);

        self.integral = constrain(
            self.integral + self.gains.ki.component_mul(&position_error) * dt,
            &self.gains.integral_limit,
        );

        let accel = self.gains.kp.component_mul(&position_error)
            + self.gains.kv.component_mul(&velocity_error)
            + self.integral
            + reference.acceleration;
        trace!(?position_error, ?velocity_error, integral = ?self.integral, "pid");

        constrain(accel, &self.gains.max_acceleration) + Vector3::z() * self.gravity
    }

    fn name(&self) -> &'static str {
        "pid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn proportional_only() {
        let mut pid = Pid3::new(
            Vector3::repeat(2.),
            Vector3::zeros(),
            Vector3::zeros(),
            Vector3::repeat(1.),
            20.,
        );
        let out = pid.update(Vector3::new(1., -0.5, 0.), 0.02, false);
        assert_relative_eq!(out, Vector3::new(2., -1., 0.));
    }

    #[test]
    fn integrator_is_limited() {
        let mut pid = Pid3::new(
            Vector3::zeros(),
            Vector3::repeat(10.),
            Vector3::zeros(),
            Vector3::repeat(0.5),
            20.,
        );
        for _ in 0..100 {
            pid.update(Vector3::new(1., -1., 0.), 0.02, false);
        }
        assert_relative_eq!(pid.integrator, Vector3::new(0.5, -0.5, 0.));
    }

    #[test]
    fn limited_integrator_only_shrinks() {
        let mut pid = Pid3::new(
            Vector3::zeros(),
            Vector3::repeat(1.),
            Vector3::zeros(),
            Vector3::repeat(10.),
            20.,
        );
        pid.update(Vector3::new(1., 0., 0.), 0.1, false);
        let before = pid.integrator.x;

        pid.update(Vector3::new(1., 0., 0.), 0.1, true);
        assert_eq!(pid.integrator.x, before);

        pid.update(Vector3::new(-1., 0., 0.), 0.1, true);
        assert!(pid.integrator.x < before);
    }
}
