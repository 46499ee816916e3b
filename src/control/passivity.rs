use super::{tracking_errors, Gains, PositionControl, Ude};
use crate::command::{ReferenceState, Tracking};
use crate::filter::LowPassFilter;
use crate::state::VehicleState;
use nalgebra::Vector3;
use tracing::trace;

/// Passivity based UDE control.
///
/// Damping comes from the filtered rate of the position error instead of the
/// measured velocity, so a noisy velocity estimate does not enter the loop.
/// Axis groups that track velocity still use the velocity error.
pub struct Passivity {
    ude: Ude,
    error_rate: LowPassFilter,
    last_error: Option<Vector3<f32>>,
}

impl Passivity {
    pub fn new(gains: Gains, gravity: f32) -> Self {
        Self {
            error_rate: LowPassFilter::with_cutoff(gains.derivative_cutoff_hz),
            ude: Ude::new(gains, gravity),
            last_error: None,
        }
    }
}

impl PositionControl for Passivity {
    fn accel(&mut self, state: &VehicleState, reference: &ReferenceState, dt: f32) -> Vector3<f32> {
        let (position_error, velocity_error) = tracking_errors(state, reference);

        let mut damping = match self.last_error {
            Some(last) if dt > 0. => self.error_rate.apply((position_error - last) / dt, dt),
            _ => {
                self.error_rate.reset(Vector3::zeros());
                Vector3::zeros()
            }
        };
        self.last_error = Some(position_error);

        if reference.xy == Tracking::Velocity {
            damping.x = velocity_error.x;
            damping.y = velocity_error.y;
        }
        if reference.z == Tracking::Velocity {
            damping.z = velocity_error.z;
        }

        let (nominal, disturbance) =
            self.ude
                .terms(position_error, damping, reference.acceleration, dt);
        trace!(?damping, ?nominal, ?disturbance, "passivity");

        self.ude.output(nominal, disturbance)
    }

    fn name(&self) -> &'static str {
        "passivity"
    }
}
