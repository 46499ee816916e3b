//! Trajectory generators used by
//! [`Mode::TrajectoryTracking`](crate::command::Mode::TrajectoryTracking).
//!
//! A generator is a pure function of time: the copter owns the trajectory clock,
//! resets it when tracking starts and asks for the reference at the elapsed time every cycle.

use crate::command::ReferenceState;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub trait TrajectoryGenerator {
    /// The reference state `t` seconds after the start of the trajectory.
    fn reference_at(&self, t: f32) -> ReferenceState;

    /// Total duration of the trajectory in seconds.
    fn duration(&self) -> f32;
}

/// Fly a horizontal circle at constant speed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleTrajectory {
    /// Center of the circle in meters. The z component is the flight altitude.
    pub center: Vector3<f32>,

    /// Radius in meters.
    pub radius: f32,

    /// Speed along the circle in meters/second.
    pub linear_velocity: f32,

    /// Time to fly in seconds.
    pub time_total: f32,

    /// Fly clockwise (seen from above) instead of counter-clockwise.
    pub clockwise: bool,
}

impl Default for CircleTrajectory {
    fn default() -> Self {
        Self {
            center: Vector3::new(0., 0., 1.),
            radius: 1.,
            linear_velocity: 0.5,
            time_total: 50.,
            clockwise: false,
        }
    }
}

impl CircleTrajectory {
    /// Angular velocity around the center in radians/second (negative when clockwise).
    pub fn angular_velocity(&self) -> f32 {
        let omega = if self.radius > 0. {
            self.linear_velocity / self.radius
        } else {
            0.
        };

        if self.clockwise {
            -omega
        } else {
            omega
        }
    }
}

impl TrajectoryGenerator for CircleTrajectory {
    fn reference_at(&self, t: f32) -> ReferenceState {
        let omega = self.angular_velocity();
        let (sin, cos) = (omega * t).sin_cos();
        let r = self.radius;

        ReferenceState {
            position: self.center + Vector3::new(r * cos, r * sin, 0.),
            velocity: Vector3::new(-r * omega * sin, r * omega * cos, 0.),
            acceleration: Vector3::new(-r * omega * omega * cos, -r * omega * omega * sin, 0.),
            ..ReferenceState::default()
        }
    }

    fn duration(&self) -> f32 {
        self.time_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f32::consts::PI;

    #[test]
    fn starts_on_the_x_axis() {
        let circle = CircleTrajectory::default();
        let reference = circle.reference_at(0.);

        assert_relative_eq!(reference.position, Vector3::new(1., 0., 1.));
        assert_relative_eq!(reference.velocity, Vector3::new(0., 0.5, 0.));
        assert_relative_eq!(reference.acceleration, Vector3::new(-0.25, 0., 0.));
    }

    #[test]
    fn quarter_turn() {
        let circle = CircleTrajectory {
            center: Vector3::new(1., 2., 3.),
            radius: 2.,
            linear_velocity: PI,
            ..CircleTrajectory::default()
        };

        // omega = PI / 2, so one second is a quarter turn
        let reference = circle.reference_at(1.);
        assert_relative_eq!(reference.position, Vector3::new(1., 4., 3.), epsilon = 1e-5);
        assert_relative_eq!(reference.velocity, Vector3::new(-PI, 0., 0.), epsilon = 1e-5);

        let clockwise = CircleTrajectory {
            clockwise: true,
            ..circle
        };
        let reference = clockwise.reference_at(1.);
        assert_relative_eq!(reference.position, Vector3::new(1., 0., 3.), epsilon = 1e-5);
    }

    #[test]
    fn speed_is_constant() {
        let circle = CircleTrajectory::default();
        for t in [0., 1.3, 7.9, 42.] {
            assert_relative_eq!(circle.reference_at(t).velocity.norm(), 0.5, epsilon = 1e-5);
        }
    }
}
