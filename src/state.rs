use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Autopilot mode name reported while the vehicle accepts offboard setpoints.
pub const OFFBOARD: &str = "OFFBOARD";

/// Autopilot mode requested when leaving offboard control.
pub const MANUAL: &str = "MANUAL";

/// State of the vehicle as reported by the estimator, refreshed once per cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Position in the inertial (ENU) frame in meters.
    pub position: Vector3<f32>,

    /// Velocity in the inertial (ENU) frame in meters/second.
    pub velocity: Vector3<f32>,

    /// Roll, pitch and yaw in radians.
    pub attitude: Vector3<f32>,

    pub armed: bool,

    /// Name of the autopilot's current flight mode.
    pub mode: String,

    /// Time of the cycle this state was used in (seconds).
    pub stamp: f32,

    /// Time since the control loop started (seconds).
    pub time_from_start: f32,
}

impl VehicleState {
    pub fn yaw(&self) -> f32 {
        self.attitude.z
    }

    pub fn is_offboard(&self) -> bool {
        self.mode == OFFBOARD
    }
}
