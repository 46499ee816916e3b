//! Boundary between the copter and the flight stack.
//!
//! A flight stack link provides the vehicle state, accepts setpoints and telemetry,
//! and serves mode change and arming requests.

use crate::command::Command;
use crate::control::AttitudeReference;
use crate::state::VehicleState;
use crate::Result;
use nalgebra::Vector3;

/// Setpoint sent to the flight stack every cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum Setpoint {
    /// Spin the motors at idle without taking off.
    Idle,

    /// Desired acceleration (meters/second^2) and yaw (radians).
    Acceleration { accel: Vector3<f32>, yaw: f32 },

    /// Desired attitude and throttle.
    Attitude(AttitudeReference),
}

/// Monitoring output published every cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Telemetry {
    /// The arbitrated command including the reference currently tracked.
    pub command: Command,

    /// The last attitude reference computed by the position controller.
    pub attitude: AttitudeReference,
}

/// Source of the estimated vehicle state.
pub trait StateSource {
    /// The latest vehicle state.
    fn state(&mut self) -> VehicleState;
}

/// Outbound setpoints and telemetry.
pub trait SetpointSink {
    fn send_setpoint(&mut self, setpoint: &Setpoint);

    fn publish_telemetry(&mut self, telemetry: &Telemetry);
}

/// Request/response services of the flight stack.
///
/// Both calls return the success indicator of the response,
/// or an error if the request could not be delivered.
pub trait FlightServices {
    /// Request the autopilot to switch to the named mode.
    fn set_mode(&mut self, mode: &str) -> Result<bool>;

    /// Request the vehicle to arm or disarm.
    fn set_armed(&mut self, armed: bool) -> Result<bool>;
}
