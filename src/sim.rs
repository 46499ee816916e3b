//! A point-mass vehicle standing in for the flight stack.
//!
//! The simulation advances by a fixed step every time the state is read,
//! so one [`StateSource::state`] call corresponds to one control cycle.

use crate::command::Command;
use crate::hal::{FlightServices, Setpoint, SetpointSink, StateSource, Telemetry};
use crate::state::{VehicleState, OFFBOARD};
use crate::Result;
use nalgebra::Vector3;
use tracing::trace;

pub struct SimVehicle {
    state: VehicleState,

    /// Integration step in seconds.
    step: f32,
    gravity: f32,
    hover_throttle: f32,

    /// Acceleration produced by the last setpoint, gravity compensation included.
    thrust: Vector3<f32>,
    yaw: f32,
    last_telemetry: Option<Telemetry>,
}

impl SimVehicle {
    /// Create an armed vehicle in offboard mode, resting at `position`.
    pub fn new(position: Vector3<f32>, step: f32) -> Self {
        Self {
            state: VehicleState {
                position,
                armed: true,
                mode: OFFBOARD.to_owned(),
                ..VehicleState::default()
            },
            step,
            gravity: 9.81,
            hover_throttle: 0.5,
            thrust: Vector3::zeros(),
            yaw: 0.,
            last_telemetry: None,
        }
    }

    /// Builder method to set the thrust model and return self.
    pub fn with_thrust(mut self, hover_throttle: f32, gravity: f32) -> Self {
        self.hover_throttle = hover_throttle;
        self.gravity = gravity;
        self
    }

    /// Move the vehicle without simulating the motion in between.
    pub fn teleport(&mut self, position: Vector3<f32>) {
        self.state.position = position;
        self.state.velocity = Vector3::zeros();
    }

    /// The current state without advancing the simulation.
    pub fn peek(&self) -> &VehicleState {
        &self.state
    }

    /// The command published with the last telemetry.
    pub fn last_command(&self) -> Option<&Command> {
        self.last_telemetry.as_ref().map(|telemetry| &telemetry.command)
    }

    fn integrate(&mut self) {
        let state = &mut self.state;
        if !state.armed {
            state.velocity = Vector3::zeros();
            return;
        }

        if state.mode != OFFBOARD {
            // The autopilot holds position outside of offboard control
            state.velocity = Vector3::zeros();
            return;
        }

        let accel = self.thrust - Vector3::z() * self.gravity;
        state.velocity += accel * self.step;
        state.position += state.velocity * self.step;
        state.attitude.z = self.yaw;

        if state.position.z < 0. {
            state.position.z = 0.;
            state.velocity.z = state.velocity.z.max(0.);
        }
    }
}

impl StateSource for SimVehicle {
    fn state(&mut self) -> VehicleState {
        self.integrate();
        trace!(position = ?self.state.position, velocity = ?self.state.velocity, "sim");
        self.state.clone()
    }
}

impl SetpointSink for SimVehicle {
    fn send_setpoint(&mut self, setpoint: &Setpoint) {
        match setpoint {
            Setpoint::Idle => self.thrust = Vector3::zeros(),
            Setpoint::Acceleration { accel, yaw } => {
                self.thrust = *accel;
                self.yaw = *yaw;
            }
            Setpoint::Attitude(attitude) => {
                let magnitude = attitude.throttle / self.hover_throttle * self.gravity;
                self.thrust = attitude.quaternion * (Vector3::z() * magnitude);
                self.yaw = attitude.attitude.z;
            }
        }
    }

    fn publish_telemetry(&mut self, telemetry: &Telemetry) {
        self.last_telemetry = Some(telemetry.clone());
    }
}

impl FlightServices for SimVehicle {
    fn set_mode(&mut self, mode: &str) -> Result<bool> {
        self.state.mode = mode.to_owned();
        Ok(true)
    }

    fn set_armed(&mut self, armed: bool) -> Result<bool> {
        self.state.armed = armed;
        if !armed {
            self.thrust = Vector3::zeros();
        }
        Ok(true)
    }
}
