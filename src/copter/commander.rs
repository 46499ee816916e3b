use super::landing::{DisarmRequest, LandingSequencer};
use crate::arbiter::{arbitrate, Override};
use crate::command::{Command, Mode, ReferenceState, Tracking};
use crate::frame::body_to_inertial;
use crate::geofence::GeoFence;
use crate::state::VehicleState;
use crate::trajectory::TrajectoryGenerator;
use nalgebra::Vector3;
use tracing::{info, warn};

/// What the copter should do with the outcome of a cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    /// Send the idle setpoint.
    Idle,

    /// Run the position controller on this reference and dispatch the result.
    Track(ReferenceState),

    /// Leave offboard control and disarm, without running the position controller.
    Disarm(DisarmRequest),

    /// Nothing to dispatch.
    Standby,
}

/// Outcome of one cycle of the [`Commander`].
#[derive(Clone, Debug, PartialEq)]
pub struct Cycle {
    /// The effective mode after arbitration.
    pub mode: Mode,
    pub directive: Directive,
}

/// Mode arbitration and reference synthesis.
///
/// Owns all state that persists across cycles: the reference sent last cycle,
/// the previous mode and command id, the takeoff origin and the trajectory clock.
pub struct Commander<T> {
    origin: Vector3<f32>,
    takeoff_height: f32,
    geofence: GeoFence,
    landing: LandingSequencer,
    trajectory: T,

    /// Command and reference sent on the last cycle that produced one.
    outgoing: Command,
    last_mode: Mode,
    last_id: u32,

    /// Seconds since trajectory tracking was entered.
    trajectory_time: f32,

    /// Id of the trajectory command that completed. Hold is requested instead
    /// until a command with a greater id arrives.
    hold_after: Option<u32>,
}

impl<T: TrajectoryGenerator> Commander<T> {
    /// Create a new commander for a vehicle that took off from `origin`.
    pub fn new(
        origin: Vector3<f32>,
        takeoff_height: f32,
        disarm_height: f32,
        geofence: GeoFence,
        trajectory: T,
    ) -> Self {
        Self {
            origin,
            takeoff_height,
            geofence,
            landing: LandingSequencer::new(origin.z, disarm_height),
            trajectory,
            outgoing: Command::default(),
            last_mode: Mode::Idle,
            last_id: 0,
            trajectory_time: 0.,
            hold_after: None,
        }
    }

    pub fn origin(&self) -> Vector3<f32> {
        self.origin
    }

    /// The effective mode of the last cycle.
    pub fn mode(&self) -> Mode {
        self.last_mode
    }

    /// The arbitrated command and the reference currently tracked.
    pub fn outgoing(&self) -> &Command {
        &self.outgoing
    }

    pub fn trajectory_time(&self) -> f32 {
        self.trajectory_time
    }

    pub fn trajectory(&self) -> &T {
        &self.trajectory
    }

    /// Run one cycle with the latest vehicle state and command.
    pub fn update(&mut self, state: &VehicleState, command: &Command, dt: f32) -> Cycle {
        let requested = self.requested_mode(command);
        let arbitration = arbitrate(
            self.last_mode,
            requested,
            self.geofence.violated(&state.position),
        );
        let mode = arbitration.mode;

        if mode != self.last_mode {
            match arbitration.reason {
                Some(Override::GeofenceBreach) => warn!(
                    from = ?self.last_mode,
                    requested = ?requested,
                    position = ?state.position,
                    "geofence breached, landing"
                ),
                _ => info!(from = ?self.last_mode, to = ?mode, id = command.id, "mode changed"),
            }
        }

        let directive = match mode {
            Mode::Idle => Directive::Idle,
            Mode::Takeoff => self.takeoff(state, command),
            Mode::MoveInertial => self.move_inertial(command),
            Mode::MoveBody => self.move_body(state, command),
            Mode::Hold => self.hold(state, command),
            Mode::Land => self.land(state, command),
            Mode::Disarm => self.disarm(state, command),
            Mode::FailsafeLand => Directive::Standby,
            Mode::TrajectoryTracking => self.track_trajectory(command, dt),
        };

        self.last_mode = mode;
        self.last_id = command.id;

        Cycle { mode, directive }
    }

    fn requested_mode(&mut self, command: &Command) -> Mode {
        match self.hold_after {
            Some(id) if command.id <= id => Mode::Hold,
            Some(_) => {
                self.hold_after = None;
                command.mode
            }
            None => command.mode,
        }
    }

    fn set_outgoing(&mut self, mode: Mode, command: &Command) {
        self.outgoing.mode = mode;
        self.outgoing.id = command.id;
    }

    fn track(&self) -> Directive {
        Directive::Track(self.outgoing.reference.clone())
    }

    fn takeoff(&mut self, state: &VehicleState, command: &Command) -> Directive {
        self.set_outgoing(Mode::Takeoff, command);

        // Yaw follows the vehicle, it is not latched
        self.outgoing.reference = ReferenceState::position(
            self.origin + Vector3::z() * self.takeoff_height,
            state.yaw(),
        );
        self.track()
    }

    fn move_inertial(&mut self, command: &Command) -> Directive {
        self.outgoing = command.clone();
        self.outgoing.mode = Mode::MoveInertial;
        self.track()
    }

    fn move_body(&mut self, state: &VehicleState, command: &Command) -> Directive {
        self.set_outgoing(Mode::MoveBody, command);

        // Only a new command is transformed, the vehicle keeps tracking the last one otherwise
        if command.id > self.last_id {
            self.outgoing.reference = body_reference(state, &command.reference);
        }
        self.track()
    }

    fn hold(&mut self, state: &VehicleState, command: &Command) -> Directive {
        self.set_outgoing(Mode::Hold, command);

        if self.last_mode != Mode::Hold {
            self.outgoing.reference = ReferenceState::position(state.position, state.yaw());
        }
        self.track()
    }

    fn land(&mut self, state: &VehicleState, command: &Command) -> Directive {
        self.set_outgoing(Mode::Land, command);

        if self.last_mode != Mode::Land {
            let target = Vector3::new(state.position.x, state.position.y, self.origin.z);
            self.outgoing.reference = ReferenceState::position(target, state.yaw());
        }

        match self.landing.check(state) {
            Some(request) => Directive::Disarm(request),
            None => self.track(),
        }
    }

    fn disarm(&mut self, state: &VehicleState, command: &Command) -> Directive {
        self.set_outgoing(Mode::Disarm, command);
        Directive::Disarm(DisarmRequest::for_state(state))
    }

    fn track_trajectory(&mut self, command: &Command, dt: f32) -> Directive {
        self.set_outgoing(Mode::TrajectoryTracking, command);

        if self.last_mode != Mode::TrajectoryTracking {
            self.trajectory_time = 0.;
        }
        self.trajectory_time += dt;
        self.outgoing.reference = self.trajectory.reference_at(self.trajectory_time);

        if self.trajectory_time >= self.trajectory.duration() {
            info!(time = self.trajectory_time, "trajectory complete, holding");
            self.hold_after = Some(command.id);
        }
        self.track()
    }
}

/// Transform a body frame reference into an inertial reference relative to the vehicle.
fn body_reference(state: &VehicleState, body: &ReferenceState) -> ReferenceState {
    let yaw = state.yaw();
    let mut reference = ReferenceState {
        xy: body.xy,
        z: body.z,
        yaw: yaw + body.yaw,
        ..ReferenceState::default()
    };

    match body.xy {
        Tracking::Velocity => {
            let velocity = body_to_inertial(yaw, body.velocity.xy());
            reference.velocity.x = velocity.x;
            reference.velocity.y = velocity.y;
        }
        Tracking::Position => {
            let delta = body_to_inertial(yaw, body.position.xy());
            reference.position.x = state.position.x + delta.x;
            reference.position.y = state.position.y + delta.y;
        }
    }

    match body.z {
        Tracking::Velocity => reference.velocity.z = body.velocity.z,
        Tracking::Position => reference.position.z = state.position.z + body.position.z,
    }

    let accel = body_to_inertial(yaw, body.acceleration.xy());
    reference.acceleration = Vector3::new(accel.x, accel.y, body.acceleration.z);

    reference
}
