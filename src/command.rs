//! Commands issued by the upstream application and the reference state they carry.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Flight behavior selected by a [`Command`].
/// After arbitration this is also the state of the copter's state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Motors spin at idle, waiting for commands.
    #[default]
    Idle,
    /// Climb above the takeoff origin to the configured height.
    Takeoff,
    /// Track a reference expressed in the inertial (ENU) frame.
    MoveInertial,
    /// Move relative to the vehicle, with the reference expressed in the body frame.
    MoveBody,
    /// Hold the position the vehicle was at when the mode was entered.
    Hold,
    /// Descend to the takeoff altitude then disarm. Once entered this mode is never left.
    Land,
    /// Leave offboard control and disarm immediately.
    Disarm,
    /// Reserved for a custom failsafe landing.
    FailsafeLand,
    /// Follow the configured trajectory until it completes, then hold.
    TrajectoryTracking,
}

/// How an axis group is tracked by the position controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tracking {
    #[default]
    Position,
    Velocity,
}

/// The target the position controller should track for one cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceState {
    /// Tracking of the horizontal (x, y) axes.
    pub xy: Tracking,

    /// Tracking of the vertical (z) axis.
    pub z: Tracking,

    /// Position target in meters.
    pub position: Vector3<f32>,

    /// Velocity target in meters/second.
    pub velocity: Vector3<f32>,

    /// Acceleration feed forward in meters/second^2.
    pub acceleration: Vector3<f32>,

    /// Yaw target in radians.
    pub yaw: f32,
}

impl ReferenceState {
    /// Track `position` on every axis with zero velocity and acceleration.
    pub fn position(position: Vector3<f32>, yaw: f32) -> Self {
        Self {
            position,
            yaw,
            ..Self::default()
        }
    }
}

/// A command from the upstream application.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub mode: Mode,

    /// Monotonically increasing identifier assigned by the issuer.
    pub id: u32,

    /// Reference interpreted according to `mode` (inertial or body frame).
    #[serde(default)]
    pub reference: ReferenceState,
}

impl Command {
    pub fn new(mode: Mode, id: u32) -> Self {
        Self {
            mode,
            id,
            reference: ReferenceState::default(),
        }
    }

    /// Builder method to set `reference` and return `self`
    pub fn with_reference(mut self, reference: ReferenceState) -> Self {
        self.reference = reference;
        self
    }
}

/// Create the latest-command slot.
///
/// The sender side is handed to the command issuer and overwrites the slot on every publish.
/// The control loop reads the receiver once per cycle,
/// so there is no queue and the last write wins.
/// The slot starts out holding an idle command with id 0.
pub fn slot() -> (watch::Sender<Command>, watch::Receiver<Command>) {
    watch::channel(Command::default())
}
