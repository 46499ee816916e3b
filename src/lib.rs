//! # offboard-flight
//! Offboard position control for multi-copters.
//!
//! # Control loop
//! [`Copter`] runs one control cycle: it arbitrates the flight [`Mode`](command::Mode),
//! synthesizes the reference state for that mode (see [`Commander`](copter::Commander)),
//! runs the position controller and dispatches the setpoint to the flight stack.
//!
//! [`scheduler`] runs the cycle at a fixed rate
//! and feeds it the latest [`Command`](command::Command).
//!
//! # Components
//! [`control`] contains the position control laws and the attitude mapping.
//!
//! [`trajectory`] contains trajectory generators.
//!
//! [`hal`] is the boundary to the flight stack (see [`sim`] for a simulated vehicle).

pub mod arbiter;

pub mod command;

pub mod config;
pub use config::Config;

pub mod control;

pub mod copter;
pub use copter::Copter;

mod error;
pub use error::{Error, Result};

pub mod filter;

pub mod frame;

pub mod geofence;

pub mod hal;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod sim;

pub mod state;

pub mod trajectory;
