use crate::hal::FlightServices;
use crate::state::{VehicleState, MANUAL};
use tracing::{info, warn};

/// Requests needed to bring an armed vehicle out of offboard control and disarm it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisarmRequest {
    /// Switch the autopilot to manual mode.
    pub leave_offboard: bool,

    /// Disarm the motors.
    pub disarm: bool,
}

impl DisarmRequest {
    /// The requests still needed for the reported vehicle state.
    pub fn for_state(state: &VehicleState) -> Self {
        Self {
            leave_offboard: state.is_offboard(),
            disarm: state.armed,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.leave_offboard && !self.disarm
    }
}

/// Decides when a landing vehicle is low enough to disarm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingSequencer {
    /// Takeoff origin altitude in meters.
    pub ground_z: f32,

    /// Height above `ground_z` (in meters) below which the vehicle is disarmed.
    pub disarm_height: f32,
}

impl LandingSequencer {
    pub fn new(ground_z: f32, disarm_height: f32) -> Self {
        Self {
            ground_z,
            disarm_height,
        }
    }

    /// Returns the disarm request if the vehicle is within the disarm height of the ground,
    /// otherwise `None` and the descent should continue.
    pub fn check(&self, state: &VehicleState) -> Option<DisarmRequest> {
        if (state.position.z - self.ground_z).abs() < self.disarm_height {
            Some(DisarmRequest::for_state(state))
        } else {
            None
        }
    }
}

/// Issue the requests in `request` and return the status of the last arming response.
///
/// `last_ack` is the previous arming response status, kept when no arming request is sent.
/// Failures are logged and not retried here: the caller issues the request again next cycle.
pub fn execute<S: FlightServices>(
    services: &mut S,
    request: DisarmRequest,
    last_ack: bool,
) -> bool {
    if request.leave_offboard {
        match services.set_mode(MANUAL) {
            Ok(true) => {}
            Ok(false) => warn!("mode change to {} rejected", MANUAL),
            Err(error) => warn!(%error, "mode change to {} failed", MANUAL),
        }
    }

    let mut ack = last_ack;
    if request.disarm {
        ack = match services.set_armed(false) {
            Ok(success) => success,
            Err(error) => {
                warn!(%error, "disarm request failed");
                false
            }
        };
    }

    if ack && request.disarm {
        info!("disarmed");
    } else if request.disarm {
        warn!("disarm rejected");
    }

    ack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OFFBOARD;
    use crate::{Error, Result};
    use nalgebra::Vector3;

    #[derive(Default)]
    struct Services {
        modes: Vec<String>,
        arming: Vec<bool>,
        reject: bool,
        fail: bool,
    }

    impl FlightServices for Services {
        fn set_mode(&mut self, mode: &str) -> Result<bool> {
            self.modes.push(mode.to_owned());
            Ok(!self.reject)
        }

        fn set_armed(&mut self, armed: bool) -> Result<bool> {
            if self.fail {
                return Err(Error::Service {
                    service: "arming",
                    reason: "timeout".into(),
                });
            }
            self.arming.push(armed);
            Ok(!self.reject)
        }
    }

    fn flying(z: f32) -> VehicleState {
        VehicleState {
            position: Vector3::new(0., 0., z),
            armed: true,
            mode: OFFBOARD.to_owned(),
            ..VehicleState::default()
        }
    }

    #[test]
    fn disarms_within_height() {
        let sequencer = LandingSequencer::new(0.5, 0.15);

        assert_eq!(sequencer.check(&flying(1.)), None);
        assert_eq!(sequencer.check(&flying(0.66)), None);
        assert_eq!(
            sequencer.check(&flying(0.6)),
            Some(DisarmRequest {
                leave_offboard: true,
                disarm: true
            })
        );
        // Below the origin counts as well
        assert!(sequencer.check(&flying(0.4)).is_some());
    }

    #[test]
    fn request_follows_state() {
        let mut state = flying(0.);
        state.mode = MANUAL.to_owned();
        assert_eq!(
            DisarmRequest::for_state(&state),
            DisarmRequest {
                leave_offboard: false,
                disarm: true
            }
        );

        state.armed = false;
        assert!(DisarmRequest::for_state(&state).is_empty());
    }

    #[test]
    fn execute_sends_requests() {
        let mut services = Services::default();
        let ack = execute(
            &mut services,
            DisarmRequest {
                leave_offboard: true,
                disarm: true,
            },
            false,
        );

        assert!(ack);
        assert_eq!(services.modes, vec![MANUAL.to_owned()]);
        assert_eq!(services.arming, vec![false]);
    }

    #[test]
    fn execute_reports_failures() {
        let mut services = Services {
            reject: true,
            ..Services::default()
        };
        let request = DisarmRequest {
            leave_offboard: false,
            disarm: true,
        };
        assert!(!execute(&mut services, request, true));

        let mut services = Services {
            fail: true,
            ..Services::default()
        };
        assert!(!execute(&mut services, request, true));

        // Without an arming request the last status is kept
        assert!(execute(&mut services, DisarmRequest::default(), true));
    }
}
