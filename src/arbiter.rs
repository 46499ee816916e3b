use crate::command::Mode;

/// The reason an incoming command was overridden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Override {
    /// The previous cycle was already landing.
    LandLatched,
    /// The vehicle left the geofence.
    GeofenceBreach,
}

/// Result of arbitrating one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arbitration {
    /// The mode acted upon this cycle.
    pub mode: Mode,

    /// Set if `mode` differs from what was requested because of an override.
    pub reason: Option<Override>,
}

/// Decide the effective mode for a cycle.
///
/// Land wins if the previous cycle was landing or the geofence is violated,
/// otherwise the requested mode is used.
/// Land is never left again because every later cycle sees Land as the previous mode.
pub fn arbitrate(previous: Mode, requested: Mode, fence_violated: bool) -> Arbitration {
    let reason = if previous == Mode::Land {
        Some(Override::LandLatched)
    } else if fence_violated {
        Some(Override::GeofenceBreach)
    } else {
        None
    };

    match reason {
        Some(reason) => Arbitration {
            mode: Mode::Land,
            reason: (requested != Mode::Land).then_some(reason),
        },
        None => Arbitration {
            mode: requested,
            reason: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_without_override() {
        let arbitration = arbitrate(Mode::Idle, Mode::Takeoff, false);
        assert_eq!(arbitration.mode, Mode::Takeoff);
        assert_eq!(arbitration.reason, None);
    }

    #[test]
    fn geofence_forces_land() {
        let arbitration = arbitrate(Mode::Hold, Mode::MoveInertial, true);
        assert_eq!(arbitration.mode, Mode::Land);
        assert_eq!(arbitration.reason, Some(Override::GeofenceBreach));
    }

    #[test]
    fn land_latches_over_every_mode() {
        for requested in [
            Mode::Idle,
            Mode::Takeoff,
            Mode::MoveInertial,
            Mode::MoveBody,
            Mode::Hold,
            Mode::Disarm,
            Mode::FailsafeLand,
            Mode::TrajectoryTracking,
        ] {
            let arbitration = arbitrate(Mode::Land, requested, false);
            assert_eq!(arbitration.mode, Mode::Land);
            assert_eq!(arbitration.reason, Some(Override::LandLatched));
        }
    }

    #[test]
    fn requested_land_is_not_an_override() {
        let arbitration = arbitrate(Mode::Land, Mode::Land, true);
        assert_eq!(arbitration.mode, Mode::Land);
        assert_eq!(arbitration.reason, None);
    }
}
