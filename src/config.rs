//! Runtime configuration loaded from a JSON file.
//!
//! Every field has a default, so an empty object `{}` is a valid configuration.

use crate::command::{Mode, ReferenceState};
use crate::control::{ControlLaw, Gains, ThrustToAttitude};
use crate::geofence::{AxisRange, GeoFence};
use crate::scheduler;
use crate::trajectory::CircleTrajectory;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Kind of setpoint sent to the flight stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Attitude and throttle from the attitude mapping.
    #[default]
    Attitude,

    /// The raw acceleration from the position controller.
    Acceleration,
}

/// Thrust model used by the attitude mapping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrustConfig {
    /// Normalized throttle that holds the vehicle in a hover.
    pub hover_throttle: f32,

    /// Gravitational acceleration in meters/second^2.
    pub gravity: f32,
}

impl Default for ThrustConfig {
    fn default() -> Self {
        let mapping = ThrustToAttitude::default();
        Self {
            hover_throttle: mapping.hover_throttle,
            gravity: mapping.gravity,
        }
    }
}

impl From<ThrustConfig> for ThrustToAttitude {
    fn from(config: ThrustConfig) -> Self {
        Self {
            hover_throttle: config.hover_throttle,
            gravity: config.gravity,
        }
    }
}

/// One step of a scripted mission, published `at` seconds after the loop starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionStep {
    pub at: f32,
    pub mode: Mode,
    #[serde(default)]
    pub reference: ReferenceState,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Takeoff altitude above the origin in meters.
    pub takeoff_height: f32,

    /// Height above the origin (in meters) below which a landing vehicle is disarmed.
    pub disarm_height: f32,

    pub geofence: GeoFence,
    pub output: OutputMode,

    /// Control loop rate in hz.
    pub loop_rate_hz: f32,

    /// Number of state samples read before the takeoff origin is captured.
    pub startup_cycles: u32,

    pub control_law: ControlLaw,
    pub gains: Gains,
    pub thrust: ThrustConfig,
    pub trajectory: CircleTrajectory,
    pub mission: Vec<MissionStep>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            takeoff_height: 1.0,
            disarm_height: 0.15,
            geofence: GeoFence::default(),
            output: OutputMode::default(),
            loop_rate_hz: 50.,
            startup_cycles: 50,
            control_law: ControlLaw::default(),
            gains: Gains::default(),
            thrust: ThrustConfig::default(),
            trajectory: CircleTrajectory::default(),
            mission: Vec::new(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_json(&contents)?;
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        scheduler::loop_period(self.loop_rate_hz)?;

        if self.disarm_height <= 0. {
            return Err(Error::Config(format!(
                "disarm height must be positive, got {}",
                self.disarm_height
            )));
        }

        let fence = &self.geofence;
        for (axis, range) in [("x", &fence.x), ("y", &fence.y), ("z", &fence.z)] {
            check_range(axis, range)?;
        }

        for step in &self.mission {
            if !step.at.is_finite() || step.at < 0. {
                return Err(Error::Config(format!(
                    "mission step times must be finite and not negative, got {}",
                    step.at
                )));
            }
        }

        Ok(())
    }

    /// Period of the control loop in seconds.
    pub fn loop_period(&self) -> f32 {
        1. / self.loop_rate_hz
    }
}

fn check_range(axis: &str, range: &AxisRange) -> Result<()> {
    if range.min > range.max {
        return Err(Error::Config(format!(
            "geofence {axis} range is inverted: [{}, {}]",
            range.min, range.max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.takeoff_height, 1.);
        assert_eq!(config.disarm_height, 0.15);
        assert_eq!(config.geofence.z, AxisRange::new(-100., 100.));
        assert_eq!(config.output, OutputMode::Attitude);
        assert_eq!(config.loop_period(), 0.02);
    }

    #[test]
    fn partial_config() {
        let config = Config::from_json(
            r#"{
                "takeoff_height": 2.5,
                "output": "acceleration",
                "control_law": "ude",
                "geofence": { "z": { "min": -1.0, "max": 3.0 } },
                "mission": [
                    { "at": 0.0, "mode": "takeoff" },
                    { "at": 5.0, "mode": "move_inertial", "reference": { "position": [1.0, 0.0, 1.0] } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.takeoff_height, 2.5);
        assert_eq!(config.output, OutputMode::Acceleration);
        assert_eq!(config.control_law, ControlLaw::Ude);
        assert_eq!(config.geofence.x, AxisRange::default());
        assert_eq!(config.geofence.z, AxisRange::new(-1., 3.));
        assert_eq!(config.mission.len(), 2);
        assert_eq!(config.mission[1].mode, Mode::MoveInertial);
        assert_eq!(config.mission[1].reference.position, Vector3::new(1., 0., 1.));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            Config::from_json(r#"{ "loop_rate_hz": 0.0 }"#),
            Err(Error::Config(_))
        ));
        // Too large for f32, parsed as infinity
        assert!(matches!(
            Config::from_json(r#"{ "loop_rate_hz": 1e39 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "loop_rate_hz": 2000.0 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "mission": [{ "at": -1.0, "mode": "hold" }] }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "disarm_height": -0.1 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "geofence": { "y": { "min": 5.0, "max": -5.0 } } }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(Config::from_json("{ takeoff"), Err(Error::Parse(_))));
    }

    #[test]
    fn missing_file() {
        let error = Config::load("/nonexistent/offboard.json").unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
        assert!(error.to_string().contains("/nonexistent/offboard.json"));
    }
}
