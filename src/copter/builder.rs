use super::{Commander, Copter};
use crate::config::{Config, OutputMode};
use crate::control::{ControlLaw, Gains, PositionControl, ThrustToAttitude};
use crate::geofence::GeoFence;
use crate::scheduler::LoopTimer;
use crate::trajectory::TrajectoryGenerator;
use crate::{Error, Result};
use nalgebra::Vector3;

pub struct Builder<L, T> {
    link: Option<L>,
    controller: Option<Box<dyn PositionControl + Send>>,
    control_law: ControlLaw,
    gains: Gains,
    mapping: ThrustToAttitude,
    output: OutputMode,
    trajectory: Option<T>,
    origin: Option<Vector3<f32>>,
    start_time: f32,
    takeoff_height: f32,
    disarm_height: f32,
    geofence: GeoFence,
}

impl<L, T> Default for Builder<L, T> {
    fn default() -> Self {
        let config = Config::default();
        Self {
            link: None,
            controller: None,
            control_law: config.control_law,
            gains: config.gains,
            mapping: config.thrust.into(),
            output: config.output,
            trajectory: None,
            origin: None,
            start_time: 0.,
            takeoff_height: config.takeoff_height,
            disarm_height: config.disarm_height,
            geofence: config.geofence,
        }
    }
}

impl<L, T> Builder<L, T>
where
    T: TrajectoryGenerator + Default,
{
    /// Builder method to take the flight parameters and control law from `config`.
    /// The trajectory is set separately with [`Builder::trajectory`].
    pub fn config(mut self, config: &Config) -> Self {
        self.control_law = config.control_law;
        self.gains = config.gains.clone();
        self.mapping = config.thrust.into();
        self.output = config.output;
        self.takeoff_height = config.takeoff_height;
        self.disarm_height = config.disarm_height;
        self.geofence = config.geofence;
        self
    }

    /// Builder method to set the link to the flight stack and return self.
    pub fn link(mut self, link: L) -> Self {
        self.link = Some(link);
        self
    }

    /// Builder method to set the position controller and return self.
    /// This takes precedence over [`Builder::control_law`].
    pub fn controller(mut self, controller: Box<dyn PositionControl + Send>) -> Self {
        self.controller = Some(controller);
        self
    }

    pub fn control_law(mut self, law: ControlLaw) -> Self {
        self.control_law = law;
        self
    }

    pub fn gains(mut self, gains: Gains) -> Self {
        self.gains = gains;
        self
    }

    pub fn mapping(mut self, mapping: ThrustToAttitude) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn trajectory(mut self, trajectory: T) -> Self {
        self.trajectory = Some(trajectory);
        self
    }

    /// Builder method to set the takeoff origin and return self.
    pub fn origin(mut self, origin: Vector3<f32>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Builder method to set the time (in seconds) the control loop starts at and return self.
    pub fn start_time(mut self, time: f32) -> Self {
        self.start_time = time;
        self
    }

    pub fn takeoff_height(mut self, height: f32) -> Self {
        self.takeoff_height = height;
        self
    }

    pub fn disarm_height(mut self, height: f32) -> Self {
        self.disarm_height = height;
        self
    }

    pub fn geofence(mut self, geofence: GeoFence) -> Self {
        self.geofence = geofence;
        self
    }

    /// Build the copter.
    /// The link and the takeoff origin are required.
    pub fn build(self) -> Result<Copter<L, T>> {
        let link = self
            .link
            .ok_or_else(|| Error::Config("a flight stack link is required".into()))?;
        let origin = self
            .origin
            .ok_or_else(|| Error::Config("the takeoff origin is required".into()))?;

        let controller = match self.controller {
            Some(controller) => controller,
            None => self
                .control_law
                .build(&self.gains, self.mapping.gravity, origin),
        };

        let commander = Commander::new(
            origin,
            self.takeoff_height,
            self.disarm_height,
            self.geofence,
            self.trajectory.unwrap_or_default(),
        );

        Ok(Copter {
            commander,
            controller,
            mapping: self.mapping,
            output: self.output,
            link,
            timer: LoopTimer::new(self.start_time),
            start_time: self.start_time,
            attitude: Default::default(),
            disarm_ack: false,
        })
    }
}
