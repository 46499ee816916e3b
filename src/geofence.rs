use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A closed interval `[min, max]` along one inertial axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::new(-100., 100.)
    }
}

/// Static axis-aligned box the vehicle must stay inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoFence {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl GeoFence {
    pub fn new(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` if any coordinate of `position` is outside its axis range.
    /// Positions on the boundary are inside the fence.
    pub fn violated(&self, position: &Vector3<f32>) -> bool {
        !(self.x.contains(position.x) && self.y.contains(position.y) && self.z.contains(position.z))
    }
}
