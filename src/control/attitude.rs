use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use num_traits::clamp;

/// Attitude and thrust reference handed to the attitude controller.
#[derive(Clone, Debug, PartialEq)]
pub struct AttitudeReference {
    /// Desired acceleration the reference was built from (meters/second^2).
    pub thrust_sp: Vector3<f32>,

    /// Normalized collective throttle in 0 ~ 1.
    pub throttle: f32,

    /// Desired roll, pitch and yaw in radians.
    pub attitude: Vector3<f32>,

    pub quaternion: UnitQuaternion<f32>,
}

impl Default for AttitudeReference {
    fn default() -> Self {
        Self {
            thrust_sp: Vector3::zeros(),
            throttle: 0.,
            attitude: Vector3::zeros(),
            quaternion: UnitQuaternion::identity(),
        }
    }
}

/// Maps a desired acceleration and yaw to an attitude reference.
pub trait AttitudeMapping {
    fn to_attitude(&self, accel: &Vector3<f32>, yaw: f32) -> AttitudeReference;
}

/// Point the body z axis along the desired acceleration and scale the throttle
/// so that an acceleration of one `gravity` gives `hover_throttle`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThrustToAttitude {
    pub hover_throttle: f32,
    pub gravity: f32,
}

impl Default for ThrustToAttitude {
    fn default() -> Self {
        Self {
            hover_throttle: 0.5,
            gravity: 9.81,
        }
    }
}

impl AttitudeMapping for ThrustToAttitude {
    fn to_attitude(&self, accel: &Vector3<f32>, yaw: f32) -> AttitudeReference {
        let body_z = accel.try_normalize(1e-6).unwrap_or_else(|| Vector3::z());

        // Heading direction in the horizontal plane
        let heading = Vector3::new(yaw.cos(), yaw.sin(), 0.);
        let body_y = body_z
            .cross(&heading)
            .try_normalize(1e-6)
            .unwrap_or_else(|| Vector3::new(-yaw.sin(), yaw.cos(), 0.));
        let body_x = body_y.cross(&body_z);

        let rotation = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[
            body_x, body_y, body_z,
        ]));
        let quaternion = UnitQuaternion::from_rotation_matrix(&rotation);
        let (roll, pitch, yaw) = quaternion.euler_angles();

        let throttle = clamp(
            accel.norm() / self.gravity * self.hover_throttle,
            0.,
            1.,
        );

        AttitudeReference {
            thrust_sp: *accel,
            throttle,
            attitude: Vector3::new(roll, pitch, yaw),
            quaternion,
        }
    }
}
