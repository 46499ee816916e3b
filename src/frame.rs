use nalgebra::{Rotation2, Vector2};

/// Rotate a horizontal body-frame vector into the inertial (ENU) frame.
///
/// `yaw` is the vehicle heading in radians, counter-clockwise from the inertial x axis,
/// so a body vector of `(1, 0)` at a yaw of 90 degrees becomes `(0, 1)`.
pub fn body_to_inertial(yaw: f32, body: Vector2<f32>) -> Vector2<f32> {
    Rotation2::new(yaw) * body
}

#[cfg(test)]
mod tests {
    use super::body_to_inertial;
    use approx::assert_relative_eq;
    use core::f32::consts::{FRAC_PI_2, PI};
    use nalgebra::Vector2;

    #[test]
    fn zero_yaw_is_identity() {
        let v = Vector2::new(1.5, -2.);
        assert_relative_eq!(body_to_inertial(0., v), v);
    }

    #[test]
    fn quarter_turn_is_counter_clockwise() {
        let v = body_to_inertial(FRAC_PI_2, Vector2::new(1., 0.));
        assert_relative_eq!(v, Vector2::new(0., 1.), epsilon = 1e-6);

        let v = body_to_inertial(FRAC_PI_2, Vector2::new(0., 1.));
        assert_relative_eq!(v, Vector2::new(-1., 0.), epsilon = 1e-6);
    }

    #[test]
    fn half_turn_reverses() {
        let v = body_to_inertial(PI, Vector2::new(2., 1.));
        assert_relative_eq!(v, Vector2::new(-2., -1.), epsilon = 1e-6);
    }
}
