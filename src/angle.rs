//! Orientation utilities shared by the orientation, frequency, Gabor and
//! singularity stages.
//!
//! Ridge orientations are undirected: θ and θ + π describe the same ridge, so
//! stored angles live in `[0, π)`. Averaging is done on the doubled-angle
//! vector `(cos 2θ, sin 2θ)`, which is continuous across the 0/π seam.

use nalgebra::Vector2;
use std::f32::consts::PI;

/// Normalizes an angle into the range [0, π).
#[inline]
pub fn normalize_half_pi(angle: f32) -> f32 {
    let mut norm = angle.rem_euclid(PI);
    if norm >= PI {
        norm -= PI;
    }
    if norm >= PI - 1e-6 {
        0.0
    } else {
        norm
    }
}

/// Computes the smallest unsigned angular difference between two orientations,
/// treating antipodal directions as equivalent (i.e. π apart → 0).
#[inline]
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs().rem_euclid(PI);
    if diff > std::f32::consts::FRAC_PI_2 {
        PI - diff
    } else {
        diff
    }
}

/// Doubled-angle unit vector `(cos 2θ, sin 2θ)` of an orientation.
#[inline]
pub fn doubled_angle_vector(theta: f32) -> Vector2<f32> {
    let (s, c) = (2.0 * theta).sin_cos();
    Vector2::new(c, s)
}

/// Recover an orientation in [0, π) from a (possibly unnormalised) doubled-angle vector.
#[inline]
pub fn orientation_from_doubled(v: &Vector2<f32>) -> f32 {
    normalize_half_pi(0.5 * v.y.atan2(v.x))
}

/// Fold a signed orientation difference in degrees into (−90°, 90°].
///
/// Orientations repeat every 180°, so a jump of more than a quarter turn is
/// read as the shorter turn in the opposite sense.
#[inline]
pub fn fold_orientation_delta_deg(delta: f32) -> f32 {
    let mut d = delta;
    while d > 90.0 {
        d -= 180.0;
    }
    while d <= -90.0 {
        d += 180.0;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn normalize_half_pi_basic() {
        assert!(approx_eq(normalize_half_pi(0.5), 0.5));
        assert!(approx_eq(
            normalize_half_pi(-std::f32::consts::FRAC_PI_4),
            3.0 * std::f32::consts::FRAC_PI_4
        ));
        assert!(approx_eq(normalize_half_pi(PI), 0.0));
        assert!(approx_eq(normalize_half_pi(3.0 * PI), 0.0));
    }

    #[test]
    fn angular_difference_handles_wrap() {
        assert!(approx_eq(angular_difference(0.0, PI), 0.0));
        assert!(approx_eq(
            angular_difference(0.1, PI - 0.1),
            0.2
        ));
        assert!(approx_eq(
            angular_difference(0.25, 1.7),
            angular_difference(1.7, 0.25)
        ));
    }

    #[test]
    fn doubled_vector_round_trips_across_seam() {
        for theta in [0.0f32, 0.3, 1.2, 3.1] {
            let back = orientation_from_doubled(&doubled_angle_vector(theta));
            assert!(angular_difference(back, theta) < 1e-4, "{theta} -> {back}");
        }
        // Averaging 5° and 175° must give 0°, not 90°.
        let avg = doubled_angle_vector(5f32.to_radians()) + doubled_angle_vector(175f32.to_radians());
        assert!(angular_difference(orientation_from_doubled(&avg), 0.0) < 1e-4);
    }

    #[test]
    fn fold_delta_range() {
        assert!(approx_eq(fold_orientation_delta_deg(170.0), -10.0));
        assert!(approx_eq(fold_orientation_delta_deg(-170.0), 10.0));
        assert!(approx_eq(fold_orientation_delta_deg(90.0), 90.0));
        assert!(approx_eq(fold_orientation_delta_deg(-90.0), 90.0));
        assert!(approx_eq(fold_orientation_delta_deg(45.0), 45.0));
    }
}
