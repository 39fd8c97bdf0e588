//! Planar geometry helpers shared by targeting, rewards, and sensors.

use nero_types::{Pose, Vec2};

/// Euclidean distance between two points on the arena floor.
pub fn distance(a: Vec2, b: Vec2) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Add `delta` degrees to `heading` and wrap the result into [0, 360).
pub fn wrap_degrees(heading: f64, delta: f64) -> f64 {
    let wrapped = (heading + delta).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed bearing in degrees from `from` (looking along its heading) towards
/// `to`, folded into [-180, 180]. Zero when the two points coincide.
pub fn bearing(from: &Pose, to: Vec2) -> f64 {
    let origin = from.position();
    if distance(origin, to) == 0.0 {
        return 0.0;
    }
    let mut relative = (to.y - origin.y).atan2(to.x - origin.x).to_degrees() - from.heading;
    if relative < -180.0 {
        relative += 360.0;
    }
    if relative > 180.0 {
        relative -= 360.0;
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn distance_is_euclidean() {
        assert!((distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert!((wrap_degrees(350.0, 20.0) - 10.0).abs() < EPS);
        assert!((wrap_degrees(10.0, -20.0) - 350.0).abs() < EPS);
        assert!(wrap_degrees(0.0, 0.0).abs() < EPS);
        assert!(wrap_degrees(0.0, 360.0).abs() < EPS);
    }

    #[test]
    fn bearing_straight_ahead_is_zero() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        assert!(bearing(&pose, Vec2::new(10.0, 0.0)).abs() < EPS);
    }

    #[test]
    fn bearing_is_signed() {
        let pose = Pose::new(0.0, 0.0, 0.0);
        assert!((bearing(&pose, Vec2::new(0.0, 5.0)) - 90.0).abs() < EPS);
        assert!((bearing(&pose, Vec2::new(0.0, -5.0)) + 90.0).abs() < EPS);
    }

    #[test]
    fn bearing_folds_across_the_seam() {
        // Facing 350 degrees, a target at 10 degrees is 20 degrees to the left.
        let pose = Pose::new(0.0, 0.0, 350.0);
        let target = Vec2::new(10.0_f64.to_radians().cos(), 10.0_f64.to_radians().sin());
        assert!((bearing(&pose, target) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn bearing_to_self_is_zero() {
        let pose = Pose::new(4.0, 4.0, 123.0);
        assert!(bearing(&pose, Vec2::new(4.0, 4.0)).abs() < EPS);
    }
}
