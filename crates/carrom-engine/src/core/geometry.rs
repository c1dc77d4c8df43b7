//! Plane geometry helpers shared by the shot evaluator, the rules and the
//! physics board. Pure functions over `glam::Vec2`.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Smallest absolute difference between two angles, in `[0, PI]`.
pub fn angle_between(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Direction angle of the vector from `from` to `to`.
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Unit vector for an angle in radians.
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Projection parameter of `point` onto the line through `a` and `b`.
/// 0 at `a`, 1 at `b`. A degenerate segment projects to 0.
pub fn projection_param(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < 0.0001 {
        return 0.0;
    }
    (point - a).dot(line) / len_sq
}

/// Distance from `point` to the segment `a`–`b` (projection clamped).
pub fn segment_point_distance(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let t = projection_param(a, b, point).clamp(0.0, 1.0);
    (a + (b - a) * t).distance(point)
}

/// Perpendicular distance from `point` to the segment `a`–`b`, but only when
/// the projection falls strictly inside the segment. Points that project onto
/// or beyond an endpoint return `None`.
pub fn interior_distance(a: Vec2, b: Vec2, point: Vec2) -> Option<f32> {
    let t = projection_param(a, b, point);
    if t <= 0.0 || t >= 1.0 {
        return None;
    }
    Some((a + (b - a) * t).distance(point))
}

/// Whether two discs overlap.
pub fn discs_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert!((normalize_angle(2.5 * PI) - 0.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(-2.5 * PI) + 0.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((normalize_angle(-0.25) + 0.25).abs() < 1e-6);
    }

    #[test]
    fn angle_between_takes_short_way_round() {
        let d = angle_between(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-5, "got {}", d);
    }

    #[test]
    fn angle_to_and_direction_agree() {
        let a = angle_to(Vec2::ZERO, Vec2::new(0.0, 10.0));
        assert!((a - PI / 2.0).abs() < 1e-6);
        let d = direction(a);
        assert!(d.x.abs() < 1e-6 && (d.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!((segment_point_distance(a, b, Vec2::new(5.0, 3.0)) - 3.0).abs() < 1e-6);
        assert!((segment_point_distance(a, b, Vec2::new(14.0, 3.0)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn interior_distance_excludes_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(interior_distance(a, b, Vec2::new(-1.0, 1.0)), None);
        assert_eq!(interior_distance(a, b, Vec2::new(10.0, 1.0)), None);
        let d = interior_distance(a, b, Vec2::new(4.0, -2.0)).unwrap();
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_segment_has_no_interior() {
        let p = Vec2::new(3.0, 3.0);
        assert_eq!(interior_distance(p, p, Vec2::new(3.0, 4.0)), None);
        assert!((segment_point_distance(p, p, Vec2::new(3.0, 4.0)) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overlap_is_strict() {
        assert!(discs_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!discs_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }
}
