//! Ground-plane geometry shared by the vehicle and circuit.
//!
//! Pure functions over `glam` types. The ground plane is world XZ, mapped to
//! `Vec2(x, z)`.

use glam::{Vec2, Vec3};

/// Below this squared length a segment is treated as a single point.
const DEGENERATE_SEGMENT_SQ: f32 = 1e-12;

/// Project a world position onto the ground plane.
#[must_use]
pub fn ground_position(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Rotate `point` around `center` by `angle` radians (counter-clockwise).
#[must_use]
pub fn rotate_around(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    center + Vec2::from_angle(angle).rotate(point - center)
}

/// Clamp to the unit interval.
#[must_use]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Points where the segment `a`→`b` crosses the circle at `center`.
///
/// Returns zero, one (tangent or single crossing) or two points, ordered
/// from `a` towards `b`. A zero-length segment returns its point when the
/// point lies inside or on the circle.
#[must_use]
pub fn segment_circle_intersection(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Vec<Vec2> {
    let d = b - a;
    let f = a - center;

    let qa = d.length_squared();
    if qa <= DEGENERATE_SEGMENT_SQ {
        return if f.length_squared() <= radius * radius {
            vec![a]
        } else {
            Vec::new()
        };
    }

    let qb = 2.0 * f.dot(d);
    let qc = f.length_squared() - radius * radius;
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return Vec::new();
    }

    let root = discriminant.sqrt();
    let t1 = (-qb - root) / (2.0 * qa);
    let t2 = (-qb + root) / (2.0 * qa);

    let mut points = Vec::with_capacity(2);
    if (0.0..=1.0).contains(&t1) {
        points.push(a + d * t1);
    }
    if root > 0.0 && (0.0..=1.0).contains(&t2) {
        points.push(a + d * t2);
    }
    points
}

/// Whether the segment `a`→`b` touches the circle boundary.
#[must_use]
pub fn segment_crosses_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    !segment_circle_intersection(a, b, center, radius).is_empty()
}
