//! Conversions between `glam` and rapier's nalgebra types.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_rotation(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn from_rotation(q: &UnitQuaternion<Real>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_matches_glam() {
        let q = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3);
        let v = Vec3::new(1.0, 2.0, 3.0);
        let rotated = to_rotation(q) * to_vector(v);
        assert!((from_vector(&rotated) - q * v).length() < 1e-5);
        assert!(from_rotation(&to_rotation(q)).abs_diff_eq(q, 1e-6));
    }
}
