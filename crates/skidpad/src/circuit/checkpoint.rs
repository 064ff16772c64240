//! Checkpoint gates and the ring they form.

use glam::{Vec2, Vec3};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geometry::{ground_position, rotate_around, segment_crosses_circle};

fn default_half_width() -> f32 {
    5.0
}

/// A checkpoint as described by a level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CheckpointDef {
    /// Ring order is the lexical order of names.
    pub name: String,
    /// World-space centre of the gate.
    pub position: Vec3,
    /// Heading a vehicle drives through the gate with (radians around +Y).
    #[serde(default)]
    pub yaw: f32,
    /// Half the gate width.
    #[serde(default = "default_half_width")]
    pub half_width: f32,
}

/// A checkpoint gate on the ground plane.
///
/// The gate is a segment across the checkpoint's heading, centred on its
/// position.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    index: usize,
    name: String,
    position: Vec3,
    center: Vec2,
    a: Vec2,
    b: Vec2,
}

impl Checkpoint {
    /// Build the gate for the checkpoint at `index` in the ring.
    pub fn new(index: usize, def: &CheckpointDef) -> Result<Self> {
        if !def.position.is_finite() || !def.yaw.is_finite() || !def.half_width.is_finite() {
            return Err(Error::NonFiniteCheckpoint { index });
        }
        if def.half_width < 0.0 {
            return Err(Error::NegativeHalfWidth {
                index,
                half_width: def.half_width,
            });
        }

        let center = ground_position(def.position);
        // Heading yaw turns ground-plane vectors clockwise when viewed as (x, z).
        let a = rotate_around(center - Vec2::new(0.0, def.half_width), center, -def.yaw);
        let b = rotate_around(center + Vec2::new(0.0, def.half_width), center, -def.yaw);
        Ok(Self {
            index,
            name: def.name.clone(),
            position: def.position,
            center,
            a,
            b,
        })
    }

    /// Position in the ring.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name from the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Ground-plane centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Gate endpoints on the ground plane.
    #[must_use]
    pub fn gate(&self) -> (Vec2, Vec2) {
        (self.a, self.b)
    }

    /// Whether the gate crosses the circle of `radius` around `position`.
    #[must_use]
    pub fn crossed_by(&self, position: Vec2, radius: f32) -> bool {
        segment_crosses_circle(self.a, self.b, position, radius)
    }
}

/// The ordered, cyclic sequence of checkpoints a race traverses.
///
/// Index 0 is the shared start/finish gate.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckpointRing {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointRing {
    /// Sort the definitions by name and build the ring.
    pub fn from_defs(defs: &[CheckpointDef]) -> Result<Self> {
        if defs.is_empty() {
            return Err(Error::EmptyRing);
        }
        let mut sorted: Vec<&CheckpointDef> = defs.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let checkpoints = sorted
            .into_iter()
            .enumerate()
            .map(|(index, def)| Checkpoint::new(index, def))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { checkpoints })
    }

    /// Number of checkpoints, including the start/finish gate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Always false; a ring cannot be built empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Checkpoint at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(index)
    }

    /// All checkpoints in ring order.
    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    /// Index following `index`, wrapping to the start gate.
    #[must_use]
    pub fn wrap(&self, index: usize) -> usize {
        index % self.checkpoints.len()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn def(name: &str, x: f32, z: f32, yaw: f32) -> CheckpointDef {
        CheckpointDef {
            name: name.into(),
            position: Vec3::new(x, 0.0, z),
            yaw,
            half_width: 3.0,
        }
    }

    #[test]
    fn test_gate_spans_across_heading() {
        let checkpoint = Checkpoint::new(0, &def("a", 10.0, 0.0, 0.0)).unwrap();
        let (a, b) = checkpoint.gate();
        assert!((a - Vec2::new(10.0, -3.0)).length() < 1e-5);
        assert!((b - Vec2::new(10.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_gate_follows_yaw() {
        // Heading a quarter turn around +Y faces -Z, so the gate spans X.
        let checkpoint = Checkpoint::new(0, &def("a", 0.0, 0.0, FRAC_PI_2)).unwrap();
        let (a, b) = checkpoint.gate();
        assert!(a.y.abs() < 1e-5 && b.y.abs() < 1e-5);
        assert!((a.x.abs() - 3.0).abs() < 1e-5);
        assert!((a.x + b.x).abs() < 1e-5);
    }

    #[test]
    fn test_crossed_by_nearby_vehicle() {
        let checkpoint = Checkpoint::new(0, &def("a", 10.0, 0.0, 0.0)).unwrap();
        assert!(checkpoint.crossed_by(Vec2::new(9.0, 0.0), 2.0));
        assert!(!checkpoint.crossed_by(Vec2::new(5.0, 0.0), 2.0));
    }

    #[test]
    fn test_ring_sorted_by_name() {
        let ring = CheckpointRing::from_defs(&[
            def("c2", 20.0, 0.0, 0.0),
            def("c0", 0.0, 0.0, 0.0),
            def("c1", 10.0, 0.0, 0.0),
        ])
        .unwrap();
        let names: Vec<_> = ring.iter().map(Checkpoint::name).collect();
        assert_eq!(names, vec!["c0", "c1", "c2"]);
        assert_eq!(ring.get(2).unwrap().index(), 2);
        assert_eq!(ring.wrap(3), 0);
    }

    #[test]
    fn test_empty_ring_is_rejected() {
        assert!(matches!(
            CheckpointRing::from_defs(&[]),
            Err(Error::EmptyRing)
        ));
    }

    #[test]
    fn test_invalid_checkpoints_are_rejected() {
        let mut bad = def("a", 0.0, 0.0, 0.0);
        bad.half_width = -1.0;
        assert!(matches!(
            CheckpointRing::from_defs(&[bad]),
            Err(Error::NegativeHalfWidth { index: 0, .. })
        ));

        let nan = def("b", f32::NAN, 0.0, 0.0);
        assert!(matches!(
            CheckpointRing::from_defs(&[def("a", 0.0, 0.0, 0.0), nan]),
            Err(Error::NonFiniteCheckpoint { index: 1 })
        ));
    }

    #[test]
    fn test_zero_width_gate_is_point_contact() {
        let mut point = def("a", 0.0, 0.0, 0.0);
        point.half_width = 0.0;
        let checkpoint = Checkpoint::new(0, &point).unwrap();
        assert!(checkpoint.crossed_by(Vec2::new(1.0, 0.0), 2.0));
        assert!(!checkpoint.crossed_by(Vec2::new(3.0, 0.0), 2.0));
    }
}
