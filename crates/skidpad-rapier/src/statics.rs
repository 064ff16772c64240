//! Immutable level geometry.
//!
//! Each static is a fixed rigid body with one attached collider, placed by
//! position and heading.

use glam::{Quat, Vec3};
use rapier3d::na::Translation3;
use rapier3d::prelude::*;
use serde::Deserialize;
use skidpad::{Error, Result};

use crate::convert::{to_rotation, to_vector};

/// Supported static collider shapes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum StaticShape {
    /// Infinite ground plane facing up through the static's position.
    Plane,
    /// Oriented box.
    Cuboid {
        /// Half-extents in meters.
        half_extents: Vec3,
    },
    /// Sphere.
    Ball {
        /// Radius in meters.
        radius: f32,
    },
}

/// A static collider as described by a level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StaticDef {
    /// World-space position.
    pub position: Vec3,
    /// Heading around +Y in radians.
    #[serde(default)]
    pub yaw: f32,
    /// Collider shape.
    #[serde(flatten)]
    pub shape: StaticShape,
    /// Contact friction.
    #[serde(default = "default_friction")]
    pub friction: f32,
}

fn default_friction() -> f32 {
    0.5
}

impl StaticDef {
    /// A flat ground box whose top face sits at `height`.
    #[must_use]
    pub fn ground(height: f32, half_size: f32) -> Self {
        Self {
            position: Vec3::new(0.0, height - 0.5, 0.0),
            yaw: 0.0,
            shape: StaticShape::Cuboid {
                half_extents: Vec3::new(half_size, 0.5, half_size),
            },
            friction: default_friction(),
        }
    }

    /// Reject non-finite placements and degenerate sizes.
    pub fn validate(&self) -> Result<()> {
        if !self.position.is_finite() || !self.yaw.is_finite() {
            return Err(Error::NonFinitePose { context: "static" });
        }
        let sizes: &[(&'static str, f32)] = match &self.shape {
            StaticShape::Plane => &[],
            StaticShape::Cuboid { half_extents } => &[
                ("half_extents.x", half_extents.x),
                ("half_extents.y", half_extents.y),
                ("half_extents.z", half_extents.z),
            ],
            StaticShape::Ball { radius } => &[("radius", *radius)],
        };
        for &(name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParameter { name, value });
            }
        }
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(Error::InvalidParameter {
                name: "friction",
                value: self.friction,
            });
        }
        Ok(())
    }

    pub(crate) fn pose(&self) -> Isometry<Real> {
        Isometry::from_parts(
            Translation3::from(to_vector(self.position)),
            to_rotation(Quat::from_rotation_y(self.yaw)),
        )
    }

    /// Build the collider, positioned by its parent body.
    pub(crate) fn collider(&self) -> Collider {
        let builder = match &self.shape {
            StaticShape::Plane => ColliderBuilder::halfspace(Vector::y_axis()),
            StaticShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            StaticShape::Ball { radius } => ColliderBuilder::ball(*radius),
        };
        builder.friction(self.friction).build()
    }
}
