//! Level files.
//!
//! A level is a TOML document with three optional sections:
//!
//! ```toml
//! [vehicle]
//! spawn = { position = [0.0, 1.0, 0.0], yaw = 0.0 }
//!
//! [circuit]
//! start = { position = [0.0, 1.0, 0.0] }
//!
//! [[circuit.checkpoints]]
//! name = "00-start"
//! position = [0.0, 0.0, 0.0]
//! yaw = 0.0
//! half_width = 6.0
//!
//! [[statics]]
//! shape = "cuboid"
//! position = [0.0, -0.5, 0.0]
//! half_extents = [200.0, 0.5, 200.0]
//! ```
//!
//! Anything left out falls back to the built-in tuning. A level without
//! statics gets a flat ground box at height zero.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use skidpad::{CircuitLayout, VehicleConfig};
use skidpad_rapier::StaticDef;
use tracing::debug;

use crate::error::{Error, Result};

/// Half-size of the ground box added to levels without statics.
const DEFAULT_GROUND_HALF_SIZE: f32 = 500.0;

/// A parsed level.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Level {
    /// Vehicle spawn and tuning.
    #[serde(default)]
    pub vehicle: VehicleConfig,
    /// Race layout, if the level is a circuit.
    #[serde(default)]
    pub circuit: Option<CircuitLayout>,
    /// Immutable colliders.
    #[serde(default)]
    pub statics: Vec<StaticDef>,
}

impl Level {
    /// Read and parse a level file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let level = Self::parse(&text).map_err(|source| Error::Level {
            path: path.to_owned(),
            source,
        })?;
        debug!(
            path = %path.display(),
            statics = level.statics.len(),
            checkpoints = level.circuit.as_ref().map_or(0, |c| c.checkpoints.len()),
            "level loaded"
        );
        Ok(level)
    }

    /// Parse level TOML.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// The level's statics, or a default ground if it declares none.
    #[must_use]
    pub fn statics_or_ground(&self) -> Vec<StaticDef> {
        if self.statics.is_empty() {
            vec![StaticDef::ground(0.0, DEFAULT_GROUND_HALF_SIZE)]
        } else {
            self.statics.clone()
        }
    }
}
