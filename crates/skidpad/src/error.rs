//! Error types for the skidpad crate.

use std::fmt;

use crate::physics::{BodyHandle, VehicleHandle};
use crate::schedule::Phase;

/// Result type for skidpad operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a simulation.
#[derive(Debug)]
pub enum Error {
    /// A checkpoint ring was built with no checkpoints.
    EmptyRing,
    /// A checkpoint has a non-finite position or yaw.
    NonFiniteCheckpoint {
        /// Index of the checkpoint in the ring.
        index: usize,
    },
    /// A checkpoint gate has a negative half-width.
    NegativeHalfWidth {
        /// Index of the checkpoint in the ring.
        index: usize,
        /// The offending half-width.
        half_width: f32,
    },
    /// A pose (start or spawn) has non-finite components.
    NonFinitePose {
        /// Which pose was invalid.
        context: &'static str,
    },
    /// A tunable parameter is out of its valid range.
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// The physics collaborator does not know this rigid body.
    UnknownBody(BodyHandle),
    /// The physics collaborator does not know this vehicle controller.
    UnknownVehicle(VehicleHandle),
    /// A scheduler callback failed.
    Callback {
        /// The phase being dispatched.
        phase: Phase,
        /// Description of the failure.
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyRing => write!(f, "checkpoint ring must contain at least one checkpoint"),
            Error::NonFiniteCheckpoint { index } => {
                write!(f, "checkpoint {index} has a non-finite position or yaw")
            }
            Error::NegativeHalfWidth { index, half_width } => {
                write!(f, "checkpoint {index} has negative half-width {half_width}")
            }
            Error::NonFinitePose { context } => write!(f, "{context} pose is not finite"),
            Error::InvalidParameter { name, value } => {
                write!(f, "invalid value {value} for parameter {name}")
            }
            Error::UnknownBody(handle) => write!(f, "unknown rigid body {handle:?}"),
            Error::UnknownVehicle(handle) => write!(f, "unknown vehicle controller {handle:?}"),
            Error::Callback { phase, message } => {
                write!(f, "{phase:?} callback failed: {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
