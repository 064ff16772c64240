//! Error types for the driver binary.

use std::fmt;
use std::path::PathBuf;

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a level or running it.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// A level file is not valid TOML for the level schema.
    Level {
        /// The level file.
        path: PathBuf,
        /// The parse error.
        source: toml::de::Error,
    },
    /// The run summary could not be serialized.
    Summary(serde_json::Error),
    /// The simulation rejected the level or failed while running.
    Sim(skidpad::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Error::Level { path, source } => {
                write!(f, "invalid level {}: {source}", path.display())
            }
            Error::Summary(e) => write!(f, "failed to serialize run summary: {e}"),
            Error::Sim(e) => write!(f, "simulation error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Level { source, .. } => Some(source),
            Error::Summary(e) => Some(e),
            Error::Sim(e) => Some(e),
        }
    }
}

impl From<skidpad::Error> for Error {
    fn from(e: skidpad::Error) -> Self {
        Error::Sim(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Summary(e)
    }
}
