//! Error types for member synthesis

use std::path::{Path, PathBuf};
use stitch_policy::PolicyError;
use stitch_session::SessionError;

/// Errors surfaced by synthesis calls
///
/// "Already exists" and empty payloads are not errors; they are reported as
/// [`crate::SynthOutcome::Skipped`].
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// A required input is missing or the request is structurally invalid
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Session failure (integrity failures poison the session)
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A configured policy could not be resolved
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SynthError {
    /// Create invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// True if the session must be discarded
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Session(e) if e.is_fatal())
    }

    /// True for invalid inputs, from the synthesizer or the session
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::Session(SessionError::InvalidArgument(_))
        )
    }
}

/// Errors loading a [`crate::SynthConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create I/O error for `path`
    pub fn io_error(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
