//! Error types for the generation pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T, E = MakerError> = std::result::Result<T, E>;

/// Errors raised while planning or committing a grid scaffold
#[derive(Debug, Error)]
pub enum MakerError {
    /// Entity name, property name or derived identifier is empty or malformed
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Referenced template is not registered
    #[error("Template not found: {0}")]
    MissingTemplate(String),

    /// Template exists but could not be rendered
    #[error("Failed to render template {template}: {message}")]
    Render {
        /// Template id
        template: String,
        /// Renderer message
        message: String,
    },

    /// Existing controller could not be read or parsed
    ///
    /// This is the only recoverable error: the controller is skipped and the
    /// rest of the scaffold is still committed.
    #[error("Cannot augment controller {class}: {reason}")]
    ControllerRead {
        /// Fully qualified controller class
        class: String,
        /// What went wrong
        reason: String,
    },

    /// Filesystem failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Services file could not be loaded or written
    #[error("Services file error: {0}")]
    Services(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MakerError {
    /// Wrap an I/O error with the path it happened on
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the pipeline may continue after this error
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::ControllerRead { .. })
    }
}
