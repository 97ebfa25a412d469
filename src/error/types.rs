//! Custom error types with exit codes

use thiserror::Error;

/// Main error type for format-configs operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    /// Configuration Error - invalid arguments or selection
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Target Error - target directory missing or unusable
    #[error("Target error: {message}")]
    Target { message: String },

    /// Config Source Error - source config directory cannot be resolved
    #[error("Config source error: {message}")]
    ConfigSource { message: String },

    /// Git Error - staging or committing failed
    #[error("Git error: {message}")]
    Git { message: String },

    /// Filesystem Error - a managed file could not be written
    #[error("Filesystem error: {message}")]
    Filesystem { message: String },
}

impl SyncError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } => 1,
            Self::Target { .. } => 2,
            Self::ConfigSource { .. } => 3,
            Self::Git { .. } => 4,
            Self::Filesystem { .. } => 5,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a target error
    #[inline]
    pub fn target<S: Into<String>>(message: S) -> Self {
        Self::Target {
            message: message.into(),
        }
    }

    /// Create a config source error
    #[inline]
    pub fn config_source<S: Into<String>>(message: S) -> Self {
        Self::ConfigSource {
            message: message.into(),
        }
    }

    /// Create a git error
    #[inline]
    pub fn git<S: Into<String>>(message: S) -> Self {
        Self::Git {
            message: message.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<S: Into<String>>(message: S) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }
}
