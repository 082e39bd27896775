//! Client error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::secret::SecretError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration file could not be loaded or written.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The configuration loaded but holds unusable values.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// A secret reference could not be resolved.
    #[error("failed to resolve {field}: {source}")]
    Secret {
        field: &'static str,
        #[source]
        source: SecretError,
    },

    /// The HTTP transport could not be set up.
    #[error("transport error: {0}")]
    Transport(#[from] timetable_sync::SyncError),

    /// Logging could not be initialized.
    #[error("tracing error: {0}")]
    Tracing(#[from] timetable_core::TracingError),
}
