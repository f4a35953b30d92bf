//! Custom error types for translator operations

use thiserror::Error;

/// Errors surfaced by the translator client.
///
/// Terminal-but-failed job states (`Failed`, `Cancelled`, `ValidationFailed`)
/// are not errors; they come back as ordinary
/// [`BatchJobState`](crate::core::models::BatchJobState) values the caller
/// branches on. Only transport and protocol failures land here.
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// The service answered with a non-success status code
    #[error("request failed: {status} - {body}")]
    RequestFailed {
        /// HTTP status code returned by the service
        status: u16,
        /// Raw response body, preserved for diagnostics
        body: String,
    },

    /// A success response carried a body that did not decode
    #[error("failed to decode response body: {message}")]
    DecodeError {
        /// What went wrong while decoding
        message: String,
    },

    /// A required argument was missing or empty
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Which argument and why
        message: String,
    },

    /// Batch submit was accepted but the Operation-Location header is absent
    #[error("202 response is missing the Operation-Location header")]
    MissingOperationLocation,

    /// The wait loop exceeded its configured timeout
    #[error("timed out waiting for the batch operation to complete")]
    TimedOut,

    /// The wait loop was cancelled externally
    #[error("wait for completion was cancelled")]
    Cancelled,

    /// Connection-level failure (DNS, TLS, socket timeout)
    #[error("transport error: {message}")]
    TransportError {
        /// Underlying transport failure description
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<anyhow::Error> for TranslatorError {
    fn from(err: anyhow::Error) -> Self {
        TranslatorError::ConfigError {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for TranslatorError {
    fn from(err: reqwest::Error) -> Self {
        TranslatorError::TransportError {
            message: err.to_string(),
        }
    }
}

/// Result type for translator operations
pub type Result<T> = std::result::Result<T, TranslatorError>;
