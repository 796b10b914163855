//! Error types for the Podium engine
//!
//! A single unified error type is used across all crates. We use `thiserror`
//! for automatic `Display` and `Error` trait implementations.
//!
//! ## Error Categories
//!
//! - **Validation**: malformed input (empty ids, out-of-range scores).
//!   Surfaced to clients as 4xx; never retried server-side.
//! - **Retryable IO**: transient WAL append failures and backpressure.
//!   Surfaced as 503 with Retry-After; index state is unchanged.
//! - **Corruption**: a checkpoint failed its integrity check. Fatal.
//! - **Internal**: unrecoverable startup or invariant failures. Fatal.
//!
//! A user absent from a shard is *not* an error: rank/score lookups return
//! `Option::None` as the not-found sentinel.

use std::io;
use thiserror::Error;

/// Result type alias for Podium operations
pub type PodiumResult<T> = std::result::Result<T, PodiumError>;

/// Unified error type for all Podium operations
#[derive(Debug, Error)]
pub enum PodiumError {
    /// Invalid input
    ///
    /// Missing or malformed fields, out-of-range score, empty identifier.
    /// Cannot be fixed by retrying; the input must be corrected.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what's wrong with the input
        message: String,
    },

    /// Transient write-path failure
    ///
    /// WAL append failed (disk pressure, brief I/O error) or the commit
    /// queue is full. The index was not modified; the write may be retried.
    #[error("write-ahead log unavailable: {message}")]
    RetryableIo {
        /// What failed
        message: String,
        /// Underlying I/O error, when there is one
        #[source]
        source: Option<io::Error>,
    },

    /// Data integrity failure
    ///
    /// A checkpoint file failed its integrity check during recovery.
    /// The shard cannot serve; the process should abort and be restarted
    /// by its supervisor after operator intervention.
    #[error("corruption detected: {message}")]
    Corruption {
        /// Description of the corruption
        message: String,
    },

    /// Unrecoverable internal failure
    ///
    /// Data directory unusable at startup, or a broken invariant.
    #[error("internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

impl PodiumError {
    /// Create an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PodiumError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a RetryableIo error with no underlying I/O source
    pub fn retryable(message: impl Into<String>) -> Self {
        PodiumError::RetryableIo {
            message: message.into(),
            source: None,
        }
    }

    /// Create a RetryableIo error wrapping an I/O error
    pub fn retryable_io(message: impl Into<String>, source: io::Error) -> Self {
        PodiumError::RetryableIo {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a Corruption error
    pub fn corruption(message: impl Into<String>) -> Self {
        PodiumError::Corruption {
            message: message.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PodiumError::Internal {
            message: message.into(),
        }
    }

    /// Check if this error may succeed on retry
    ///
    /// Only transient write-path failures are retryable. Validation errors
    /// need corrected input; corruption and internal errors need operator
    /// intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PodiumError::RetryableIo { .. })
    }

    /// Check if this is a validation error (client-side fault)
    pub fn is_validation(&self) -> bool {
        matches!(self, PodiumError::InvalidInput { .. })
    }

    /// Check if this error is fatal to the shard or process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PodiumError::Corruption { .. } | PodiumError::Internal { .. }
        )
    }
}

impl From<io::Error> for PodiumError {
    fn from(e: io::Error) -> Self {
        PodiumError::RetryableIo {
            message: e.to_string(),
            source: Some(e),
        }
    }
}
