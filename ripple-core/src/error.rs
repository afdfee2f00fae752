//! Error types for the reactive runtime.

use thiserror::Error;

/// Errors surfaced by reactive containers and codecs.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// A container was built from something that is not object-like, or a
    /// persisted payload could not be decoded when the container was created.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An external store update could not be decoded.
    ///
    /// Persisted variables never return this; it is logged and the update is
    /// dropped.
    #[error("external update for key `{key}` discarded: {reason}")]
    ExternalSyncConflict { key: String, reason: String },

    /// A value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// A computation was re-run from inside its own run more often than the
    /// configured limit.
    #[error("update depth exceeded {limit}; a write is probably re-triggering its own effect")]
    UpdateDepthExceeded { limit: usize },
}

/// Result type for reactive operations.
pub type Result<T> = std::result::Result<T, ReactiveError>;
