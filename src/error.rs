//! Error types for Chatlens
//!
//! This module defines the error types used throughout the crate,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Chatlens operations
///
/// Covers configuration loading, session storage, JSON import/export,
/// and snapshots that violate the assumed session shape.
#[derive(Error, Debug)]
pub enum ChatlensError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A session in the snapshot cannot be aggregated
    #[error("Malformed session {session_id}: {message}")]
    MalformedSession {
        /// Identifier of the offending session
        session_id: String,
        /// What was wrong with it
        message: String,
    },

    /// Metrics could not be computed for a snapshot
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// JSON import failed (bad file shape, unreadable file)
    #[error("Import error: {0}")]
    Import(String),

    /// A session id prefix matches more than one stored session
    #[error("Ambiguous session id {prefix}: matches {count} sessions")]
    AmbiguousId {
        /// The prefix as given
        prefix: String,
        /// How many sessions it matches
        count: usize,
    },

    /// Requested session or preset does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Chatlens operations
///
/// Uses `anyhow::Error` so callers get rich context and easy propagation.
pub type Result<T> = anyhow::Result<T>;
