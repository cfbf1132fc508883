//! Error types for the aura_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for aura_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persisted snapshot exists but does not describe an application state
    #[error("Persisted snapshot is corrupt: {0}")]
    PersistenceCorrupt(String),

    /// A caller supplied a value the store cannot apply
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Asset missing from the offline cache and unreachable at its origin
    #[error("Asset unavailable: {path} ({reason})")]
    AssetUnavailable { path: String, reason: String },
}
