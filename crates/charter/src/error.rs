//! Error types for Charter.
//!
//! Widget and controller operations do not return these across the signal
//! boundary; they log and carry on. The errors exist for the internal
//! lookups those operations are built from, and for configuration loading.

use std::path::PathBuf;

use charter_core::ObjectError;

/// The main error type for Charter operations.
#[derive(Debug, thiserror::Error)]
pub enum CharterError {
    /// Object-related error.
    #[error("object error: {0}")]
    Object(#[from] ObjectError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An index past the end of a collection.
    #[error("index {index} out of range (length {len})")]
    InvalidIndex { index: usize, len: usize },

    /// A category with no slots or no palette button.
    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    /// A policy the catalog does not know.
    #[error("unknown policy `{0}`")]
    UnknownPolicy(String),

    /// A category-local slot the inventory does not provide.
    #[error("category `{category}` has {available} slots, slot {slot} does not exist")]
    MissingSlot {
        category: String,
        slot: usize,
        available: i32,
    },
}

/// Errors loading or saving [`UiConfig`](crate::config::UiConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A specialized Result type for Charter operations.
pub type Result<T> = std::result::Result<T, CharterError>;
