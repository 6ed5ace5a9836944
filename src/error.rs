//! Error types for taxonomy synthesis

use thiserror::Error;

/// Result type for synthesis operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// Fatal synthesis errors.
///
/// Non-fatal conditions (unresolved dimensions, name collisions, duplicate
/// kinds) are reported through [`crate::graph::Diagnostics`] instead.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Kind '{kind}' has no superkind")]
    MissingSuperkind { kind: String },

    #[error("Schema section not found: {0}")]
    SectionNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
