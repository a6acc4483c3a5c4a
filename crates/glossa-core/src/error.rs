//! Error types for registry validation and configuration loading.

use thiserror::Error;

/// Errors raised while building or querying the relation type registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown relation type: {0}")]
    UnknownType(String),

    #[error("Invalid relation type name '{0}': must start with a letter and contain only letters and digits")]
    InvalidName(String),

    #[error("Duplicate relation type: {0}")]
    DuplicateName(String),

    #[error("Relation type '{name}' declares inverse '{inverse}' which does not point back")]
    InverseMismatch { name: String, inverse: String },

    #[error("Symmetric relation type '{0}' cannot declare an inverse")]
    SymmetricWithInverse(String),

    #[error("Relation type '{name}' has invalid color '{color}', expected #rrggbb")]
    InvalidColor { name: String, color: String },

    #[error("Default relation type '{0}' is not registered")]
    UnknownDefault(String),

    #[error("Relation type '{name}' is used by {count} relation(s) and cannot be removed")]
    InUse { name: String, count: usize },

    #[error("A relation type registry is already installed")]
    AlreadyInstalled,
}

/// Errors raised while reading or writing `.glossa/config.json`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid relation types: {0}")]
    Registry(#[from] RegistryError),
}
