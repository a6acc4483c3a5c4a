//! Error types for export and import.

use glossa_core::GlossaryId;
use glossa_graph::{RelationError, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Glossary not found: {0}")]
    GlossaryNotFound(GlossaryId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Relation(#[from] RelationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
