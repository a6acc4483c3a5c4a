//! Error types for edge storage and relation mutations.

use glossa_core::{GlossaryId, TermId};
use thiserror::Error;

/// Failures reported by an [`EdgeStore`](crate::EdgeStore) adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Term not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Term id contains a reserved character: {0:?}")]
    InvalidId(String),

    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Failures of relation mutations and queries.
///
/// Everything except [`RelationError::Unavailable`] is the caller's
/// fault and will fail the same way on retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelationError {
    #[error("Invalid relation type: {0}")]
    InvalidRelationType(String),

    #[error("Term not found: {0}")]
    TermNotFound(TermId),

    #[error("A term cannot be related to itself: {0}")]
    SelfRelationNotAllowed(TermId),

    #[error("Relation type '{relation_type}' cannot link glossary {from_glossary} to glossary {to_glossary}")]
    CrossDomainNotAllowed {
        relation_type: String,
        from_glossary: GlossaryId,
        to_glossary: GlossaryId,
    },

    #[error("Relation store unavailable: {0}")]
    Unavailable(String),
}

impl RelationError {
    /// True for transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    pub fn is_client_error(&self) -> bool {
        !self.is_retryable()
    }
}

impl From<StoreError> for RelationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) | StoreError::InvalidId(id) => Self::TermNotFound(TermId::new(id)),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
