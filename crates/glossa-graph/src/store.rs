//! Storage seams for terms and relation edges.
//!
//! The relation engine never reaches into a database directly. It talks
//! to an [`EdgeStore`], which also answers the handful of term lookups
//! the engine needs through [`TermDirectory`].

use crate::edge::{EdgeOp, RelationEdge};
use crate::error::StoreError;
use async_trait::async_trait;
use glossa_core::{GlossaryId, GlossaryRecord, TermId, TermRecord};
use std::collections::HashMap;

/// Read access to the entity store that owns terms and glossaries.
#[async_trait]
pub trait TermDirectory: Send + Sync {
    /// Fetches a term record, deleted or not.
    async fn term(&self, id: &TermId) -> Result<Option<TermRecord>, StoreError>;

    async fn term_by_fqn(&self, fqn: &str) -> Result<Option<TermRecord>, StoreError>;

    async fn glossary(&self, id: &GlossaryId) -> Result<Option<GlossaryRecord>, StoreError>;

    /// Live terms of a glossary, ordered by FQN.
    async fn terms_in_glossary(&self, id: &GlossaryId) -> Result<Vec<TermRecord>, StoreError>;
}

/// Persistence for relation edges.
#[async_trait]
pub trait EdgeStore: TermDirectory {
    /// Stores an edge. Returns false if it was already present.
    ///
    /// Fails with [`StoreError::NotFound`] if an endpoint does not exist.
    async fn add_edge(&self, edge: &RelationEdge) -> Result<bool, StoreError>;

    /// Deletes an edge. Returns false if it was not present.
    async fn remove_edge(&self, edge: &RelationEdge) -> Result<bool, StoreError>;

    /// Outgoing edges of `term`, optionally restricted to some types.
    ///
    /// Results are ordered by relation type, then target.
    async fn edges_from(
        &self,
        term: &TermId,
        types: Option<&[String]>,
    ) -> Result<Vec<RelationEdge>, StoreError>;

    async fn all_edges(&self) -> Result<Vec<RelationEdge>, StoreError>;

    /// True if the term exists and is not deleted.
    async fn exists(&self, term: &TermId) -> Result<bool, StoreError> {
        Ok(matches!(self.term(term).await?, Some(record) if !record.deleted))
    }

    /// Applies several writes, reporting which ones changed state.
    ///
    /// The default applies them one by one. Adapters that can write
    /// atomically should override this so that a relation and its
    /// inverse never land half-written.
    async fn apply(&self, ops: &[EdgeOp]) -> Result<Vec<bool>, StoreError> {
        let mut applied = Vec::with_capacity(ops.len());
        for op in ops {
            let changed = match op {
                EdgeOp::Add(edge) => self.add_edge(edge).await?,
                EdgeOp::Remove(edge) => self.remove_edge(edge).await?,
            };
            applied.push(changed);
        }
        Ok(applied)
    }

    /// Number of stored edges per relation type.
    async fn usage_counts(&self) -> Result<HashMap<String, usize>, StoreError> {
        let mut counts = HashMap::new();
        for edge in self.all_edges().await? {
            *counts.entry(edge.relation_type).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Checks a type filter: `None` or an empty slice accept everything.
pub(crate) fn type_matches(types: Option<&[String]>, relation_type: &str) -> bool {
    match types {
        Some(types) if !types.is_empty() => types.iter().any(|t| t == relation_type),
        _ => true,
    }
}
