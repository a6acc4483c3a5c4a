//! In-memory edge store backed by [`TermGraph`].

use crate::edge::{EdgeOp, RelationEdge};
use crate::error::StoreError;
use crate::graph::TermGraph;
use crate::store::{EdgeStore, TermDirectory};
use async_trait::async_trait;
use glossa_core::{GlossaryId, GlossaryRecord, TermId, TermRecord};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Keeps terms and edges in a petgraph graph behind a lock.
///
/// Batches are applied under a single write lock, so a relation and its
/// inverse are always visible together.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RwLock<TermGraph>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TermGraph>, StoreError> {
        self.graph
            .read()
            .map_err(|_| StoreError::Unavailable("graph lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TermGraph>, StoreError> {
        self.graph
            .write()
            .map_err(|_| StoreError::Unavailable("graph lock poisoned".into()))
    }

    pub fn put_glossary(&self, glossary: GlossaryRecord) -> Result<(), StoreError> {
        self.write()?.add_glossary(glossary);
        Ok(())
    }

    pub fn put_term(&self, term: TermRecord) -> Result<(), StoreError> {
        self.write()?.add_term(term);
        Ok(())
    }

    /// Soft-deletes a term.
    pub fn delete_term(&self, id: &TermId) -> Result<(), StoreError> {
        if self.write()?.mark_deleted(id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(id.to_string()))
        }
    }

    pub fn edge_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.edge_count())
    }
}

fn missing_endpoint(graph: &TermGraph, edge: &RelationEdge) -> StoreError {
    let id = if graph.get_by_id(&edge.from).is_none() {
        &edge.from
    } else {
        &edge.to
    };
    StoreError::NotFound(id.to_string())
}

#[async_trait]
impl TermDirectory for MemoryStore {
    async fn term(&self, id: &TermId) -> Result<Option<TermRecord>, StoreError> {
        Ok(self.read()?.get_by_id(id).cloned())
    }

    async fn term_by_fqn(&self, fqn: &str) -> Result<Option<TermRecord>, StoreError> {
        Ok(self.read()?.get_by_fqn(fqn).cloned())
    }

    async fn glossary(&self, id: &GlossaryId) -> Result<Option<GlossaryRecord>, StoreError> {
        Ok(self.read()?.glossary(id).cloned())
    }

    async fn terms_in_glossary(&self, id: &GlossaryId) -> Result<Vec<TermRecord>, StoreError> {
        Ok(self
            .read()?
            .terms_in_glossary(id)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EdgeStore for MemoryStore {
    async fn add_edge(&self, edge: &RelationEdge) -> Result<bool, StoreError> {
        let mut graph = self.write()?;
        match graph.add_edge(edge) {
            Some(added) => Ok(added),
            None => Err(missing_endpoint(&graph, edge)),
        }
    }

    async fn remove_edge(&self, edge: &RelationEdge) -> Result<bool, StoreError> {
        Ok(self.write()?.remove_edge(edge))
    }

    async fn edges_from(
        &self,
        term: &TermId,
        types: Option<&[String]>,
    ) -> Result<Vec<RelationEdge>, StoreError> {
        Ok(self.read()?.edges_from(term, types))
    }

    async fn all_edges(&self) -> Result<Vec<RelationEdge>, StoreError> {
        Ok(self.read()?.edges())
    }

    async fn apply(&self, ops: &[EdgeOp]) -> Result<Vec<bool>, StoreError> {
        let mut graph = self.write()?;

        // Check endpoints up front so a failing batch writes nothing.
        for op in ops {
            if let EdgeOp::Add(edge) = op {
                if graph.get_by_id(&edge.from).is_none() || graph.get_by_id(&edge.to).is_none() {
                    return Err(missing_endpoint(&graph, edge));
                }
            }
        }

        let applied = ops
            .iter()
            .map(|op| match op {
                EdgeOp::Add(edge) => graph.add_edge(edge).unwrap_or(false),
                EdgeOp::Remove(edge) => graph.remove_edge(edge),
            })
            .collect();
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        let glossary = GlossaryRecord::new("g1", "Finance");
        store.put_glossary(glossary.clone()).unwrap();
        store.put_term(TermRecord::new("a", &glossary, "Revenue")).unwrap();
        store.put_term(TermRecord::new("b", &glossary, "Income")).unwrap();
        store
    }

    #[tokio::test]
    async fn test_exists_ignores_deleted_terms() {
        let store = store();
        assert!(store.exists(&"a".into()).await.unwrap());

        store.delete_term(&"a".into()).unwrap();
        assert!(!store.exists(&"a".into()).await.unwrap());
        assert!(!store.exists(&"missing".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_with_missing_endpoint_writes_nothing() {
        let store = store();
        let ops = vec![
            EdgeOp::Add(RelationEdge::new("a", "b", "broader")),
            EdgeOp::Add(RelationEdge::new("b", "ghost", "narrower")),
        ];

        let err = store.apply(&ops).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
        assert_eq!(store.edge_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_usage_counts() {
        let store = store();
        store.add_edge(&RelationEdge::new("a", "b", "synonym")).await.unwrap();
        store.add_edge(&RelationEdge::new("b", "a", "synonym")).await.unwrap();
        store.add_edge(&RelationEdge::new("a", "b", "seeAlso")).await.unwrap();

        let counts = store.usage_counts().await.unwrap();
        assert_eq!(counts.get("synonym"), Some(&2));
        assert_eq!(counts.get("seeAlso"), Some(&1));
        assert_eq!(counts.get("broader"), None);
    }
}
