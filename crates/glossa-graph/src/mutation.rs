//! Adding and removing typed relations.
//!
//! Every mutation goes through [`RelationService`]. It validates the
//! request against the registry and the term directory, derives the
//! implied reverse edge with [`inverse_of`], and hands both edges to the
//! store as one batch. Validation failures never reach the store.

use crate::edge::{inverse_of, EdgeOp, RelationEdge};
use crate::error::{RelationError, StoreError};
use crate::store::EdgeStore;
use glossa_core::{RelationType, RelationTypeRegistry, TermId, TermRecord, TermRef};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on a single store call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// The edges a mutation touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    /// The relation and its implied reverse edge, if any.
    pub edges: Vec<RelationEdge>,

    /// How many of `edges` actually changed state. Zero means the call
    /// was a no-op (duplicate add, or removal of something absent).
    pub changed: usize,
}

impl MutationOutcome {
    pub fn is_noop(&self) -> bool {
        self.changed == 0
    }
}

/// One outgoing relation of a term, with the target resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTerm {
    pub relation_type: String,
    pub term: TermRef,
}

/// Validates and applies relation mutations against an [`EdgeStore`].
pub struct RelationService<S: ?Sized> {
    store: Arc<S>,
    registry: Arc<RelationTypeRegistry>,
    timeout: Duration,
}

impl<S: ?Sized> Clone for RelationService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            timeout: self.timeout,
        }
    }
}

impl<S: EdgeStore + ?Sized> RelationService<S> {
    pub fn new(store: Arc<S>, registry: Arc<RelationTypeRegistry>) -> Self {
        Self {
            store,
            registry,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the bound applied to every store call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &RelationTypeRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Relates `from` to `to` with `relation_type`.
    ///
    /// Writes the forward edge and, for symmetric or paired types, the
    /// reverse edge in one batch. Adding an existing relation succeeds
    /// with nothing changed.
    pub async fn add_relation(
        &self,
        from: &TermId,
        to: &TermId,
        relation_type: &str,
    ) -> Result<MutationOutcome, RelationError> {
        let ty = self.validate(from, to, relation_type).await?;

        let edges = self.plan(RelationEdge::new(from.clone(), to.clone(), ty.name.clone()));
        let ops: Vec<EdgeOp> = edges.iter().cloned().map(EdgeOp::Add).collect();
        let applied = self.call(self.store.apply(&ops)).await?;
        let changed = applied.into_iter().filter(|&c| c).count();

        if changed > 0 {
            info!("Added relation {} ({} edge(s) written)", edges[0], changed);
        } else {
            debug!("Relation {} already present", edges[0]);
        }

        Ok(MutationOutcome { edges, changed })
    }

    /// Checks a prospective relation without writing anything: the type
    /// is registered, both terms are live, the terms differ, and the
    /// type may cross glossaries if they do.
    pub async fn validate(
        &self,
        from: &TermId,
        to: &TermId,
        relation_type: &str,
    ) -> Result<RelationType, RelationError> {
        let ty = self.resolve_type(relation_type)?.clone();

        let from_term = self.require_term(from).await?;
        let to_term = self.require_term(to).await?;

        if from == to {
            return Err(RelationError::SelfRelationNotAllowed(from.clone()));
        }

        if !ty.cross_domain_allowed && from_term.glossary != to_term.glossary {
            return Err(RelationError::CrossDomainNotAllowed {
                relation_type: ty.name,
                from_glossary: from_term.glossary,
                to_glossary: to_term.glossary,
            });
        }

        Ok(ty)
    }

    /// Removes the relation of exactly `relation_type` between the pair,
    /// along with its implied reverse edge. Other types between the same
    /// terms are left alone. Removing something absent succeeds.
    pub async fn remove_relation(
        &self,
        from: &TermId,
        to: &TermId,
        relation_type: &str,
    ) -> Result<MutationOutcome, RelationError> {
        let ty = self.resolve_type(relation_type)?;

        let edges = self.plan(RelationEdge::new(from.clone(), to.clone(), ty.name.clone()));
        let ops: Vec<EdgeOp> = edges.iter().cloned().map(EdgeOp::Remove).collect();
        let applied = self.call(self.store.apply(&ops)).await?;
        let changed = applied.into_iter().filter(|&c| c).count();

        if changed > 0 {
            info!("Removed relation {} ({} edge(s) deleted)", edges[0], changed);
        }

        Ok(MutationOutcome { edges, changed })
    }

    /// Outgoing relations of a term, skipping targets that are gone.
    pub async fn relations_of(&self, term: &TermId) -> Result<Vec<RelatedTerm>, RelationError> {
        self.require_term(term).await?;

        let edges = self.call(self.store.edges_from(term, None)).await?;
        let mut related = Vec::with_capacity(edges.len());

        for edge in edges {
            match self.call(self.store.term(&edge.to)).await? {
                Some(target) if !target.deleted => related.push(RelatedTerm {
                    relation_type: edge.relation_type,
                    term: target.to_ref(),
                }),
                _ => warn!("Skipping relation to missing term {}", edge.to),
            }
        }

        Ok(related)
    }

    /// Finds a live term by fully qualified name.
    pub async fn term_by_fqn(&self, fqn: &str) -> Result<Option<TermRecord>, RelationError> {
        let term = self.call(self.store.term_by_fqn(fqn)).await?;
        Ok(term.filter(|t| !t.deleted))
    }

    /// Edge counts for every registered type, zero included.
    pub async fn usage_counts(&self) -> Result<BTreeMap<String, usize>, RelationError> {
        let stored = self.call(self.store.usage_counts()).await?;

        Ok(self
            .registry
            .all()
            .iter()
            .map(|ty| (ty.name.clone(), stored.get(&ty.name).copied().unwrap_or(0)))
            .collect())
    }

    /// The forward edge followed by its implied reverse edge.
    pub fn plan(&self, edge: RelationEdge) -> Vec<RelationEdge> {
        let inverse = inverse_of(&edge, &self.registry);
        let mut edges = vec![edge];
        edges.extend(inverse);
        edges
    }

    fn resolve_type(&self, name: &str) -> Result<&RelationType, RelationError> {
        self.registry
            .resolve(name)
            .map_err(|_| RelationError::InvalidRelationType(name.to_string()))
    }

    async fn require_term(&self, id: &TermId) -> Result<TermRecord, RelationError> {
        if !self.call(self.store.exists(id)).await? {
            return Err(RelationError::TermNotFound(id.clone()));
        }
        self.call(self.store.term(id))
            .await?
            .ok_or_else(|| RelationError::TermNotFound(id.clone()))
    }

    /// Runs a store call under the configured timeout.
    async fn call<T, F>(&self, fut: F) -> Result<T, RelationError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(RelationError::from),
            Err(_) => {
                warn!("Store call exceeded {:?}", self.timeout);
                Err(RelationError::Unavailable(format!(
                    "store call timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use glossa_core::{GlossaryId, GlossaryRecord};
    use std::collections::HashMap;

    fn service() -> RelationService<MemoryStore> {
        let store = MemoryStore::new();
        let finance = GlossaryRecord::new("g1", "Finance");
        let sales = GlossaryRecord::new("g2", "Sales");
        store.put_glossary(finance.clone()).unwrap();
        store.put_glossary(sales.clone()).unwrap();
        store.put_term(TermRecord::new("a", &finance, "Revenue")).unwrap();
        store.put_term(TermRecord::new("b", &finance, "Income")).unwrap();
        store.put_term(TermRecord::new("x", &sales, "Deal")).unwrap();

        RelationService::new(Arc::new(store), Arc::new(RelationTypeRegistry::builtin()))
    }

    #[tokio::test]
    async fn test_plan_uses_inverse_rule() {
        let service = service();
        let plan = service.plan(RelationEdge::new("a", "b", "calculatedFrom"));

        assert_eq!(
            plan,
            vec![
                RelationEdge::new("a", "b", "calculatedFrom"),
                RelationEdge::new("b", "a", "usedToCalculate"),
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_add_is_noop() {
        let service = service();
        let first = service.add_relation(&"a".into(), &"b".into(), "synonym").await.unwrap();
        let second = service.add_relation(&"a".into(), &"b".into(), "synonym").await.unwrap();

        assert_eq!(first.changed, 2);
        assert!(second.is_noop());
        assert_eq!(service.store().edge_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_self_relation_rejected() {
        let service = service();
        let err = service.add_relation(&"a".into(), &"a".into(), "seeAlso").await.unwrap_err();

        assert_eq!(err, RelationError::SelfRelationNotAllowed("a".into()));
        assert_eq!(service.store().edge_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_type_rejected_before_lookup() {
        let service = service();
        let err = service
            .add_relation(&"a".into(), &"missing".into(), "invalidType")
            .await
            .unwrap_err();

        assert_eq!(err, RelationError::InvalidRelationType("invalidType".into()));
    }

    #[tokio::test]
    async fn test_missing_term() {
        let service = service();
        let err = service.add_relation(&"a".into(), &"zzz".into(), "synonym").await.unwrap_err();
        assert_eq!(err, RelationError::TermNotFound("zzz".into()));
    }

    #[tokio::test]
    async fn test_deleted_term_counts_as_missing() {
        let service = service();
        service.store().delete_term(&"b".into()).unwrap();

        let err = service.add_relation(&"a".into(), &"b".into(), "synonym").await.unwrap_err();
        assert_eq!(err, RelationError::TermNotFound("b".into()));
    }

    #[tokio::test]
    async fn test_cross_glossary_allowed_for_associative_types() {
        let service = service();
        let outcome = service.add_relation(&"a".into(), &"x".into(), "calculatedFrom").await.unwrap();
        assert_eq!(outcome.changed, 2);
    }

    #[tokio::test]
    async fn test_validate_writes_nothing() {
        let service = service();
        let ty = service.validate(&"a".into(), &"b".into(), "synonym").await.unwrap();
        assert_eq!(ty.name, "synonym");

        let err = service.validate(&"a".into(), &"x".into(), "partOf").await.unwrap_err();
        assert!(matches!(err, RelationError::CrossDomainNotAllowed { .. }));
        assert_eq!(service.store().edge_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_unknown_type() {
        let service = service();
        let err = service.remove_relation(&"a".into(), &"b".into(), "nope").await.unwrap_err();
        assert_eq!(err, RelationError::InvalidRelationType("nope".into()));
    }

    #[tokio::test]
    async fn test_relations_of_resolves_targets() {
        let service = service();
        service.add_relation(&"a".into(), &"b".into(), "broader").await.unwrap();

        let related = service.relations_of(&"b".into()).await.unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].relation_type, "narrower");
        assert_eq!(related[0].term.fully_qualified_name, "Finance.Revenue");
    }

    #[tokio::test]
    async fn test_usage_counts_cover_all_types() {
        let service = service();
        service.add_relation(&"a".into(), &"b".into(), "broader").await.unwrap();

        let counts = service.usage_counts().await.unwrap();
        assert_eq!(counts.len(), 10);
        assert_eq!(counts["broader"], 1);
        assert_eq!(counts["narrower"], 1);
        assert_eq!(counts["synonym"], 0);
    }

    /// A store whose writes never finish.
    struct StalledStore(MemoryStore);

    #[async_trait]
    impl crate::store::TermDirectory for StalledStore {
        async fn term(&self, id: &TermId) -> Result<Option<TermRecord>, StoreError> {
            self.0.term(id).await
        }

        async fn term_by_fqn(&self, fqn: &str) -> Result<Option<TermRecord>, StoreError> {
            self.0.term_by_fqn(fqn).await
        }

        async fn glossary(&self, id: &GlossaryId) -> Result<Option<GlossaryRecord>, StoreError> {
            self.0.glossary(id).await
        }

        async fn terms_in_glossary(&self, id: &GlossaryId) -> Result<Vec<TermRecord>, StoreError> {
            self.0.terms_in_glossary(id).await
        }
    }

    #[async_trait]
    impl EdgeStore for StalledStore {
        async fn add_edge(&self, _edge: &RelationEdge) -> Result<bool, StoreError> {
            std::future::pending().await
        }

        async fn remove_edge(&self, _edge: &RelationEdge) -> Result<bool, StoreError> {
            std::future::pending().await
        }

        async fn edges_from(
            &self,
            _term: &TermId,
            _types: Option<&[String]>,
        ) -> Result<Vec<RelationEdge>, StoreError> {
            Ok(Vec::new())
        }

        async fn all_edges(&self) -> Result<Vec<RelationEdge>, StoreError> {
            Ok(Vec::new())
        }

        async fn usage_counts(&self) -> Result<HashMap<String, usize>, StoreError> {
            Ok(HashMap::new())
        }
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_unavailable() {
        let inner = MemoryStore::new();
        let glossary = GlossaryRecord::new("g1", "Finance");
        inner.put_term(TermRecord::new("a", &glossary, "Revenue")).unwrap();
        inner.put_term(TermRecord::new("b", &glossary, "Income")).unwrap();

        let service = RelationService::new(
            Arc::new(StalledStore(inner)),
            Arc::new(RelationTypeRegistry::builtin()),
        )
        .with_timeout(Duration::from_millis(20));

        let err = service.add_relation(&"a".into(), &"b".into(), "seeAlso").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
