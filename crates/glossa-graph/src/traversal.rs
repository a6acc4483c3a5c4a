//! Bounded neighborhood graphs for visualization.
//!
//! Breadth-first expansion from a root term, following outgoing edges
//! up to a hop limit. A visited set keyed by term id guarantees
//! termination on cyclic data; the engine never prevents cycles at
//! write time.

use crate::edge::{GraphEdge, RelationEdge};
use crate::error::{RelationError, StoreError};
use crate::mutation::DEFAULT_OPERATION_TIMEOUT;
use crate::store::EdgeStore;
use glossa_core::{RelationTypeRegistry, TermId, TermRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A term in a traversal result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: TermId,
    pub label: String,
    pub fully_qualified_name: String,

    /// Hops from the root.
    pub depth: usize,

    /// True if no returned edge touches this node.
    pub isolated: bool,
}

/// Nodes and edges reachable from a root term.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRelationGraph {
    pub root: TermId,

    /// Nodes in discovery order, root first.
    pub nodes: Vec<GraphNode>,

    pub edges: Vec<GraphEdge>,

    pub max_depth: usize,

    /// Set when the node cap cut the expansion short.
    pub truncated: bool,

    /// Time taken in milliseconds.
    pub query_time_ms: u64,
}

impl TermRelationGraph {
    pub fn contains(&self, id: &TermId) -> bool {
        self.nodes.iter().any(|node| &node.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Builds [`TermRelationGraph`]s from an [`EdgeStore`].
pub struct GraphTraversal<S: ?Sized> {
    store: Arc<S>,
    registry: Arc<RelationTypeRegistry>,
    timeout: Duration,
    max_nodes: Option<usize>,
}

impl<S: ?Sized> Clone for GraphTraversal<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            registry: Arc::clone(&self.registry),
            timeout: self.timeout,
            max_nodes: self.max_nodes,
        }
    }
}

impl<S: EdgeStore + ?Sized> GraphTraversal<S> {
    pub fn new(store: Arc<S>, registry: Arc<RelationTypeRegistry>) -> Self {
        Self {
            store,
            registry,
            timeout: DEFAULT_OPERATION_TIMEOUT,
            max_nodes: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Caps the number of nodes a single traversal may return.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Expands from `root` for at most `max_depth` hops.
    ///
    /// `types` restricts which relation types are followed; `None` or an
    /// empty list follows all of them. `max_depth = 0` yields the root
    /// alone. Every node is expanded once, so each edge appears once.
    pub async fn build_graph(
        &self,
        root: &TermId,
        max_depth: usize,
        types: Option<&[String]>,
    ) -> Result<TermRelationGraph, RelationError> {
        let start = Instant::now();

        if let Some(types) = types {
            if let Some(unknown) = types.iter().find(|t| !self.registry.is_valid(t)) {
                return Err(RelationError::InvalidRelationType(unknown.clone()));
            }
        }

        let root_term = match self.call(self.store.term(root)).await? {
            Some(term) if !term.deleted => term,
            _ => return Err(RelationError::TermNotFound(root.clone())),
        };

        let mut records: Vec<(TermRecord, usize)> = vec![(root_term, 0)];
        let mut visited: HashSet<TermId> = HashSet::new();
        let mut queue: VecDeque<(TermId, usize)> = VecDeque::new();
        let mut edges: Vec<RelationEdge> = Vec::new();
        let mut truncated = false;

        visited.insert(root.clone());
        queue.push_back((root.clone(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            for edge in self.call(self.store.edges_from(&current, types)).await? {
                if !visited.contains(&edge.to) {
                    if self.max_nodes.is_some_and(|cap| records.len() >= cap) {
                        truncated = true;
                        continue;
                    }

                    match self.call(self.store.term(&edge.to)).await? {
                        Some(term) if !term.deleted => {
                            visited.insert(edge.to.clone());
                            queue.push_back((edge.to.clone(), depth + 1));
                            records.push((term, depth + 1));
                        }
                        _ => {
                            warn!("Skipping edge {} to missing term", edge);
                            continue;
                        }
                    }
                }
                edges.push(edge);
            }
        }

        if truncated {
            debug!("Traversal from {} truncated at {} nodes", root, records.len());
        }

        let mut degree: HashMap<&TermId, usize> = HashMap::new();
        for edge in &edges {
            *degree.entry(&edge.from).or_insert(0) += 1;
            *degree.entry(&edge.to).or_insert(0) += 1;
        }

        let nodes = records
            .iter()
            .map(|(term, depth)| GraphNode {
                id: term.id.clone(),
                label: term.label(),
                fully_qualified_name: term.fully_qualified_name.clone(),
                depth: *depth,
                isolated: !degree.contains_key(&term.id),
            })
            .collect();

        let edges = edges
            .iter()
            .map(|edge| GraphEdge::from_edge(edge, &self.registry))
            .collect();

        Ok(TermRelationGraph {
            root: root.clone(),
            nodes,
            edges,
            max_depth,
            truncated,
            query_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, RelationError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(RelationError::from),
            Err(_) => Err(RelationError::Unavailable(format!(
                "store call timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use glossa_core::GlossaryRecord;

    fn store_with(ids: &[&str]) -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        let glossary = GlossaryRecord::new("g1", "Finance");
        store.put_glossary(glossary.clone()).unwrap();
        for id in ids {
            store.put_term(TermRecord::new(*id, &glossary, *id)).unwrap();
        }
        Arc::new(store)
    }

    async fn link(store: &MemoryStore, from: &str, to: &str, ty: &str) {
        store.add_edge(&RelationEdge::new(from, to, ty)).await.unwrap();
    }

    #[tokio::test]
    async fn test_isolated_root() {
        let store = store_with(&["a"]);
        let traversal = GraphTraversal::new(store, Arc::new(RelationTypeRegistry::builtin()));

        let graph = traversal.build_graph(&"a".into(), 3, None).await.unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.nodes[0].isolated);
    }

    #[tokio::test]
    async fn test_zero_depth_returns_root_only() {
        let store = store_with(&["a", "b"]);
        link(&store, "a", "b", "seeAlso").await;
        let traversal = GraphTraversal::new(store, Arc::new(RelationTypeRegistry::builtin()));

        let graph = traversal.build_graph(&"a".into(), 0, None).await.unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[tokio::test]
    async fn test_type_filter() {
        let store = store_with(&["a", "b", "c"]);
        link(&store, "a", "b", "seeAlso").await;
        link(&store, "a", "c", "antonym").await;
        let traversal = GraphTraversal::new(store, Arc::new(RelationTypeRegistry::builtin()));

        let filter = vec!["antonym".to_string()];
        let graph = traversal.build_graph(&"a".into(), 2, Some(&filter)).await.unwrap();
        assert!(graph.contains(&"c".into()));
        assert!(!graph.contains(&"b".into()));
        assert_eq!(graph.edges[0].label, "Antonym");
    }

    #[tokio::test]
    async fn test_unknown_filter_type() {
        let store = store_with(&["a"]);
        let traversal = GraphTraversal::new(store, Arc::new(RelationTypeRegistry::builtin()));

        let filter = vec!["bogus".to_string()];
        let err = traversal.build_graph(&"a".into(), 2, Some(&filter)).await.unwrap_err();
        assert_eq!(err, RelationError::InvalidRelationType("bogus".into()));
    }

    #[tokio::test]
    async fn test_missing_root() {
        let store = store_with(&[]);
        let traversal = GraphTraversal::new(store, Arc::new(RelationTypeRegistry::builtin()));

        let err = traversal.build_graph(&"nope".into(), 2, None).await.unwrap_err();
        assert_eq!(err, RelationError::TermNotFound("nope".into()));
    }

    #[tokio::test]
    async fn test_node_cap_truncates() {
        let store = store_with(&["hub", "s1", "s2", "s3"]);
        for spoke in ["s1", "s2", "s3"] {
            link(&store, "hub", spoke, "seeAlso").await;
        }
        let traversal = GraphTraversal::new(store, Arc::new(RelationTypeRegistry::builtin()))
            .with_max_nodes(2);

        let graph = traversal.build_graph(&"hub".into(), 1, None).await.unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.truncated);
    }

    #[tokio::test]
    async fn test_deleted_targets_are_skipped() {
        let store = store_with(&["a", "b"]);
        link(&store, "a", "b", "seeAlso").await;
        store.delete_term(&"b".into()).unwrap();
        let traversal = GraphTraversal::new(store, Arc::new(RelationTypeRegistry::builtin()));

        let graph = traversal.build_graph(&"a".into(), 2, None).await.unwrap();
        assert_eq!(graph.node_count(), 1);
        assert!(graph.nodes[0].isolated);
    }
}
