//! In-memory term graph.
//!
//! TermGraph wraps petgraph and adds indexes for id, FQN and glossary
//! lookups. Terms are never removed from the graph, only flagged as
//! deleted, so node indexes stay stable.

use crate::edge::RelationEdge;
use crate::store::type_matches;
use glossa_core::{GlossaryId, GlossaryRecord, TermId, TermRecord};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// Terms as nodes, relation type names as edge weights.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TermGraph {
    graph: DiGraph<TermRecord, String>,

    /// Maps term ids to graph node indexes.
    id_index: HashMap<TermId, NodeId>,

    /// Maps fully qualified names to node indexes.
    fqn_index: HashMap<String, NodeId>,

    /// Maps glossaries to their member nodes.
    glossary_index: HashMap<GlossaryId, Vec<NodeId>>,

    glossaries: HashMap<GlossaryId, GlossaryRecord>,
}

impl TermGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_glossary(&mut self, glossary: GlossaryRecord) {
        self.glossaries.insert(glossary.id.clone(), glossary);
    }

    pub fn glossary(&self, id: &GlossaryId) -> Option<&GlossaryRecord> {
        self.glossaries.get(id)
    }

    /// Adds a term, or replaces the record of an existing one.
    pub fn add_term(&mut self, term: TermRecord) -> NodeId {
        if let Some(&index) = self.id_index.get(&term.id) {
            let previous = std::mem::replace(&mut self.graph[index], term);
            let current = &self.graph[index];

            if previous.fully_qualified_name != current.fully_qualified_name {
                self.fqn_index.remove(&previous.fully_qualified_name);
                self.fqn_index
                    .insert(current.fully_qualified_name.clone(), index);
            }
            if previous.glossary != current.glossary {
                if let Some(members) = self.glossary_index.get_mut(&previous.glossary) {
                    members.retain(|&i| i != index);
                }
                self.glossary_index
                    .entry(current.glossary.clone())
                    .or_default()
                    .push(index);
            }
            return index;
        }

        let id = term.id.clone();
        let fqn = term.fully_qualified_name.clone();
        let glossary = term.glossary.clone();

        let index = self.graph.add_node(term);

        // Update indexes
        self.id_index.insert(id, index);
        self.fqn_index.insert(fqn, index);
        self.glossary_index.entry(glossary).or_default().push(index);

        index
    }

    /// Flags a term as deleted. Its edges stay in place.
    pub fn mark_deleted(&mut self, id: &TermId) -> bool {
        match self.id_index.get(id) {
            Some(&index) => {
                self.graph[index].deleted = true;
                true
            }
            None => false,
        }
    }

    /// Gets a term by its id.
    pub fn get_by_id(&self, id: &TermId) -> Option<&TermRecord> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    pub fn get_by_fqn(&self, fqn: &str) -> Option<&TermRecord> {
        let index = self.fqn_index.get(fqn)?;
        self.graph.node_weight(*index)
    }

    /// Live terms of a glossary, ordered by FQN.
    pub fn terms_in_glossary(&self, id: &GlossaryId) -> Vec<&TermRecord> {
        let mut terms: Vec<&TermRecord> = self
            .glossary_index
            .get(id)
            .map(|indexes| {
                indexes
                    .iter()
                    .filter_map(|idx| self.graph.node_weight(*idx))
                    .filter(|term| !term.deleted)
                    .collect()
            })
            .unwrap_or_default();

        terms.sort_by(|a, b| a.fully_qualified_name.cmp(&b.fully_qualified_name));
        terms
    }

    fn find_edge(&self, from: NodeId, to: NodeId, relation_type: &str) -> Option<petgraph::graph::EdgeIndex> {
        self.graph
            .edges_connecting(from, to)
            .find(|edge| edge.weight() == relation_type)
            .map(|edge| edge.id())
    }

    pub fn contains_edge(&self, edge: &RelationEdge) -> bool {
        match (self.id_index.get(&edge.from), self.id_index.get(&edge.to)) {
            (Some(&from), Some(&to)) => self.find_edge(from, to, &edge.relation_type).is_some(),
            _ => false,
        }
    }

    /// Inserts an edge if absent.
    ///
    /// Returns `None` if an endpoint is unknown, otherwise whether the
    /// edge was newly added.
    pub fn add_edge(&mut self, edge: &RelationEdge) -> Option<bool> {
        let from = *self.id_index.get(&edge.from)?;
        let to = *self.id_index.get(&edge.to)?;

        if self.find_edge(from, to, &edge.relation_type).is_some() {
            return Some(false);
        }
        self.graph.add_edge(from, to, edge.relation_type.clone());
        Some(true)
    }

    /// Removes an edge. Returns whether it was present.
    pub fn remove_edge(&mut self, edge: &RelationEdge) -> bool {
        let (Some(&from), Some(&to)) = (self.id_index.get(&edge.from), self.id_index.get(&edge.to)) else {
            return false;
        };

        match self.find_edge(from, to, &edge.relation_type) {
            Some(index) => self.graph.remove_edge(index).is_some(),
            None => false,
        }
    }

    /// Outgoing edges of a term, ordered by type then target id.
    pub fn edges_from(&self, id: &TermId, types: Option<&[String]>) -> Vec<RelationEdge> {
        let Some(&index) = self.id_index.get(id) else {
            return Vec::new();
        };

        let mut edges: Vec<RelationEdge> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .filter(|edge| type_matches(types, edge.weight()))
            .map(|edge| RelationEdge {
                from: id.clone(),
                to: self.graph[edge.target()].id.clone(),
                relation_type: edge.weight().clone(),
            })
            .collect();

        edges.sort_by(|a, b| {
            a.relation_type
                .cmp(&b.relation_type)
                .then_with(|| a.to.cmp(&b.to))
        });
        edges
    }

    /// Every edge in the graph.
    pub fn edges(&self) -> Vec<RelationEdge> {
        self.graph
            .edge_references()
            .map(|edge| RelationEdge {
                from: self.graph[edge.source()].id.clone(),
                to: self.graph[edge.target()].id.clone(),
                relation_type: edge.weight().clone(),
            })
            .collect()
    }

    /// Returns the number of terms (including deleted ones).
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
