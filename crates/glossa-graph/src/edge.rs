//! Edge types for the term relation graph.
//!
//! An edge is a directed, typed link between two terms. Edges are
//! unique on `(from, to, relation_type)`; storing the same triple twice
//! is a no-op.

use glossa_core::{RelationTypeRegistry, TermId};
use serde::{Deserialize, Serialize};

/// A stored relation between two terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationEdge {
    pub from: TermId,
    pub to: TermId,
    pub relation_type: String,
}

impl RelationEdge {
    /// Creates a new edge.
    pub fn new(from: impl Into<TermId>, to: impl Into<TermId>, relation_type: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: relation_type.into(),
        }
    }
}

impl std::fmt::Display for RelationEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.from, self.relation_type, self.to)
    }
}

/// The edge implied in the reverse direction, if the type implies one.
///
/// Symmetric types produce the same type reversed; paired types produce
/// their inverse reversed; other types (and unknown ones) produce nothing.
pub fn inverse_of(edge: &RelationEdge, registry: &RelationTypeRegistry) -> Option<RelationEdge> {
    let inverse = registry.inverse_name(&edge.relation_type)?;
    Some(RelationEdge {
        from: edge.to.clone(),
        to: edge.from.clone(),
        relation_type: inverse.to_string(),
    })
}

/// One write against an edge store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeOp {
    Add(RelationEdge),
    Remove(RelationEdge),
}

impl EdgeOp {
    pub fn edge(&self) -> &RelationEdge {
        match self {
            Self::Add(edge) | Self::Remove(edge) => edge,
        }
    }
}

/// A simplified edge for graph export/visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: TermId,
    pub to: TermId,
    pub relation_type: String,
    pub label: String,
    pub color: String,
}

impl GraphEdge {
    /// Decorates a stored edge with its type's label and color.
    pub fn from_edge(edge: &RelationEdge, registry: &RelationTypeRegistry) -> Self {
        let (label, color) = match registry.get(&edge.relation_type) {
            Some(ty) => (ty.display_name.clone(), ty.color.clone()),
            None => (edge.relation_type.clone(), "#667085".to_string()),
        };

        Self {
            from: edge.from.clone(),
            to: edge.to.clone(),
            relation_type: edge.relation_type.clone(),
            label,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_of_paired_type() {
        let registry = RelationTypeRegistry::builtin();
        let edge = RelationEdge::new("a", "b", "broader");

        assert_eq!(
            inverse_of(&edge, &registry),
            Some(RelationEdge::new("b", "a", "narrower"))
        );
    }

    #[test]
    fn test_inverse_of_symmetric_type() {
        let registry = RelationTypeRegistry::builtin();
        let edge = RelationEdge::new("a", "b", "synonym");

        assert_eq!(
            inverse_of(&edge, &registry),
            Some(RelationEdge::new("b", "a", "synonym"))
        );
    }

    #[test]
    fn test_inverse_of_one_way_type() {
        let registry = RelationTypeRegistry::builtin();
        assert_eq!(inverse_of(&RelationEdge::new("a", "b", "seeAlso"), &registry), None);
        assert_eq!(inverse_of(&RelationEdge::new("a", "b", "unknown"), &registry), None);
    }

    #[test]
    fn test_graph_edge_carries_type_style() {
        let registry = RelationTypeRegistry::builtin();
        let edge = GraphEdge::from_edge(&RelationEdge::new("a", "b", "partOf"), &registry);

        assert_eq!(edge.label, "Part Of");
        assert_eq!(edge.color, "#6938ef");
    }
}
