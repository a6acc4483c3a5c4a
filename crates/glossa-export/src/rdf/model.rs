//! A minimal RDF data model.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Iri(String),
    Literal(String),
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }
}

/// A statement. Subjects and predicates are always IRIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Node,
}

/// An insertion-ordered set of triples.
#[derive(Debug, Clone, Default)]
pub struct TripleSet {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
}

impl TripleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple unless it is already present.
    pub fn insert(&mut self, subject: &str, predicate: impl Into<String>, object: Node) -> bool {
        let triple = Triple {
            subject: subject.to_string(),
            predicate: predicate.into(),
            object,
        };
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn contains(&self, subject: &str, predicate: &str, object: &Node) -> bool {
        self.triples
            .iter()
            .any(|t| t.subject == subject && t.predicate == predicate && &t.object == object)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Subjects in first-seen order, each with its triples.
    pub fn by_subject(&self) -> Vec<(&str, Vec<&Triple>)> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: std::collections::HashMap<&str, Vec<&Triple>> = Default::default();

        for triple in &self.triples {
            let group = groups.entry(triple.subject.as_str()).or_default();
            if group.is_empty() {
                order.push(triple.subject.as_str());
            }
            group.push(triple);
        }

        order
            .into_iter()
            .map(|subject| (subject, groups.remove(subject).unwrap_or_default()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_dropped() {
        let mut set = TripleSet::new();
        assert!(set.insert("s", "p", Node::literal("o")));
        assert!(!set.insert("s", "p", Node::literal("o")));
        assert!(set.insert("s", "p", Node::iri("o")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_grouping_keeps_first_seen_order() {
        let mut set = TripleSet::new();
        set.insert("b", "p", Node::literal("1"));
        set.insert("a", "p", Node::literal("2"));
        set.insert("b", "q", Node::literal("3"));

        let groups = set.by_subject();
        assert_eq!(groups[0].0, "b");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "a");
    }
}
