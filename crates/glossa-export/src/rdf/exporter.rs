//! Builds the SKOS view of a glossary.

use super::format::RdfFormat;
use super::model::{Node, TripleSet};
use super::vocab::{self, predicate_for};
use super::writer;
use crate::error::ExportError;
use glossa_core::{GlossaryId, RelationTypeRegistry, TermId, TermRecord};
use glossa_graph::EdgeStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Renders glossaries as SKOS concept schemes.
///
/// The glossary becomes a `skos:ConceptScheme` and each live term a
/// `skos:Concept` with its label, definition and synonyms. Parent/child
/// structure maps to `skos:broader`; with relations included the
/// `skos:narrower` side is written as well, along with every typed
/// relation under its mapped predicate.
pub struct SemanticExporter<S: ?Sized> {
    store: Arc<S>,
    registry: Arc<RelationTypeRegistry>,
    base_uri: String,
}

impl<S: EdgeStore + ?Sized> SemanticExporter<S> {
    pub fn new(store: Arc<S>, registry: Arc<RelationTypeRegistry>, base_uri: impl Into<String>) -> Self {
        let mut base_uri = base_uri.into();
        if !base_uri.ends_with('/') && !base_uri.ends_with('#') {
            base_uri.push('/');
        }
        Self {
            store,
            registry,
            base_uri,
        }
    }

    pub fn glossary_iri(&self, id: &GlossaryId) -> String {
        format!("{}glossary/{}", self.base_uri, urlencoding::encode(id.as_str()))
    }

    pub fn term_iri(&self, id: &TermId) -> String {
        format!("{}glossaryTerm/{}", self.base_uri, urlencoding::encode(id.as_str()))
    }

    /// Exports a glossary, parsing `format` leniently.
    pub async fn export_glossary(
        &self,
        glossary: &GlossaryId,
        format: &str,
        include_relations: bool,
    ) -> Result<String, ExportError> {
        self.export_glossary_as(glossary, RdfFormat::parse_lenient(format), include_relations)
            .await
    }

    pub async fn export_glossary_as(
        &self,
        glossary: &GlossaryId,
        format: RdfFormat,
        include_relations: bool,
    ) -> Result<String, ExportError> {
        let triples = self.build_triples(glossary, include_relations).await?;
        info!(
            "Exported glossary {} as {} ({} triples)",
            glossary,
            format,
            triples.len()
        );
        writer::write(&triples, format)
    }

    /// The format-independent triple set for a glossary.
    pub async fn build_triples(
        &self,
        glossary_id: &GlossaryId,
        include_relations: bool,
    ) -> Result<TripleSet, ExportError> {
        let glossary = self
            .store
            .glossary(glossary_id)
            .await?
            .ok_or_else(|| ExportError::GlossaryNotFound(glossary_id.clone()))?;
        let terms = self.store.terms_in_glossary(glossary_id).await?;

        let rdf_type = vocab::rdf("type");
        let scheme = self.glossary_iri(&glossary.id);
        let mut triples = TripleSet::new();

        triples.insert(&scheme, rdf_type.clone(), Node::iri(vocab::skos("ConceptScheme")));
        triples.insert(&scheme, vocab::rdfs("label"), Node::literal(glossary.label()));
        if let Some(description) = non_empty(&glossary.description) {
            triples.insert(&scheme, vocab::skos("definition"), Node::literal(description));
        }

        let members: HashMap<&TermId, &TermRecord> = terms.iter().map(|t| (&t.id, t)).collect();

        for term in &terms {
            let concept = self.term_iri(&term.id);

            triples.insert(&concept, rdf_type.clone(), Node::iri(vocab::skos("Concept")));
            triples.insert(&concept, vocab::skos("prefLabel"), Node::literal(term.label()));
            triples.insert(&concept, vocab::skos("inScheme"), Node::iri(scheme.clone()));
            if let Some(description) = non_empty(&term.description) {
                triples.insert(&concept, vocab::skos("definition"), Node::literal(description));
            }
            for synonym in term.synonyms.iter().filter(|s| !s.trim().is_empty()) {
                triples.insert(&concept, vocab::skos("altLabel"), Node::literal(synonym.clone()));
            }

            match term.parent.as_ref().filter(|p| members.contains_key(p)) {
                Some(parent) => {
                    let parent_iri = self.term_iri(parent);
                    triples.insert(&concept, vocab::skos("broader"), Node::iri(parent_iri.clone()));
                    if include_relations {
                        triples.insert(&parent_iri, vocab::skos("narrower"), Node::iri(concept.clone()));
                    }
                }
                None => {
                    triples.insert(&scheme, vocab::skos("hasTopConcept"), Node::iri(concept.clone()));
                }
            }
        }

        if include_relations {
            for term in &terms {
                self.add_relations(&mut triples, term).await?;
            }
        }

        debug!("Built {} triples for glossary {}", triples.len(), glossary.name);
        Ok(triples)
    }

    async fn add_relations(&self, triples: &mut TripleSet, term: &TermRecord) -> Result<(), ExportError> {
        let concept = self.term_iri(&term.id);

        for edge in self.store.edges_from(&term.id, None).await? {
            let Some(ty) = self.registry.get(&edge.relation_type) else {
                continue;
            };
            let target = match self.store.term(&edge.to).await? {
                Some(target) if !target.deleted => target,
                _ => continue,
            };

            triples.insert(&concept, predicate_for(ty), Node::iri(self.term_iri(&target.id)));

            if ty.name == "synonym" {
                triples.insert(&concept, vocab::skos("altLabel"), Node::literal(target.label()));
            }
        }
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
