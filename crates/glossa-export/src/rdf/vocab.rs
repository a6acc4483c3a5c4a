//! Namespaces and predicates used in exports.

use glossa_core::RelationType;

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const DCT: &str = "http://purl.org/dc/terms/";

/// Glossa's own namespace for relation types with no SKOS counterpart.
pub const OM: &str = "https://open-metadata.org/ontology/";

/// Prefixes declared in Turtle, RDF/XML and JSON-LD output.
pub const PREFIXES: [(&str, &str); 5] = [
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("skos", SKOS),
    ("dct", DCT),
    ("om", OM),
];

pub fn rdf(local: &str) -> String {
    format!("{}{}", RDF, local)
}

pub fn rdfs(local: &str) -> String {
    format!("{}{}", RDFS, local)
}

pub fn skos(local: &str) -> String {
    format!("{}{}", SKOS, local)
}

/// Expands `prefix:local` for a known prefix; anything else is returned as is.
pub fn expand(curie_or_iri: &str) -> String {
    if let Some((prefix, local)) = curie_or_iri.split_once(':') {
        if let Some((_, ns)) = PREFIXES.iter().find(|(p, _)| *p == prefix) {
            return format!("{}{}", ns, local);
        }
    }
    curie_or_iri.to_string()
}

/// Shortens an IRI to `prefix:local` when a known namespace covers it
/// and the local part is a plain name.
pub fn compact(iri: &str) -> Option<String> {
    PREFIXES.iter().find_map(|(prefix, ns)| {
        let local = iri.strip_prefix(*ns)?;
        let plain = !local.is_empty()
            && local
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        plain.then(|| format!("{}:{}", prefix, local))
    })
}

/// The predicate IRI a relation type exports as.
///
/// A configured `rdfPredicate` wins; otherwise the hierarchy types map
/// to SKOS and everything else lands in the `om:` namespace.
pub fn predicate_for(ty: &RelationType) -> String {
    if let Some(predicate) = &ty.rdf_predicate {
        return expand(predicate);
    }
    match ty.name.as_str() {
        "broader" | "narrower" => skos(&ty.name),
        "relatedTo" | "related" => skos("related"),
        "synonym" => skos("exactMatch"),
        "seeAlso" => rdfs("seeAlso"),
        other => format!("{}{}", OM, other),
    }
}

/// True for predicates that express hierarchy.
pub fn is_hierarchy(predicate: &str) -> bool {
    predicate == skos("broader") || predicate == skos("narrower")
}
