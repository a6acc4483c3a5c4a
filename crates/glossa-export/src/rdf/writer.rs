//! Serializers for a [`TripleSet`].

use super::format::RdfFormat;
use super::model::{Node, Triple, TripleSet};
use super::vocab::{self, PREFIXES};
use crate::error::ExportError;
use quick_xml::escape::escape;
use serde_json::{json, Map, Value};

/// Serializes `triples` in the requested syntax.
pub fn write(triples: &TripleSet, format: RdfFormat) -> Result<String, ExportError> {
    match format {
        RdfFormat::Turtle => Ok(turtle(triples)),
        RdfFormat::NTriples => Ok(ntriples(triples)),
        RdfFormat::RdfXml => Ok(rdf_xml(triples)),
        RdfFormat::JsonLd => json_ld(triples),
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// N-Triples
// ─────────────────────────────────────────────────────────────────────────────

fn ntriples(triples: &TripleSet) -> String {
    let mut out = String::new();
    for triple in triples.iter() {
        let object = match &triple.object {
            Node::Iri(iri) => format!("<{}>", iri),
            Node::Literal(value) => escape_literal(value),
        };
        out.push_str(&format!("<{}> <{}> {} .\n", triple.subject, triple.predicate, object));
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Turtle
// ─────────────────────────────────────────────────────────────────────────────

fn turtle_iri(iri: &str) -> String {
    vocab::compact(iri).unwrap_or_else(|| format!("<{}>", iri))
}

fn turtle(triples: &TripleSet) -> String {
    let mut out = String::new();
    for (prefix, ns) in PREFIXES {
        out.push_str(&format!("@prefix {}: <{}> .\n", prefix, ns));
    }

    let rdf_type = vocab::rdf("type");
    for (subject, group) in triples.by_subject() {
        out.push('\n');
        out.push_str(&turtle_iri(subject));

        let last = group.len().saturating_sub(1);
        for (i, triple) in group.iter().enumerate() {
            let predicate = if triple.predicate == rdf_type {
                "a".to_string()
            } else {
                turtle_iri(&triple.predicate)
            };
            let object = match &triple.object {
                Node::Iri(iri) => turtle_iri(iri),
                Node::Literal(value) => escape_literal(value),
            };
            let end = if i == last { " ." } else { " ;" };
            out.push_str(&format!("\n    {} {}{}", predicate, object, end));
        }
        out.push('\n');
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// RDF/XML
// ─────────────────────────────────────────────────────────────────────────────

/// Splits an IRI into namespace and local name at the last `#` or `/`.
fn split_iri(iri: &str) -> (&str, &str) {
    match iri.rfind(|c: char| c == '#' || c == '/') {
        Some(i) if i + 1 < iri.len() => (&iri[..=i], &iri[i + 1..]),
        _ => (iri, ""),
    }
}

/// Qualified names for predicates, declaring extra namespaces as needed.
struct QNames {
    extra: Vec<(String, String)>,
}

impl QNames {
    fn collect(triples: &TripleSet) -> Self {
        let mut extra: Vec<(String, String)> = Vec::new();
        for triple in triples.iter() {
            if vocab::compact(&triple.predicate).is_some() {
                continue;
            }
            let (ns, _) = split_iri(&triple.predicate);
            if !extra.iter().any(|(_, known)| known == ns) {
                extra.push((format!("ns{}", extra.len()), ns.to_string()));
            }
        }
        Self { extra }
    }

    fn qname(&self, iri: &str) -> String {
        if let Some(qname) = vocab::compact(iri) {
            return qname;
        }
        let (ns, local) = split_iri(iri);
        let prefix = self
            .extra
            .iter()
            .find(|(_, known)| known == ns)
            .map(|(prefix, _)| prefix.as_str())
            .unwrap_or("ns");
        format!("{}:{}", prefix, local)
    }
}

fn rdf_xml(triples: &TripleSet) -> String {
    let qnames = QNames::collect(triples);

    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rdf:RDF");
    for (prefix, ns) in PREFIXES {
        out.push_str(&format!("\n    xmlns:{}=\"{}\"", prefix, escape(ns)));
    }
    for (prefix, ns) in &qnames.extra {
        out.push_str(&format!("\n    xmlns:{}=\"{}\"", prefix, escape(ns.as_str())));
    }
    out.push_str(">\n");

    for (subject, group) in triples.by_subject() {
        out.push_str(&format!(
            "  <rdf:Description rdf:about=\"{}\">\n",
            escape(subject)
        ));
        for triple in group {
            out.push_str(&xml_property(&qnames, triple));
        }
        out.push_str("  </rdf:Description>\n");
    }

    out.push_str("</rdf:RDF>\n");
    out
}

fn xml_property(qnames: &QNames, triple: &Triple) -> String {
    let name = qnames.qname(&triple.predicate);
    match &triple.object {
        Node::Iri(iri) => format!("    <{} rdf:resource=\"{}\"/>\n", name, escape(iri.as_str())),
        Node::Literal(value) => format!("    <{}>{}</{}>\n", name, escape(value.as_str()), name),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON-LD
// ─────────────────────────────────────────────────────────────────────────────

fn json_ld_iri(iri: &str) -> String {
    vocab::compact(iri).unwrap_or_else(|| iri.to_string())
}

fn json_ld(triples: &TripleSet) -> Result<String, ExportError> {
    let context: Map<String, Value> = PREFIXES
        .iter()
        .map(|(prefix, ns)| (prefix.to_string(), Value::String(ns.to_string())))
        .collect();

    let rdf_type = vocab::rdf("type");
    let mut graph = Vec::new();

    for (subject, group) in triples.by_subject() {
        let mut node = Map::new();
        node.insert("@id".into(), Value::String(json_ld_iri(subject)));

        for triple in group {
            if triple.predicate == rdf_type {
                if let Node::Iri(iri) = &triple.object {
                    push_value(&mut node, "@type", Value::String(json_ld_iri(iri)));
                    continue;
                }
            }
            let value = match &triple.object {
                Node::Iri(iri) => json!({ "@id": json_ld_iri(iri) }),
                Node::Literal(value) => json!({ "@value": value }),
            };
            push_value(&mut node, &json_ld_iri(&triple.predicate), value);
        }
        graph.push(Value::Object(node));
    }

    let document = json!({
        "@context": context,
        "@graph": graph,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

fn push_value(node: &mut Map<String, Value>, key: &str, value: Value) {
    match node.get_mut(key) {
        Some(Value::Array(values)) => values.push(value),
        _ => {
            node.insert(key.to_string(), Value::Array(vec![value]));
        }
    }
}
