//! Output syntaxes.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdfFormat {
    #[default]
    Turtle,
    RdfXml,
    NTriples,
    JsonLd,
}

impl RdfFormat {
    /// Parses a format name, falling back to Turtle for anything unknown.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Self::Turtle,
            "rdfxml" | "rdf/xml" | "xml" | "rdf" => Self::RdfXml,
            "ntriples" | "n-triples" | "nt" => Self::NTriples,
            "jsonld" | "json-ld" | "json" => Self::JsonLd,
            other => {
                warn!("Unknown RDF format '{}', using turtle", other);
                Self::Turtle
            }
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Turtle => "text/turtle",
            Self::RdfXml => "application/rdf+xml",
            Self::NTriples => "application/n-triples",
            Self::JsonLd => "application/ld+json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Turtle => "ttl",
            Self::RdfXml => "rdf",
            Self::NTriples => "nt",
            Self::JsonLd => "jsonld",
        }
    }
}

impl std::fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Turtle => "turtle",
            Self::RdfXml => "rdfxml",
            Self::NTriples => "ntriples",
            Self::JsonLd => "jsonld",
        };
        write!(f, "{}", s)
    }
}
