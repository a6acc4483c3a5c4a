//! SKOS/RDF export of a glossary.
//!
//! The exporter first builds one format-independent [`TripleSet`], then
//! a writer serializes it. Choosing a format never changes which
//! triples are emitted.

mod exporter;
mod format;
mod model;
pub mod vocab;
mod writer;

pub use exporter::SemanticExporter;
pub use format::RdfFormat;
pub use model::{Node, Triple, TripleSet};
pub use writer::write;
