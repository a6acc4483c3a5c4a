//! Glossa Export - Moving relations in and out of the engine
//!
//! Two codecs live here:
//!
//! - The tabular codec packs a term's relations into one spreadsheet
//!   cell (`synonym:Finance.Income;Finance.Profit`) and unpacks such
//!   cells during import, one row at a time.
//! - The semantic codec renders a glossary as a SKOS concept scheme in
//!   Turtle, N-Triples, RDF/XML or JSON-LD.
//!
//! Both read through the graph crate's store traits and never write
//! edges except via [`RelationService`](glossa_graph::RelationService).

mod error;
mod import;
pub mod rdf;
mod tabular;

pub use error::ExportError;
pub use import::{ImportReport, ImportRow, RelationImporter, RowFailure};
pub use rdf::{RdfFormat, SemanticExporter};
pub use tabular::{relations_cell, CellEntry, TabularCodec, ENTRY_DELIMITER, TYPE_SEPARATOR};
