//! Glossa Graph - Typed relations between glossary terms
//!
//! This crate owns the relation edges. It validates every mutation
//! against the relation type registry, keeps symmetric and inverse
//! edges in step, and walks the resulting graph for visualization.
//!
//! # Architecture
//!
//! - [`EdgeStore`] is the storage seam. Two adapters ship here: an
//!   in-memory petgraph store for tests and embedding, and a sled store
//!   that writes both halves of a relation in one transaction.
//! - [`RelationService`] adds and removes relations.
//! - [`GraphTraversal`] builds bounded neighborhood graphs.
//!
//! # Example
//!
//! ```no_run
//! use glossa_core::{GlossaryRecord, RelationTypeRegistry, TermRecord};
//! use glossa_graph::{MemoryStore, RelationService};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let finance = GlossaryRecord::new("g1", "Finance");
//! store.put_glossary(finance.clone())?;
//! store.put_term(TermRecord::new("revenue", &finance, "Revenue"))?;
//! store.put_term(TermRecord::new("income", &finance, "Income"))?;
//!
//! let service = RelationService::new(store, Arc::new(RelationTypeRegistry::builtin()));
//! service.add_relation(&"revenue".into(), &"income".into(), "synonym").await?;
//! # Ok(())
//! # }
//! ```

mod edge;
mod error;
mod graph;
mod memory;
mod mutation;
mod sled_store;
mod store;
mod traversal;

pub use edge::{inverse_of, EdgeOp, GraphEdge, RelationEdge};
pub use error::{RelationError, StoreError};
pub use graph::TermGraph;
pub use memory::MemoryStore;
pub use mutation::{MutationOutcome, RelatedTerm, RelationService};
pub use sled_store::SledEdgeStore;
pub use store::{EdgeStore, TermDirectory};
pub use traversal::{GraphNode, GraphTraversal, TermRelationGraph};
