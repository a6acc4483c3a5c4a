//! Glossa Server - WebSocket access to the relation engine
//!
//! This crate exposes relation mutations, traversal and exports as
//! JSON-RPC 2.0 methods over WebSocket.
//!
//! The server supports:
//! - Multiple concurrent connections
//! - `relation.add`, `relation.remove`, `relation.list`
//! - `graph.build` for visualization
//! - `types.list`, `types.usage`
//! - `export.rdf`, `export.cell`
//!
//! Validation failures come back as client errors; storage trouble
//! comes back as a retryable server error.

use glossa_core::{GlossaConfig, RelationTypeRegistry};
use glossa_export::SemanticExporter;
use glossa_graph::{EdgeStore, GraphTraversal, RelationService};
use std::sync::Arc;

mod handlers;
mod protocol;
mod server;

pub use protocol::{codes, Request, Response, RpcError};
pub use server::{process_message, GlossaServer, ServerConfig};

/// The services every connection works against.
pub struct Engine {
    pub relations: RelationService<dyn EdgeStore>,
    pub traversal: GraphTraversal<dyn EdgeStore>,
    pub exporter: SemanticExporter<dyn EdgeStore>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn EdgeStore>,
        registry: Arc<RelationTypeRegistry>,
        config: &GlossaConfig,
    ) -> Self {
        let timeout = config.operation_timeout();
        Self {
            relations: RelationService::new(store.clone(), registry.clone()).with_timeout(timeout),
            traversal: GraphTraversal::new(store.clone(), registry.clone())
                .with_timeout(timeout)
                .with_max_nodes(config.max_graph_nodes),
            exporter: SemanticExporter::new(store, registry, config.base_uri.clone()),
        }
    }

    pub fn registry(&self) -> &RelationTypeRegistry {
        self.relations.registry()
    }
}

/// Shared engine state across connections.
pub type SharedEngine = Arc<Engine>;
