//! Request handlers for protocol methods.
//!
//! Each handler implements one method and turns engine failures into
//! error responses.

use crate::protocol::{codes, ExportRdfParams, GraphParams, RelationParams, Response, TermParams};
use crate::SharedEngine;
use glossa_core::{GlossaryId, RelationType, TermId};
use glossa_export::{relations_cell, ExportError, RdfFormat};
use glossa_graph::{MutationOutcome, RelatedTerm, RelationError};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

fn mutation_result(id: Option<Value>, result: Result<MutationOutcome, RelationError>) -> Response {
    match result {
        Ok(outcome) => Response::success(id, outcome),
        Err(e) => Response::from_relation_error(id, &e),
    }
}

fn relation_type_of(engine: &SharedEngine, params: &RelationParams) -> String {
    params
        .relation_type
        .clone()
        .unwrap_or_else(|| engine.registry().default_type().name.clone())
}

fn export_error(id: Option<Value>, err: ExportError) -> Response {
    match err {
        ExportError::GlossaryNotFound(_) => Response::error(id, codes::GLOSSARY_NOT_FOUND, err.to_string()),
        ExportError::Relation(e) => Response::from_relation_error(id, &e),
        ExportError::Store(e) => Response::from_relation_error(id, &RelationError::from(e)),
        other => Response::error(id, codes::INTERNAL_ERROR, other.to_string()),
    }
}

/// Handles the relation.add method.
pub async fn handle_add(engine: SharedEngine, id: Option<Value>, params: RelationParams) -> Response {
    let relation_type = relation_type_of(&engine, &params);
    debug!("relation.add {} -[{}]-> {}", params.from, relation_type, params.to);

    let result = engine
        .relations
        .add_relation(&TermId::new(params.from), &TermId::new(params.to), &relation_type)
        .await;
    mutation_result(id, result)
}

/// Handles the relation.remove method.
pub async fn handle_remove(engine: SharedEngine, id: Option<Value>, params: RelationParams) -> Response {
    let relation_type = relation_type_of(&engine, &params);
    debug!("relation.remove {} -[{}]-> {}", params.from, relation_type, params.to);

    let result = engine
        .relations
        .remove_relation(&TermId::new(params.from), &TermId::new(params.to), &relation_type)
        .await;
    mutation_result(id, result)
}

/// Handles the relation.list method.
pub async fn handle_list(engine: SharedEngine, id: Option<Value>, params: TermParams) -> Response {
    #[derive(Serialize)]
    struct ListResult {
        term: TermId,
        relations: Vec<RelatedTerm>,
    }

    let term = TermId::new(params.term);
    match engine.relations.relations_of(&term).await {
        Ok(relations) => Response::success(id, ListResult { term, relations }),
        Err(e) => Response::from_relation_error(id, &e),
    }
}

/// Handles the graph.build method.
pub async fn handle_graph(engine: SharedEngine, id: Option<Value>, params: GraphParams) -> Response {
    let root = TermId::new(params.term);
    let result = engine
        .traversal
        .build_graph(&root, params.depth, params.relation_types.as_deref())
        .await;

    match result {
        Ok(graph) => {
            debug!(
                "graph.build {} depth {}: {} nodes, {} edges",
                root,
                params.depth,
                graph.node_count(),
                graph.edge_count()
            );
            Response::success(id, graph)
        }
        Err(e) => Response::from_relation_error(id, &e),
    }
}

/// Handles the types.list method.
pub async fn handle_types(engine: SharedEngine, id: Option<Value>) -> Response {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct TypesResult<'a> {
        types: &'a [RelationType],
        default_type: &'a str,
    }

    let registry = engine.registry();
    Response::success(
        id,
        TypesResult {
            types: registry.all(),
            default_type: &registry.default_type().name,
        },
    )
}

/// Handles the types.usage method.
pub async fn handle_usage(engine: SharedEngine, id: Option<Value>) -> Response {
    #[derive(Serialize)]
    struct UsageResult {
        usage: BTreeMap<String, usize>,
        total: usize,
    }

    match engine.relations.usage_counts().await {
        Ok(usage) => {
            let total = usage.values().sum();
            Response::success(id, UsageResult { usage, total })
        }
        Err(e) => Response::from_relation_error(id, &e),
    }
}

/// Handles the export.rdf method.
pub async fn handle_export_rdf(engine: SharedEngine, id: Option<Value>, params: ExportRdfParams) -> Response {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct RdfResult {
        format: RdfFormat,
        mime_type: &'static str,
        document: String,
    }

    let requested = params.format.unwrap_or_else(|| RdfFormat::default().to_string());
    let format = RdfFormat::parse_lenient(&requested);
    let glossary = GlossaryId::new(params.glossary);

    match engine
        .exporter
        .export_glossary_as(&glossary, format, params.include_relations)
        .await
    {
        Ok(document) => Response::success(
            id,
            RdfResult {
                format,
                mime_type: format.mime_type(),
                document,
            },
        ),
        Err(e) => export_error(id, e),
    }
}

/// Handles the export.cell method.
pub async fn handle_export_cell(engine: SharedEngine, id: Option<Value>, params: TermParams) -> Response {
    let term = TermId::new(params.term);
    match relations_cell(&engine.relations, &term).await {
        Ok(cell) => Response::success(id, json!({ "term": term, "cell": cell })),
        Err(e) => export_error(id, e),
    }
}
