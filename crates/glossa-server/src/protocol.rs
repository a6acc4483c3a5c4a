//! JSON-RPC 2.0 message types and method parameters.

use glossa_graph::RelationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Error codes used in responses.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub const GLOSSARY_NOT_FOUND: i32 = -32001;
    pub const INVALID_RELATION_TYPE: i32 = -32010;
    pub const TERM_NOT_FOUND: i32 = -32011;
    pub const SELF_RELATION: i32 = -32012;
    pub const CROSS_DOMAIN: i32 = -32013;
    pub const UNAVAILABLE: i32 = -32050;
}

/// An incoming request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

/// An outgoing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn success<T: Serialize>(id: Option<Value>, result: T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: "2.0".to_string(),
                result: Some(value),
                error: None,
                id,
            },
            Err(e) => Self::error(id, codes::INTERNAL_ERROR, e.to_string()),
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.data = Some(data);
        }
        self
    }

    pub fn parse_error() -> Self {
        Self::error(None, codes::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_params(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, codes::INVALID_PARAMS, message)
    }

    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, codes::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    /// Maps a relation failure to its error code.
    ///
    /// Only `Unavailable` is flagged retryable in `data`.
    pub fn from_relation_error(id: Option<Value>, err: &RelationError) -> Self {
        let code = match err {
            RelationError::InvalidRelationType(_) => codes::INVALID_RELATION_TYPE,
            RelationError::TermNotFound(_) => codes::TERM_NOT_FOUND,
            RelationError::SelfRelationNotAllowed(_) => codes::SELF_RELATION,
            RelationError::CrossDomainNotAllowed { .. } => codes::CROSS_DOMAIN,
            RelationError::Unavailable(_) => codes::UNAVAILABLE,
        };
        Self::error(id, code, err.to_string()).with_data(json!({ "retryable": err.is_retryable() }))
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Method parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for `relation.add` and `relation.remove`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationParams {
    pub from: String,
    pub to: String,

    /// Falls back to the registry default when absent.
    #[serde(default)]
    pub relation_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermParams {
    pub term: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphParams {
    pub term: String,
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default)]
    pub relation_types: Option<Vec<String>>,
}

fn default_depth() -> usize {
    2
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRdfParams {
    pub glossary: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default = "default_include_relations")]
    pub include_relations: bool,
}

fn default_include_relations() -> bool {
    true
}
