use futures_util::{SinkExt, StreamExt};
use glossa_core::{GlossaConfig, GlossaryRecord, RelationTypeRegistry, TermRecord};
use glossa_graph::{EdgeStore, MemoryStore};
use glossa_server::{codes, process_message, Engine, GlossaServer, Response, ServerConfig, SharedEngine};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Finance: revenue, income, profit. Sales: deal.
fn engine() -> Engine {
    let store = MemoryStore::new();
    let finance = GlossaryRecord::new("finance", "Finance");
    let sales = GlossaryRecord::new("sales", "Sales");
    store.put_glossary(finance.clone()).unwrap();
    store.put_glossary(sales.clone()).unwrap();
    store.put_term(TermRecord::new("revenue", &finance, "Revenue")).unwrap();
    store.put_term(TermRecord::new("income", &finance, "Income")).unwrap();
    store.put_term(TermRecord::new("profit", &finance, "Profit")).unwrap();
    store.put_term(TermRecord::new("deal", &sales, "Deal")).unwrap();

    let store: Arc<dyn EdgeStore> = Arc::new(store);
    Engine::new(store, Arc::new(RelationTypeRegistry::builtin()), &GlossaConfig::default())
}

async fn call(engine: &SharedEngine, method: &str, params: Value) -> Response {
    let request = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
    process_message(&request.to_string(), engine.clone()).await
}

fn error_code(response: &Response) -> i32 {
    response.error.as_ref().map(|e| e.code).unwrap_or(0)
}

#[tokio::test]
async fn test_add_synonym_is_visible_from_both_sides() {
    let engine = Arc::new(engine());

    let added = call(
        &engine,
        "relation.add",
        json!({ "from": "revenue", "to": "profit", "relationType": "synonym" }),
    )
    .await;
    assert!(!added.is_error());
    assert_eq!(added.result.as_ref().unwrap()["changed"], 2);

    let listed = call(&engine, "relation.list", json!({ "term": "profit" })).await;
    let relations = listed.result.unwrap()["relations"].clone();
    assert_eq!(relations[0]["relationType"], "synonym");
    assert_eq!(relations[0]["term"]["fullyQualifiedName"], "Finance.Revenue");

    let again = call(
        &engine,
        "relation.add",
        json!({ "from": "revenue", "to": "profit", "relationType": "synonym" }),
    )
    .await;
    assert_eq!(again.result.unwrap()["changed"], 0);

    let removed = call(
        &engine,
        "relation.remove",
        json!({ "from": "profit", "to": "revenue", "relationType": "synonym" }),
    )
    .await;
    assert_eq!(removed.result.unwrap()["changed"], 2);
}

#[tokio::test]
async fn test_missing_type_uses_default() {
    let engine = Arc::new(engine());
    let added = call(&engine, "relation.add", json!({ "from": "revenue", "to": "deal" })).await;
    let result = added.result.unwrap();
    assert_eq!(result["edges"][0]["relationType"], "relatedTo");
    assert_eq!(result["changed"], 2);
}

#[tokio::test]
async fn test_validation_failures_map_to_codes() {
    let engine = Arc::new(engine());

    let cases = [
        (json!({ "from": "revenue", "to": "profit", "relationType": "bogus" }), codes::INVALID_RELATION_TYPE),
        (json!({ "from": "revenue", "to": "missing" }), codes::TERM_NOT_FOUND),
        (json!({ "from": "revenue", "to": "revenue" }), codes::SELF_RELATION),
        (json!({ "from": "revenue", "to": "deal", "relationType": "broader" }), codes::CROSS_DOMAIN),
    ];

    for (params, expected) in cases {
        let response = call(&engine, "relation.add", params).await;
        assert_eq!(error_code(&response), expected);
        let data = response.error.unwrap().data.unwrap();
        assert_eq!(data["retryable"], false);
    }

    let usage = call(&engine, "types.usage", Value::Null).await;
    assert_eq!(usage.result.unwrap()["total"], 0);
}

#[tokio::test]
async fn test_protocol_errors() {
    let engine = Arc::new(engine());

    let parse = process_message("{not json", engine.clone()).await;
    assert_eq!(error_code(&parse), codes::PARSE_ERROR);

    let unknown = call(&engine, "relation.merge", json!({})).await;
    assert_eq!(error_code(&unknown), codes::METHOD_NOT_FOUND);

    let bad = call(&engine, "relation.add", json!({ "from": "revenue" })).await;
    assert_eq!(error_code(&bad), codes::INVALID_PARAMS);
}

#[tokio::test]
async fn test_graph_build_and_types() {
    let engine = Arc::new(engine());
    call(&engine, "relation.add", json!({ "from": "revenue", "to": "income", "relationType": "narrower" })).await;
    call(&engine, "relation.add", json!({ "from": "income", "to": "profit", "relationType": "seeAlso" })).await;

    let shallow = call(&engine, "graph.build", json!({ "term": "revenue", "depth": 1 })).await;
    let graph = shallow.result.unwrap();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(graph["truncated"], false);

    let deep = call(&engine, "graph.build", json!({ "term": "revenue" })).await;
    assert_eq!(deep.result.unwrap()["nodes"].as_array().unwrap().len(), 3);

    let filtered = call(
        &engine,
        "graph.build",
        json!({ "term": "revenue", "relationTypes": ["unknownType"] }),
    )
    .await;
    assert_eq!(error_code(&filtered), codes::INVALID_RELATION_TYPE);

    let types = call(&engine, "types.list", Value::Null).await.result.unwrap();
    assert_eq!(types["types"].as_array().unwrap().len(), 10);
    assert_eq!(types["defaultType"], "relatedTo");

    let usage = call(&engine, "types.usage", Value::Null).await.result.unwrap();
    assert_eq!(usage["usage"]["narrower"], 1);
    assert_eq!(usage["usage"]["broader"], 1);
    assert_eq!(usage["usage"]["seeAlso"], 1);
    assert_eq!(usage["usage"]["antonym"], 0);
}

#[tokio::test]
async fn test_exports() {
    let engine = Arc::new(engine());
    call(&engine, "relation.add", json!({ "from": "revenue", "to": "profit", "relationType": "synonym" })).await;

    let cell = call(&engine, "export.cell", json!({ "term": "revenue" })).await;
    assert_eq!(cell.result.unwrap()["cell"], "synonym:Finance.Profit");

    let rdf = call(&engine, "export.rdf", json!({ "glossary": "finance", "format": "nt" })).await;
    let result = rdf.result.unwrap();
    assert_eq!(result["mimeType"], "application/n-triples");
    assert!(result["document"].as_str().unwrap().contains("exactMatch"));

    let default = call(&engine, "export.rdf", json!({ "glossary": "finance" })).await;
    assert_eq!(default.result.unwrap()["format"], "turtle");

    // An unknown format falls back to turtle, and the reported format
    // matches the document actually produced.
    let fallback = call(&engine, "export.rdf", json!({ "glossary": "finance", "format": "yaml" })).await;
    let fallback = fallback.result.unwrap();
    assert_eq!(fallback["format"], "turtle");
    assert_eq!(fallback["mimeType"], "text/turtle");
    assert!(fallback["document"].as_str().unwrap().contains("@prefix skos:"));

    let missing = call(&engine, "export.rdf", json!({ "glossary": "nope" })).await;
    assert_eq!(error_code(&missing), codes::GLOSSARY_NOT_FOUND);
}

#[tokio::test]
async fn test_websocket_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GlossaServer::new(engine(), ServerConfig { addr });
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}", addr))
        .await
        .unwrap();
    let request = json!({ "jsonrpc": "2.0", "id": 42, "method": "types.list" });
    ws.send(Message::Text(request.to_string())).await.unwrap();

    let reply = loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => break text,
            _ => continue,
        }
    };
    let response: Value = serde_json::from_str(&reply).unwrap();
    assert_eq!(response["id"], 42);
    assert_eq!(response["result"]["defaultType"], "relatedTo");
}
