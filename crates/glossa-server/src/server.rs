//! WebSocket server implementation.
//!
//! Handles client connections and routes messages to handlers.

use crate::handlers::{
    handle_add, handle_export_cell, handle_export_rdf, handle_graph, handle_list, handle_remove,
    handle_types, handle_usage,
};
use crate::protocol::{ExportRdfParams, GraphParams, RelationParams, Request, Response, TermParams};
use crate::{Engine, SharedEngine};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Server configuration.
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 7433)),
        }
    }
}

/// The Glossa WebSocket server.
pub struct GlossaServer {
    config: ServerConfig,
    engine: SharedEngine,
}

impl GlossaServer {
    pub fn new(engine: Engine, config: ServerConfig) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> SharedEngine {
        self.engine.clone()
    }

    /// Binds the configured address and serves forever.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!("Glossa server listening on {}", listener.local_addr()?);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let engine = self.engine.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, engine).await {
                            error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    engine: SharedEngine,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = accept_async(stream).await?;
    info!("WebSocket connection established with {}", addr);

    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!("Message error from {}: {}", addr, e);
                break;
            }
        };

        if msg.is_close() {
            debug!("Client {} disconnected", addr);
            break;
        }

        if msg.is_ping() {
            write.send(Message::Pong(msg.into_data())).await?;
            continue;
        }

        if msg.is_text() {
            let text = msg.to_text().unwrap_or("");
            let response = process_message(text, engine.clone()).await;
            let json = serde_json::to_string(&response)?;
            write.send(Message::Text(json)).await?;
        }
    }

    info!("Connection closed: {}", addr);
    Ok(())
}

/// Parses one JSON-RPC message and routes it to its handler.
pub async fn process_message(text: &str, engine: SharedEngine) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(_) => return Response::parse_error(),
    };

    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Processing method: {}", method);

    match method {
        "relation.add" => match serde_json::from_value::<RelationParams>(request.params) {
            Ok(params) => handle_add(engine, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "relation.remove" => match serde_json::from_value::<RelationParams>(request.params) {
            Ok(params) => handle_remove(engine, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "relation.list" => match serde_json::from_value::<TermParams>(request.params) {
            Ok(params) => handle_list(engine, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "graph.build" => match serde_json::from_value::<GraphParams>(request.params) {
            Ok(params) => handle_graph(engine, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "types.list" => handle_types(engine, id).await,

        "types.usage" => handle_usage(engine, id).await,

        "export.rdf" => match serde_json::from_value::<ExportRdfParams>(request.params) {
            Ok(params) => handle_export_rdf(engine, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        "export.cell" => match serde_json::from_value::<TermParams>(request.params) {
            Ok(params) => handle_export_cell(engine, id, params).await,
            Err(e) => Response::invalid_params(id, e.to_string()),
        },

        _ => Response::method_not_found(id, method),
    }
}
