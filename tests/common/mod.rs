//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use records_service::config::ServiceConfig;
use records_service::http::HttpServer;
use records_service::lifecycle::Shutdown;
use records_service::store::MemoryStore;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Router over a fresh in-memory store. The store handle is shared.
pub fn test_router() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let server = HttpServer::new(ServiceConfig::default(), Arc::new(store.clone()));
    (server.router(), store)
}

/// Drive one request through `router`.
///
/// The body is sent verbatim so malformed payloads can be exercised.
/// An empty response body comes back as `Value::Null`; a non-JSON body as
/// `Value::String`.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&[u8]>,
) -> Result<(StatusCode, Value), String> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(bytes) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes.to_vec())),
        None => builder.body(Body::empty()),
    }
    .map_err(|err| format!("build request: {err}"))?;

    let response = router
        .clone()
        .oneshot(req)
        .await
        .map_err(|err| format!("route request: {err}"))?;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .map_err(|err| format!("read response body: {err}"))?;

    let parsed = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    Ok((status, parsed))
}

/// A server bound to an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub store: MemoryStore,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

/// Start a real server on 127.0.0.1 with an in-memory store.
pub async fn start_server() -> RunningServer {
    let store = MemoryStore::new();
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::new(store.clone()));
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    RunningServer {
        addr,
        store,
        shutdown,
        handle,
    }
}
