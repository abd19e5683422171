//! In-process mock of the Deform document API used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use deform_kv::{Client, ClientConfig};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TOKEN: &str = "test-token";
pub const PROJECT: &str = "kvproject";
pub const COLLECTION: &str = "settings";
pub const NOT_FOUND_BODY: &str = r#"{"error":"Document not found"}"#;
pub const UNAUTHORIZED_BODY: &str = r#"{"error":"Authentication failed"}"#;

/// What the mock answers with
#[derive(Clone, Copy)]
pub enum Behavior {
    /// Emulate the document API over an in-memory map
    Documents,
    /// Answer every request with a fixed status and body
    Fixed(StatusCode, &'static str),
    /// Answer every request with a fixed status and raw body bytes
    Raw(StatusCode, &'static [u8]),
    /// Accept requests and never answer
    Stall,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

struct State {
    behavior: Behavior,
    documents: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockServer {
    addr: SocketAddr,
    state: Arc<State>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(State {
            behavior,
            documents: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        });

        let accept_state = state.clone();
        let task = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let state = accept_state.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = state.clone();
                        async move { Ok::<_, Infallible>(handle(&state, req).await) }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, state, task }
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_base: Some(self.api_base()),
            ..ClientConfig::new(PROJECT, COLLECTION, TOKEN)
        }
    }

    pub fn client(&self) -> Client {
        Client::with_config(self.config()).expect("Failed to create client")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.state.documents.lock().unwrap().get(key).cloned()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn respond(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(body.into()))
        .unwrap()
}

async fn handle(state: &State, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await.unwrap().to_bytes();
    let body = String::from_utf8_lossy(&body).to_string();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: body.clone(),
    });

    match state.behavior {
        Behavior::Fixed(status, text) => respond(status, text),
        Behavior::Raw(status, bytes) => respond(status, bytes),
        Behavior::Stall => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            respond(StatusCode::GATEWAY_TIMEOUT, "")
        }
        Behavior::Documents => documents(state, &parts.method, parts.uri.path(), header("authorization"), &body),
    }
}

fn documents(
    state: &State,
    method: &Method,
    path: &str,
    authorization: Option<String>,
    body: &str,
) -> Response<Full<Bytes>> {
    let expected = format!("Token {}", TOKEN);
    if authorization.as_deref() != Some(expected.as_str()) {
        return respond(StatusCode::UNAUTHORIZED, UNAUTHORIZED_BODY);
    }

    let prefix = format!("/api/collections/{}/documents/", COLLECTION);
    let key = match path
        .strip_prefix(&prefix)
        .and_then(|rest| rest.strip_suffix('/'))
        .filter(|segment| !segment.is_empty() && !segment.contains('/'))
    {
        Some(segment) => percent_decode_str(segment).decode_utf8_lossy().to_string(),
        None => return respond(StatusCode::NOT_FOUND, r#"{"error":"Not found"}"#),
    };

    let mut documents = state.documents.lock().unwrap();
    match *method {
        Method::GET => match documents.get(&key) {
            Some(value) => respond(
                StatusCode::OK,
                serde_json::json!({ "_id": key, "value": value }).to_string(),
            ),
            None => respond(StatusCode::NOT_FOUND, NOT_FOUND_BODY),
        },
        Method::PUT => {
            let doc: serde_json::Value = match serde_json::from_str(body) {
                Ok(doc) => doc,
                Err(_) => return respond(StatusCode::BAD_REQUEST, r#"{"error":"Invalid JSON"}"#),
            };
            let value = match (doc["_id"].as_str(), doc["value"].as_str()) {
                (Some(id), Some(value)) if id == key => value.to_string(),
                _ => return respond(StatusCode::BAD_REQUEST, r#"{"error":"Invalid document"}"#),
            };
            let status = if documents.insert(key, value).is_some() {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            respond(status, body.to_string())
        }
        _ => respond(StatusCode::METHOD_NOT_ALLOWED, r#"{"error":"Method not allowed"}"#),
    }
}
