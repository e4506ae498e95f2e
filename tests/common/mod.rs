//! In-process mock backend for integration tests
//!
//! Serves `/products/`, `/invoices/` and an echo chat socket at `/ws/chat/`
//! on an ephemeral port. Every REST request is recorded as `"METHOD /path"`.

#![allow(dead_code)]

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use invoicedesk::config::{ApiConfig, ChatConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct Backend {
    pub products: Vec<Value>,
    pub invoices: Vec<Value>,
    pub requests: Vec<String>,
    /// Answer every REST call with this status
    pub fail_with: Option<StatusCode>,
    /// Answer list calls with an object instead of an array
    pub malformed_lists: bool,
    next_id: u64,
}

impl Backend {
    fn collection(&mut self, name: &str) -> &mut Vec<Value> {
        match name {
            "products" => &mut self.products,
            _ => &mut self.invoices,
        }
    }

    /// Store `body`, assigning a numeric id unless it already carries one
    fn insert(&mut self, collection: &str, mut body: Value) -> Value {
        self.next_id += 1;
        if let Value::Object(fields) = &mut body {
            fields
                .entry("id".to_string())
                .or_insert_with(|| json!(self.next_id));
        }
        self.collection(collection).push(body.clone());
        body
    }
}

type Shared = Arc<Mutex<Backend>>;

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend::default()));

        let router = Router::new()
            .route(
                "/products/",
                get(|s: State<Shared>| list(s, "products"))
                    .post(|s: State<Shared>, b: Json<Value>| create(s, "products", b)),
            )
            .route(
                "/products/:id/",
                axum::routing::put(|s: State<Shared>, id: Path<String>, b: Json<Value>| {
                    update(s, "products", id, b)
                })
                .delete(|s: State<Shared>, id: Path<String>| remove(s, "products", id)),
            )
            .route(
                "/invoices/",
                get(|s: State<Shared>| list(s, "invoices"))
                    .post(|s: State<Shared>, b: Json<Value>| create(s, "invoices", b)),
            )
            .route(
                "/invoices/:id/",
                axum::routing::put(|s: State<Shared>, id: Path<String>, b: Json<Value>| {
                    update(s, "invoices", id, b)
                })
                .delete(|s: State<Shared>, id: Path<String>| remove(s, "invoices", id)),
            )
            .route("/ws/chat/", get(chat_socket))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: format!("http://{}", self.addr),
            request_timeout_secs: Some(5),
        }
    }

    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            url: format!("ws://{}/ws/chat/", self.addr),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn products(&self) -> Vec<Value> {
        self.state.lock().unwrap().products.clone()
    }

    pub fn invoices(&self) -> Vec<Value> {
        self.state.lock().unwrap().invoices.clone()
    }

    pub fn seed(&self, collection: &str, body: Value) -> Value {
        self.state.lock().unwrap().insert(collection, body)
    }

    pub fn fail_with(&self, status: Option<StatusCode>) {
        self.state.lock().unwrap().fail_with = status;
    }

    pub fn malformed_lists(&self, on: bool) {
        self.state.lock().unwrap().malformed_lists = on;
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn id_matches(item: &Value, id: &str) -> bool {
    match &item["id"] {
        Value::Number(n) => n.to_string() == id,
        Value::String(s) => s == id,
        _ => false,
    }
}

async fn list(State(state): State<Shared>, collection: &'static str) -> Response {
    let mut backend = state.lock().unwrap();
    backend.requests.push(format!("GET /{}/", collection));

    if let Some(status) = backend.fail_with {
        return (status, "boom").into_response();
    }
    if backend.malformed_lists {
        return Json(json!({ "detail": "not a list" })).into_response();
    }
    Json(Value::Array(backend.collection(collection).clone())).into_response()
}

async fn create(
    State(state): State<Shared>,
    collection: &'static str,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.requests.push(format!("POST /{}/", collection));

    if let Some(status) = backend.fail_with {
        return (status, "boom").into_response();
    }
    let created = backend.insert(collection, body);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update(
    State(state): State<Shared>,
    collection: &'static str,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.requests.push(format!("PUT /{}/{}/", collection, id));

    if let Some(status) = backend.fail_with {
        return (status, "boom").into_response();
    }
    let Some(item) = backend
        .collection(collection)
        .iter_mut()
        .find(|item| id_matches(item, &id))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if let (Value::Object(fields), Value::Object(changes)) = (item, body) {
        for (key, value) in changes {
            if key != "id" {
                fields.insert(key, value);
            }
        }
    }
    StatusCode::OK.into_response()
}

async fn remove(
    State(state): State<Shared>,
    collection: &'static str,
    Path(id): Path<String>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.requests.push(format!("DELETE /{}/{}/", collection, id));

    if let Some(status) = backend.fail_with {
        return (status, "boom").into_response();
    }
    let items = backend.collection(collection);
    let before = items.len();
    items.retain(|item| !id_matches(item, &id));
    if items.len() == before {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn chat_socket(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(chat_session)
}

/// Scripted assistant:
/// - `Hello` gets `Hi there`
/// - `!malformed` gets a non-JSON frame followed by `after`
/// - `!close` closes the socket
/// - anything else is echoed back
async fn chat_session(mut socket: WebSocket) {
    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(raw) = message else {
            continue;
        };
        let text = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|v| v["text"].as_str().map(str::to_string))
            .unwrap_or_default();

        let replies: Vec<Message> = match text.as_str() {
            "Hello" => vec![reply("Hi there")],
            "!malformed" => vec![Message::Text("not json".to_string()), reply("after")],
            "!close" => {
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
            other => vec![reply(&format!("echo: {}", other))],
        };

        for reply in replies {
            if socket.send(reply).await.is_err() {
                return;
            }
        }
    }
}

fn reply(text: &str) -> Message {
    Message::Text(json!({ "response": text }).to_string())
}
