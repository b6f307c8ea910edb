//! Common test utilities for integration tests
//!
//! An in-process axum server that answers canned responses per
//! (method, path) and records every request it sees.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Router;
use binance_rest::{BinanceRestClient, ClientConfig, Credentials};
use serde_json::Value;
use tracing::{Dispatch, Level};

pub const API_KEY: &str = "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A";

/// Secret from the exchange's published signing examples
pub const SECRET_KEY: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

/// A canned reply
#[derive(Debug, Clone)]
pub struct Canned {
    status: u16,
    body: String,
    delay: Option<Duration>,
    retry_after: Option<u64>,
    location: Option<String>,
}

impl Canned {
    pub fn json(status: u16, body: Value) -> Self {
        Self::raw(status, &body.to_string())
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
            retry_after: None,
            location: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after = Some(secs);
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }
}

/// A request as the server received it
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Recompute the signature over query (minus `signature`) ++ body
    pub fn has_valid_signature(&self, secret: &str) -> bool {
        let Some(query) = self.query.as_deref() else {
            return false;
        };
        let Some(idx) = query.rfind("&signature=") else {
            return false;
        };
        let payload = format!("{}{}", &query[..idx], self.body);
        let expected = Credentials::new("", secret).sign(payload.as_bytes());
        query[idx + "&signature=".len()..] == expected
    }
}

#[derive(Default)]
struct ServerState {
    routes: Mutex<HashMap<(String, String), Canned>>,
    captured: Mutex<Vec<Captured>>,
}

pub struct MockServer {
    pub base_url: String,
    state: Arc<ServerState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        let handler_state = Arc::clone(&state);
        let app = Router::new().fallback(move |req: Request| {
            let state = Arc::clone(&handler_state);
            async move { handle(req, state).await }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn route(&self, method: &str, path: &str, reply: Canned) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), reply);
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.state.captured.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Captured {
        self.requests().pop().expect("server saw no requests")
    }

    /// Config pointed at this server, with test credentials
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_base_url(self.base_url.clone())
            .with_credentials(Credentials::new(API_KEY, SECRET_KEY))
    }

    pub fn client(&self) -> BinanceRestClient {
        BinanceRestClient::with_config(self.config())
    }

    /// Client with no credentials at all
    pub fn anonymous_client(&self) -> BinanceRestClient {
        BinanceRestClient::with_config(ClientConfig::new().with_base_url(self.base_url.clone()))
    }
}

async fn handle(req: Request, state: Arc<ServerState>) -> Response {
    let (parts, body) = req.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let captured = Captured {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers.clone(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let key = (captured.method.clone(), captured.path.clone());
    state.captured.lock().unwrap().push(captured);

    let reply = state.routes.lock().unwrap().get(&key).cloned();
    let Some(reply) = reply else {
        return Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"code":-1,"msg":"no such route"}"#))
            .unwrap();
    };

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut builder = Response::builder()
        .status(reply.status)
        .header("content-type", "application/json");
    if let Some(secs) = reply.retry_after {
        builder = builder.header("retry-after", secs.to_string());
    }
    if let Some(location) = reply.location {
        builder = builder.header("location", location);
    }
    builder.body(Body::from(reply.body)).unwrap()
}

/// Port that nothing is listening on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// In-memory log sink for a client's dispatch
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn dispatch(&self) -> Dispatch {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .finish();
        Dispatch::new(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
