#![allow(dead_code)]

use chrono::Duration;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use taskflow_core::db::open_db_in_memory;
use taskflow_server::{build_router, AppState};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub base_url: String,
    pub http: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.http.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.http.delete(self.url(path)).bearer_auth(token)
    }

    /// Registers a user and returns its bearer token.
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = send(self.http.post(self.url("/api/auth/register")).json(&json!({
            "name": "Test User",
            "email": email,
            "password": "secret-pass"
        })))
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Creates a task and returns its JSON representation.
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let (status, body) = send(self.post("/api/tasks", token).json(&body)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["task"].clone()
    }
}

/// Starts the full router over a fresh in-memory database.
pub async fn spawn_server() -> TestServer {
    spawn_server_with_ttl(Duration::hours(1)).await
}

pub async fn spawn_server_with_ttl(session_ttl: Duration) -> TestServer {
    let conn = open_db_in_memory().unwrap();
    let state = AppState::new(conn, session_ttl);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.ok();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        http: Client::new(),
        _handle: handle,
    }
}

/// Sends a request and decodes the JSON body.
pub async fn send(request: RequestBuilder) -> (StatusCode, Value) {
    let response = request.send().await.unwrap();
    let status = response.status();
    let body = response.json::<Value>().await.unwrap();
    (status, body)
}
