#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use orgchart_api::app::{app, AppState};
use orgchart_api::auth::Authenticator;
use orgchart_api::config::AppConfig;
use orgchart_api::database::{DocumentStore, MemoryStore};
use orgchart_api::fixtures::{self, Fixtures};

/// The full router over a fresh in-memory store holding the sample organisation.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub async fn seeded() -> Result<Self> {
        let config = AppConfig::in_memory();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        fixtures::seed(store.clone(), &Fixtures::builtin()?, true).await?;

        let auth = Authenticator::from_config(&config.security)?;
        let router = app(AppState::new(store, auth), &config);
        Ok(Self { router })
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, value))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, None).await
    }
}

/// Assert the shared error body shape and return its message.
pub fn error_message(body: &Value, code: &str) -> String {
    assert_eq!(body["code"], code, "unexpected error body: {}", body);
    assert_eq!(body["error"], body["message"], "error and message differ: {}", body);
    body["message"].as_str().unwrap_or_default().to_string()
}
