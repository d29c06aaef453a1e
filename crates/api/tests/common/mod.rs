#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use mediashelf_api::config::{LogFormat, ServerConfig, StorageBackend};
use mediashelf_api::router::build_app_router;
use mediashelf_api::state::AppState;
use mediashelf_core::cache::CacheRegistry;
use mediashelf_db::Catalog;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and the in-memory storage backend.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage: StorageBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        cache_enabled: true,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over a fresh in-memory catalog.
///
/// The returned router is cheap to clone; clones share the same catalog, so
/// a test can issue several requests against one collection.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState {
        catalog: Arc::new(Catalog::in_memory(&CacheRegistry::new(config.cache_enabled))),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST a payload and return the created row's `data` object.
pub async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let response = post_json(app, uri, body).await;
    assert_eq!(response.status(), 201, "POST {uri} failed");
    let mut json = body_json(response).await;
    json["data"].take()
}

/// Names (or titles) of a listing in response order.
pub fn field_list(listing: &Value, field: &str) -> Vec<String> {
    listing["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[field].as_str().unwrap().to_string())
        .collect()
}

pub fn game_json(name: &str) -> Value {
    json!({ "name": name, "media_count": 1 })
}

pub fn movie_json(name: &str, genres: &[i64]) -> Value {
    json!({
        "czech_name": name,
        "original_name": name,
        "year": 1999,
        "languages": ["en"],
        "subtitles": ["cs"],
        "media": [{ "length": 136 }],
        "genres": genres,
    })
}

pub fn show_json(original_name: &str) -> Value {
    json!({ "czech_name": original_name, "original_name": original_name })
}

pub fn season_json(number: i32) -> Value {
    json!({
        "number": number,
        "start_year": 2004,
        "end_year": 2005,
        "language": "en",
    })
}

pub fn episode_json(number: i32, length: i32) -> Value {
    json!({ "number": number, "name": format!("Episode {number}"), "length": length })
}
