//! Shared helpers for router-level tests.
//!
//! Builds the full router over a fresh in-memory store with two API keys,
//! one per test owner, and rate limiting off.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use snipspace_api::{create_api_router, ApiConfig, AppState, AuthConfig};
use snipspace_test_utils::fixtures::{alice, bob};
use tower::ServiceExt;

pub const ALICE_KEY: &str = "alice-test-key";
pub const BOB_KEY: &str = "bob-test-key";

pub fn test_app() -> Result<Router, String> {
    test_app_with(ApiConfig::default())
}

/// Same as [`test_app`] with custom API settings; rate limiting stays off.
pub fn test_app_with(api_config: ApiConfig) -> Result<Router, String> {
    let api_config = ApiConfig {
        rate_limit_enabled: false,
        ..api_config
    };
    let mut auth_config = AuthConfig::default();
    auth_config.add_api_key(ALICE_KEY, alice());
    auth_config.add_api_key(BOB_KEY, bob());

    create_api_router(AppState::in_memory(), &api_config, auth_config).map_err(|e| e.message)
}

/// Send one request and decode the JSON body (`Value::Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value), String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .map_err(|e| e.to_string())?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| e.to_string())?
        .to_bytes();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).map_err(|e| format!("{}: {:?}", e, bytes))?
    };
    Ok((status, json))
}

/// Pull a string field out of a JSON object.
pub fn field(value: &Value, name: &str) -> Result<String, String> {
    value
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("missing string field {} in {}", name, value))
}

/// Create a space for `api_key` and return its id.
pub async fn create_space(app: &Router, api_key: &str, name: &str) -> Result<String, String> {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/spaces",
        Some(api_key),
        Some(serde_json::json!({ "name": name })),
    )
    .await?;
    if status != StatusCode::CREATED {
        return Err(format!("create space returned {}: {}", status, body));
    }
    field(&body, "space_id")
}

/// Create a snippet in `space_id` and return its id.
pub async fn create_snippet(
    app: &Router,
    api_key: &str,
    space_id: &str,
    title: &str,
    language: &str,
    project: Option<&str>,
) -> Result<String, String> {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/snippets",
        Some(api_key),
        Some(serde_json::json!({
            "space_id": space_id,
            "title": title,
            "code": "print('hi')",
            "language": language,
            "project": project,
        })),
    )
    .await?;
    if status != StatusCode::CREATED {
        return Err(format!("create snippet returned {}: {}", status, body));
    }
    field(&body, "snippet_id")
}
