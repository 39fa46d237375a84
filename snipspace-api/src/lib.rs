//! Snipspace API - REST API Layer
//!
//! Axum service over a [`snipspace_storage::ContentStore`]: spaces, snippets,
//! notes and prompts scoped to the authenticated owner, with orphan
//! migration, facets, Prometheus metrics and an OpenAPI document.

#[macro_use]
mod macros;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use auth::{
    authenticate, authenticate_api_key, authenticate_jwt, generate_jwt_token, validate_jwt_token,
    AuthConfig, AuthContext, AuthMethod, Claims,
};
pub use config::{ApiConfig, Environment, StoreBackend};
pub use db::{DbConfig, PgStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{auth_middleware, AuthExtractor, AuthMiddlewareState};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::{AppState, SharedStore};
pub use types::*;
