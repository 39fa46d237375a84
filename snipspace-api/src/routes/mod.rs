//! REST API Routes Module
//!
//! Route handlers organized by entity type:
//! - Spaces, snippets, notes and prompts under /api/v1 (authenticated)
//! - The combined project facet at /api/v1/projects
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - Optional static SPA serving for every other path

pub mod facets;
pub mod health;
pub mod note;
pub mod prompt;
pub mod snippet;
pub mod space;

use std::path::Path;
use std::time::Duration;

use axum::{
    http::{header, header::HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use snipspace_core::SnipspaceError;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{auth_middleware, rate_limit_middleware, AuthMiddlewareState, RateLimitState};
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use facets::create_router as facets_router;
pub use health::create_router as health_router;
pub use note::create_router as note_router;
pub use prompt::create_router as prompt_router;
pub use snippet::create_router as snippet_router;
pub use space::create_router as space_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

#[cfg(feature = "openapi")]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// SECURE ROUTER BUILDER
// ============================================================================

/// Builder for the API router with auth and rate limiting on every
/// `/api/v1` route.
///
/// Health, metrics and the OpenAPI document stay public.
pub struct SecureRouterBuilder {
    state: AppState,
    api_config: ApiConfig,
    auth_state: AuthMiddlewareState,
    rate_limit_state: RateLimitState,
}

impl SecureRouterBuilder {
    /// Validate both configurations for the configured environment.
    ///
    /// Production refuses to start with an open CORS policy or a weak JWT
    /// secret; development only warns.
    pub fn new(state: AppState, api_config: ApiConfig, auth_config: AuthConfig) -> ApiResult<Self> {
        api_config
            .validate()
            .map_err(|e| ApiError::invalid_input(SnipspaceError::Config(e).to_string()))?;
        auth_config.validate_for_environment(api_config.environment)?;

        let auth_state = AuthMiddlewareState::new(auth_config);
        let rate_limit_state = RateLimitState::new(api_config.clone());

        Ok(Self {
            state,
            api_config,
            auth_state,
            rate_limit_state,
        })
    }

    fn build_entity_routes(&self) -> Router<AppState> {
        Router::new()
            .nest("/spaces", space::create_router())
            .nest("/snippets", snippet::create_router())
            .nest("/notes", note::create_router())
            .nest("/prompts", prompt::create_router())
            .nest("/projects", facets::create_router())
    }

    /// Build the complete router.
    ///
    /// # Middleware Order (outer to inner)
    /// 1. CORS - handles preflight requests
    /// 2. Observability - tracing and metrics
    /// 3. Auth (only on /api/v1/*) - resolves the owner
    /// 4. Rate limiting (only on /api/v1/*) - per owner
    pub fn build(self) -> Router {
        let api_routes = self
            .build_entity_routes()
            .layer(from_fn_with_state(self.rate_limit_state, rate_limit_middleware))
            .layer(from_fn_with_state(self.auth_state, auth_middleware));

        let mut router = Router::new()
            .nest("/api/v1", api_routes)
            .nest("/health", health::create_router())
            .route("/metrics", get(metrics_handler));

        #[cfg(feature = "openapi")]
        {
            router = router.route("/openapi.json", get(openapi_json));
        }

        if let Some(dir) = self.api_config.static_dir.as_deref() {
            router = with_static_spa(router, dir);
        }

        let cors = build_cors_layer(&self.api_config);

        router
            .with_state(self.state)
            .layer(from_fn(observability_middleware))
            .layer(cors)
    }
}

/// Serve the built SPA for every unmatched path, falling back to
/// `index.html` for client-side routes.
fn with_static_spa(router: Router<AppState>, dir: &Path) -> Router<AppState> {
    tracing::info!(dir = %dir.display(), "Serving static SPA");
    let index = ServeFile::new(dir.join("index.html"));
    router.fallback_service(ServeDir::new(dir).fallback(index))
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// Empty origins allow every origin; otherwise only the configured ones,
/// where `*.domain` matches any https subdomain.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-api-key"),
        ])
        .expose_headers([
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("retry-after"),
        ])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
        let allowed = config.clone();
        let origins = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|origin| allowed.is_origin_allowed(origin))
                .unwrap_or(false)
        });

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

/// Create the complete API router.
///
/// - REST routes under /api/v1/* (API key or JWT required, rate limited per owner)
/// - Health checks at /health/* (public)
/// - Metrics at /metrics (public)
/// - OpenAPI document at /openapi.json (with the `openapi` feature)
/// - Static SPA for every other path when `static_dir` is configured
pub fn create_api_router(
    state: AppState,
    api_config: &ApiConfig,
    auth_config: AuthConfig,
) -> ApiResult<Router> {
    SecureRouterBuilder::new(state, api_config.clone(), auth_config).map(SecureRouterBuilder::build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_production_requires_cors_origins() {
        let config = ApiConfig {
            environment: Environment::Production,
            ..ApiConfig::default()
        };
        let result = SecureRouterBuilder::new(AppState::in_memory(), config, AuthConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_development_builds_with_defaults() {
        let result = create_api_router(
            AppState::in_memory(),
            &ApiConfig::default(),
            AuthConfig::default(),
        );
        assert!(result.is_ok());
    }
}
