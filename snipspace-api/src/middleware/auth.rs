//! Axum Middleware for Authentication
//!
//! - Authenticates requests using API keys or JWT tokens
//! - Injects AuthContext into request extensions
//! - Returns 401 for unauthenticated requests

use crate::auth::{authenticate, AuthConfig, AuthContext};
use crate::error::ApiError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: AuthConfig) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
        }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Axum middleware for authentication.
///
/// Reads `X-API-Key` or `Authorization: Bearer`, resolves the owner and
/// injects an [`AuthContext`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let api_key_header = request
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok());

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    let auth_context = authenticate(&state.auth_config, api_key_header, auth_header)
        .map_err(|e| {
            tracing::debug!(code = %e.code, "Authentication rejected");
            AuthMiddlewareError(e)
        })?;

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error wrapper for middleware that implements IntoResponse.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Typed Axum extractor for the authenticated caller.
///
/// Requires `auth_middleware` on the route; without it the extractor fails
/// with a 500.
#[derive(Debug, Clone)]
pub struct AuthExtractor(pub AuthContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthMiddlewareError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthExtractor)
            .ok_or_else(|| {
                AuthMiddlewareError(ApiError::internal_error(
                    "AuthContext not found in request extensions. \
                     Ensure auth_middleware is applied to this route.",
                ))
            })
    }
}

impl std::ops::Deref for AuthExtractor {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt_token, JwtSecret};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use snipspace_core::OwnerId;
    use tower::ServiceExt;

    fn test_auth_config() -> Result<AuthConfig, String> {
        let mut config = AuthConfig::default();
        config.add_api_key("test_key_123", OwnerId::new("user_alice"));
        config.jwt_secret =
            JwtSecret::new("test_secret".to_string()).map_err(|e| e.to_string())?;
        Ok(config)
    }

    async fn whoami(AuthExtractor(auth): AuthExtractor) -> String {
        auth.owner_id.to_string()
    }

    fn test_app(config: AuthConfig) -> Router {
        let auth_state = AuthMiddlewareState::new(config);

        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
    }

    async fn body_string(response: Response) -> Result<String, String> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| e.to_string())?;
        String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
    }

    #[tokio::test]
    async fn test_middleware_with_valid_api_key() -> Result<(), String> {
        let app = test_app(test_auth_config()?);

        let request = Request::builder()
            .uri("/whoami")
            .header("x-api-key", "test_key_123")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await?, "user_alice");
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_with_bearer_token() -> Result<(), String> {
        let config = test_auth_config()?;
        let token = generate_jwt_token(&config, &OwnerId::new("user_bob"))
            .map_err(|e| e.to_string())?;
        let app = test_app(config);

        let request = Request::builder()
            .uri("/whoami")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await?, "user_bob");
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_with_invalid_api_key() -> Result<(), String> {
        let app = test_app(test_auth_config()?);

        let request = Request::builder()
            .uri("/whoami")
            .header("x-api-key", "invalid_key")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_without_authentication() -> Result<(), String> {
        let app = test_app(test_auth_config()?);

        let request = Request::builder()
            .uri("/whoami")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
