//! Middleware modules for the Snipspace API
//!
//! - `auth`: authentication middleware and the `AuthExtractor`
//! - `rate_limit`: per-owner rate limiting
//!
//! # Middleware Order
//!
//! Rate limiting is keyed by owner, so it runs after authentication:
//!
//! ```ignore
//! Router::new()
//!     .route("/api/v1/spaces", get(handler))
//!     // Innermost: needs AuthContext
//!     .layer(middleware::from_fn_with_state(rate_limit_state, rate_limit_middleware))
//!     // Outermost: injects AuthContext
//!     .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
//! ```

mod auth;
mod rate_limit;

pub use auth::{auth_middleware, AuthExtractor, AuthMiddlewareError, AuthMiddlewareState};
pub use rate_limit::{rate_limit_middleware, RateLimitError, RateLimitState};
