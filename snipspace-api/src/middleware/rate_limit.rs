//! Per-owner rate limiting
//!
//! One governor limiter per authenticated owner, created on first use.

use crate::auth::AuthContext;
use crate::config::ApiConfig;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header::HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{clock::DefaultClock, Quota, RateLimiter};
use snipspace_core::OwnerId;
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectRateLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, DefaultClock>;

/// State for rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    config: Arc<ApiConfig>,
    limiters: Arc<DashMap<OwnerId, Arc<DirectRateLimiter>>>,
}

impl RateLimitState {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
            limiters: Arc::new(DashMap::new()),
        }
    }

    fn quota(&self) -> Quota {
        Quota::per_minute(
            NonZeroU32::new(self.config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(self.config.rate_limit_burst).unwrap_or(NonZeroU32::MIN))
    }

    fn limiter_for(&self, owner: &OwnerId) -> Arc<DirectRateLimiter> {
        self.limiters
            .entry(owner.clone())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota())))
            .clone()
    }

    /// Number of owners with a live limiter.
    pub fn tracked_owners(&self) -> usize {
        self.limiters.len()
    }
}

/// Rejection returned when an owner exceeds its quota.
#[derive(Debug)]
pub struct RateLimitError {
    /// Seconds until the next request would be admitted
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let error = ApiError::too_many_requests(Some(self.retry_after));
        let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(error)).into_response();
        response.headers_mut().insert(
            HeaderName::from_static("retry-after"),
            HeaderValue::from_str(&self.retry_after.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("60")),
        );
        response
    }
}

/// Rate limiting middleware.
///
/// Requests without an [`AuthContext`] pass through untouched; the auth
/// middleware has already rejected them on protected routes.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    if !state.config.rate_limit_enabled {
        return Ok(next.run(request).await);
    }

    let owner = match request.extensions().get::<AuthContext>() {
        Some(auth) => auth.owner_id.clone(),
        None => return Ok(next.run(request).await),
    };

    let limiter = state.limiter_for(&owner);

    match limiter.check() {
        Ok(_) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from_str(&state.config.rate_limit_per_minute.to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("600")),
            );
            Ok(response)
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()))
                .as_secs()
                .max(1);
            tracing::debug!(owner = %owner, retry_after, "Rate limit exceeded");
            Err(RateLimitError { retry_after })
        }
    }
}
