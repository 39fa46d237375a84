//! Error Types for the Snipspace API
//!
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use snipspace_core::{
    AccessError, ConfigError, DomainError, EntityType, SnipspaceError, StorageError,
    ValidationError,
};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing or blank
    MissingField,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested space does not exist or is not owned by the caller
    SpaceNotFound,

    SnippetNotFound,

    NoteNotFound,

    PromptNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Entity with the same identifier already exists
    EntityAlreadyExists,

    /// Space still has snippets and cannot be deleted
    SpaceNotEmpty,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,

    /// Request rate limit exceeded
    TooManyRequests,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::SpaceNotFound
            | ErrorCode::SnippetNotFound
            | ErrorCode::NoteNotFound
            | ErrorCode::PromptNotFound => StatusCode::NOT_FOUND,

            ErrorCode::EntityAlreadyExists | ErrorCode::SpaceNotEmpty => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable | ErrorCode::ConnectionPoolExhausted => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            ErrorCode::InternalError | ErrorCode::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Not authenticated",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",

            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",

            ErrorCode::SpaceNotFound => "Space not found",
            ErrorCode::SnippetNotFound => "Snippet not found",
            ErrorCode::NoteNotFound => "Note not found",
            ErrorCode::PromptNotFound => "Prompt not found",

            ErrorCode::EntityAlreadyExists => "Entity already exists",
            ErrorCode::SpaceNotEmpty => "Space still contains snippets",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::ConnectionPoolExhausted => "Connection pool exhausted",
            ErrorCode::TooManyRequests => "Rate limit exceeded",
        }
    }

    /// Not-found code for a given entity type.
    pub fn not_found_for(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::Space => ErrorCode::SpaceNotFound,
            EntityType::Snippet => ErrorCode::SnippetNotFound,
            EntityType::Note => ErrorCode::NoteNotFound,
            EntityType::Prompt => ErrorCode::PromptNotFound,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, counts, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Missing, or owned by someone else. Callers get the same response
    /// for both.
    pub fn entity_not_found(entity_type: EntityType, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::not_found_for(entity_type),
            format!("{} not found: {}", entity_type, id),
        )
    }

    pub fn entity_already_exists(entity_type: EntityType, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityAlreadyExists,
            format!("{} already exists: {}", entity_type, reason),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }

    /// Create a TooManyRequests error.
    pub fn too_many_requests(retry_after_secs: Option<u64>) -> Self {
        let message = match retry_after_secs {
            Some(secs) => format!("Rate limit exceeded. Retry after {} seconds", secs),
            None => "Rate limit exceeded".to_string(),
        };
        Self::new(ErrorCode::TooManyRequests, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

impl From<SnipspaceError> for ApiError {
    fn from(err: SnipspaceError) -> Self {
        match err {
            SnipspaceError::Access(AccessError::Unauthenticated) => {
                ApiError::from_code(ErrorCode::Unauthorized)
            }
            SnipspaceError::Access(AccessError::NotFound { entity_type, id })
            | SnipspaceError::Storage(StorageError::NotFound { entity_type, id }) => {
                ApiError::entity_not_found(entity_type, id)
            }
            SnipspaceError::Domain(DomainError::SpaceNotEmpty { space_id, snippets }) => {
                let message = DomainError::SpaceNotEmpty { space_id, snippets }.to_string();
                ApiError::new(ErrorCode::SpaceNotEmpty, message).with_details(
                    serde_json::json!({ "space_id": space_id, "snippets": snippets }),
                )
            }
            SnipspaceError::Validation(ValidationError::RequiredFieldMissing { field }) => {
                ApiError::missing_field(&field)
            }
            SnipspaceError::Validation(ValidationError::InvalidValue { field, reason }) => {
                ApiError::validation_failed(format!("Invalid value for {}: {}", field, reason))
            }
            SnipspaceError::Storage(StorageError::InsertFailed {
                entity_type,
                reason,
            }) if reason == "already exists" => ApiError::entity_already_exists(entity_type, reason),
            SnipspaceError::Storage(StorageError::PoolExhausted) => {
                tracing::warn!("Database connection pool exhausted");
                ApiError::connection_pool_exhausted()
            }
            SnipspaceError::Storage(StorageError::Unavailable { reason }) => {
                tracing::error!("Storage unavailable: {}", reason);
                ApiError::service_unavailable("Storage temporarily unavailable")
            }
            SnipspaceError::Storage(other) => {
                tracing::error!("Storage error: {:?}", other);
                ApiError::database_error("Database operation failed")
            }
            SnipspaceError::Config(ConfigError::MissingRequired { field }) => {
                tracing::error!("Configuration missing: {}", field);
                ApiError::internal_error("Server misconfigured")
            }
            SnipspaceError::Config(other) => {
                tracing::error!("Configuration error: {:?}", other);
                ApiError::internal_error("Server misconfigured")
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::MissingField.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::SnippetNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::SpaceNotEmpty.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::DatabaseError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::TooManyRequests.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_not_found_maps_per_entity() {
        let err = ApiError::from(SnipspaceError::not_found(EntityType::Prompt, Uuid::nil()));
        assert_eq!(err.code, ErrorCode::PromptNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.message.contains("Prompt not found"));
    }

    #[test]
    fn test_space_not_empty_is_conflict_with_details() {
        let err = ApiError::from(SnipspaceError::Domain(DomainError::SpaceNotEmpty {
            space_id: Uuid::nil(),
            snippets: 2,
        }));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            err.details.as_ref().and_then(|d| d.get("snippets")).and_then(|v| v.as_u64()),
            Some(2)
        );
    }

    #[test]
    fn test_backend_failure_hides_cause() {
        let err = ApiError::from(SnipspaceError::Storage(StorageError::Backend {
            reason: "connection refused to 10.0.0.5".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("10.0.0.5"));
    }

    #[test]
    fn test_pool_exhaustion_is_service_unavailable() {
        let err = ApiError::from(SnipspaceError::Storage(StorageError::PoolExhausted));
        assert_eq!(err.code, ErrorCode::ConnectionPoolExhausted);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(SnipspaceError::Storage(StorageError::Unavailable {
            reason: "pool closed".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ServiceUnavailable);
        assert!(!err.message.contains("pool closed"));
    }

    #[test]
    fn test_query_rejection_is_invalid_input() -> Result<(), String> {
        use axum::extract::Query;
        use axum::http::Uri;

        #[derive(Debug, Deserialize)]
        struct Filter {
            #[serde(rename = "limit")]
            _limit: u32,
        }

        let uri: Uri = "/api/v1/snippets?limit=many"
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| e.to_string())?;
        let rejection = Query::<Filter>::try_from_uri(&uri)
            .err()
            .ok_or("non-numeric limit should be rejected")?;
        assert!(matches!(rejection, QueryRejection::FailedToDeserializeQueryString(_)));

        let err = ApiError::from(rejection);
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::unauthorized("Invalid token");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("UNAUTHORIZED"));
        assert!(json.contains("Invalid token"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
