//! Error types for Snipspace operations

use crate::EntityType;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: Uuid,
        reason: String,
    },

    #[error("Delete failed for {entity_type:?} with id {id}: {reason}")]
    DeleteFailed {
        entity_type: EntityType,
        id: Uuid,
        reason: String,
    },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Ownership and authentication failures.
///
/// A record that exists but belongs to someone else is reported exactly like a
/// record that does not exist.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: EntityType, id: Uuid },
}

/// Domain rule violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(
        "Cannot delete space {space_id} with {snippets} snippet(s). Please move or delete all snippets first."
    )]
    SpaceNotEmpty { space_id: Uuid, snippets: u64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Snipspace errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnipspaceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl SnipspaceError {
    /// Shorthand for the not-found-or-not-owned rejection.
    pub fn not_found(entity_type: EntityType, id: impl Into<Uuid>) -> Self {
        SnipspaceError::Access(AccessError::NotFound {
            entity_type,
            id: id.into(),
        })
    }

    /// Shorthand for a missing or blank required field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        SnipspaceError::Validation(ValidationError::RequiredFieldMissing {
            field: field.into(),
        })
    }

    /// Whether this is a not-found-or-not-owned rejection.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SnipspaceError::Access(AccessError::NotFound { .. })
                | SnipspaceError::Storage(StorageError::NotFound { .. })
        )
    }
}

/// Result type alias for Snipspace operations.
pub type SnipspaceResult<T> = Result<T, SnipspaceError>;
