//! Snipspace Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for owners, spaces and content records
//! - Fixtures for common scenarios
//! - Assertions for Snipspace-specific error shapes

// Re-export the reference store from its source crate
pub use snipspace_storage::InMemoryStore;

pub use snipspace_core::{
    AccessError, ContentCounts, DomainError, EntityIdType, EntityType, Note, NoteId, OwnerId,
    Prompt, PromptId, SnipspaceError, SnipspaceResult, Snippet, SnippetId, Space, SpaceId,
    StorageError, Timestamp, ValidationError,
};

use chrono::Utc;
use uuid::Uuid;

/// Languages the generators draw from.
pub const LANGUAGES: &[&str] = &["rust", "python", "typescript", "go", "bash", "sql"];

/// Projects the generators draw from. The empty string exercises blank
/// handling.
pub const PROJECTS: &[&str] = &["web", "cli", "infra", ""];

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Snipspace entity types.

    use super::*;
    use proptest::prelude::*;

    // === Identity Type Generators ===

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_space_id() -> impl Strategy<Value = SpaceId> {
        arb_uuid().prop_map(SpaceId::new)
    }

    pub fn arb_snippet_id() -> impl Strategy<Value = SnippetId> {
        arb_uuid().prop_map(SnippetId::new)
    }

    pub fn arb_note_id() -> impl Strategy<Value = NoteId> {
        arb_uuid().prop_map(NoteId::new)
    }

    pub fn arb_prompt_id() -> impl Strategy<Value = PromptId> {
        arb_uuid().prop_map(PromptId::new)
    }

    /// Generate an identity-provider style owner id.
    pub fn arb_owner_id() -> impl Strategy<Value = OwnerId> {
        "user_[a-z0-9]{4,12}".prop_map(OwnerId::new)
    }

    /// Generate a Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    // === Field Generators ===

    pub fn arb_language() -> impl Strategy<Value = String> {
        prop::sample::select(LANGUAGES).prop_map(str::to_string)
    }

    /// Optional project, sometimes blank.
    pub fn arb_project() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(prop::sample::select(PROJECTS).prop_map(str::to_string))
    }

    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z][a-z]{2,10}( [a-z]{2,10}){0,3}"
    }

    pub fn arb_tags() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z]{2,8}", 0..4)
    }

    // === Struct Generators ===

    /// Generate a Space owned by `owner`.
    pub fn arb_space(owner: OwnerId) -> impl Strategy<Value = Space> {
        (
            arb_space_id(),
            "[A-Z][a-z]{2,12}",
            proptest::option::of("[a-z ]{1,40}"),
            arb_timestamp(),
        )
            .prop_map(move |(space_id, name, description, created_at)| Space {
                space_id,
                owner_id: owner.clone(),
                name,
                description,
                icon: None,
                created_at,
                updated_at: created_at,
            })
    }

    /// Generate a Snippet owned by `owner` in `space_id`.
    pub fn arb_snippet(owner: OwnerId, space_id: Option<SpaceId>) -> impl Strategy<Value = Snippet> {
        (
            arb_snippet_id(),
            arb_title(),
            "[a-z(){};= ]{1,80}",
            arb_language(),
            arb_tags(),
            arb_project(),
            arb_timestamp(),
        )
            .prop_map(
                move |(snippet_id, title, code, language, tags, project, created_at)| Snippet {
                    snippet_id,
                    owner_id: owner.clone(),
                    space_id,
                    title,
                    code,
                    language,
                    description: None,
                    tags,
                    project,
                    created_at,
                    updated_at: created_at,
                },
            )
    }

    /// Generate a Note owned by `owner` in `space_id`.
    pub fn arb_note(owner: OwnerId, space_id: Option<SpaceId>) -> impl Strategy<Value = Note> {
        (
            arb_note_id(),
            arb_title(),
            "[a-zA-Z0-9 .,!?]{1,200}",
            arb_tags(),
            arb_project(),
            arb_timestamp(),
        )
            .prop_map(
                move |(note_id, title, content, tags, project, created_at)| Note {
                    note_id,
                    owner_id: owner.clone(),
                    space_id,
                    title,
                    content,
                    description: None,
                    tags,
                    project,
                    created_at,
                    updated_at: created_at,
                },
            )
    }

    /// Generate a Prompt owned by `owner` in `space_id`.
    pub fn arb_prompt(owner: OwnerId, space_id: Option<SpaceId>) -> impl Strategy<Value = Prompt> {
        arb_note(owner, space_id).prop_map(|note| Prompt {
            prompt_id: PromptId::new(note.note_id.as_uuid()),
            owner_id: note.owner_id,
            space_id: note.space_id,
            title: note.title,
            content: note.content,
            description: note.description,
            tags: note.tags,
            project: note.project,
            created_at: note.created_at,
            updated_at: note.updated_at,
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    pub fn alice() -> OwnerId {
        OwnerId::new("user_alice")
    }

    pub fn bob() -> OwnerId {
        OwnerId::new("user_bob")
    }

    /// Create a test Space.
    pub fn test_space(owner: &OwnerId) -> Space {
        let now = Utc::now();
        Space {
            space_id: SpaceId::now_v7(),
            owner_id: owner.clone(),
            name: "Test space".to_string(),
            description: Some("A test space".to_string()),
            icon: Some("🧪".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a test Snippet.
    pub fn test_snippet(owner: &OwnerId, space_id: Option<SpaceId>) -> Snippet {
        let now = Utc::now();
        Snippet {
            snippet_id: SnippetId::now_v7(),
            owner_id: owner.clone(),
            space_id,
            title: "Read a file".to_string(),
            code: "let s = std::fs::read_to_string(path)?;".to_string(),
            language: "rust".to_string(),
            description: None,
            tags: vec!["io".to_string()],
            project: Some("cli".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a test Note.
    pub fn test_note(owner: &OwnerId, space_id: Option<SpaceId>) -> Note {
        let now = Utc::now();
        Note {
            note_id: NoteId::now_v7(),
            owner_id: owner.clone(),
            space_id,
            title: "Meeting notes".to_string(),
            content: "Ship the release on Friday.".to_string(),
            description: None,
            tags: vec![],
            project: Some("web".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a test Prompt.
    pub fn test_prompt(owner: &OwnerId, space_id: Option<SpaceId>) -> Prompt {
        let now = Utc::now();
        Prompt {
            prompt_id: PromptId::now_v7(),
            owner_id: owner.clone(),
            space_id,
            title: "Summarize".to_string(),
            content: "Summarize the following text in three bullet points.".to_string(),
            description: None,
            tags: vec!["llm".to_string()],
            project: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for Snipspace-specific error shapes.

    use super::*;

    /// Assert that a SnipspaceResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &SnipspaceResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert a not-found-or-not-owned rejection for `entity_type`, raised
    /// either by the ownership check or by the store itself.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &SnipspaceResult<T>, entity_type: EntityType) {
        match result {
            Err(SnipspaceError::Access(AccessError::NotFound { entity_type: et, .. }))
            | Err(SnipspaceError::Storage(StorageError::NotFound { entity_type: et, .. })) => {
                assert_eq!(*et, entity_type, "Wrong entity type in NotFound error");
            }
            other => panic!("Expected NotFound error for {:?}, got: {:?}", entity_type, other),
        }
    }

    /// Assert that deleting a space was refused because snippets remain.
    #[track_caller]
    pub fn assert_space_not_empty<T: std::fmt::Debug>(result: &SnipspaceResult<T>) {
        match result {
            Err(SnipspaceError::Domain(DomainError::SpaceNotEmpty { .. })) => {}
            other => panic!("Expected SpaceNotEmpty error, got: {:?}", other),
        }
    }

    /// Assert that a SnipspaceResult is a Validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &SnipspaceResult<T>) {
        match result {
            Err(SnipspaceError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }
}
