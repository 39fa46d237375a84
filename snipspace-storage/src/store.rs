//! Async storage trait for spaces and content.
//!
//! Stores do not check ownership; services in the API crate do that before
//! calling in. Stores do keep referential integrity: content never points at
//! a missing space, and a space referenced by snippets cannot be deleted.

use crate::{NoteUpdate, PromptUpdate, SnippetUpdate, SpaceUpdate};
use ::async_trait::async_trait;
use snipspace_core::{
    ContentCounts, Note, NoteId, OwnerId, Prompt, PromptId, SnippetId, SnipspaceResult, Snippet,
    Space, SpaceId,
};

/// Storage for spaces, snippets, notes and prompts.
///
/// `*_update` and `*_delete` return `StorageError::NotFound` for unknown ids.
/// Content inserts and updates naming a space that does not exist fail with
/// `StorageError::NotFound` for that space.
/// `*_list_by_owner` results are unordered; callers sort.
#[async_trait]
pub trait ContentStore: Send + Sync {
    // ========================================================================
    // SPACE OPERATIONS
    // ========================================================================

    /// Insert a new space.
    async fn space_insert(&self, space: &Space) -> SnipspaceResult<()>;

    /// Get a space by ID.
    async fn space_get(&self, id: SpaceId) -> SnipspaceResult<Option<Space>>;

    /// Apply a partial update and return the stored result.
    async fn space_update(&self, id: SpaceId, update: SpaceUpdate) -> SnipspaceResult<Space>;

    /// Delete a space no snippet references, detaching its notes and prompts
    /// in the same step.
    ///
    /// Fails with `DomainError::SpaceNotEmpty` while snippets reference the
    /// space. Returns how many records of each kind were detached.
    async fn space_delete(&self, id: SpaceId) -> SnipspaceResult<ContentCounts>;

    /// All spaces of an owner.
    async fn space_list_by_owner(&self, owner: &OwnerId) -> SnipspaceResult<Vec<Space>>;

    // ========================================================================
    // SNIPPET OPERATIONS
    // ========================================================================

    async fn snippet_insert(&self, snippet: &Snippet) -> SnipspaceResult<()>;

    async fn snippet_get(&self, id: SnippetId) -> SnipspaceResult<Option<Snippet>>;

    async fn snippet_update(&self, id: SnippetId, update: SnippetUpdate)
        -> SnipspaceResult<Snippet>;

    async fn snippet_delete(&self, id: SnippetId) -> SnipspaceResult<()>;

    /// Snippets of an owner, optionally restricted to one space.
    async fn snippet_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Snippet>>;

    // ========================================================================
    // NOTE OPERATIONS
    // ========================================================================

    async fn note_insert(&self, note: &Note) -> SnipspaceResult<()>;

    async fn note_get(&self, id: NoteId) -> SnipspaceResult<Option<Note>>;

    async fn note_update(&self, id: NoteId, update: NoteUpdate) -> SnipspaceResult<Note>;

    async fn note_delete(&self, id: NoteId) -> SnipspaceResult<()>;

    async fn note_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Note>>;

    // ========================================================================
    // PROMPT OPERATIONS
    // ========================================================================

    async fn prompt_insert(&self, prompt: &Prompt) -> SnipspaceResult<()>;

    async fn prompt_get(&self, id: PromptId) -> SnipspaceResult<Option<Prompt>>;

    async fn prompt_update(&self, id: PromptId, update: PromptUpdate) -> SnipspaceResult<Prompt>;

    async fn prompt_delete(&self, id: PromptId) -> SnipspaceResult<()>;

    async fn prompt_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Prompt>>;

    // ========================================================================
    // SPACE MEMBERSHIP
    // ========================================================================

    /// Number of snippets, notes and prompts referencing a space.
    async fn space_content_counts(&self, space_id: SpaceId) -> SnipspaceResult<ContentCounts>;

    /// Give every space-less record of `owner` the space `space_id`.
    ///
    /// Returns how many records of each kind were assigned.
    async fn assign_orphans(
        &self,
        owner: &OwnerId,
        space_id: SpaceId,
    ) -> SnipspaceResult<ContentCounts>;

    /// Backend liveness check behind /health/ready.
    async fn ping(&self) -> SnipspaceResult<()> {
        Ok(())
    }
}
