//! Content Service
//!
//! Snippet, note and prompt operations. Get, list, update and delete are
//! written once over [`StoredContent`]; creation is per kind because the
//! records differ.

use async_trait::async_trait;
use chrono::Utc;
use snipspace_core::{
    distinct_languages, distinct_projects, merge_facets, normalize_optional, normalize_tags,
    require_non_blank, ContentFilter, ContentRecord, EntityIdType, EntityType, Note, NoteId,
    OwnerId, Prompt, PromptId, Snippet, SnippetId, SnipspaceError, SnipspaceResult, SpaceId,
};
use snipspace_storage::{ContentStore, NoteUpdate, SnippetUpdate};

use super::space_service::no_changes;
use super::{owned_space, tracked};
use crate::types::{
    CreateNoteRequest, CreatePromptRequest, CreateSnippetRequest, UpdateNoteRequest,
    UpdatePromptRequest, UpdateSnippetRequest,
};

// ============================================================================
// STORE ACCESS PER KIND
// ============================================================================

/// A content record kind together with its table operations.
#[async_trait]
pub trait StoredContent: ContentRecord + Clone + Send + Sync + Sized + 'static {
    type Id: EntityIdType;
    type Update: Send + 'static;

    fn id(&self) -> Self::Id;

    /// The space an update moves the record into, if any.
    fn target_space(update: &Self::Update) -> Option<SpaceId>;

    async fn fetch(store: &dyn ContentStore, id: Self::Id) -> SnipspaceResult<Option<Self>>;

    async fn list(
        store: &dyn ContentStore,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Self>>;

    async fn insert(store: &dyn ContentStore, record: &Self) -> SnipspaceResult<()>;

    async fn patch(
        store: &dyn ContentStore,
        id: Self::Id,
        update: Self::Update,
    ) -> SnipspaceResult<Self>;

    async fn remove(store: &dyn ContentStore, id: Self::Id) -> SnipspaceResult<()>;

    fn entity_type() -> EntityType {
        Self::KIND.entity_type()
    }
}

macro_rules! impl_stored_content {
    (
        $record:ty,
        id: $id:ty => $id_field:ident,
        update: $update:ty,
        ops: ($get:ident, $list:ident, $insert:ident, $patch:ident, $delete:ident)
    ) => {
        #[async_trait]
        impl StoredContent for $record {
            type Id = $id;
            type Update = $update;

            fn id(&self) -> Self::Id {
                self.$id_field
            }

            fn target_space(update: &Self::Update) -> Option<SpaceId> {
                update.space_id
            }

            async fn fetch(store: &dyn ContentStore, id: Self::Id) -> SnipspaceResult<Option<Self>> {
                tracked("get", Self::entity_type(), store.$get(id)).await
            }

            async fn list(
                store: &dyn ContentStore,
                owner: &OwnerId,
                space_id: Option<SpaceId>,
            ) -> SnipspaceResult<Vec<Self>> {
                tracked("list", Self::entity_type(), store.$list(owner, space_id)).await
            }

            async fn insert(store: &dyn ContentStore, record: &Self) -> SnipspaceResult<()> {
                tracked("insert", Self::entity_type(), store.$insert(record)).await
            }

            async fn patch(
                store: &dyn ContentStore,
                id: Self::Id,
                update: Self::Update,
            ) -> SnipspaceResult<Self> {
                tracked("update", Self::entity_type(), store.$patch(id, update)).await
            }

            async fn remove(store: &dyn ContentStore, id: Self::Id) -> SnipspaceResult<()> {
                tracked("delete", Self::entity_type(), store.$delete(id)).await
            }
        }
    };
}

impl_stored_content!(
    Snippet,
    id: SnippetId => snippet_id,
    update: SnippetUpdate,
    ops: (snippet_get, snippet_list_by_owner, snippet_insert, snippet_update, snippet_delete)
);

impl_stored_content!(
    Note,
    id: NoteId => note_id,
    update: NoteUpdate,
    ops: (note_get, note_list_by_owner, note_insert, note_update, note_delete)
);

impl_stored_content!(
    Prompt,
    id: PromptId => prompt_id,
    update: NoteUpdate,
    ops: (prompt_get, prompt_list_by_owner, prompt_insert, prompt_update, prompt_delete)
);

// ============================================================================
// GENERIC OPERATIONS
// ============================================================================

/// Whether `space_id` is absent or owned by `owner`.
async fn space_visible(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: Option<SpaceId>,
) -> SnipspaceResult<bool> {
    let Some(space_id) = space_id else {
        return Ok(true);
    };
    match owned_space(store, owner, space_id).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// The owner's records of one kind that pass `filter`, newest first.
///
/// Scoping to a space the caller does not own yields an empty list.
pub async fn list_content<R: StoredContent>(
    store: &dyn ContentStore,
    owner: &OwnerId,
    filter: ContentFilter,
) -> SnipspaceResult<Vec<R>> {
    let filter = filter.normalized();
    if !space_visible(store, owner, filter.space_id).await? {
        return Ok(Vec::new());
    }

    let records = R::list(store, owner, filter.space_id).await?;
    Ok(filter.apply(records))
}

/// A single owned record.
pub async fn get_content<R: StoredContent>(
    store: &dyn ContentStore,
    owner: &OwnerId,
    id: R::Id,
) -> SnipspaceResult<R> {
    match R::fetch(store, id).await? {
        Some(record) if record.owner_id() == owner => Ok(record),
        Some(_) => {
            tracing::debug!(
                owner = %owner,
                entity = %R::entity_type(),
                id = %id,
                "Record owned by another user"
            );
            Err(SnipspaceError::not_found(R::entity_type(), id.as_uuid()))
        }
        None => Err(SnipspaceError::not_found(R::entity_type(), id.as_uuid())),
    }
}

/// Apply a validated partial update to an owned record.
///
/// Moving to another space requires owning that space.
pub async fn update_content<R: StoredContent>(
    store: &dyn ContentStore,
    owner: &OwnerId,
    id: R::Id,
    update: R::Update,
) -> SnipspaceResult<R> {
    get_content::<R>(store, owner, id).await?;
    if let Some(target) = R::target_space(&update) {
        owned_space(store, owner, target).await?;
    }
    R::patch(store, id, update).await
}

/// Delete an owned record.
pub async fn delete_content<R: StoredContent>(
    store: &dyn ContentStore,
    owner: &OwnerId,
    id: R::Id,
) -> SnipspaceResult<()> {
    get_content::<R>(store, owner, id).await?;
    R::remove(store, id).await?;
    tracing::debug!(owner = %owner, entity = %R::entity_type(), id = %id, "Record deleted");
    Ok(())
}

/// Space a new record goes into: required and owned by the caller.
async fn target_space_for_create(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: Option<SpaceId>,
) -> SnipspaceResult<SpaceId> {
    let space_id = space_id.ok_or_else(|| SnipspaceError::missing_field("space_id"))?;
    owned_space(store, owner, space_id).await?;
    Ok(space_id)
}

// ============================================================================
// CREATE / UPDATE PER KIND
// ============================================================================

pub async fn create_snippet(
    store: &dyn ContentStore,
    owner: &OwnerId,
    req: CreateSnippetRequest,
) -> SnipspaceResult<Snippet> {
    let title = require_non_blank("title", &req.title)?;
    let code = require_non_blank("code", &req.code)?;
    let language = require_non_blank("language", &req.language)?;
    let space_id = target_space_for_create(store, owner, req.space_id).await?;

    let now = Utc::now();
    let snippet = Snippet {
        snippet_id: SnippetId::now_v7(),
        owner_id: owner.clone(),
        space_id: Some(space_id),
        title,
        code,
        language,
        description: normalize_optional(req.description),
        tags: normalize_tags(req.tags),
        project: normalize_optional(req.project),
        created_at: now,
        updated_at: now,
    };

    Snippet::insert(store, &snippet).await?;
    Ok(snippet)
}

pub async fn update_snippet(
    store: &dyn ContentStore,
    owner: &OwnerId,
    id: SnippetId,
    req: UpdateSnippetRequest,
) -> SnipspaceResult<Snippet> {
    if !req.has_changes() {
        return Err(no_changes());
    }
    update_content::<Snippet>(store, owner, id, req.into_update()?).await
}

macro_rules! text_content_service {
    ($record:ident, $id:ident => $id_field:ident, $create_fn:ident, $create_req:ty, $update_fn:ident, $update_req:ty) => {
        pub async fn $create_fn(
            store: &dyn ContentStore,
            owner: &OwnerId,
            req: $create_req,
        ) -> SnipspaceResult<$record> {
            let title = require_non_blank("title", &req.title)?;
            let content = require_non_blank("content", &req.content)?;
            let space_id = target_space_for_create(store, owner, req.space_id).await?;

            let now = Utc::now();
            let record = $record {
                $id_field: $id::now_v7(),
                owner_id: owner.clone(),
                space_id: Some(space_id),
                title,
                content,
                description: normalize_optional(req.description),
                tags: normalize_tags(req.tags),
                project: normalize_optional(req.project),
                created_at: now,
                updated_at: now,
            };

            $record::insert(store, &record).await?;
            Ok(record)
        }

        pub async fn $update_fn(
            store: &dyn ContentStore,
            owner: &OwnerId,
            id: $id,
            req: $update_req,
        ) -> SnipspaceResult<$record> {
            if !req.has_changes() {
                return Err(no_changes());
            }
            update_content::<$record>(store, owner, id, req.into_update()?).await
        }
    };
}

text_content_service!(Note, NoteId => note_id, create_note, CreateNoteRequest, update_note, UpdateNoteRequest);
text_content_service!(Prompt, PromptId => prompt_id, create_prompt, CreatePromptRequest, update_prompt, UpdatePromptRequest);

// ============================================================================
// FACETS
// ============================================================================

/// Distinct snippet languages of the owner, optionally within one space.
pub async fn snippet_languages(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: Option<SpaceId>,
) -> SnipspaceResult<Vec<String>> {
    let snippets = list_content::<Snippet>(store, owner, scope(space_id)).await?;
    Ok(distinct_languages(&snippets))
}

/// Distinct projects of one content kind.
pub async fn content_projects<R: StoredContent>(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: Option<SpaceId>,
) -> SnipspaceResult<Vec<String>> {
    let records = list_content::<R>(store, owner, scope(space_id)).await?;
    Ok(distinct_projects(&records))
}

/// Projects across snippets and notes, for the combined project filter.
pub async fn all_projects(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: Option<SpaceId>,
) -> SnipspaceResult<Vec<String>> {
    let snippets = content_projects::<Snippet>(store, owner, space_id).await?;
    let notes = content_projects::<Note>(store, owner, space_id).await?;
    Ok(merge_facets(snippets, notes))
}

fn scope(space_id: Option<SpaceId>) -> ContentFilter {
    ContentFilter {
        space_id,
        ..ContentFilter::default()
    }
}
