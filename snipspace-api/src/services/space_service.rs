//! Space Service
//!
//! Space CRUD, the delete guard, default-space creation and orphan
//! migration.

use chrono::Utc;
use snipspace_core::{
    normalize_optional, require_non_blank, ContentCounts, DomainError, EntityIdType, EntityType,
    OwnerId, SnipspaceError, SnipspaceResult, Space, SpaceId, ValidationError,
    DEFAULT_SPACE_DESCRIPTION, DEFAULT_SPACE_ICON, DEFAULT_SPACE_NAME,
};
use snipspace_storage::ContentStore;

use super::{owned_space, tracked};
use crate::telemetry::METRICS;
use crate::types::{
    BootstrapResponse, CreateSpaceRequest, DefaultSpaceResponse, MigrateOrphansResponse,
    UpdateSpaceRequest,
};

fn newest_first(spaces: &mut [Space]) {
    spaces.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.space_id.cmp(&a.space_id))
    });
}

/// All spaces of `owner`, newest first.
pub async fn list_spaces(store: &dyn ContentStore, owner: &OwnerId) -> SnipspaceResult<Vec<Space>> {
    let mut spaces = tracked("list", EntityType::Space, store.space_list_by_owner(owner)).await?;
    newest_first(&mut spaces);
    Ok(spaces)
}

/// A single space. Spaces of other owners are reported as not found.
pub async fn get_space(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<Space> {
    owned_space(store, owner, space_id).await
}

fn new_space(owner: &OwnerId, name: String, description: Option<String>, icon: Option<String>) -> Space {
    let now = Utc::now();
    Space {
        space_id: SpaceId::now_v7(),
        owner_id: owner.clone(),
        name,
        description: normalize_optional(description),
        icon: normalize_optional(icon),
        created_at: now,
        updated_at: now,
    }
}

/// Create a space owned by `owner`.
pub async fn create_space(
    store: &dyn ContentStore,
    owner: &OwnerId,
    req: CreateSpaceRequest,
) -> SnipspaceResult<Space> {
    let name = require_non_blank("name", &req.name)?;
    let space = new_space(owner, name, req.description, req.icon);

    tracked("insert", EntityType::Space, store.space_insert(&space)).await?;
    tracing::debug!(owner = %owner, space_id = %space.space_id, "Space created");
    Ok(space)
}

/// Apply a partial update to an owned space.
pub async fn update_space(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
    req: UpdateSpaceRequest,
) -> SnipspaceResult<Space> {
    if !req.has_changes() {
        return Err(no_changes());
    }
    let update = req.into_update()?;

    owned_space(store, owner, space_id).await?;
    tracked("update", EntityType::Space, store.space_update(space_id, update)).await
}

pub(crate) fn no_changes() -> SnipspaceError {
    SnipspaceError::Validation(ValidationError::InvalidValue {
        field: "body".to_string(),
        reason: "at least one field must be provided for update".to_string(),
    })
}

/// Delete an owned space.
///
/// Refused while any snippet references the space. Notes and prompts still
/// in it are detached and become orphaned.
pub async fn delete_space(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<()> {
    owned_space(store, owner, space_id).await?;

    let detached = tracked("delete", EntityType::Space, store.space_delete(space_id))
        .await
        .map_err(|err| {
            if let SnipspaceError::Domain(DomainError::SpaceNotEmpty { snippets, .. }) = &err {
                tracing::debug!(
                    owner = %owner,
                    space_id = %space_id,
                    snippets = *snippets,
                    "Space delete refused"
                );
            }
            err
        })?;

    tracing::info!(
        owner = %owner,
        space_id = %space_id,
        detached_notes = detached.notes,
        detached_prompts = detached.prompts,
        "Space deleted"
    );
    Ok(())
}

/// Per-kind content counts of an owned space.
pub async fn space_content_counts(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<ContentCounts> {
    owned_space(store, owner, space_id).await?;
    tracked("count", EntityType::Space, store.space_content_counts(space_id)).await
}

pub async fn snippet_count(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<u64> {
    Ok(space_content_counts(store, owner, space_id).await?.snippets)
}

pub async fn note_count(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<u64> {
    Ok(space_content_counts(store, owner, space_id).await?.notes)
}

pub async fn prompt_count(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<u64> {
    Ok(space_content_counts(store, owner, space_id).await?.prompts)
}

/// Return the owner's oldest space, creating the default one if they have
/// none.
pub async fn ensure_default_space(
    store: &dyn ContentStore,
    owner: &OwnerId,
) -> SnipspaceResult<DefaultSpaceResponse> {
    let spaces = tracked("list", EntityType::Space, store.space_list_by_owner(owner)).await?;

    let oldest = spaces
        .into_iter()
        .min_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.space_id.cmp(&b.space_id))
        });

    if let Some(space) = oldest {
        return Ok(DefaultSpaceResponse {
            space,
            created: false,
        });
    }

    let space = new_space(
        owner,
        DEFAULT_SPACE_NAME.to_string(),
        Some(DEFAULT_SPACE_DESCRIPTION.to_string()),
        Some(DEFAULT_SPACE_ICON.to_string()),
    );
    tracked("insert", EntityType::Space, store.space_insert(&space)).await?;

    tracing::info!(owner = %owner, space_id = %space.space_id, "Default space created");
    Ok(DefaultSpaceResponse {
        space,
        created: true,
    })
}

/// Assign every space-less snippet, note and prompt of `owner` to an owned
/// space. A second run migrates nothing.
pub async fn migrate_orphans(
    store: &dyn ContentStore,
    owner: &OwnerId,
    space_id: SpaceId,
) -> SnipspaceResult<MigrateOrphansResponse> {
    owned_space(store, owner, space_id).await?;

    let counts = tracked(
        "assign_orphans",
        EntityType::Space,
        store.assign_orphans(owner, space_id),
    )
    .await?;

    if counts.total() > 0 {
        if let Ok(metrics) = METRICS.as_ref() {
            metrics.record_orphans_migrated(counts.total());
        }
        tracing::info!(
            owner = %owner,
            space_id = %space_id,
            snippets = counts.snippets,
            notes = counts.notes,
            prompts = counts.prompts,
            "Orphaned content migrated"
        );
    }

    Ok(MigrateOrphansResponse::new(space_id, counts))
}

/// First-load setup: make sure a default space exists and move orphaned
/// content into it.
pub async fn bootstrap(store: &dyn ContentStore, owner: &OwnerId) -> SnipspaceResult<BootstrapResponse> {
    let DefaultSpaceResponse { space, created } = ensure_default_space(store, owner).await?;
    let migration = migrate_orphans(store, owner, space.space_id).await?;
    Ok(BootstrapResponse {
        space,
        created,
        migration,
    })
}
