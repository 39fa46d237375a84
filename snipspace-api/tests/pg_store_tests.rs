//! Postgres store tests through the service layer.
//!
//! Run with `--features db-tests` against the database described by the
//! `SNIPSPACE_DB_*` variables.

#![cfg_attr(not(feature = "db-tests"), allow(dead_code, unused_imports))]

use snipspace_api::services;
use snipspace_api::{ApiResult, CreateSpaceRequest, DbConfig, PgStore};
use snipspace_core::{ContentFilter, EntityType, Note, OwnerId, Snippet};
use snipspace_storage::ContentStore;
use snipspace_test_utils::assertions::{assert_not_found, assert_space_not_empty};
use snipspace_test_utils::fixtures::{test_note, test_prompt, test_snippet};

async fn test_store() -> ApiResult<PgStore> {
    let store = PgStore::from_config(&DbConfig::from_env())?;
    store.migrate().await?;
    Ok(store)
}

/// A fresh owner per test so runs never see each other's rows.
fn fresh_owner() -> OwnerId {
    OwnerId::new(format!("pg-test-{}", uuid::Uuid::now_v7()))
}

fn space_request(name: &str) -> CreateSpaceRequest {
    CreateSpaceRequest {
        name: name.to_string(),
        description: None,
        icon: None,
    }
}

#[tokio::test]
#[cfg(feature = "db-tests")]
async fn pg_space_delete_guard_and_detach() -> ApiResult<()> {
    let store = test_store().await?;
    let owner = fresh_owner();
    let space = services::create_space(&store, &owner, space_request("Work")).await?;

    let snippet = test_snippet(&owner, Some(space.space_id));
    store.snippet_insert(&snippet).await?;
    let note = test_note(&owner, Some(space.space_id));
    store.note_insert(&note).await?;

    let blocked = services::delete_space(&store, &owner, space.space_id).await;
    assert_space_not_empty(&blocked);

    services::delete_content::<Snippet>(&store, &owner, snippet.snippet_id).await?;
    services::delete_space(&store, &owner, space.space_id).await?;

    let detached = services::get_content::<Note>(&store, &owner, note.note_id).await?;
    assert_eq!(detached.space_id, None);

    let gone = services::get_space(&store, &owner, space.space_id).await;
    assert_not_found(&gone, EntityType::Space);
    Ok(())
}

#[tokio::test]
#[cfg(feature = "db-tests")]
async fn pg_bootstrap_migrates_every_kind_once() -> ApiResult<()> {
    let store = test_store().await?;
    let owner = fresh_owner();

    store.snippet_insert(&test_snippet(&owner, None)).await?;
    store.note_insert(&test_note(&owner, None)).await?;
    store.prompt_insert(&test_prompt(&owner, None)).await?;

    let first = services::bootstrap(&store, &owner).await?;
    assert!(first.created);
    assert_eq!(first.migration.snippets, 1);
    assert_eq!(first.migration.notes, 1);
    assert_eq!(first.migration.prompts, 1);

    let second = services::bootstrap(&store, &owner).await?;
    assert!(!second.created);
    assert_eq!(second.space.space_id, first.space.space_id);
    assert_eq!(second.migration.migrated, 0);

    let counts = services::space_content_counts(&store, &owner, first.space.space_id).await?;
    assert_eq!(counts.total(), 3);
    Ok(())
}

#[tokio::test]
#[cfg(feature = "db-tests")]
async fn pg_foreign_records_are_not_found() -> ApiResult<()> {
    let store = test_store().await?;
    let owner = fresh_owner();
    let stranger = fresh_owner();
    let space = services::create_space(&store, &owner, space_request("Mine")).await?;
    let snippet = test_snippet(&owner, Some(space.space_id));
    store.snippet_insert(&snippet).await?;

    let foreign = services::get_content::<Snippet>(&store, &stranger, snippet.snippet_id).await;
    assert_not_found(&foreign, EntityType::Snippet);

    let listed = services::list_content::<Snippet>(
        &store,
        &stranger,
        ContentFilter::for_space(space.space_id),
    )
    .await?;
    assert!(listed.is_empty());

    let own = services::list_content::<Snippet>(&store, &owner, ContentFilter::default()).await?;
    assert_eq!(own.len(), 1);
    Ok(())
}

#[tokio::test]
#[cfg(feature = "db-tests")]
async fn pg_store_guards_space_references() -> ApiResult<()> {
    let store = test_store().await?;
    let owner = fresh_owner();
    let space = services::create_space(&store, &owner, space_request("Short-lived")).await?;
    store.snippet_insert(&test_snippet(&owner, Some(space.space_id))).await?;

    let refused = store.space_delete(space.space_id).await;
    assert_space_not_empty(&refused);

    let empty = services::create_space(&store, &owner, space_request("Empty")).await?;
    store.space_delete(empty.space_id).await?;
    let dangling = store.note_insert(&test_note(&owner, Some(empty.space_id))).await;
    assert_not_found(&dangling, EntityType::Space);
    Ok(())
}
