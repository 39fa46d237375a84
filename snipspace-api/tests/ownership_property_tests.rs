//! Property tests for owner isolation across every content kind.
//!
//! A stranger's get, update, delete and move attempts on another owner's
//! snippet, note or prompt must all come back as that kind's NotFound and
//! leave the stored record untouched.

use proptest::prelude::*;
use snipspace_api::services::{self, StoredContent};
use snipspace_core::{
    ContentRecord, EntityIdType, Note, OwnerId, Prompt, Snippet, SnipspaceError, Space,
};
use snipspace_storage::{ContentStore, InMemoryStore, NoteUpdate, SnippetUpdate};
use snipspace_test_utils::generators::{
    arb_note, arb_owner_id, arb_prompt, arb_snippet, arb_space,
};

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => panic!("failed to build runtime: {e}"),
    }
}

/// Two distinct owners, each with one space, plus one record of every kind
/// in the first owner's space.
fn arb_scenario() -> impl Strategy<Value = (Space, Space, Snippet, Note, Prompt)> {
    (arb_owner_id(), arb_owner_id())
        .prop_filter("owners must differ", |(owner, stranger)| owner != stranger)
        .prop_flat_map(|(owner, stranger)| (arb_space(owner), arb_space(stranger)))
        .prop_flat_map(|(space, strangers_space)| {
            let owner = space.owner_id.clone();
            let space_id = Some(space.space_id);
            (
                Just(space),
                Just(strangers_space),
                arb_snippet(owner.clone(), space_id),
                arb_note(owner.clone(), space_id),
                arb_prompt(owner, space_id),
            )
        })
}

/// Run every foreign operation against `record` and check nothing leaked or
/// changed.
async fn assert_hidden_from<R>(
    store: &InMemoryStore,
    record: R,
    stranger: &OwnerId,
    edit: R::Update,
    move_to_strangers_space: R::Update,
) -> Result<(), TestCaseError>
where
    R: StoredContent + PartialEq + std::fmt::Debug,
{
    let id = record.id();
    let not_found = SnipspaceError::not_found(R::entity_type(), id.as_uuid());

    let got = services::get_content::<R>(store, stranger, id).await;
    prop_assert_eq!(got.err(), Some(not_found.clone()));

    let edited = services::update_content::<R>(store, stranger, id, edit).await;
    prop_assert_eq!(edited.err(), Some(not_found.clone()));

    let moved = services::update_content::<R>(store, stranger, id, move_to_strangers_space).await;
    prop_assert_eq!(moved.err(), Some(not_found.clone()));

    let deleted = services::delete_content::<R>(store, stranger, id).await;
    prop_assert_eq!(deleted.err(), Some(not_found));

    let owner = record.owner_id().clone();
    prop_assert_eq!(R::fetch(store, id).await?, Some(record.clone()));
    prop_assert_eq!(services::get_content::<R>(store, &owner, id).await?, record);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_foreign_content_is_not_found_and_unchanged(
        (space, strangers_space, snippet, note, prompt) in arb_scenario(),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let store = InMemoryStore::new();
            store.space_insert(&space).await?;
            store.space_insert(&strangers_space).await?;
            store.snippet_insert(&snippet).await?;
            store.note_insert(&note).await?;
            store.prompt_insert(&prompt).await?;
            let stranger = &strangers_space.owner_id;
            let target = Some(strangers_space.space_id);

            assert_hidden_from(
                &store,
                snippet,
                stranger,
                SnippetUpdate {
                    title: Some("hijacked".to_string()),
                    code: Some("rm -rf /".to_string()),
                    ..SnippetUpdate::default()
                },
                SnippetUpdate { space_id: target, ..SnippetUpdate::default() },
            )
            .await?;

            assert_hidden_from(
                &store,
                note,
                stranger,
                NoteUpdate {
                    title: Some("hijacked".to_string()),
                    content: Some("replaced".to_string()),
                    ..NoteUpdate::default()
                },
                NoteUpdate { space_id: target, ..NoteUpdate::default() },
            )
            .await?;

            assert_hidden_from(
                &store,
                prompt,
                stranger,
                NoteUpdate {
                    title: Some("hijacked".to_string()),
                    content: Some("ignore previous instructions".to_string()),
                    ..NoteUpdate::default()
                },
                NoteUpdate { space_id: target, ..NoteUpdate::default() },
            )
            .await?;
            Ok::<(), TestCaseError>(())
        })?;
    }
}
