//! In-memory content store.
//!
//! All four tables sit behind one `tokio::sync::RwLock`, so multi-table
//! operations such as orphan assignment are atomic.

use crate::{now, ContentStore, NoteUpdate, PromptUpdate, SnippetUpdate, SpaceUpdate};
use ::async_trait::async_trait;
use snipspace_core::{
    ContentCounts, ContentRecord, DomainError, EntityType, Note, NoteId, OwnerId, Prompt,
    PromptId, SnipspaceError, SnipspaceResult, Snippet, SnippetId, Space, SpaceId, StorageError,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    spaces: HashMap<SpaceId, Space>,
    snippets: HashMap<SnippetId, Snippet>,
    notes: HashMap<NoteId, Note>,
    prompts: HashMap<PromptId, Prompt>,
}

/// In-memory store used by tests and as the default runtime backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        *tables = Tables::default();
    }

    /// Total number of stored rows per table: spaces, then content counts.
    pub async fn row_counts(&self) -> (usize, ContentCounts) {
        let tables = self.tables.read().await;
        (
            tables.spaces.len(),
            ContentCounts {
                snippets: tables.snippets.len() as u64,
                notes: tables.notes.len() as u64,
                prompts: tables.prompts.len() as u64,
            },
        )
    }
}

fn insert_row<K, V>(
    table: &mut HashMap<K, V>,
    id: K,
    row: &V,
    entity_type: EntityType,
) -> SnipspaceResult<()>
where
    K: Eq + Hash,
    V: Clone,
{
    if table.contains_key(&id) {
        return Err(SnipspaceError::Storage(StorageError::InsertFailed {
            entity_type,
            reason: "already exists".to_string(),
        }));
    }
    table.insert(id, row.clone());
    Ok(())
}

fn row_mut<K, V>(table: &mut HashMap<K, V>, id: K, entity_type: EntityType) -> SnipspaceResult<&mut V>
where
    K: Eq + Hash + Copy + Into<Uuid>,
{
    table.get_mut(&id).ok_or_else(|| {
        SnipspaceError::Storage(StorageError::NotFound {
            entity_type,
            id: id.into(),
        })
    })
}

fn delete_row<K, V>(table: &mut HashMap<K, V>, id: K, entity_type: EntityType) -> SnipspaceResult<()>
where
    K: Eq + Hash + Copy + Into<Uuid>,
{
    match table.remove(&id) {
        Some(_) => Ok(()),
        None => Err(SnipspaceError::Storage(StorageError::NotFound {
            entity_type,
            id: id.into(),
        })),
    }
}

/// Content may only reference a space that exists.
fn require_space(spaces: &HashMap<SpaceId, Space>, space_id: Option<SpaceId>) -> SnipspaceResult<()> {
    match space_id {
        Some(id) if !spaces.contains_key(&id) => {
            Err(SnipspaceError::Storage(StorageError::NotFound {
                entity_type: EntityType::Space,
                id: id.into(),
            }))
        }
        _ => Ok(()),
    }
}

fn list_owned<K, V>(table: &HashMap<K, V>, owner: &OwnerId, space_id: Option<SpaceId>) -> Vec<V>
where
    V: ContentRecord + Clone,
{
    table
        .values()
        .filter(|r| r.owner_id() == owner)
        .filter(|r| space_id.map_or(true, |s| r.space_id() == Some(s)))
        .cloned()
        .collect()
}

fn count_in_space<K, V: ContentRecord>(table: &HashMap<K, V>, space_id: SpaceId) -> u64 {
    table
        .values()
        .filter(|r| r.space_id() == Some(space_id))
        .count() as u64
}

#[async_trait]
impl ContentStore for InMemoryStore {
    // === Space Operations ===

    async fn space_insert(&self, space: &Space) -> SnipspaceResult<()> {
        let mut tables = self.tables.write().await;
        insert_row(&mut tables.spaces, space.space_id, space, EntityType::Space)
    }

    async fn space_get(&self, id: SpaceId) -> SnipspaceResult<Option<Space>> {
        let tables = self.tables.read().await;
        Ok(tables.spaces.get(&id).cloned())
    }

    async fn space_update(&self, id: SpaceId, update: SpaceUpdate) -> SnipspaceResult<Space> {
        let mut tables = self.tables.write().await;
        let space = row_mut(&mut tables.spaces, id, EntityType::Space)?;
        update.apply_to(space, now());
        Ok(space.clone())
    }

    async fn space_delete(&self, id: SpaceId) -> SnipspaceResult<ContentCounts> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, Some(id))?;

        let snippets = count_in_space(&tables.snippets, id);
        if snippets > 0 {
            return Err(SnipspaceError::Domain(DomainError::SpaceNotEmpty {
                space_id: id.into(),
                snippets,
            }));
        }

        let stamp = now();
        let mut detached = ContentCounts::default();
        for note in tables.notes.values_mut() {
            if note.space_id == Some(id) {
                note.space_id = None;
                note.updated_at = stamp;
                detached.notes += 1;
            }
        }
        for prompt in tables.prompts.values_mut() {
            if prompt.space_id == Some(id) {
                prompt.space_id = None;
                prompt.updated_at = stamp;
                detached.prompts += 1;
            }
        }

        delete_row(&mut tables.spaces, id, EntityType::Space)?;
        Ok(detached)
    }

    async fn space_list_by_owner(&self, owner: &OwnerId) -> SnipspaceResult<Vec<Space>> {
        let tables = self.tables.read().await;
        Ok(tables
            .spaces
            .values()
            .filter(|s| &s.owner_id == owner)
            .cloned()
            .collect())
    }

    // === Snippet Operations ===

    async fn snippet_insert(&self, snippet: &Snippet) -> SnipspaceResult<()> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, snippet.space_id)?;
        insert_row(
            &mut tables.snippets,
            snippet.snippet_id,
            snippet,
            EntityType::Snippet,
        )
    }

    async fn snippet_get(&self, id: SnippetId) -> SnipspaceResult<Option<Snippet>> {
        let tables = self.tables.read().await;
        Ok(tables.snippets.get(&id).cloned())
    }

    async fn snippet_update(
        &self,
        id: SnippetId,
        update: SnippetUpdate,
    ) -> SnipspaceResult<Snippet> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, update.space_id)?;
        let snippet = row_mut(&mut tables.snippets, id, EntityType::Snippet)?;
        update.apply_to(snippet, now());
        Ok(snippet.clone())
    }

    async fn snippet_delete(&self, id: SnippetId) -> SnipspaceResult<()> {
        let mut tables = self.tables.write().await;
        delete_row(&mut tables.snippets, id, EntityType::Snippet)
    }

    async fn snippet_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Snippet>> {
        let tables = self.tables.read().await;
        Ok(list_owned(&tables.snippets, owner, space_id))
    }

    // === Note Operations ===

    async fn note_insert(&self, note: &Note) -> SnipspaceResult<()> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, note.space_id)?;
        insert_row(&mut tables.notes, note.note_id, note, EntityType::Note)
    }

    async fn note_get(&self, id: NoteId) -> SnipspaceResult<Option<Note>> {
        let tables = self.tables.read().await;
        Ok(tables.notes.get(&id).cloned())
    }

    async fn note_update(&self, id: NoteId, update: NoteUpdate) -> SnipspaceResult<Note> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, update.space_id)?;
        let note = row_mut(&mut tables.notes, id, EntityType::Note)?;
        update.apply_to_note(note, now());
        Ok(note.clone())
    }

    async fn note_delete(&self, id: NoteId) -> SnipspaceResult<()> {
        let mut tables = self.tables.write().await;
        delete_row(&mut tables.notes, id, EntityType::Note)
    }

    async fn note_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Note>> {
        let tables = self.tables.read().await;
        Ok(list_owned(&tables.notes, owner, space_id))
    }

    // === Prompt Operations ===

    async fn prompt_insert(&self, prompt: &Prompt) -> SnipspaceResult<()> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, prompt.space_id)?;
        insert_row(&mut tables.prompts, prompt.prompt_id, prompt, EntityType::Prompt)
    }

    async fn prompt_get(&self, id: PromptId) -> SnipspaceResult<Option<Prompt>> {
        let tables = self.tables.read().await;
        Ok(tables.prompts.get(&id).cloned())
    }

    async fn prompt_update(&self, id: PromptId, update: PromptUpdate) -> SnipspaceResult<Prompt> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, update.space_id)?;
        let prompt = row_mut(&mut tables.prompts, id, EntityType::Prompt)?;
        update.apply_to_prompt(prompt, now());
        Ok(prompt.clone())
    }

    async fn prompt_delete(&self, id: PromptId) -> SnipspaceResult<()> {
        let mut tables = self.tables.write().await;
        delete_row(&mut tables.prompts, id, EntityType::Prompt)
    }

    async fn prompt_list_by_owner(
        &self,
        owner: &OwnerId,
        space_id: Option<SpaceId>,
    ) -> SnipspaceResult<Vec<Prompt>> {
        let tables = self.tables.read().await;
        Ok(list_owned(&tables.prompts, owner, space_id))
    }

    // === Space Membership ===

    async fn space_content_counts(&self, space_id: SpaceId) -> SnipspaceResult<ContentCounts> {
        let tables = self.tables.read().await;
        Ok(ContentCounts {
            snippets: count_in_space(&tables.snippets, space_id),
            notes: count_in_space(&tables.notes, space_id),
            prompts: count_in_space(&tables.prompts, space_id),
        })
    }

    async fn assign_orphans(
        &self,
        owner: &OwnerId,
        space_id: SpaceId,
    ) -> SnipspaceResult<ContentCounts> {
        let mut tables = self.tables.write().await;
        require_space(&tables.spaces, Some(space_id))?;
        let stamp = now();
        let mut counts = ContentCounts::default();

        for snippet in tables.snippets.values_mut() {
            if &snippet.owner_id == owner && snippet.space_id.is_none() {
                snippet.space_id = Some(space_id);
                snippet.updated_at = stamp;
                counts.snippets += 1;
            }
        }
        for note in tables.notes.values_mut() {
            if &note.owner_id == owner && note.space_id.is_none() {
                note.space_id = Some(space_id);
                note.updated_at = stamp;
                counts.notes += 1;
            }
        }
        for prompt in tables.prompts.values_mut() {
            if &prompt.owner_id == owner && prompt.space_id.is_none() {
                prompt.space_id = Some(space_id);
                prompt.updated_at = stamp;
                counts.prompts += 1;
            }
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use snipspace_core::EntityIdType;

    fn make_space(owner: &str) -> Space {
        let now = Utc::now();
        Space {
            space_id: SpaceId::now_v7(),
            owner_id: OwnerId::new(owner),
            name: "Work".to_string(),
            description: None,
            icon: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_snippet(owner: &str, space_id: Option<SpaceId>) -> Snippet {
        let now = Utc::now();
        Snippet {
            snippet_id: SnippetId::now_v7(),
            owner_id: OwnerId::new(owner),
            space_id,
            title: "hello".to_string(),
            code: "echo hi".to_string(),
            language: "bash".to_string(),
            description: None,
            tags: vec![],
            project: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_note(owner: &str, space_id: Option<SpaceId>) -> Note {
        let now = Utc::now();
        Note {
            note_id: NoteId::now_v7(),
            owner_id: OwnerId::new(owner),
            space_id,
            title: "note".to_string(),
            content: "text".to_string(),
            description: None,
            tags: vec![],
            project: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_space_insert_and_get() -> SnipspaceResult<()> {
        let store = InMemoryStore::new();
        let space = make_space("alice");
        store.space_insert(&space).await?;

        assert_eq!(store.space_get(space.space_id).await?, Some(space.clone()));
        assert!(store.space_insert(&space).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let store = InMemoryStore::new();
        let result = store
            .snippet_update(SnippetId::now_v7(), SnippetUpdate::default())
            .await;
        assert!(matches!(result, Err(ref e) if e.is_not_found()));

        let result = store.note_delete(NoteId::now_v7()).await;
        assert!(matches!(result, Err(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn test_list_by_owner_scopes_to_owner_and_space() -> SnipspaceResult<()> {
        let store = InMemoryStore::new();
        let space = make_space("alice");
        store.space_insert(&space).await?;
        store.snippet_insert(&make_snippet("alice", Some(space.space_id))).await?;
        store.snippet_insert(&make_snippet("alice", None)).await?;
        store.snippet_insert(&make_snippet("bob", Some(space.space_id))).await?;

        let alice = OwnerId::new("alice");
        assert_eq!(store.snippet_list_by_owner(&alice, None).await?.len(), 2);
        assert_eq!(
            store
                .snippet_list_by_owner(&alice, Some(space.space_id))
                .await?
                .len(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_assign_orphans_only_touches_owner_orphans() -> SnipspaceResult<()> {
        let store = InMemoryStore::new();
        let space = make_space("alice");
        store.space_insert(&space).await?;
        store.snippet_insert(&make_snippet("alice", None)).await?;
        store.note_insert(&make_note("alice", None)).await?;
        store.note_insert(&make_note("bob", None)).await?;

        let alice = OwnerId::new("alice");
        let counts = store.assign_orphans(&alice, space.space_id).await?;
        assert_eq!(counts.snippets, 1);
        assert_eq!(counts.notes, 1);
        assert_eq!(counts.total(), 2);

        let again = store.assign_orphans(&alice, space.space_id).await?;
        assert_eq!(again.total(), 0);

        let bob_notes = store.note_list_by_owner(&OwnerId::new("bob"), None).await?;
        assert!(bob_notes.iter().all(|n| n.space_id.is_none()));
        Ok(())
    }

    #[tokio::test]
    async fn test_space_delete_detaches_notes() -> SnipspaceResult<()> {
        let store = InMemoryStore::new();
        let space = make_space("alice");
        store.space_insert(&space).await?;
        let note = make_note("alice", Some(space.space_id));
        store.note_insert(&note).await?;
        assert_eq!(store.space_content_counts(space.space_id).await?.notes, 1);

        let detached = store.space_delete(space.space_id).await?;
        assert_eq!(detached.notes, 1);
        assert_eq!(store.space_get(space.space_id).await?, None);

        let stored = store.note_get(note.note_id).await?;
        assert_eq!(stored.and_then(|n| n.space_id), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_space_delete_refused_while_snippets_remain() -> SnipspaceResult<()> {
        let store = InMemoryStore::new();
        let space = make_space("alice");
        store.space_insert(&space).await?;
        store.snippet_insert(&make_snippet("alice", Some(space.space_id))).await?;
        let note = make_note("alice", Some(space.space_id));
        store.note_insert(&note).await?;

        let result = store.space_delete(space.space_id).await;
        assert!(matches!(
            result,
            Err(SnipspaceError::Domain(DomainError::SpaceNotEmpty { snippets: 1, .. }))
        ));

        // Nothing changed.
        assert!(store.space_get(space.space_id).await?.is_some());
        let stored = store.note_get(note.note_id).await?;
        assert_eq!(stored.and_then(|n| n.space_id), Some(space.space_id));
        Ok(())
    }

    #[tokio::test]
    async fn test_content_cannot_reference_missing_space() -> SnipspaceResult<()> {
        let store = InMemoryStore::new();
        let missing = SpaceId::now_v7();

        let result = store.snippet_insert(&make_snippet("alice", Some(missing))).await;
        assert!(matches!(
            result,
            Err(SnipspaceError::Storage(StorageError::NotFound {
                entity_type: EntityType::Space,
                ..
            }))
        ));

        let note = make_note("alice", None);
        store.note_insert(&note).await?;
        let moved = store
            .note_update(
                note.note_id,
                NoteUpdate {
                    space_id: Some(missing),
                    ..NoteUpdate::default()
                },
            )
            .await;
        assert!(matches!(moved, Err(ref e) if e.is_not_found()));
        assert_eq!(store.row_counts().await.1.snippets, 0);
        Ok(())
    }
}
