//! Snipspace Storage - Storage Trait and In-Memory Store
//!
//! Defines the storage abstraction for spaces and their content. The Postgres
//! implementation lives in snipspace-api next to its connection pool.

pub mod memory;
pub mod store;

pub use memory::InMemoryStore;
pub use store::ContentStore;

use chrono::Utc;
use snipspace_core::{
    normalize_optional, normalize_tags, Note, Prompt, Snippet, Space, SpaceId, Timestamp,
};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for spaces.
///
/// `Some(None)` on an optional field clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
}

impl SpaceUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.icon.is_none()
    }

    /// Apply the patch in place and bump `updated_at`.
    pub fn apply_to(self, space: &mut Space, now: Timestamp) {
        if let Some(name) = self.name {
            space.name = name;
        }
        if let Some(description) = self.description {
            space.description = normalize_optional(description);
        }
        if let Some(icon) = self.icon {
            space.icon = normalize_optional(icon);
        }
        space.updated_at = now;
    }
}

/// Update payload for snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetUpdate {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub project: Option<Option<String>>,
    /// Move to another space.
    pub space_id: Option<SpaceId>,
}

impl SnippetUpdate {
    pub fn apply_to(self, snippet: &mut Snippet, now: Timestamp) {
        if let Some(title) = self.title {
            snippet.title = title;
        }
        if let Some(code) = self.code {
            snippet.code = code;
        }
        if let Some(language) = self.language {
            snippet.language = language;
        }
        if let Some(description) = self.description {
            snippet.description = normalize_optional(description);
        }
        if let Some(tags) = self.tags {
            snippet.tags = normalize_tags(tags);
        }
        if let Some(project) = self.project {
            snippet.project = normalize_optional(project);
        }
        if let Some(space_id) = self.space_id {
            snippet.space_id = Some(space_id);
        }
        snippet.updated_at = now;
    }
}

/// Update payload for notes. Prompts share the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub project: Option<Option<String>>,
    /// Move to another space.
    pub space_id: Option<SpaceId>,
}

/// Update payload for prompts.
pub type PromptUpdate = NoteUpdate;

macro_rules! impl_text_update {
    ($method:ident, $record:ty) => {
        impl NoteUpdate {
            pub fn $method(self, record: &mut $record, now: Timestamp) {
                if let Some(title) = self.title {
                    record.title = title;
                }
                if let Some(content) = self.content {
                    record.content = content;
                }
                if let Some(description) = self.description {
                    record.description = normalize_optional(description);
                }
                if let Some(tags) = self.tags {
                    record.tags = normalize_tags(tags);
                }
                if let Some(project) = self.project {
                    record.project = normalize_optional(project);
                }
                if let Some(space_id) = self.space_id {
                    record.space_id = Some(space_id);
                }
                record.updated_at = now;
            }
        }
    };
}

impl_text_update!(apply_to_note, Note);
impl_text_update!(apply_to_prompt, Prompt);

/// Current time for `updated_at` stamps.
pub(crate) fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipspace_core::{EntityIdType, OwnerId, SnippetId};

    fn make_snippet() -> Snippet {
        let now = Utc::now();
        Snippet {
            snippet_id: SnippetId::now_v7(),
            owner_id: OwnerId::new("alice"),
            space_id: None,
            title: "Old".to_string(),
            code: "print(1)".to_string(),
            language: "python".to_string(),
            description: Some("desc".to_string()),
            tags: vec!["a".to_string()],
            project: Some("proj".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_snippet_update_is_partial() {
        let mut snippet = make_snippet();
        let created = snippet.created_at;
        let later = created + chrono::Duration::seconds(5);

        SnippetUpdate {
            title: Some("New".to_string()),
            project: Some(None),
            tags: Some(vec![" b ".to_string(), "b".to_string()]),
            ..SnippetUpdate::default()
        }
        .apply_to(&mut snippet, later);

        assert_eq!(snippet.title, "New");
        assert_eq!(snippet.code, "print(1)");
        assert_eq!(snippet.description.as_deref(), Some("desc"));
        assert_eq!(snippet.project, None);
        assert_eq!(snippet.tags, vec!["b".to_string()]);
        assert_eq!(snippet.created_at, created);
        assert_eq!(snippet.updated_at, later);
    }

    #[test]
    fn test_space_update_blank_description_clears() {
        let now = Utc::now();
        let mut space = Space {
            space_id: SpaceId::now_v7(),
            owner_id: OwnerId::new("alice"),
            name: "Work".to_string(),
            description: Some("stuff".to_string()),
            icon: None,
            created_at: now,
            updated_at: now,
        };

        let update = SpaceUpdate {
            description: Some(Some("   ".to_string())),
            ..SpaceUpdate::default()
        };
        assert!(!update.is_empty());
        update.apply_to(&mut space, now);
        assert_eq!(space.description, None);
        assert_eq!(space.name, "Work");
    }
}
