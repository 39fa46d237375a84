//! Core entity structures

use crate::{
    ContentKind, EntityId, EntityIdType, NoteId, OwnerId, PromptId, SnippetId, SpaceId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Space - user-owned grouping container for content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Space {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub space_id: SpaceId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub owner_id: OwnerId,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Snippet - a titled piece of code in some language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Snippet {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub snippet_id: SnippetId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub owner_id: OwnerId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub space_id: Option<SpaceId>,
    pub title: String,
    pub code: String,
    pub language: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub project: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Note - free-form text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Note {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub note_id: NoteId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub owner_id: OwnerId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub space_id: Option<SpaceId>,
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub project: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Prompt - same shape as a note, kept in its own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Prompt {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub prompt_id: PromptId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub owner_id: OwnerId,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub space_id: Option<SpaceId>,
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub project: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// Number of records of each kind inside one space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContentCounts {
    pub snippets: u64,
    pub notes: u64,
    pub prompts: u64,
}

impl ContentCounts {
    pub fn total(&self) -> u64 {
        self.snippets + self.notes + self.prompts
    }
}

/// Read access shared by every content record, used by filtering, sorting
/// and facet extraction.
pub trait ContentRecord {
    const KIND: ContentKind;

    fn entity_id(&self) -> EntityId;
    fn owner_id(&self) -> &OwnerId;
    fn space_id(&self) -> Option<SpaceId>;
    fn title(&self) -> &str;
    fn project(&self) -> Option<&str>;
    fn created_at(&self) -> Timestamp;

    /// Only snippets carry a language.
    fn language(&self) -> Option<&str> {
        None
    }

    /// Whether the record has no space association.
    fn is_orphaned(&self) -> bool {
        self.space_id().is_none()
    }
}

macro_rules! impl_content_record {
    ($id_field:ident) => {
        fn entity_id(&self) -> EntityId {
            self.$id_field.as_uuid()
        }

        fn owner_id(&self) -> &OwnerId {
            &self.owner_id
        }

        fn space_id(&self) -> Option<SpaceId> {
            self.space_id
        }

        fn title(&self) -> &str {
            &self.title
        }

        fn project(&self) -> Option<&str> {
            self.project.as_deref()
        }

        fn created_at(&self) -> Timestamp {
            self.created_at
        }
    };
}

impl ContentRecord for Snippet {
    const KIND: ContentKind = ContentKind::Snippet;

    impl_content_record!(snippet_id);

    fn language(&self) -> Option<&str> {
        Some(&self.language)
    }
}

impl ContentRecord for Note {
    const KIND: ContentKind = ContentKind::Note;

    impl_content_record!(note_id);
}

impl ContentRecord for Prompt {
    const KIND: ContentKind = ContentKind::Prompt;

    impl_content_record!(prompt_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_snippet_exposes_language() {
        let now = Utc::now();
        let snippet = Snippet {
            snippet_id: SnippetId::now_v7(),
            owner_id: OwnerId::new("alice"),
            space_id: None,
            title: "hello".to_string(),
            code: "fn main() {}".to_string(),
            language: "rust".to_string(),
            description: None,
            tags: vec![],
            project: Some("cli".to_string()),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(ContentRecord::language(&snippet), Some("rust"));
        assert_eq!(ContentRecord::project(&snippet), Some("cli"));
        assert!(snippet.is_orphaned());
        assert_eq!(snippet.entity_id(), snippet.snippet_id.as_uuid());
    }

    #[test]
    fn test_note_has_no_language() {
        let now = Utc::now();
        let note = Note {
            note_id: NoteId::now_v7(),
            owner_id: OwnerId::new("alice"),
            space_id: Some(SpaceId::now_v7()),
            title: "todo".to_string(),
            content: "buy milk".to_string(),
            description: None,
            tags: vec![],
            project: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(ContentRecord::language(&note), None);
        assert!(!note.is_orphaned());
        assert_eq!(<Note as ContentRecord>::KIND, ContentKind::Note);
    }

    #[test]
    fn test_content_counts_total() {
        let counts = ContentCounts {
            snippets: 2,
            notes: 1,
            prompts: 4,
        };
        assert_eq!(counts.total(), 7);
    }
}
