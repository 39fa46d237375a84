//! Note and prompt API types
//!
//! Notes and prompts share one shape, so their request and response types are
//! generated from the same template.

use serde::{Deserialize, Serialize};
use snipspace_core::{require_non_blank, ContentFilter, Note, Prompt, SnipspaceResult, SpaceId};
use snipspace_storage::NoteUpdate;

macro_rules! text_content_types {
    (
        record: $record:ty,
        create: $create:ident,
        update: $update:ident,
        query: $query:ident,
        list: $list:ident,
        field: $field:ident,
    ) => {
        /// Request to create a new record.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $create {
            /// Space to file the record under; must belong to the caller
            #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
            pub space_id: Option<SpaceId>,
            pub title: String,
            pub content: String,
            pub description: Option<String>,
            #[serde(default)]
            pub tags: Vec<String>,
            pub project: Option<String>,
        }

        /// Partial update; a blank `description` or `project` clears it.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $update {
            pub title: Option<String>,
            pub content: Option<String>,
            pub description: Option<String>,
            pub tags: Option<Vec<String>>,
            pub project: Option<String>,
            #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
            pub space_id: Option<SpaceId>,
        }

        impl $update {
            pub fn has_changes(&self) -> bool {
                self.title.is_some()
                    || self.content.is_some()
                    || self.description.is_some()
                    || self.tags.is_some()
                    || self.project.is_some()
                    || self.space_id.is_some()
            }

            /// Validate and convert into a storage update.
            pub fn into_update(self) -> SnipspaceResult<NoteUpdate> {
                Ok(NoteUpdate {
                    title: self
                        .title
                        .map(|v| require_non_blank("title", &v))
                        .transpose()?,
                    content: self
                        .content
                        .map(|v| require_non_blank("content", &v))
                        .transpose()?,
                    description: self.description.map(Some),
                    tags: self.tags,
                    project: self.project.map(Some),
                    space_id: self.space_id,
                })
            }
        }

        /// Query string for listing records.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $query {
            #[serde(default, deserialize_with = "super::common::optional_space_id")]
            #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
            pub space_id: Option<SpaceId>,
            pub project: Option<String>,
            /// Title search
            pub search: Option<String>,
        }

        impl From<$query> for ContentFilter {
            fn from(query: $query) -> Self {
                ContentFilter {
                    space_id: query.space_id,
                    language: None,
                    project: query.project,
                    search: query.search,
                }
                .normalized()
            }
        }

        /// Response containing a list of records.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        pub struct $list {
            pub $field: Vec<$record>,
            pub total: usize,
        }

        impl From<Vec<$record>> for $list {
            fn from($field: Vec<$record>) -> Self {
                Self {
                    total: $field.len(),
                    $field,
                }
            }
        }
    };
}

text_content_types! {
    record: Note,
    create: CreateNoteRequest,
    update: UpdateNoteRequest,
    query: ListNotesQuery,
    list: ListNotesResponse,
    field: notes,
}

text_content_types! {
    record: Prompt,
    create: CreatePromptRequest,
    update: UpdatePromptRequest,
    query: ListPromptsQuery,
    list: ListPromptsResponse,
    field: prompts,
}
