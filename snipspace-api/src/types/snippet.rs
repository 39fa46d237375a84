//! Snippet-related API types

use serde::{Deserialize, Serialize};
use snipspace_core::{require_non_blank, ContentFilter, Snippet, SnipspaceResult, SpaceId};
use snipspace_storage::SnippetUpdate;

/// Request to create a new snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateSnippetRequest {
    /// Space to file the snippet under; must belong to the caller
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub space_id: Option<SpaceId>,
    pub title: String,
    pub code: String,
    pub language: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub project: Option<String>,
}

/// Partial update of a snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateSnippetRequest {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub project: Option<String>,
    /// Move the snippet to another space
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub space_id: Option<SpaceId>,
}

impl UpdateSnippetRequest {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.code.is_some()
            || self.language.is_some()
            || self.description.is_some()
            || self.tags.is_some()
            || self.project.is_some()
            || self.space_id.is_some()
    }

    /// Validate and convert into a storage update.
    pub fn into_update(self) -> SnipspaceResult<SnippetUpdate> {
        Ok(SnippetUpdate {
            title: self
                .title
                .map(|v| require_non_blank("title", &v))
                .transpose()?,
            code: self
                .code
                .map(|v| require_non_blank("code", &v))
                .transpose()?,
            language: self
                .language
                .map(|v| require_non_blank("language", &v))
                .transpose()?,
            description: self.description.map(Some),
            tags: self.tags,
            project: self.project.map(Some),
            space_id: self.space_id,
        })
    }
}

/// Query string for listing snippets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListSnippetsQuery {
    #[serde(default, deserialize_with = "super::common::optional_space_id")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub space_id: Option<SpaceId>,
    pub language: Option<String>,
    pub project: Option<String>,
    /// Title search
    pub search: Option<String>,
}

impl From<ListSnippetsQuery> for ContentFilter {
    fn from(query: ListSnippetsQuery) -> Self {
        ContentFilter {
            space_id: query.space_id,
            language: query.language,
            project: query.project,
            search: query.search,
        }
        .normalized()
    }
}

/// Response containing a list of snippets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListSnippetsResponse {
    pub snippets: Vec<Snippet>,
    pub total: usize,
}

impl From<Vec<Snippet>> for ListSnippetsResponse {
    fn from(snippets: Vec<Snippet>) -> Self {
        Self {
            total: snippets.len(),
            snippets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_blank_values_become_absent() {
        let filter = ContentFilter::from(ListSnippetsQuery {
            language: Some(String::new()),
            project: Some(" cli ".to_string()),
            ..ListSnippetsQuery::default()
        });
        assert_eq!(filter.language, None);
        assert_eq!(filter.project.as_deref(), Some("cli"));
    }

    #[test]
    fn test_create_request_tags_default_to_empty() -> Result<(), serde_json::Error> {
        let req: CreateSnippetRequest = serde_json::from_str(
            r#"{"title":"t","code":"c","language":"rust","description":null,"project":null}"#,
        )?;
        assert!(req.tags.is_empty());
        assert_eq!(req.space_id, None);
        Ok(())
    }

    #[test]
    fn test_update_request_rejects_blank_code() {
        let req = UpdateSnippetRequest {
            code: Some(" ".to_string()),
            ..UpdateSnippetRequest::default()
        };
        assert!(req.has_changes());
        assert!(req.into_update().is_err());
    }
}
