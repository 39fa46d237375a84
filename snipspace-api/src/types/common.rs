//! Types shared by several resources

use serde::{Deserialize, Deserializer, Serialize};
use snipspace_core::{ContentCounts, SpaceId};

/// Query-string `space_id`: an empty value means no space filter.
pub(crate) fn optional_space_id<'de, D>(deserializer: D) -> Result<Option<SpaceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Query string for facet endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FacetQuery {
    /// Restrict the facet to one space
    #[serde(default, deserialize_with = "optional_space_id")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub space_id: Option<SpaceId>,
}

/// Sorted distinct values usable as a list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FacetResponse {
    pub values: Vec<String>,
}

impl From<Vec<String>> for FacetResponse {
    fn from(values: Vec<String>) -> Self {
        Self { values }
    }
}

/// Per-kind content counts of one space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SpaceCountsResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub space_id: SpaceId,
    pub snippets: u64,
    pub notes: u64,
    pub prompts: u64,
    pub total: u64,
}

impl SpaceCountsResponse {
    pub fn new(space_id: SpaceId, counts: ContentCounts) -> Self {
        Self {
            space_id,
            snippets: counts.snippets,
            notes: counts.notes,
            prompts: counts.prompts,
            total: counts.total(),
        }
    }
}

/// Outcome of moving orphaned content into a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MigrateOrphansResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub space_id: SpaceId,
    /// Records migrated across all kinds
    pub migrated: u64,
    pub snippets: u64,
    pub notes: u64,
    pub prompts: u64,
}

impl MigrateOrphansResponse {
    pub fn new(space_id: SpaceId, counts: ContentCounts) -> Self {
        Self {
            space_id,
            migrated: counts.total(),
            snippets: counts.snippets,
            notes: counts.notes,
            prompts: counts.prompts,
        }
    }
}
