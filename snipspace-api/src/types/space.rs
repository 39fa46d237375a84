//! Space-related API types

use serde::{Deserialize, Serialize};
use snipspace_core::{require_non_blank, SnipspaceResult, Space};
use snipspace_storage::SpaceUpdate;

use super::MigrateOrphansResponse;

/// Request to create a new space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateSpaceRequest {
    pub name: String,
    pub description: Option<String>,
    /// Emoji or short icon name
    pub icon: Option<String>,
}

/// Partial update of a space.
///
/// An absent field is left unchanged; a blank `description` or `icon`
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateSpaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl UpdateSpaceRequest {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.description.is_some() || self.icon.is_some()
    }

    /// Validate and convert into a storage update.
    pub fn into_update(self) -> SnipspaceResult<SpaceUpdate> {
        Ok(SpaceUpdate {
            name: self
                .name
                .map(|name| require_non_blank("name", &name))
                .transpose()?,
            description: self.description.map(Some),
            icon: self.icon.map(Some),
        })
    }
}

/// Response containing a list of spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListSpacesResponse {
    pub spaces: Vec<Space>,
    pub total: usize,
}

impl From<Vec<Space>> for ListSpacesResponse {
    fn from(spaces: Vec<Space>) -> Self {
        Self {
            total: spaces.len(),
            spaces,
        }
    }
}

/// The owner's default space and whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DefaultSpaceResponse {
    pub space: Space,
    pub created: bool,
}

/// Result of the first-load bootstrap: default space plus migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BootstrapResponse {
    pub space: Space,
    pub created: bool,
    pub migration: MigrateOrphansResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipspace_core::SnipspaceError;

    #[test]
    fn test_update_request_without_fields() {
        let req = UpdateSpaceRequest::default();
        assert!(!req.has_changes());
    }

    #[test]
    fn test_update_request_rejects_blank_name() {
        let req = UpdateSpaceRequest {
            name: Some("  ".to_string()),
            ..UpdateSpaceRequest::default()
        };
        assert!(matches!(req.into_update(), Err(SnipspaceError::Validation(_))));
    }

    #[test]
    fn test_update_request_blank_icon_clears() -> SnipspaceResult<()> {
        let req = UpdateSpaceRequest {
            icon: Some(String::new()),
            ..UpdateSpaceRequest::default()
        };
        let update = req.into_update()?;
        assert_eq!(update.icon, Some(Some(String::new())));
        assert_eq!(update.name, None);
        Ok(())
    }
}
