//! OpenAPI Specification for the Snipspace API
//!
//! Generated with utoipa from the route annotations and schema derives.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{facets, health, note, prompt, snippet, space};
use crate::types::*;

use snipspace_core::{ContentCounts, Note, Prompt, Snippet, Space};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Snipspace API",
        version = "0.1.0",
        description = "Personal organizer for code snippets, notes and prompts grouped into spaces"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Spaces", description = "User-owned containers for content"),
        (name = "Snippets", description = "Code snippets with language and project"),
        (name = "Notes", description = "Free-form text notes"),
        (name = "Prompts", description = "Reusable prompt texts"),
        (name = "Facets", description = "Distinct filter values across content kinds"),
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Space Routes ===
        space::list_spaces,
        space::create_space,
        space::ensure_default_space,
        space::bootstrap,
        space::get_space,
        space::update_space,
        space::delete_space,
        space::space_counts,
        space::migrate_orphans,

        // === Snippet Routes ===
        snippet::list_snippets,
        snippet::create_snippet,
        snippet::list_languages,
        snippet::list_projects,
        snippet::get_snippet,
        snippet::update_snippet,
        snippet::delete_snippet,

        // === Note Routes ===
        note::list_notes,
        note::create_note,
        note::list_projects,
        note::get_note,
        note::update_note,
        note::delete_note,

        // === Prompt Routes ===
        prompt::list_prompts,
        prompt::create_prompt,
        prompt::list_projects,
        prompt::get_prompt,
        prompt::update_prompt,
        prompt::delete_prompt,

        // === Facets ===
        facets::list_all_projects,

        // === Health & Metrics ===
        health::ping,
        health::liveness,
        health::readiness,
        crate::telemetry::metrics::metrics_handler,
    ),
    components(
        schemas(
            Space,
            Snippet,
            Note,
            Prompt,
            ContentCounts,
            CreateSpaceRequest,
            UpdateSpaceRequest,
            ListSpacesResponse,
            DefaultSpaceResponse,
            BootstrapResponse,
            SpaceCountsResponse,
            MigrateOrphansResponse,
            CreateSnippetRequest,
            UpdateSnippetRequest,
            ListSnippetsResponse,
            CreateNoteRequest,
            UpdateNoteRequest,
            ListNotesResponse,
            CreatePromptRequest,
            UpdatePromptRequest,
            ListPromptsResponse,
            FacetResponse,
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
            ApiError,
            ErrorCode,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the API key and bearer token security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );

            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT whose subject is the owner id"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// OpenAPI document as a JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Snipspace API");

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.security_schemes.contains_key("api_key"));
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("Snippet"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        for path in [
            "/api/v1/spaces/{id}/migrate-orphans",
            "/api/v1/snippets/languages",
            "/api/v1/prompts/{id}",
            "/api/v1/projects",
            "/health/ready",
        ] {
            assert!(json.contains(path), "missing path {}", path);
        }
        Ok(())
    }
}
