//! Space REST API Routes
//!
//! CRUD for spaces plus the default-space, count and orphan migration
//! endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use snipspace_core::SpaceId;

use crate::{
    error::ApiResult,
    middleware::AuthExtractor,
    services,
    state::{AppState, SharedStore},
    types::{
        CreateSpaceRequest, ListSpacesResponse, MigrateOrphansResponse, SpaceCountsResponse,
        UpdateSpaceRequest,
    },
};

#[cfg(feature = "openapi")]
use crate::{
    error::ApiError,
    types::{BootstrapResponse, DefaultSpaceResponse},
};
#[cfg(feature = "openapi")]
use snipspace_core::Space;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/spaces - List the caller's spaces, newest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/spaces",
    tag = "Spaces",
    responses(
        (status = 200, description = "Spaces of the caller", body = ListSpacesResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn list_spaces(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
) -> ApiResult<Json<ListSpacesResponse>> {
    let spaces = services::list_spaces(store.as_ref(), &auth.owner_id).await?;
    Ok(Json(spaces.into()))
}

/// POST /api/v1/spaces - Create a space
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/spaces",
    tag = "Spaces",
    request_body = CreateSpaceRequest,
    responses(
        (status = 201, description = "Space created", body = Space),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn create_space(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Json(req): Json<CreateSpaceRequest>,
) -> ApiResult<impl IntoResponse> {
    let space = services::create_space(store.as_ref(), &auth.owner_id, req).await?;
    Ok((StatusCode::CREATED, Json(space)))
}

/// POST /api/v1/spaces/default - Return the caller's default space, creating it if needed
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/spaces/default",
    tag = "Spaces",
    responses(
        (status = 200, description = "Existing or newly created default space", body = DefaultSpaceResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn ensure_default_space(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
) -> ApiResult<impl IntoResponse> {
    let response = services::ensure_default_space(store.as_ref(), &auth.owner_id).await?;
    Ok(Json(response))
}

/// POST /api/v1/spaces/bootstrap - Ensure a default space and migrate orphans into it
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/spaces/bootstrap",
    tag = "Spaces",
    responses(
        (status = 200, description = "Default space and migration result", body = BootstrapResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn bootstrap(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
) -> ApiResult<impl IntoResponse> {
    let response = services::bootstrap(store.as_ref(), &auth.owner_id).await?;
    Ok(Json(response))
}

/// GET /api/v1/spaces/{id} - Get a space
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/spaces/{id}",
    tag = "Spaces",
    params(("id" = String, Path, description = "Space ID")),
    responses(
        (status = 200, description = "Space details", body = Space),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn get_space(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SpaceId>,
) -> ApiResult<impl IntoResponse> {
    let space = services::get_space(store.as_ref(), &auth.owner_id, id).await?;
    Ok(Json(space))
}

/// PATCH /api/v1/spaces/{id} - Update a space
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/spaces/{id}",
    tag = "Spaces",
    params(("id" = String, Path, description = "Space ID")),
    request_body = UpdateSpaceRequest,
    responses(
        (status = 200, description = "Space updated", body = Space),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn update_space(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SpaceId>,
    Json(req): Json<UpdateSpaceRequest>,
) -> ApiResult<impl IntoResponse> {
    let space = services::update_space(store.as_ref(), &auth.owner_id, id, req).await?;
    Ok(Json(space))
}

/// DELETE /api/v1/spaces/{id} - Delete a space that holds no snippets
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/spaces/{id}",
    tag = "Spaces",
    params(("id" = String, Path, description = "Space ID")),
    responses(
        (status = 204, description = "Space deleted"),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 409, description = "Space still contains snippets", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn delete_space(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SpaceId>,
) -> ApiResult<StatusCode> {
    services::delete_space(store.as_ref(), &auth.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/spaces/{id}/counts - Snippet, note and prompt counts
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/spaces/{id}/counts",
    tag = "Spaces",
    params(("id" = String, Path, description = "Space ID")),
    responses(
        (status = 200, description = "Per-kind content counts", body = SpaceCountsResponse),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn space_counts(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SpaceId>,
) -> ApiResult<Json<SpaceCountsResponse>> {
    let counts = services::space_content_counts(store.as_ref(), &auth.owner_id, id).await?;
    Ok(Json(SpaceCountsResponse::new(id, counts)))
}

/// POST /api/v1/spaces/{id}/migrate-orphans - Move space-less content into this space
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/spaces/{id}/migrate-orphans",
    tag = "Spaces",
    params(("id" = String, Path, description = "Target space ID")),
    responses(
        (status = 200, description = "Migration result", body = MigrateOrphansResponse),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn migrate_orphans(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SpaceId>,
) -> ApiResult<Json<MigrateOrphansResponse>> {
    let response = services::migrate_orphans(store.as_ref(), &auth.owner_id, id).await?;
    Ok(Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_spaces).post(create_space))
        .route("/default", post(ensure_default_space))
        .route("/bootstrap", post(bootstrap))
        .route("/:id", get(get_space).patch(update_space).delete(delete_space))
        .route("/:id/counts", get(space_counts))
        .route("/:id/migrate-orphans", post(migrate_orphans))
}
