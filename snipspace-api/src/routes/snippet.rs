//! Snippet REST API Routes

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use snipspace_core::{ContentFilter, Snippet, SnippetId};

use crate::{
    error::ApiResult,
    middleware::AuthExtractor,
    services,
    state::{AppState, SharedStore},
    types::{
        CreateSnippetRequest, FacetQuery, FacetResponse, ListSnippetsQuery, ListSnippetsResponse,
        UpdateSnippetRequest,
    },
};

#[cfg(feature = "openapi")]
use crate::error::ApiError;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/snippets - List snippets with filters, newest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/snippets",
    tag = "Snippets",
    params(
        ("space_id" = Option<String>, Query, description = "Only snippets in this space"),
        ("language" = Option<String>, Query, description = "Exact language match"),
        ("project" = Option<String>, Query, description = "Exact project match"),
        ("search" = Option<String>, Query, description = "Title search"),
    ),
    responses(
        (status = 200, description = "Matching snippets", body = ListSnippetsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn list_snippets(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    query: Result<Query<ListSnippetsQuery>, QueryRejection>,
) -> ApiResult<Json<ListSnippetsResponse>> {
    let Query(query) = query?;
    let filter = ContentFilter::from(query);
    let snippets =
        services::list_content::<Snippet>(store.as_ref(), &auth.owner_id, filter).await?;
    Ok(Json(snippets.into()))
}

/// POST /api/v1/snippets - Create a snippet
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/snippets",
    tag = "Snippets",
    request_body = CreateSnippetRequest,
    responses(
        (status = 201, description = "Snippet created", body = Snippet),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn create_snippet(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Json(req): Json<CreateSnippetRequest>,
) -> ApiResult<impl IntoResponse> {
    let snippet = services::create_snippet(store.as_ref(), &auth.owner_id, req).await?;
    Ok((StatusCode::CREATED, Json(snippet)))
}

/// GET /api/v1/snippets/languages - Distinct languages
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/snippets/languages",
    tag = "Snippets",
    params(("space_id" = Option<String>, Query, description = "Restrict to one space")),
    responses(
        (status = 200, description = "Sorted distinct languages", body = FacetResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn list_languages(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    query: Result<Query<FacetQuery>, QueryRejection>,
) -> ApiResult<Json<FacetResponse>> {
    let Query(query) = query?;
    let values = services::snippet_languages(store.as_ref(), &auth.owner_id, query.space_id).await?;
    Ok(Json(values.into()))
}

/// GET /api/v1/snippets/projects - Distinct snippet projects
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/snippets/projects",
    tag = "Snippets",
    params(("space_id" = Option<String>, Query, description = "Restrict to one space")),
    responses(
        (status = 200, description = "Sorted distinct projects", body = FacetResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn list_projects(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    query: Result<Query<FacetQuery>, QueryRejection>,
) -> ApiResult<Json<FacetResponse>> {
    let Query(query) = query?;
    let values =
        services::content_projects::<Snippet>(store.as_ref(), &auth.owner_id, query.space_id)
            .await?;
    Ok(Json(values.into()))
}

/// GET /api/v1/snippets/{id} - Get a snippet
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/snippets/{id}",
    tag = "Snippets",
    params(("id" = String, Path, description = "Snippet ID")),
    responses(
        (status = 200, description = "Snippet details", body = Snippet),
        (status = 404, description = "Snippet not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn get_snippet(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SnippetId>,
) -> ApiResult<Json<Snippet>> {
    let snippet = services::get_content::<Snippet>(store.as_ref(), &auth.owner_id, id).await?;
    Ok(Json(snippet))
}

/// PATCH /api/v1/snippets/{id} - Update a snippet
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/snippets/{id}",
    tag = "Snippets",
    params(("id" = String, Path, description = "Snippet ID")),
    request_body = UpdateSnippetRequest,
    responses(
        (status = 200, description = "Snippet updated", body = Snippet),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Snippet or target space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn update_snippet(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SnippetId>,
    Json(req): Json<UpdateSnippetRequest>,
) -> ApiResult<Json<Snippet>> {
    let snippet = services::update_snippet(store.as_ref(), &auth.owner_id, id, req).await?;
    Ok(Json(snippet))
}

/// DELETE /api/v1/snippets/{id} - Delete a snippet
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/snippets/{id}",
    tag = "Snippets",
    params(("id" = String, Path, description = "Snippet ID")),
    responses(
        (status = 204, description = "Snippet deleted"),
        (status = 404, description = "Snippet not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn delete_snippet(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<SnippetId>,
) -> ApiResult<StatusCode> {
    services::delete_content::<Snippet>(store.as_ref(), &auth.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_snippets).post(create_snippet))
        .route("/languages", get(list_languages))
        .route("/projects", get(list_projects))
        .route("/:id", get(get_snippet).patch(update_snippet).delete(delete_snippet))
}
