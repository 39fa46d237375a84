//! Prompt REST API Routes

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use snipspace_core::{ContentFilter, Prompt, PromptId};

use crate::{
    error::ApiResult,
    middleware::AuthExtractor,
    services,
    state::{AppState, SharedStore},
    types::{
        CreatePromptRequest, FacetQuery, FacetResponse, ListPromptsQuery, ListPromptsResponse,
        UpdatePromptRequest,
    },
};

#[cfg(feature = "openapi")]
use crate::error::ApiError;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/prompts - List prompts with filters, newest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/prompts",
    tag = "Prompts",
    params(
        ("space_id" = Option<String>, Query, description = "Only prompts in this space"),
        ("project" = Option<String>, Query, description = "Exact project match"),
        ("search" = Option<String>, Query, description = "Title search"),
    ),
    responses(
        (status = 200, description = "Matching prompts", body = ListPromptsResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn list_prompts(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    query: Result<Query<ListPromptsQuery>, QueryRejection>,
) -> ApiResult<Json<ListPromptsResponse>> {
    let Query(query) = query?;
    let prompts =
        services::list_content::<Prompt>(store.as_ref(), &auth.owner_id, ContentFilter::from(query))
            .await?;
    Ok(Json(prompts.into()))
}

/// POST /api/v1/prompts - Create a prompt
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/prompts",
    tag = "Prompts",
    request_body = CreatePromptRequest,
    responses(
        (status = 201, description = "Prompt created", body = Prompt),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn create_prompt(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Json(req): Json<CreatePromptRequest>,
) -> ApiResult<impl IntoResponse> {
    let prompt = services::create_prompt(store.as_ref(), &auth.owner_id, req).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

/// GET /api/v1/prompts/projects - Distinct prompt projects
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/prompts/projects",
    tag = "Prompts",
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
        services::content_projects::<Prompt>(store.as_ref(), &auth.owner_id, query.space_id).await?;
    Ok(Json(values.into()))
}

/// GET /api/v1/prompts/{id} - Get a prompt
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/prompts/{id}",
    tag = "Prompts",
    params(("id" = String, Path, description = "Prompt ID")),
    responses(
        (status = 200, description = "Prompt details", body = Prompt),
        (status = 404, description = "Prompt not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn get_prompt(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<PromptId>,
) -> ApiResult<Json<Prompt>> {
    let prompt = services::get_content::<Prompt>(store.as_ref(), &auth.owner_id, id).await?;
    Ok(Json(prompt))
}

/// PATCH /api/v1/prompts/{id} - Update a prompt
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/prompts/{id}",
    tag = "Prompts",
    params(("id" = String, Path, description = "Prompt ID")),
    request_body = UpdatePromptRequest,
    responses(
        (status = 200, description = "Prompt updated", body = Prompt),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Prompt or target space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn update_prompt(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<PromptId>,
    Json(req): Json<UpdatePromptRequest>,
) -> ApiResult<Json<Prompt>> {
    let prompt = services::update_prompt(store.as_ref(), &auth.owner_id, id, req).await?;
    Ok(Json(prompt))
}

/// DELETE /api/v1/prompts/{id} - Delete a prompt
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/prompts/{id}",
    tag = "Prompts",
    params(("id" = String, Path, description = "Prompt ID")),
    responses(
        (status = 204, description = "Prompt deleted"),
        (status = 404, description = "Prompt not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn delete_prompt(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<PromptId>,
) -> ApiResult<StatusCode> {
    services::delete_content::<Prompt>(store.as_ref(), &auth.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_prompts).post(create_prompt))
        .route("/projects", get(list_projects))
        .route("/:id", get(get_prompt).patch(update_prompt).delete(delete_prompt))
}
