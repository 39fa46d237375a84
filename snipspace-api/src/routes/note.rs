//! Note REST API Routes

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use snipspace_core::{ContentFilter, Note, NoteId};

use crate::{
    error::ApiResult,
    middleware::AuthExtractor,
    services,
    state::{AppState, SharedStore},
    types::{
        CreateNoteRequest, FacetQuery, FacetResponse, ListNotesQuery, ListNotesResponse,
        UpdateNoteRequest,
    },
};

#[cfg(feature = "openapi")]
use crate::error::ApiError;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/v1/notes - List notes with filters, newest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/notes",
    tag = "Notes",
    params(
        ("space_id" = Option<String>, Query, description = "Only notes in this space"),
        ("project" = Option<String>, Query, description = "Exact project match"),
        ("search" = Option<String>, Query, description = "Title search"),
    ),
    responses(
        (status = 200, description = "Matching notes", body = ListNotesResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn list_notes(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    query: Result<Query<ListNotesQuery>, QueryRejection>,
) -> ApiResult<Json<ListNotesResponse>> {
    let Query(query) = query?;
    let notes =
        services::list_content::<Note>(store.as_ref(), &auth.owner_id, ContentFilter::from(query))
            .await?;
    Ok(Json(notes.into()))
}

/// POST /api/v1/notes - Create a note
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/notes",
    tag = "Notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn create_note(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let note = services::create_note(store.as_ref(), &auth.owner_id, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /api/v1/notes/projects - Distinct note projects
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/notes/projects",
    tag = "Notes",
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
        services::content_projects::<Note>(store.as_ref(), &auth.owner_id, query.space_id).await?;
    Ok(Json(values.into()))
}

/// GET /api/v1/notes/{id} - Get a note
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/notes/{id}",
    tag = "Notes",
    params(("id" = String, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note details", body = Note),
        (status = 404, description = "Note not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn get_note(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<NoteId>,
) -> ApiResult<Json<Note>> {
    let note = services::get_content::<Note>(store.as_ref(), &auth.owner_id, id).await?;
    Ok(Json(note))
}

/// PATCH /api/v1/notes/{id} - Update a note
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/api/v1/notes/{id}",
    tag = "Notes",
    params(("id" = String, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Note or target space not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn update_note(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<NoteId>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    let note = services::update_note(store.as_ref(), &auth.owner_id, id, req).await?;
    Ok(Json(note))
}

/// DELETE /api/v1/notes/{id} - Delete a note
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/v1/notes/{id}",
    tag = "Notes",
    params(("id" = String, Path, description = "Note ID")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 404, description = "Note not found", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn delete_note(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    Path(id): Path<NoteId>,
) -> ApiResult<StatusCode> {
    services::delete_content::<Note>(store.as_ref(), &auth.owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/projects", get(list_projects))
        .route("/:id", get(get_note).patch(update_note).delete(delete_note))
}
