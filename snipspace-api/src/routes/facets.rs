//! Cross-kind facet routes

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};

use crate::{
    error::ApiResult,
    middleware::AuthExtractor,
    services,
    state::{AppState, SharedStore},
    types::{FacetQuery, FacetResponse},
};

#[cfg(feature = "openapi")]
use crate::error::ApiError;

/// GET /api/v1/projects - Projects used by snippets or notes
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Facets",
    params(("space_id" = Option<String>, Query, description = "Restrict to one space")),
    responses(
        (status = 200, description = "Sorted distinct projects", body = FacetResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
    ),
    security(("api_key" = []), ("bearer_auth" = []))
))]
pub async fn list_all_projects(
    State(store): State<SharedStore>,
    auth: AuthExtractor,
    query: Result<Query<FacetQuery>, QueryRejection>,
) -> ApiResult<Json<FacetResponse>> {
    let Query(query) = query?;
    let values = services::all_projects(store.as_ref(), &auth.owner_id, query.space_id).await?;
    Ok(Json(values.into()))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(list_all_projects))
}
