// handlers/data/area.rs - /area routes
//
// Area keys are strings, so the path key is used as-is.

use axum::extract::{Json, Path, Query, State};
use serde_json::Value;

use super::utils::DeleteQuery;
use crate::app::AppState;
use crate::database::models::{Area, AreaChanges, AreaSearchHit, NewArea};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DeleteConfirmation;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Area>> {
    Ok(ApiResponse::success(state.areas().get_all().await?))
}

pub async fn show(State(state): State<AppState>, Path(area_id): Path<String>) -> ApiResult<Area> {
    Ok(ApiResponse::success(state.areas().get_by_id(&area_id).await?))
}

pub async fn search(State(state): State<AppState>, Path(query): Path<String>) -> ApiResult<Vec<AreaSearchHit>> {
    Ok(ApiResponse::success(state.areas().search(&query).await?))
}

pub async fn create(State(state): State<AppState>, Json(new): Json<NewArea>) -> ApiResult<Area> {
    Ok(ApiResponse::created(state.areas().create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(area_id): Path<String>,
    Json(changes): Json<AreaChanges>,
) -> ApiResult<Area> {
    Ok(ApiResponse::success(state.areas().update(&area_id, changes).await?))
}

pub async fn replace(State(state): State<AppState>, Path(area_id): Path<String>, Json(body): Json<Value>) -> ApiResult<Area> {
    Ok(ApiResponse::success(state.areas().replace(&area_id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(area_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<DeleteConfirmation> {
    Ok(ApiResponse::success(state.areas().delete(&area_id, query.force()).await?))
}
