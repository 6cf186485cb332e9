// handlers/data/manager.rs - /manager routes

use axum::extract::{Json, Path, Query, State};
use serde_json::Value;

use super::utils::{parse_key, DeleteQuery};
use crate::app::AppState;
use crate::database::models::{Manager, ManagerChanges, ManagerSearchHit, NewManager};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DeleteConfirmation;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Manager>> {
    Ok(ApiResponse::success(state.managers().get_all().await?))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Manager> {
    let id = parse_key("managerId", &id)?;
    Ok(ApiResponse::success(state.managers().get_by_id(id).await?))
}

pub async fn search(State(state): State<AppState>, Path(query): Path<String>) -> ApiResult<Vec<ManagerSearchHit>> {
    Ok(ApiResponse::success(state.managers().search(&query).await?))
}

pub async fn create(State(state): State<AppState>, Json(new): Json<NewManager>) -> ApiResult<Manager> {
    Ok(ApiResponse::created(state.managers().create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<ManagerChanges>,
) -> ApiResult<Manager> {
    let id = parse_key("managerId", &id)?;
    Ok(ApiResponse::success(state.managers().update(id, changes).await?))
}

pub async fn replace(State(state): State<AppState>, Path(id): Path<String>, Json(body): Json<Value>) -> ApiResult<Manager> {
    let id = parse_key("managerId", &id)?;
    Ok(ApiResponse::success(state.managers().replace(id, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<DeleteConfirmation> {
    let id = parse_key("managerId", &id)?;
    Ok(ApiResponse::success(state.managers().delete(id, query.force()).await?))
}
