// handlers/data/department.rs - /department routes

use axum::extract::{Json, Path, Query, State};
use serde_json::Value;

use super::utils::{parse_key, DeleteQuery};
use crate::app::AppState;
use crate::database::models::{Department, DepartmentChanges, DepartmentSearchHit, DepartmentView, NewDepartment};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DeleteConfirmation;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<DepartmentView>> {
    Ok(ApiResponse::success(state.departments().get_all().await?))
}

pub async fn show(State(state): State<AppState>, Path(number): Path<String>) -> ApiResult<DepartmentView> {
    let number = parse_key("departmentNumber", &number)?;
    Ok(ApiResponse::success(state.departments().get_by_id(number).await?))
}

pub async fn search(State(state): State<AppState>, Path(query): Path<String>) -> ApiResult<Vec<DepartmentSearchHit>> {
    Ok(ApiResponse::success(state.departments().search(&query).await?))
}

pub async fn create(State(state): State<AppState>, Json(new): Json<NewDepartment>) -> ApiResult<Department> {
    Ok(ApiResponse::created(state.departments().create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(changes): Json<DepartmentChanges>,
) -> ApiResult<Department> {
    let number = parse_key("departmentNumber", &number)?;
    Ok(ApiResponse::success(state.departments().update(number, changes).await?))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Department> {
    let number = parse_key("departmentNumber", &number)?;
    Ok(ApiResponse::success(state.departments().replace(number, body).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<DeleteConfirmation> {
    let number = parse_key("departmentNumber", &number)?;
    Ok(ApiResponse::success(state.departments().delete(number, query.force()).await?))
}
