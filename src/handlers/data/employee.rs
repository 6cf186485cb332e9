// handlers/data/employee.rs - /employee routes

use axum::extract::{Json, Path, Query, State};
use serde_json::Value;

use super::utils::{parse_key, DeleteQuery};
use crate::app::AppState;
use crate::database::models::{Employee, EmployeeChanges, EmployeeSearchHit, EmployeeView, NewEmployee};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DeleteConfirmation;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<EmployeeView>> {
    Ok(ApiResponse::success(state.employees().get_all().await?))
}

pub async fn show(State(state): State<AppState>, Path(number): Path<String>) -> ApiResult<EmployeeView> {
    let number = parse_key("employeeNumber", &number)?;
    Ok(ApiResponse::success(state.employees().get_by_id(number).await?))
}

pub async fn search(State(state): State<AppState>, Path(query): Path<String>) -> ApiResult<Vec<EmployeeSearchHit>> {
    Ok(ApiResponse::success(state.employees().search(&query).await?))
}

pub async fn create(State(state): State<AppState>, Json(new): Json<NewEmployee>) -> ApiResult<Employee> {
    Ok(ApiResponse::created(state.employees().create(new).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(changes): Json<EmployeeChanges>,
) -> ApiResult<Employee> {
    let number = parse_key("employeeNumber", &number)?;
    Ok(ApiResponse::success(state.employees().update(number, changes).await?))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Employee> {
    let number = parse_key("employeeNumber", &number)?;
    Ok(ApiResponse::success(state.employees().replace(number, body).await?))
}

/// `force` is accepted for symmetry; employees have no dependents.
pub async fn delete(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<DeleteConfirmation> {
    let number = parse_key("employeeNumber", &number)?;
    Ok(ApiResponse::success(state.employees().delete(number, query.force()).await?))
}
