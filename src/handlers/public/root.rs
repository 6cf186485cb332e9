// handlers/public/root.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "orgchart-api",
        "version": version,
        "description": "Employees, departments, managers and areas with referential integrity",
        "endpoints": {
            "employee": "/employee[/:employeeNumber], /employee/search/:query",
            "department": "/department[/:departmentNumber], /department/search/:query",
            "manager": "/manager[/:managerId], /manager/search/:query",
            "area": "/area[/:areaId], /area/search/:query",
            "auth": "/auth/login",
            "health": "/health",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": "unavailable"
                })),
            )
        }
    }
}
