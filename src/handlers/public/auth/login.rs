// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::{Json, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::LoginSuccess;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/**
 * POST /auth/login - Exchange a username and password for a JWT
 *
 * Expected Input:
 * ```json
 * { "username": "admin", "password": "admin" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "message": "Login successful",
 *   "user": { "username": "admin", "role": "admin", "specialMessage": "..." },
 *   "token": "eyJhbGciOiJIUzI1NiI..."
 * }
 * ```
 *
 * Unknown users and wrong passwords both answer 401 with the same message.
 */
pub async fn login_post(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> ApiResult<LoginSuccess> {
    let success = state.auth.login(&request.username, &request.password)?;
    Ok(ApiResponse::success(success))
}
