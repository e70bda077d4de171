use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::authenticate;
use crate::errors::AppError;
use crate::models::user::UserResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = authenticate(&state.db, &request.email, &request.password).await?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        user: user.into(),
    }))
}
