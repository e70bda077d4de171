//! Axum route handlers for the Users API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserResponse;
use crate::state::AppState;
use crate::storage::Upload;
use crate::users::service::{
    create_user, get_user, list_users, set_profile_picture, soft_delete_user, update_user,
    NewUser, UserUpdate,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Soft-deleted users are excluded unless explicitly requested.
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub employees: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let user = create_user(&state.db, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            success: true,
            message: "User created successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// GET /api/v1/users?include_deleted=
pub async fn handle_list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = list_users(&state.db, query.include_deleted).await?;

    Ok(Json(UserListResponse {
        success: true,
        employees: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = get_user(&state.db, id).await?;

    Ok(Json(UserEnvelope {
        success: true,
        message: "User retrieved successfully".to_string(),
        user: user.into(),
    }))
}

/// PATCH /api/v1/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = update_user(&state.db, id, request).await?;

    Ok(Json(UserEnvelope {
        success: true,
        message: "User updated successfully".to_string(),
        user: user.into(),
    }))
}

/// DELETE /api/v1/users/:id
///
/// Soft delete: the row is retained and stays readable by primary key.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    soft_delete_user(&state.db, id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "User soft deleted successfully".to_string(),
    }))
}

/// PUT /api/v1/users/:id/profile-picture
///
/// Multipart form with a single `profile` file field. With no file supplied
/// the existing picture reference is left unchanged.
pub async fn handle_set_profile_picture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != "profile" {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read profile upload: {e}")))?;

        upload = Some(Upload {
            field_name,
            filename,
            content_type,
            bytes,
        });
    }

    let user = set_profile_picture(&state.db, &state.storage, id, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            success: true,
            message: "Profile picture added successfully".to_string(),
            user: user.into(),
        }),
    ))
}
