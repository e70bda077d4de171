//! Axum route handlers for the Resumes API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::resumes::service::{
    create_resume, delete_resume, get_resume, list_resumes, update_resume,
};
use crate::state::AppState;
use crate::storage::Upload;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResumeEnvelope {
    pub success: bool,
    pub message: String,
    pub resume: Resume,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub success: bool,
    pub resumes: Vec<Resume>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Multipart form content shared by create and update: a `resume_details`
/// text field and a `pdf` file field.
#[derive(Debug, Default)]
struct ResumeForm {
    resume_details: Option<String>,
    pdf: Option<Upload>,
}

async fn read_resume_form(mut multipart: Multipart) -> Result<ResumeForm, AppError> {
    let mut form = ResumeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "resume_details" => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("failed to read resume_details: {e}"))
                })?;
                form.resume_details = Some(text);
            }
            "pdf" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read pdf upload: {e}")))?;
                form.pdf = Some(Upload {
                    field_name,
                    filename,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
///
/// Multipart upload; the `pdf` file is mandatory.
pub async fn handle_create_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeEnvelope>), AppError> {
    let form = read_resume_form(multipart).await?;

    let resume_details = form
        .resume_details
        .ok_or_else(|| AppError::Validation("resume_details is required".to_string()))?;
    let pdf = form
        .pdf
        .ok_or_else(|| AppError::Validation("a pdf file is required".to_string()))?;

    let resume = create_resume(&state.db, &state.storage, resume_details, pdf).await?;

    Ok((
        StatusCode::CREATED,
        Json(ResumeEnvelope {
            success: true,
            message: "Resume uploaded successfully".to_string(),
            resume,
        }),
    ))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = list_resumes(&state.db).await?;

    Ok(Json(ResumeListResponse {
        success: true,
        resumes,
    }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeEnvelope>, AppError> {
    let resume = get_resume(&state.db, id).await?;

    Ok(Json(ResumeEnvelope {
        success: true,
        message: "Resume retrieved successfully".to_string(),
        resume,
    }))
}

/// PATCH /api/v1/resumes/:id
///
/// Multipart form; both fields optional, absent ones are left untouched.
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ResumeEnvelope>, AppError> {
    let form = read_resume_form(multipart).await?;

    let resume = update_resume(
        &state.db,
        &state.storage,
        id,
        form.resume_details,
        form.pdf,
    )
    .await?;

    Ok(Json(ResumeEnvelope {
        success: true,
        message: "Resume updated successfully".to_string(),
        resume,
    }))
}

/// DELETE /api/v1/resumes/:id
///
/// Hard delete: removes the row and its PDF.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    delete_resume(&state.db, &state.storage, id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Resume deleted successfully".to_string(),
    }))
}
