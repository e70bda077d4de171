//! Resume record service.
//!
//! A resume is a row plus its PDF on disk. Creation stores the file before
//! the row so no row ever references a file that failed to write; deletion
//! removes the row first and treats file cleanup as best-effort.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::storage::{FileKind, FileStore, Upload};

pub async fn create_resume(
    pool: &PgPool,
    storage: &FileStore,
    resume_details: String,
    pdf: Upload,
) -> Result<Resume, AppError> {
    if resume_details.trim().is_empty() {
        return Err(AppError::Validation(
            "resume_details must not be empty".to_string(),
        ));
    }

    // Fatal on failure: nothing is inserted unless the file is on disk.
    let stored = storage.store(FileKind::Document, &pdf).await?;

    let resume = sqlx::query_as::<_, Resume>(
        r#"
        INSERT INTO resumes (id, resume_details, pdf, created_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&resume_details)
    .bind(&stored)
    .fetch_one(pool)
    .await?;

    info!("Created resume {} with file {stored}", resume.id);
    Ok(resume)
}

pub async fn get_resume(pool: &PgPool, id: Uuid) -> Result<Resume, AppError> {
    sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

pub async fn list_resumes(pool: &PgPool) -> Result<Vec<Resume>, AppError> {
    let resumes = sqlx::query_as::<_, Resume>("SELECT * FROM resumes ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    Ok(resumes)
}

/// Replaces the PDF and/or the details of an existing resume. Absent fields
/// are left untouched; with a new file the superseded one is cleaned up
/// best-effort once the new file is stored.
pub async fn update_resume(
    pool: &PgPool,
    storage: &FileStore,
    id: Uuid,
    resume_details: Option<String>,
    pdf: Option<Upload>,
) -> Result<Resume, AppError> {
    let existing = get_resume(pool, id).await?;

    let stored = match pdf {
        Some(upload) => Some(
            storage
                .replace(FileKind::Document, Some(&existing.pdf), &upload)
                .await?,
        ),
        None => None,
    };

    let resume = sqlx::query_as::<_, Resume>(
        r#"
        UPDATE resumes SET
            resume_details = COALESCE($2, resume_details),
            pdf = COALESCE($3, pdf)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&resume_details)
    .bind(&stored)
    .fetch_one(pool)
    .await?;

    info!("Updated resume {id}");
    Ok(resume)
}

/// Hard delete: removes the row, then the file. A file-cleanup failure is
/// logged and never blocks the row deletion.
pub async fn delete_resume(pool: &PgPool, storage: &FileStore, id: Uuid) -> Result<(), AppError> {
    let resume = get_resume(pool, id).await?;

    sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    storage.remove_stale(&resume.pdf).await;

    info!("Deleted resume {id} and its file {}", resume.pdf);
    Ok(())
}
