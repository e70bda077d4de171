use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the `resumes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub resume_details: String,
    /// Stored path of the PDF, relative to the upload root. Mandatory —
    /// a resume row never exists without its file.
    pub pdf: String,
    pub created_at: DateTime<Utc>,
}
