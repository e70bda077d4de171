//! User record service.
//!
//! Single request-scoped reads/writes against the `users` table. Records are
//! never physically removed: deletion flips `is_deleted` and the row stays
//! readable by primary key.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::errors::AppError;
use crate::models::user::User;
use crate::storage::{FileKind, FileStore, Upload};

/// Field set required to register a user.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub designation: String,
    pub department: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
}

pub async fn create_user(pool: &PgPool, new: NewUser) -> Result<User, AppError> {
    if new.email.trim().is_empty() {
        return Err(AppError::Validation("email must not be empty".to_string()));
    }
    if new.password.trim().is_empty() {
        return Err(AppError::Validation("password must not be empty".to_string()));
    }

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(&new.email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Duplicate(format!(
            "a user with email {} already exists",
            new.email
        )));
    }

    let password_hash = hash_password(&new.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users
            (id, username, name, address, phone, email, password_hash,
             role, designation, department, profile_picture, is_deleted,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NULL, FALSE, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.username)
    .bind(&new.name)
    .bind(&new.address)
    .bind(&new.phone)
    .bind(&new.email)
    .bind(&password_hash)
    .bind(&new.role)
    .bind(&new.designation)
    .bind(&new.department)
    .fetch_one(pool)
    .await
    .map_err(map_unique_violation)?;

    info!("Created user {}", user.id);
    Ok(user)
}

/// Loads a user by primary key. Soft-deleted users are still readable here.
pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

/// Lists users. The soft-delete filter is an explicit parameter, never a
/// hidden default.
pub async fn list_users(pool: &PgPool, include_deleted: bool) -> Result<Vec<User>, AppError> {
    let users = if include_deleted {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_deleted = FALSE ORDER BY created_at",
        )
        .fetch_all(pool)
        .await?
    };
    Ok(users)
}

pub async fn update_user(pool: &PgPool, id: Uuid, update: UserUpdate) -> Result<User, AppError> {
    let password_hash = resolve_password_hash(update.password.as_deref())?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            username = COALESCE($2, username),
            name = COALESCE($3, name),
            address = COALESCE($4, address),
            phone = COALESCE($5, phone),
            email = COALESCE($6, email),
            password_hash = COALESCE($7, password_hash),
            role = COALESCE($8, role),
            designation = COALESCE($9, designation),
            department = COALESCE($10, department),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&update.username)
    .bind(&update.name)
    .bind(&update.address)
    .bind(&update.phone)
    .bind(&update.email)
    .bind(&password_hash)
    .bind(&update.role)
    .bind(&update.designation)
    .bind(&update.department)
    .fetch_optional(pool)
    .await
    .map_err(map_unique_violation)?
    .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    info!("Updated user {id}");
    Ok(user)
}

/// Marks a user deleted without removing the row.
pub async fn soft_delete_user(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let deleted = sqlx::query_scalar::<_, Uuid>(
        "UPDATE users SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 RETURNING id",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    if deleted.is_none() {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }
    info!("Soft deleted user {id}");
    Ok(())
}

/// Stores a new profile picture and commits its path, then removes the
/// superseded file. With no upload the existing reference is left unchanged.
pub async fn set_profile_picture(
    pool: &PgPool,
    storage: &FileStore,
    id: Uuid,
    upload: Option<Upload>,
) -> Result<User, AppError> {
    let user = get_user(pool, id).await?;

    let Some(upload) = upload else {
        return Ok(user);
    };

    let stored = storage.store(FileKind::Image, &upload).await?;

    // The new reference must be durable before the old file goes away.
    let updated = sqlx::query_as::<_, User>(
        "UPDATE users SET profile_picture = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&stored)
    .fetch_one(pool)
    .await?;

    if let Some(old) = user.profile_picture.as_deref() {
        storage.remove_stale(old).await;
    }

    info!("Updated profile picture for user {id}");
    Ok(updated)
}

/// Resolves the password field of a partial update. An absent or blank
/// password never touches the stored hash.
fn resolve_password_hash(password: Option<&str>) -> Result<Option<String>, AppError> {
    match password {
        Some(p) if !p.trim().is_empty() => Ok(Some(hash_password(p)?)),
        _ => Ok(None),
    }
}

fn map_unique_violation(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::Duplicate("a user with this email already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;

    #[test]
    fn test_absent_password_is_not_rehashed() {
        assert!(resolve_password_hash(None).unwrap().is_none());
    }

    #[test]
    fn test_blank_password_is_not_rehashed() {
        assert!(resolve_password_hash(Some("")).unwrap().is_none());
        assert!(resolve_password_hash(Some("   ")).unwrap().is_none());
    }

    #[test]
    fn test_supplied_password_is_hashed() {
        let hash = resolve_password_hash(Some("new-secret")).unwrap().unwrap();
        assert_ne!(hash, "new-secret");
        assert!(verify_password("new-secret", &hash));
    }
}
