use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the `users` table.
///
/// Deliberately not `Serialize`: the row carries the password hash, which
/// must never cross the HTTP boundary. Convert to [`UserResponse`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub designation: String,
    pub department: String,
    /// Stored path of the profile picture, relative to the upload root.
    pub profile_picture: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Safe projection of a user for API responses — everything but the hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub role: String,
    pub designation: String,
    pub department: String,
    pub profile_picture: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            name: user.name,
            address: user.address,
            phone: user.phone,
            email: user.email,
            role: user.role,
            designation: user.designation,
            department: user.department,
            profile_picture: user.profile_picture,
            is_deleted: user.is_deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            name: "Jane Doe".to_string(),
            address: "12 Main St".to_string(),
            phone: "555-0100".to_string(),
            email: "jane@example.com".to_string(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            role: "employee".to_string(),
            designation: "Engineer".to_string(),
            department: "Platform".to_string(),
            profile_picture: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_response_excludes_password_hash() {
        let response = UserResponse::from(sample_user());
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "jane@example.com");
    }

    #[test]
    fn test_response_keeps_profile_picture_reference() {
        let mut user = sample_user();
        user.profile_picture = Some("profile/profile-1700000000-abc.png".to_string());
        let response = UserResponse::from(user);
        assert_eq!(
            response.profile_picture.as_deref(),
            Some("profile/profile-1700000000-abc.png")
        );
    }
}
