pub mod handlers;
mod password;

pub use password::{hash_password, verify_password};

use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::User;

/// Loads the user for `email` and checks the password against the stored
/// hash. Unknown email and wrong password are indistinguishable to the
/// caller.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Auth)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AppError::Auth);
    }

    info!("User {} authenticated", user.id);
    Ok(user)
}
