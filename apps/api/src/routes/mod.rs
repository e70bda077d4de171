pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth_handlers;
use crate::resumes::handlers as resume_handlers;
use crate::state::AppState;
use crate::users::handlers as user_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/v1/auth/login", post(auth_handlers::handle_login))
        // Users API
        .route(
            "/api/v1/users",
            post(user_handlers::handle_create_user).get(user_handlers::handle_list_users),
        )
        .route(
            "/api/v1/users/:id",
            get(user_handlers::handle_get_user)
                .patch(user_handlers::handle_update_user)
                .delete(user_handlers::handle_delete_user),
        )
        .route(
            "/api/v1/users/:id/profile-picture",
            put(user_handlers::handle_set_profile_picture),
        )
        // Resumes API
        .route(
            "/api/v1/resumes",
            post(resume_handlers::handle_create_resume).get(resume_handlers::handle_list_resumes),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resume_handlers::handle_get_resume)
                .patch(resume_handlers::handle_update_resume)
                .delete(resume_handlers::handle_delete_resume),
        )
        .with_state(state)
}
