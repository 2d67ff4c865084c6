//! Defines the HTTP routes for user management.
//!
//! Every route requires a valid session; state-changing routes also pass
//! the CSRF guard before their handler runs.

use super::handlers::{
    create_user, delete_user, get_user_by_email, get_user_by_id, list_users, update_user,
    update_user_by_email,
};
use crate::auth::middleware::{csrf_guard, jwt_auth};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn user_router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route(
            "/",
            post(create_user).layer(middleware::from_fn(csrf_guard)),
        )
        .route("/{id}", get(get_user_by_id))
        .route(
            "/{id}",
            post(update_user)
                .delete(delete_user)
                .layer(middleware::from_fn(csrf_guard)),
        )
        .route("/email/{email}", get(get_user_by_email))
        .route(
            "/email/{email}",
            post(update_user_by_email).layer(middleware::from_fn(csrf_guard)),
        )
        .layer(middleware::from_fn(jwt_auth))
}
