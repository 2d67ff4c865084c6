//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle user signup, login, session introspection, and the
//! three-step password-recovery flow. They are designed to be integrated
//! into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout).layer(middleware::from_fn(jwt_auth)))
        .route("/me", get(me).layer(middleware::from_fn(jwt_auth)))
        .route(
            "/csrf-token",
            get(csrf_token).layer(middleware::from_fn(jwt_auth)),
        )
        .route("/verify-user", post(verify_user))
        .route("/verify-question", post(verify_question))
        .route("/reset-password", post(reset_password))
}
