//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for signup, login, the
//! password-recovery flow, and session introspection, parse request data,
//! and interact with `auth::service` for core business logic. Cookie
//! handling lives here: the service layer only ever sees typed commands.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::cookies;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::config::Config;
use crate::database::models::UserProfile;
use crate::utils::generate_random_string::generate_random_string;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json},
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, Json as ResponseJson},
};
use sqlx::SqlitePool;

/// Length of generated CSRF token values.
const CSRF_TOKEN_LENGTH: usize = 32;

type SessionHeaders = AppendHeaders<[(axum::http::HeaderName, String); 2]>;

/// Builds the session + CSRF cookie pair set on login and signup.
fn session_headers(access_token: &str, csrf_token: &str) -> SessionHeaders {
    AppendHeaders([
        (SET_COOKIE, cookies::session_cookie(access_token)),
        (SET_COOKIE, cookies::csrf_cookie(csrf_token)),
    ])
}

/// Handle user signup request
#[axum::debug_handler]
pub async fn signup(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, SessionHeaders, ResponseJson<ApiResponse<AuthData>>), (StatusCode, String)>
{
    let auth_service = AuthService::new(&pool, &config);

    let session = match auth_service.sign_up(payload).await {
        Ok(session) => session,
        Err(error) => return Err(service_error_to_http(error)),
    };

    let csrf_token = generate_random_string(CSRF_TOKEN_LENGTH);
    let headers = session_headers(&session.access_token, &csrf_token);

    Ok((
        StatusCode::CREATED,
        headers,
        ResponseJson(ApiResponse::success(
            AuthData {
                user: session.user,
                csrf_token,
            },
            "User registered successfully",
        )),
    ))
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, SessionHeaders, ResponseJson<ApiResponse<AuthData>>), (StatusCode, String)>
{
    let auth_service = AuthService::new(&pool, &config);

    let session = match auth_service.login(payload).await {
        Ok(session) => session,
        Err(error) => return Err(service_error_to_http(error)),
    };

    let csrf_token = generate_random_string(CSRF_TOKEN_LENGTH);
    let headers = session_headers(&session.access_token, &csrf_token);

    Ok((
        StatusCode::OK,
        headers,
        ResponseJson(ApiResponse::success(
            AuthData {
                user: session.user,
                csrf_token,
            },
            "User logged in successfully",
        )),
    ))
}

/// Get current user information from token claims
#[axum::debug_handler]
pub async fn me(
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<ApiResponse<MeResponse>>, (StatusCode, String)> {
    tracing::info!("Fetching current user info for email: {}", claims.email());

    Ok(ResponseJson(ApiResponse::success(
        MeResponse {
            email: claims.email().to_string(),
            name: claims.name().to_string(),
        },
        "User profile retrieved successfully",
    )))
}

/// Issue a fresh CSRF token and cookie for the current session
#[axum::debug_handler]
pub async fn csrf_token() -> Result<
    (
        AppendHeaders<[(axum::http::HeaderName, String); 1]>,
        ResponseJson<ApiResponse<CsrfTokenResponse>>,
    ),
    (StatusCode, String),
> {
    tracing::info!("Generating new CSRF token");
    let csrf_token = generate_random_string(CSRF_TOKEN_LENGTH);
    let headers = AppendHeaders([(SET_COOKIE, cookies::csrf_cookie(&csrf_token))]);

    Ok((
        headers,
        ResponseJson(ApiResponse::success(
            CsrfTokenResponse { csrf_token },
            "CSRF token generated successfully",
        )),
    ))
}

/// First password-recovery step: look up the account's security question
#[axum::debug_handler]
pub async fn verify_user(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<VerifyUserRequest>,
) -> Result<ResponseJson<ApiResponse<QuestionResponse>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.validate_user(payload).await {
        Ok(question) => Ok(ResponseJson(ApiResponse::success(
            QuestionResponse { question },
            "User validated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Second password-recovery step: check the security answer
#[axum::debug_handler]
pub async fn verify_question(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<VerifyQuestionRequest>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.validate_question(payload).await {
        Ok(profile) => Ok(ResponseJson(ApiResponse::success(
            profile,
            "Security question validated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Final password-recovery step: store the replacement password
#[axum::debug_handler]
pub async fn reset_password(
    Extension(pool): Extension<SqlitePool>,
    Extension(config): Extension<Config>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, (StatusCode, String)> {
    let auth_service = AuthService::new(&pool, &config);

    match auth_service.reset_password(payload).await {
        Ok(profile) => Ok(ResponseJson(ApiResponse::success(
            profile,
            "Password reset successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Handle logout request: clear both cookies. Issued tokens stay valid
/// until natural expiry; there is no server-side state to invalidate.
#[axum::debug_handler]
pub async fn logout() -> Result<
    (
        SessionHeaders,
        ResponseJson<ApiResponse<serde_json::Value>>,
    ),
    (StatusCode, String),
> {
    tracing::info!("Logging out a user");
    let headers = AppendHeaders([
        (SET_COOKIE, cookies::clear_session_cookie()),
        (SET_COOKIE, cookies::clear_csrf_cookie()),
    ]);

    Ok((
        headers,
        ResponseJson(ApiResponse::success(
            serde_json::json!({ "message": "Logged out" }),
            "Logged out successfully",
        )),
    ))
}
