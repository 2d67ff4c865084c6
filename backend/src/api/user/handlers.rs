//! Handler functions for user management API endpoints.
//!
//! These functions process requests for the administrative user CRUD
//! surface. Responses always carry the sanitized `UserProfile` view;
//! hashes and the verification pair never leave the service layer.

use crate::api::common::{
    ApiResponse, PaginatedData, PaginationFilter, PaginationMeta, service_error_to_http,
    validation_error_response,
};
use crate::database::models::{CreateNewUser, UpdateUser, UserProfile};
use crate::services::user_service::UserService;
use crate::utils::jwt::Claims;
use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;
use validator::Validate;

/// Lists users, paginated, newest first.
#[axum::debug_handler]
pub async fn list_users(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Query(pagination): Query<PaginationFilter>,
) -> Result<ResponseJson<ApiResponse<PaginatedData<UserProfile>>>, (StatusCode, String)> {
    if let Err(validation_errors) = pagination.validate() {
        return Err(validation_error_response(validation_errors));
    }

    tracing::info!("Listing users for: {}", claims.email());

    let user_service = UserService::new(&pool);
    let (users, total) = match user_service.list_users(&pagination).await {
        Ok(result) => result,
        Err(error) => return Err(service_error_to_http(error)),
    };

    let profiles: Vec<UserProfile> = users.iter().map(UserProfile::from).collect();
    let meta = PaginationMeta::from_filter(&pagination, total);

    Ok(ResponseJson(ApiResponse::paginated(
        PaginatedData::new(profiles, total),
        meta,
        "Users retrieved successfully",
    )))
}

/// Retrieves a user by its ID.
#[axum::debug_handler]
pub async fn get_user_by_id(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, (StatusCode, String)> {
    tracing::info!("Getting user by ID: {} for: {}", id, claims.email());

    let user_service = UserService::new(&pool);
    match user_service.get_user_required(&id).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserProfile::from(user),
            "User retrieved successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Retrieves a user by email.
#[axum::debug_handler]
pub async fn get_user_by_email(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(email): Path<String>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, (StatusCode, String)> {
    tracing::info!("Getting user by email: {} for: {}", email, claims.email());

    let user_service = UserService::new(&pool);
    match user_service.get_user_by_email_required(&email).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserProfile::from(user),
            "User retrieved successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Creates a user through the administrative path.
#[axum::debug_handler]
pub async fn create_user(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Json(payload): Json<CreateNewUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<UserProfile>>), (StatusCode, String)> {
    tracing::info!("Creating user {} for: {}", payload.email, claims.email());

    let user_service = UserService::new(&pool);
    match user_service.create_user(payload).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(
                UserProfile::from(user),
                "User created successfully",
            )),
        )),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Applies a partial update to a user found by ID.
#[axum::debug_handler]
pub async fn update_user(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, (StatusCode, String)> {
    tracing::info!("Updating user {} for: {}", id, claims.email());

    let user_service = UserService::new(&pool);
    match user_service.update_user(&id, payload).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserProfile::from(user),
            "User updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Applies a partial update to a user found by email. This is the
/// administrative route that can move an account to `blocked`.
#[axum::debug_handler]
pub async fn update_user_by_email(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(email): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> Result<ResponseJson<ApiResponse<UserProfile>>, (StatusCode, String)> {
    tracing::info!("Updating user by email {} for: {}", email, claims.email());

    let user_service = UserService::new(&pool);
    match user_service.update_user_by_email(&email, payload).await {
        Ok(user) => Ok(ResponseJson(ApiResponse::success(
            UserProfile::from(user),
            "User updated successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}

/// Deletes a user by ID.
#[axum::debug_handler]
pub async fn delete_user(
    Extension(claims): Extension<Claims>,
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<String>,
) -> Result<ResponseJson<ApiResponse<serde_json::Value>>, (StatusCode, String)> {
    tracing::info!("Deleting user {} for: {}", id, claims.email());

    let user_service = UserService::new(&pool);
    match user_service.delete_user(&id).await {
        Ok(()) => Ok(ResponseJson(ApiResponse::success(
            serde_json::json!({ "deleted": true }),
            "User deleted successfully",
        ))),
        Err(error) => Err(service_error_to_http(error)),
    }
}
