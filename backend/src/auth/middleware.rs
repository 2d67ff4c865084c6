//! Middleware for protecting authenticated routes and handling authorization.
//!
//! This module contains logic for validating session tokens (JWTs) and
//! enforcing the CSRF cookie/header contract on state-changing endpoints.

use crate::api::common::service_error_to_http;
use crate::auth::cookies::{ACCESS_TOKEN_COOKIE, CSRF_HEADER, CSRF_TOKEN_COOKIE, bearer_from_cookie, read_cookie};
use crate::config::Config;
use crate::errors::ServiceError;
use crate::utils::jwt::JwtUtils;
use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

/// Session authentication middleware.
///
/// Accepts the token from the `Authorization: Bearer` header first, then
/// falls back to the HTTP-only session cookie. Valid claims are inserted
/// into request extensions for handlers.
pub async fn jwt_auth(mut request: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    let Some(token) = extract_token(request.headers()) else {
        tracing::warn!("No token provided for {}", request.uri().path());
        return Err(service_error_to_http(ServiceError::unauthorized(
            "No token provided",
        )));
    };

    let config = request
        .extensions()
        .get::<Config>()
        .cloned()
        .ok_or_else(|| {
            service_error_to_http(ServiceError::internal("Configuration not available"))
        })?;

    let jwt_utils = JwtUtils::new(&config);
    match jwt_utils.validate_token(&token) {
        Ok(claims) => {
            tracing::info!("Token validated for user: {}", claims.email());
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(_) => {
            tracing::warn!("Invalid token for {}", request.uri().path());
            Err(service_error_to_http(ServiceError::unauthorized(
                "Invalid token",
            )))
        }
    }
}

/// CSRF middleware for state-changing routes.
///
/// The CSRF token must arrive both as the readable cookie and as the
/// `x-csrf-token` header, and the two must match exactly.
pub async fn csrf_guard(request: Request, next: Next) -> Result<Response, (StatusCode, String)> {
    if !csrf_tokens_match(request.headers()) {
        return Err(service_error_to_http(ServiceError::csrf_mismatch()));
    }

    Ok(next.run(request).await)
}

/// Token from the `Authorization` header, falling back to the session cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookie = read_cookie(headers, ACCESS_TOKEN_COOKIE)?;
    bearer_from_cookie(&cookie).map(|token| token.to_string())
}

fn csrf_tokens_match(headers: &HeaderMap) -> bool {
    let csrf_cookie = read_cookie(headers, CSRF_TOKEN_COOKIE);
    let csrf_header = headers
        .get(CSRF_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.to_string());

    match (csrf_cookie, csrf_header) {
        (Some(cookie), Some(header)) => cookie == header,
        (None, _) => {
            tracing::warn!("No cookie CSRF token provided");
            false
        }
        (_, None) => {
            tracing::warn!("No header CSRF token provided");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cookies::session_cookie;
    use axum::http::HeaderValue;
    use axum::http::header::COOKIE;

    #[test]
    fn extract_token_prefers_the_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        headers.insert(
            COOKIE,
            HeaderValue::from_static("access_token=Bearer%20cookie-token"),
        );

        assert_eq!(extract_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn extract_token_falls_back_to_the_session_cookie() {
        let mut headers = HeaderMap::new();
        let pair = session_cookie("cookie-token");
        let pair = pair.split(';').next().unwrap();
        headers.insert(COOKIE, HeaderValue::from_str(pair).unwrap());

        assert_eq!(extract_token(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn extract_token_rejects_non_bearer_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));

        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn csrf_requires_both_tokens_to_match() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("csrf_token=tok123"));
        headers.insert(CSRF_HEADER, HeaderValue::from_static("tok123"));
        assert!(csrf_tokens_match(&headers));

        let mut mismatched = HeaderMap::new();
        mismatched.insert(COOKIE, HeaderValue::from_static("csrf_token=tok123"));
        mismatched.insert(CSRF_HEADER, HeaderValue::from_static("tok456"));
        assert!(!csrf_tokens_match(&mismatched));

        let mut missing_header = HeaderMap::new();
        missing_header.insert(COOKIE, HeaderValue::from_static("csrf_token=tok123"));
        assert!(!csrf_tokens_match(&missing_header));

        let mut missing_cookie = HeaderMap::new();
        missing_cookie.insert(CSRF_HEADER, HeaderValue::from_static("tok123"));
        assert!(!csrf_tokens_match(&missing_cookie));
    }
}
