//! The session/CSRF cookie contract.
//!
//! Login and signup set an HTTP-only `access_token` cookie holding
//! `Bearer <token>` (the space percent-encoded on the wire) and a
//! client-readable `csrf_token` cookie. State-changing requests must echo
//! the CSRF value in the `x-csrf-token` header, matching the cookie
//! exactly. Logout clears both cookies; there is no server-side session
//! state to invalidate.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const CSRF_TOKEN_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// `Set-Cookie` value for the HTTP-only session cookie.
pub fn session_cookie(token: &str) -> String {
    format!("{ACCESS_TOKEN_COOKIE}=Bearer%20{token}; HttpOnly; SameSite=Lax; Path=/")
}

/// `Set-Cookie` value for the client-readable CSRF cookie.
pub fn csrf_cookie(token: &str) -> String {
    format!("{CSRF_TOKEN_COOKIE}={token}; SameSite=Strict; Path=/")
}

/// `Set-Cookie` value expiring the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{ACCESS_TOKEN_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// `Set-Cookie` value expiring the CSRF cookie.
pub fn clear_csrf_cookie() -> String {
    format!("{CSRF_TOKEN_COOKIE}=; SameSite=Strict; Path=/; Max-Age=0")
}

/// Reads a single cookie value from the request `Cookie` header.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Extracts the raw token from a session cookie value.
///
/// Accepts both the percent-encoded form this service writes and a
/// literal `Bearer ` prefix, since intermediaries may decode the value.
pub fn bearer_from_cookie(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer%20")
        .or_else(|| value.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_cookie_round_trips_through_the_cookie_header() {
        let set_cookie = session_cookie("abc.def.ghi");
        let cookie_pair = set_cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie_pair).unwrap());

        let value = read_cookie(&headers, ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(bearer_from_cookie(&value), Some("abc.def.ghi"));
    }

    #[test]
    fn read_cookie_picks_the_named_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("csrf_token=tok123; access_token=Bearer%20xyz"),
        );

        assert_eq!(
            read_cookie(&headers, CSRF_TOKEN_COOKIE).as_deref(),
            Some("tok123")
        );
        assert_eq!(
            read_cookie(&headers, ACCESS_TOKEN_COOKIE).as_deref(),
            Some("Bearer%20xyz")
        );
        assert_eq!(read_cookie(&headers, "other"), None);
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_from_cookie("Bearer xyz"), Some("xyz"));
        assert_eq!(bearer_from_cookie("xyz"), None);
    }

    #[test]
    fn clearing_cookies_expires_them() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
        assert!(clear_csrf_cookie().contains("Max-Age=0"));
    }
}
