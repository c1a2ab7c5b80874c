//! Opaque session tokens.
//!
//! Tokens are 32 random bytes, URL-safe base64 over the wire. Only the
//! SHA-256 hash is persisted, so a leaked database dump does not leak
//! usable credentials. Lifetime is enforced by the session row's
//! `expires_at`, not by anything encoded in the token.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Raw entropy per session token.
const SESSION_TOKEN_BYTES: usize = 32;

/// Generate a fresh session token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a session token for storage and lookup.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the session token from a request.
///
/// Checks the `Authorization: Bearer` header first, then the session
/// cookie. Returns `None` when neither carries a token.
#[must_use]
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn token_hash_is_hex_sha256() {
        let hash = hash_token("some-token");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // Deterministic for lookups
        assert_eq!(hash, hash_token("some-token"));
    }

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_token(&headers, "atrium_session").as_deref(), Some("abc123"));
    }

    #[test]
    fn extracts_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("atrium_session=xyz789; theme=dark"),
        );
        assert_eq!(extract_token(&headers, "atrium_session").as_deref(), Some("xyz789"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("atrium_session=from-cookie"),
        );
        assert_eq!(
            extract_token(&headers, "atrium_session").as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn absent_token_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers, "atrium_session"), None);
    }
}
