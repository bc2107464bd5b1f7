// src/gate.rs
//! Request-level protection for routes that need a signed-in user.
//!
//! Every request is a fresh mount of an [`AccessGuard`]: the session is
//! resolved once, applied as a single snapshot, and the guard either lets the
//! request through or produces the sign-in redirect.
use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use reqwest::Url;
use tracing::warn;

use crate::auth::AuthState;
use crate::guard::{AccessGuard, GuardState, Navigator, SIGN_IN_PATH};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "sb-access-token";

/// Captures the guard's redirect so it can become the HTTP response.
#[derive(Debug, Default)]
pub struct PendingRedirect(pub Option<String>);

impl Navigator for PendingRedirect {
    fn redirect(&mut self, path: &str) {
        self.0 = Some(path.to_string());
    }
}

/// `/auth?redirectTo=<original>` with the original path form-encoded.
pub fn sign_in_redirect(sign_in_path: &str, original_path: &str) -> String {
    let query = Url::parse_with_params("http://localhost/", &[("redirectTo", original_path)])
        .ok()
        .and_then(|url| url.query().map(str::to_string))
        .unwrap_or_default();
    format!("{sign_in_path}?{query}")
}

/// Bearer token first, then the session cookie.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(char::is_whitespace))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = access_token(request.headers()).map(str::to_string);

    let snapshot = match token {
        Some(token) => match state.auth.get_user(&token).await {
            Ok(identity) => AuthState {
                identity,
                loading: false,
            },
            Err(e) => {
                warn!("Failed to resolve session: {e}");
                AuthState::signed_out()
            }
        },
        None => AuthState::signed_out(),
    };

    let mut guard = AccessGuard::new(PendingRedirect::default());
    if guard.apply(&snapshot) == GuardState::Authorized {
        if let Some(identity) = guard.identity().cloned() {
            request.extensions_mut().insert(identity);
        }
        return next.run(request).await;
    }

    let sign_in_path = guard
        .into_navigator()
        .0
        .unwrap_or_else(|| SIGN_IN_PATH.to_string());
    // Nested routers see a stripped path; send the caller back to the full one.
    let original_path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path())
        .unwrap_or_else(|| request.uri().path());
    Redirect::to(&sign_in_redirect(&sign_in_path, original_path)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn redirect_carries_encoded_origin() {
        assert_eq!(
            sign_in_redirect("/auth", "/polls/create"),
            "/auth?redirectTo=%2Fpolls%2Fcreate"
        );
    }

    #[test]
    fn bearer_token_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(COOKIE, HeaderValue::from_static("sb-access-token=xyz"));
        assert_eq!(access_token(&headers), Some("abc"));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        for value in ["bearer abc", "BEARER abc", "Bearer   abc "] {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
            assert_eq!(access_token(&headers), Some("abc"), "{value}");
        }
    }

    #[test]
    fn reads_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; sb-access-token=xyz; lang=en"),
        );
        assert_eq!(access_token(&headers), Some("xyz"));
    }

    #[test]
    fn no_credentials_means_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        headers.insert(COOKIE, HeaderValue::from_static("sb-access-token="));
        assert_eq!(access_token(&headers), None);
    }
}
