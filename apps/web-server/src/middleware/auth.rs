//! Session extractors.
//!
//! The current user is never ambient state: handlers that need one take an
//! [`Identity`] (or [`OptionalIdentity`]) argument, resolved from the
//! `session` cookie or a `Bearer` header.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use yatube_core::domain::STAFF_ROLE;
use yatube_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "session";

/// Where anonymous visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login/";

/// Authenticated user identity extractor.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}

impl Identity {
    /// Check if the user has a specific role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_staff(&self) -> bool {
        self.has_role(STAFF_ROLE)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            roles: claims.roles,
        }
    }
}

/// Missing or unusable session. Answers with a redirect to the login page.
#[derive(Debug)]
pub struct AuthenticationError {
    pub cause: AuthError,
    /// Path to come back to after logging in.
    pub next: String,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::Found();
        response.insert_header((header::LOCATION, login_url(&self.next)));

        // A stale or forged cookie would otherwise bounce the user forever.
        if matches!(
            self.cause,
            AuthError::TokenExpired | AuthError::InvalidToken(_)
        ) {
            response.cookie(expired_session_cookie());
        }
        response.finish()
    }
}

/// `/auth/login/?next=<path>`
pub fn login_url(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={encoded}")
}

/// Only same-site absolute paths are accepted as redirect targets.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

pub fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn authenticate(req: &HttpRequest) -> Result<Identity, AuthError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        tracing::error!("AppState not found in app data");
        AuthError::InvalidToken("Server configuration error".to_string())
    })?;

    let token = session_token(req).ok_or(AuthError::MissingAuth)?;
    state.tokens.validate_token(&token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(|cause| {
            tracing::debug!(%cause, path = %req.path(), "Session required");
            AuthenticationError {
                cause,
                next: req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| req.path().to_string()),
            }
        }))
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(OptionalIdentity(authenticate(req).ok())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=%2Fcreate%2F");
        assert_eq!(
            login_url("/admin/posts/?q=a&page=2"),
            "/auth/login/?next=%2Fadmin%2Fposts%2F%3Fq%3Da%26page%3D2"
        );
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/posts/1/edit/")), "/posts/1/edit/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_redirects_to_login() {
        let err = AuthenticationError {
            cause: AuthError::MissingAuth,
            next: "/create/".to_string(),
        };
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login/?next=%2Fcreate%2F"
        );
    }
}
