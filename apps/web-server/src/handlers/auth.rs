//! Authentication handlers - signup, login and logout pages.

use actix_web::{HttpResponse, http::header, web};

use yatube_core::domain::User;
use yatube_core::error::RepoError;
use yatube_shared::dto::{LoginRequest, NextQuery, SignupRequest};

use crate::middleware::auth::{OptionalIdentity, expired_session_cookie, safe_next, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::query::LenientQuery;
use crate::state::AppState;
use crate::views::{LayoutChrome, LayoutContext, LoginTemplate, LoginView, SignupTemplate, SignupView, render};

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

/// Issue a session for `user` and redirect to `location`.
fn start_session(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username, user.roles())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .cookie(session_cookie(
            token,
            state.tokens.expiration_seconds(),
            state.secure_cookies,
        ))
        .finish())
}

fn login_page(identity: &OptionalIdentity, view: LoginView) -> AppResult<HttpResponse> {
    render(LoginTemplate {
        view: LayoutContext::new(LayoutChrome::for_visitor(identity.0.as_ref()), view),
    })
}

fn signup_page(identity: &OptionalIdentity, view: SignupView) -> AppResult<HttpResponse> {
    render(SignupTemplate {
        view: LayoutContext::new(LayoutChrome::for_visitor(identity.0.as_ref()), view),
    })
}

/// GET /auth/signup/
pub async fn signup_form(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    signup_page(&identity, SignupView::default())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Form<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim().to_string();
    let mut view = SignupView {
        username: username.clone(),
        ..SignupView::default()
    };

    if !User::is_valid_username(&username) {
        view.username_errors.push(INVALID_USERNAME.to_string());
    } else if state.users.find_by_username(&username).await?.is_some() {
        view.username_errors.push(USERNAME_TAKEN.to_string());
    }

    if req.password1 != req.password2 {
        view.password_errors.push(PASSWORD_MISMATCH.to_string());
    } else {
        view.password_errors = state.passwords.validate(&req.password2, &username);
    }

    if !view.username_errors.is_empty() || !view.password_errors.is_empty() {
        return signup_page(&identity, view);
    }

    let hash = state
        .passwords
        .hash(&req.password2)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = match state.users.create(User::new(username, hash)).await {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same name.
        Err(RepoError::Constraint(_)) => {
            view.username_errors.push(USERNAME_TAKEN.to_string());
            return signup_page(&identity, view);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    start_session(&state, &user, "/")
}

/// GET /auth/login/
pub async fn login_form(
    identity: OptionalIdentity,
    query: LenientQuery<NextQuery>,
) -> AppResult<HttpResponse> {
    let view = LoginView {
        next: safe_next(query.next.as_deref()),
        ..LoginView::default()
    };
    login_page(&identity, view)
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    body: web::Form<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let next = safe_next(req.next.as_deref());

    let user = state.users.find_by_username(req.username.trim()).await?;
    let verified = match &user {
        Some(user) => state
            .passwords
            .verify(&req.password, &user.password_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?,
        None => false,
    };

    match user {
        Some(user) if verified => {
            tracing::info!(user_id = %user.id, "User logged in");
            start_session(&state, &user, &next)
        }
        _ => {
            tracing::debug!(username = %req.username, "Login rejected");
            login_page(
                &identity,
                LoginView {
                    username: req.username,
                    next,
                    errors: vec![INVALID_LOGIN.to_string()],
                },
            )
        }
    }
}

/// POST /auth/logout/
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(expired_session_cookie())
        .finish()
}
