//! Error handling - every failure becomes a rendered error page.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};
use askama::Template;
use std::fmt;
use yatube_shared::ErrorResponse;

use yatube_core::error::{DomainError, RepoError};

use crate::views::ErrorTemplate;

/// Application-level error type that converts to HTML error pages.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Forbidden,
    TooManyRequests(u64),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::TooManyRequests(secs) => write!(f, "Too many requests, retry in {}s", secs),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    fn body(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::TooManyRequests(secs) => ErrorResponse::too_many_requests(*secs),
            AppError::Internal(_) => ErrorResponse::internal_error(),
        }
    }

    /// The rendered error page, quoting the request id when one is known.
    pub fn page(&self, request_id: Option<&str>) -> HttpResponse {
        let mut body = self.body();
        if let Some(id) = request_id {
            body = body.with_request_id(id);
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::TooManyRequests(secs) = self {
            builder.insert_header(("Retry-After", secs.to_string()));
        }

        match ErrorTemplate::from(body.clone()).render() {
            Ok(html) => builder.content_type(ContentType::html()).body(html),
            Err(e) => {
                tracing::error!("Error page rendering failed: {}", e);
                builder
                    .content_type(ContentType::plaintext())
                    .body(format!("{} {}", body.status, body.title))
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }
        self.page(None)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{} {} not found", entity_type, key))
            }
            DomainError::Forbidden(reason) => {
                tracing::debug!(reason, "Access denied");
                AppError::Forbidden
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("Template rendering failed: {}", err))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
