//! Data Transfer Objects - form bodies and query strings.

use serde::{Deserialize, Serialize};

/// `?page=` on every listing. Kept as a raw string so junk falls back to page 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Submitted post form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    pub group: Option<String>,
}

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// `?next=` on the login page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Staff post listing query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminPostQuery {
    pub q: Option<String>,
    pub pub_date: Option<String>,
    pub page: Option<String>,
}

/// Inline group change from the staff listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminGroupChange {
    pub group: Option<String>,
}

/// Staff group creation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupFormData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}
