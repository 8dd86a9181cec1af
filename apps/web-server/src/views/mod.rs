//! Presentation layer - askama templates and the view structs they read.
//!
//! Templates only see plain strings, numbers, booleans and vectors; every
//! view struct is assembled from domain values here, so handlers never
//! format anything themselves.

mod admin;
mod auth;
mod posts;

use actix_web::{HttpResponse, http::StatusCode, http::header::ContentType};
use askama::Template;
use yatube_core::domain::{Group, PostListing};
use yatube_core::pagination::PageWindow;
use yatube_shared::ErrorResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;

pub use admin::{
    AdminGroupsTemplate, AdminGroupsView, AdminPostRow, AdminPostsTemplate, AdminPostsView,
    GroupFormView, admin_posts_query,
};
pub use auth::{LoginTemplate, LoginView, SignupTemplate, SignupView};
pub use posts::{
    CreatePostTemplate, GroupListTemplate, GroupListView, IndexTemplate, PostDetailTemplate,
    PostDetailView, PostFormView, PostListView, ProfileTemplate, ProfileView,
};

/// `pub_date` as shown on cards.
const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Render a template as a `200 OK` HTML page.
pub fn render<T: Template>(template: T) -> AppResult<HttpResponse> {
    render_with_status(template, StatusCode::OK)
}

pub fn render_with_status<T: Template>(template: T, status: StatusCode) -> AppResult<HttpResponse> {
    let html = template.render()?;
    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(html))
}

/// Navigation bar state.
#[derive(Debug, Clone, Default)]
pub struct LayoutChrome {
    pub signed_in: bool,
    pub username: String,
    pub is_staff: bool,
}

impl LayoutChrome {
    pub fn for_visitor(identity: Option<&Identity>) -> Self {
        match identity {
            Some(identity) => Self {
                signed_in: true,
                username: identity.username.clone(),
                is_staff: identity.is_staff(),
            },
            None => Self::default(),
        }
    }
}

/// Chrome plus the page-specific content.
#[derive(Debug, Clone)]
pub struct LayoutContext<T> {
    pub chrome: LayoutChrome,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self { chrome, content }
    }
}

/// A post as shown in listings and on its own page.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub pub_date: String,
    pub author_username: String,
    pub has_group: bool,
    pub group_title: String,
    pub group_slug: String,
}

impl From<PostListing> for PostCard {
    fn from(listing: PostListing) -> Self {
        let PostListing {
            post,
            author,
            group,
        } = listing;
        let (group_title, group_slug) = group
            .map(|g| (g.title, g.slug))
            .unwrap_or_default();

        Self {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date.format(DATE_FORMAT).to_string(),
            author_username: author.username,
            has_group: !group_slug.is_empty(),
            group_title,
            group_slug,
        }
    }
}

/// Page links under a listing.
#[derive(Debug, Clone)]
pub struct PageNav {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_other_pages: bool,
    pub has_previous: bool,
    pub previous_number: u64,
    pub has_next: bool,
    pub next_number: u64,
    /// Query string the page number is appended to, e.g. `?page=` or `?q=x&page=`.
    pub href_prefix: String,
}

impl PageNav {
    pub fn new(window: &PageWindow) -> Self {
        Self::with_prefix(window, "?page=".to_string())
    }

    pub fn with_prefix(window: &PageWindow, href_prefix: String) -> Self {
        Self {
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_other_pages: window.has_other_pages(),
            has_previous: window.has_previous(),
            previous_number: window.previous_page_number().unwrap_or(1),
            has_next: window.has_next(),
            next_number: window.next_page_number().unwrap_or(window.num_pages),
            href_prefix,
        }
    }
}

/// One `<option>` of a group select.
#[derive(Debug, Clone)]
pub struct GroupOption {
    pub id: String,
    pub title: String,
    pub selected: bool,
}

impl GroupOption {
    pub fn list(groups: &[Group], selected: Option<i64>) -> Vec<Self> {
        groups
            .iter()
            .map(|group| Self {
                id: group.id.to_string(),
                title: group.title.clone(),
                selected: selected == Some(group.id),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ErrorPageView {
    pub status: u16,
    pub title: String,
    pub detail: String,
    pub request_id: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

impl From<ErrorResponse> for ErrorTemplate {
    fn from(body: ErrorResponse) -> Self {
        let content = ErrorPageView {
            status: body.status,
            title: body.title,
            detail: body.detail.unwrap_or_default(),
            request_id: body.request_id.unwrap_or_default(),
        };
        Self {
            view: LayoutContext::new(LayoutChrome::default(), content),
        }
    }
}
