use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Group, NewGroup, NewPost, Post, PostListing, User};
use crate::error::RepoError;

/// Lookup shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new user. Fails with `RepoError::Constraint` on a taken username.
    async fn create(&self, user: User) -> Result<User, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;

    /// Insert a new group. Fails with `RepoError::Constraint` on a taken slug.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;
}

/// Post repository.
///
/// Listings always come back newest first, with author and group loaded
/// in batch rather than per row.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite `text` and `group_id` only. Author and `pub_date` are left alone.
    async fn update_content(
        &self,
        id: i64,
        text: String,
        group_id: Option<i64>,
    ) -> Result<Post, RepoError>;

    async fn update_group(&self, id: i64, group_id: Option<i64>) -> Result<Post, RepoError>;

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError>;

    async fn list(
        &self,
        query: &PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostListing>, RepoError>;

    async fn find_listing(&self, id: i64) -> Result<Option<PostListing>, RepoError>;
}

/// Filter for post listings. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub author_id: Option<Uuid>,
    pub group_id: Option<i64>,
    pub text_contains: Option<String>,
    pub published_since: Option<DateTime<Utc>>,
}

impl PostQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self {
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn in_group(group_id: i64) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    /// Case-insensitive substring search on `text`. Blank terms are ignored.
    pub fn containing(mut self, term: &str) -> Self {
        let term = term.trim();
        self.text_contains = (!term.is_empty()).then(|| term.to_string());
        self
    }

    pub fn published_since(mut self, since: Option<DateTime<Utc>>) -> Self {
        self.published_since = since;
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if self.group_id.is_some() && self.group_id != post.group_id {
            return false;
        }
        if let Some(term) = &self.text_contains {
            if !post.text.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if self.published_since.is_some_and(|since| post.pub_date < since) {
            return false;
        }
        true
    }
}
