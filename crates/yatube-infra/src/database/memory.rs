//! In-memory repositories - used when no database is configured and in tests.
//!
//! All three repositories share one set of tables so listings can resolve
//! authors and groups the same way the SQL joins do.
//! Note: Data is lost on process restart.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Group, NewGroup, NewPost, Post, PostListing, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{
    BaseRepository, GroupRepository, PostQuery, PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    next_group_id: i64,
    next_post_id: i64,
}

impl Tables {
    fn listing(&self, post: &Post) -> Result<PostListing, RepoError> {
        let author = self
            .users
            .iter()
            .find(|u| u.id == post.author_id)
            .map(User::summary)
            .ok_or_else(|| RepoError::Constraint(format!("post {} has no author", post.id)))?;
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id).cloned());

        Ok(PostListing {
            post: post.clone(),
            author,
            group,
        })
    }

    /// Newest first, ties broken by id like the SQL ordering.
    fn sorted_posts(&self, query: &PostQuery) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().filter(|p| query.matches(p)).collect();
        posts.sort_by_key(|p| Reverse((p.pub_date, p.id)));
        posts
    }

    fn group_exists(&self, group_id: Option<i64>) -> bool {
        group_id.is_none_or(|id| self.groups.iter().any(|g| g.id == id))
    }
}

/// Shared in-memory tables. Clone freely; clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository(self.clone())
    }

    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository(self.clone())
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository(self.clone())
    }
}

pub struct InMemoryUserRepository(InMemoryStore);

pub struct InMemoryGroupRepository(InMemoryStore);

pub struct InMemoryPostRepository(InMemoryStore);

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.0.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BaseRepository<Group, i64> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.0.tables.read().await;
        let mut groups = tables.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let mut tables = self.0.tables.write().await;
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.next_group_id += 1;
        let group = Group {
            id: tables.next_group_id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        };
        tables.groups.push(group.clone());
        Ok(group)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.0.tables.write().await;
        if !tables.users.iter().any(|u| u.id == post.author_id) || !tables.group_exists(post.group_id)
        {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }
        tables.next_post_id += 1;
        let post = Post {
            id: tables.next_post_id,
            text: post.text,
            pub_date: post.pub_date,
            author_id: post.author_id,
            group_id: post.group_id,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_content(
        &self,
        id: i64,
        text: String,
        group_id: Option<i64>,
    ) -> Result<Post, RepoError> {
        let mut tables = self.0.tables.write().await;
        if !tables.group_exists(group_id) {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.text = text;
        post.group_id = group_id;
        Ok(post.clone())
    }

    async fn update_group(&self, id: i64, group_id: Option<i64>) -> Result<Post, RepoError> {
        let mut tables = self.0.tables.write().await;
        if !tables.group_exists(group_id) {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        post.group_id = group_id;
        Ok(post.clone())
    }

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        let tables = self.0.tables.read().await;
        Ok(tables.posts.iter().filter(|p| query.matches(p)).count() as u64)
    }

    async fn list(
        &self,
        query: &PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostListing>, RepoError> {
        let tables = self.0.tables.read().await;
        tables
            .sorted_posts(query)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| tables.listing(p))
            .collect()
    }

    async fn find_listing(&self, id: i64) -> Result<Option<PostListing>, RepoError> {
        let tables = self.0.tables.read().await;
        tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.listing(p))
            .transpose()
    }
}
