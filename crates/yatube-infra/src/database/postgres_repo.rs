//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use yatube_core::domain::{Group, NewGroup, NewPost, Post, PostListing, User, UserSummary};
use yatube_core::error::RepoError;
use yatube_core::ports::{GroupRepository, PostQuery, PostRepository, UserRepository};

use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = user.into();
        let model = active.insert(self.db.as_ref()).await.map_err(write_error)?;
        tracing::info!(user_id = %model.id, "User created");

        Ok(model.into())
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let active: group::ActiveModel = group.into();
        let model = active.insert(self.db.as_ref()).await.map_err(write_error)?;
        tracing::info!(group_id = model.id, slug = %model.slug, "Group created");

        Ok(model.into())
    }
}

/// `%term%` for a case-insensitive `LIKE ... ESCAPE '\'`, with the term's own
/// wildcards taken literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl PostgresPostRepository {
    pub(crate) fn filtered(query: &PostQuery) -> Select<PostEntity> {
        let mut select = PostEntity::find();
        if let Some(author_id) = query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(group_id) = query.group_id {
            select = select.filter(post::Column::GroupId.eq(group_id));
        }
        if let Some(term) = &query.text_contains {
            let pattern = LikeExpr::new(contains_pattern(term)).escape('\\');
            select = select.filter(Expr::expr(Func::lower(Expr::col(post::Column::Text))).like(pattern));
        }
        if let Some(since) = query.published_since {
            select = select.filter(post::Column::PubDate.gte(since));
        }
        select
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
    }

    /// Attach authors to posts with a single `IN` query.
    async fn with_authors(
        &self,
        rows: Vec<(post::Model, Option<group::Model>)>,
    ) -> Result<Vec<PostListing>, RepoError> {
        let mut author_ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<Uuid, UserSummary> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            UserEntity::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(self.db.as_ref())
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|u| {
                    (
                        u.id,
                        UserSummary {
                            id: u.id,
                            username: u.username,
                        },
                    )
                })
                .collect()
        };

        rows.into_iter()
            .map(|(post, group)| {
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    RepoError::Constraint(format!("post {} has no author", post.id))
                })?;
                Ok(PostListing {
                    post: post.into(),
                    author,
                    group: group.map(Into::into),
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let active: post::ActiveModel = post.into();
        let model = active.insert(self.db.as_ref()).await.map_err(write_error)?;
        tracing::info!(post_id = model.id, author_id = %model.author_id, "Post created");

        Ok(model.into())
    }

    async fn update_content(
        &self,
        id: i64,
        text: String,
        group_id: Option<i64>,
    ) -> Result<Post, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?
            .ok_or(RepoError::NotFound)?;

        let mut active = model.into_active_model();
        active.text = Set(text);
        active.group_id = Set(group_id);
        let model = active.update(self.db.as_ref()).await.map_err(write_error)?;
        tracing::info!(post_id = model.id, "Post updated");

        Ok(model.into())
    }

    async fn update_group(&self, id: i64, group_id: Option<i64>) -> Result<Post, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?
            .ok_or(RepoError::NotFound)?;

        let mut active = model.into_active_model();
        active.group_id = Set(group_id);
        let model = active.update(self.db.as_ref()).await.map_err(write_error)?;

        Ok(model.into())
    }

    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        Self::filtered(query)
            .count(self.db.as_ref())
            .await
            .map_err(query_error)
    }

    async fn list(
        &self,
        query: &PostQuery,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<PostListing>, RepoError> {
        let rows = Self::filtered(query)
            .offset(offset)
            .limit(limit)
            .find_also_related(GroupEntity)
            .all(self.db.as_ref())
            .await
            .map_err(query_error)?;

        self.with_authors(rows).await
    }

    async fn find_listing(&self, id: i64) -> Result<Option<PostListing>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(GroupEntity)
            .one(self.db.as_ref())
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(self.with_authors(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}
