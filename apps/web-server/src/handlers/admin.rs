//! Staff pages driven by the admin listing configuration.

use actix_web::{HttpResponse, http::header, web};
use chrono::Utc;

use yatube_core::admin::DateFilter;
use yatube_core::error::{DomainError, RepoError};
use yatube_core::forms::{GroupForm, INVALID_CHOICE};
use yatube_core::ports::PostQuery;
use yatube_shared::dto::{AdminGroupChange, AdminPostQuery, GroupFormData};

use super::posts::load_page;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::query::LenientQuery;
use crate::state::AppState;
use crate::views::{
    AdminGroupsTemplate, AdminGroupsView, AdminPostRow, AdminPostsTemplate, AdminPostsView,
    GroupFormView, LayoutChrome, LayoutContext, PageNav, admin_posts_query, render,
};

const SLUG_TAKEN: &str = "Group with this Slug already exists.";

fn require_staff(identity: &Identity) -> AppResult<()> {
    if identity.is_staff() {
        Ok(())
    } else {
        tracing::warn!(user = %identity.username, "Non-staff user on admin page");
        Err(DomainError::Forbidden("staff only").into())
    }
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_string()))
        .finish()
}

/// GET /admin/posts/?q=&pub_date=&page=
pub async fn posts(
    state: web::Data<AppState>,
    identity: Identity,
    query: LenientQuery<AdminPostQuery>,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;

    let AdminPostQuery { q, pub_date, page } = query.into_inner();
    let q = q.unwrap_or_default().trim().to_string();
    let filter = DateFilter::from_param(pub_date.as_deref());

    let post_query = PostQuery::all()
        .containing(&q)
        .published_since(filter.since(Utc::now()));
    let page = load_page(&state, &post_query, page.as_deref()).await?;
    let groups = state.groups.list_all().await?;

    let nav = PageNav::with_prefix(&page.window, admin_posts_query(&q, filter));
    let rows = page
        .items
        .iter()
        .map(|listing| AdminPostRow::new(listing, &groups))
        .collect();

    render(AdminPostsTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(Some(&identity)),
            AdminPostsView::new(rows, &q, filter, nav),
        ),
    })
}

/// POST /admin/posts/{post_id}/group/
pub async fn change_post_group(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<String>,
    body: web::Form<AdminGroupChange>,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;

    let raw_id = post_id.into_inner();
    let id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::from(DomainError::not_found("Post", &raw_id)))?;

    let raw_group = body.into_inner().group.unwrap_or_default();
    let raw_group = raw_group.trim();
    let group_id = if raw_group.is_empty() {
        None
    } else {
        let groups = state.groups.list_all().await?;
        match raw_group.parse::<i64>() {
            Ok(gid) if groups.iter().any(|g| g.id == gid) => Some(gid),
            _ => return Err(AppError::BadRequest(INVALID_CHOICE.to_string())),
        }
    };

    match state.posts.update_group(id, group_id).await {
        Ok(post) => {
            tracing::info!(post_id = post.id, group_id = ?post.group_id, by = %identity.username, "Post group changed");
        }
        Err(RepoError::NotFound) => return Err(DomainError::not_found("Post", id).into()),
        Err(e) => return Err(e.into()),
    }

    Ok(redirect("/admin/posts/"))
}

async fn groups_page(
    state: &AppState,
    identity: &Identity,
    form: GroupFormView,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;
    render(AdminGroupsTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(Some(identity)),
            AdminGroupsView::new(&groups, form),
        ),
    })
}

/// GET /admin/groups/
pub async fn groups(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    require_staff(&identity)?;
    groups_page(&state, &identity, GroupFormView::default()).await
}

/// POST /admin/groups/
pub async fn create_group(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Form<GroupFormData>,
) -> AppResult<HttpResponse> {
    require_staff(&identity)?;

    let GroupFormData {
        title,
        slug,
        description,
    } = body.into_inner();
    let mut form = GroupForm::bound(title, slug, description);

    let Some(new_group) = form.validate() else {
        return groups_page(&state, &identity, GroupFormView::from(&form)).await;
    };

    if state.groups.find_by_slug(&new_group.slug).await?.is_some() {
        form.add_error("slug", SLUG_TAKEN);
        return groups_page(&state, &identity, GroupFormView::from(&form)).await;
    }

    match state.groups.create(new_group).await {
        Ok(group) => {
            tracing::info!(group_id = group.id, slug = %group.slug, "Group created");
            Ok(redirect("/admin/groups/"))
        }
        Err(RepoError::Constraint(_)) => {
            form.add_error("slug", SLUG_TAKEN);
            groups_page(&state, &identity, GroupFormView::from(&form)).await
        }
        Err(e) => Err(e.into()),
    }
}
