//! Post pages: feeds, detail, create and edit.

use actix_web::{HttpResponse, http::header, web};

use yatube_core::domain::{EditAccess, Post, PostListing};
use yatube_core::error::DomainError;
use yatube_core::forms::PostForm;
use yatube_core::pagination::Page;
use yatube_core::ports::PostQuery;
use yatube_shared::dto::{PageQuery, PostFormData};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::query::LenientQuery;
use crate::state::AppState;
use crate::views::{
    CreatePostTemplate, GroupListTemplate, GroupListView, IndexTemplate, LayoutChrome,
    LayoutContext, PostCard, PostDetailTemplate, PostDetailView, PostFormView, PostListView,
    ProfileTemplate, ProfileView, render,
};

fn see_other(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Post ids in paths are parsed by hand so junk is a 404 rather than a 400.
fn parse_post_id(raw: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::from(DomainError::not_found("Post", raw)))
}

/// Load one page of posts matching `query`.
pub(crate) async fn load_page(
    state: &AppState,
    query: &PostQuery,
    requested: Option<&str>,
) -> AppResult<Page<PostListing>> {
    let total = state.posts.count(query).await?;
    let window = state.paginator.window(total, requested);
    let items = state.posts.list(query, window.offset, window.limit()).await?;
    Ok(Page::new(items, window))
}

async fn find_post(state: &AppState, raw_id: &str) -> AppResult<Post> {
    let id = parse_post_id(raw_id)?;
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", raw_id).into())
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: LenientQuery<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = load_page(&state, &PostQuery::all(), query.page.as_deref()).await?;

    render(IndexTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(identity.0.as_ref()),
            PostListView::new(page),
        ),
    })
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    slug: web::Path<String>,
    query: LenientQuery<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = slug.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("Group", &slug))?;

    let page = load_page(&state, &PostQuery::in_group(group.id), query.page.as_deref()).await?;

    render(GroupListTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(identity.0.as_ref()),
            GroupListView::new(group, page),
        ),
    })
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    username: web::Path<String>,
    query: LenientQuery<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = username.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("User", &username))?;

    let page = load_page(&state, &PostQuery::by_author(author.id), query.page.as_deref()).await?;

    render(ProfileTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(identity.0.as_ref()),
            ProfileView::new(author.username, page),
        ),
    })
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let raw_id = post_id.into_inner();
    let id = parse_post_id(&raw_id)?;
    let listing = state
        .posts
        .find_listing(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", &raw_id))?;

    let number_of_posts = state
        .posts
        .count(&PostQuery::by_author(listing.post.author_id))
        .await?;
    let can_edit = identity
        .0
        .as_ref()
        .is_some_and(|user| listing.post.is_authored_by(user.user_id));

    render(PostDetailTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(identity.0.as_ref()),
            PostDetailView {
                post_info: PostCard::from(listing),
                number_of_posts,
                can_edit,
            },
        ),
    })
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let groups = state.groups.list_all().await?;
    let form = PostForm::empty();

    render(CreatePostTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(Some(&identity)),
            PostFormView::create(&form, &groups),
        ),
    })
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let PostFormData { text, group } = body.into_inner();
    let groups = state.groups.list_all().await?;
    let mut form = PostForm::bound(text, group);

    let Some(content) = form.validate(&groups) else {
        tracing::debug!(user = %identity.username, "Post form rejected");
        return render(CreatePostTemplate {
            view: LayoutContext::new(
                LayoutChrome::for_visitor(Some(&identity)),
                PostFormView::create(&form, &groups),
            ),
        });
    };

    let post = state
        .posts
        .create(content.into_new_post(identity.user_id))
        .await?;
    tracing::info!(post_id = post.id, author = %identity.username, "Post created");

    Ok(see_other(format!("/profile/{}/", identity.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, &post_id).await?;

    if post.edit_access(identity.user_id) == EditAccess::NotAuthor {
        return Ok(see_other(format!("/posts/{}/", post.id)));
    }

    let groups = state.groups.list_all().await?;
    let form = PostForm::for_post(&post);

    render(CreatePostTemplate {
        view: LayoutContext::new(
            LayoutChrome::for_visitor(Some(&identity)),
            PostFormView::edit(&form, &groups, &post),
        ),
    })
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    post_id: web::Path<String>,
    body: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let mut post = find_post(&state, &post_id).await?;

    if post.edit_access(identity.user_id) == EditAccess::NotAuthor {
        tracing::debug!(post_id = post.id, user = %identity.username, "Edit by non-author ignored");
        return Ok(see_other(format!("/posts/{}/", post.id)));
    }

    let PostFormData { text, group } = body.into_inner();
    let groups = state.groups.list_all().await?;
    let mut form = PostForm::bound(text, group);

    let Some(content) = form.validate(&groups) else {
        return render(CreatePostTemplate {
            view: LayoutContext::new(
                LayoutChrome::for_visitor(Some(&identity)),
                PostFormView::edit(&form, &groups, &post),
            ),
        });
    };

    content.apply_to(&mut post);
    state
        .posts
        .update_content(post.id, post.text, post.group_id)
        .await?;
    tracing::info!(post_id = post.id, "Post updated");

    Ok(see_other(format!("/posts/{}/", post.id)))
}
