use askama::Template;
use yatube_core::domain::{Group, Post, PostListing};
use yatube_core::forms::PostForm;
use yatube_core::pagination::Page;

use super::{GroupOption, LayoutContext, PageNav, PostCard};

/// Feed of posts on the index page.
#[derive(Debug, Clone)]
pub struct PostListView {
    pub posts: Vec<PostCard>,
    pub page: PageNav,
}

impl PostListView {
    pub fn new(page: Page<PostListing>) -> Self {
        let nav = PageNav::new(&page.window);
        Self {
            posts: page.items.into_iter().map(PostCard::from).collect(),
            page: nav,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<PostListView>,
}

#[derive(Debug, Clone)]
pub struct GroupListView {
    pub title: String,
    pub description: String,
    pub posts: Vec<PostCard>,
    pub page: PageNav,
}

impl GroupListView {
    pub fn new(group: Group, page: Page<PostListing>) -> Self {
        let PostListView { posts, page } = PostListView::new(page);
        Self {
            title: group.title,
            description: group.description,
            posts,
            page,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub view: LayoutContext<GroupListView>,
}

#[derive(Debug, Clone)]
pub struct ProfileView {
    pub username: String,
    pub post_count: u64,
    pub posts: Vec<PostCard>,
    pub page: PageNav,
}

impl ProfileView {
    /// The post count is the total across all pages.
    pub fn new(username: String, page: Page<PostListing>) -> Self {
        let post_count = page.window.count;
        let PostListView { posts, page } = PostListView::new(page);
        Self {
            username,
            post_count,
            posts,
            page,
        }
    }
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub view: LayoutContext<ProfileView>,
}

#[derive(Debug, Clone)]
pub struct PostDetailView {
    pub post_info: PostCard,
    /// Total posts by the same author.
    pub number_of_posts: u64,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub view: LayoutContext<PostDetailView>,
}

/// Create and edit share one page.
#[derive(Debug, Clone)]
pub struct PostFormView {
    pub is_edit: bool,
    pub post_id: i64,
    pub action: String,
    pub text: String,
    pub text_errors: Vec<String>,
    pub group_errors: Vec<String>,
    pub groups: Vec<GroupOption>,
}

impl PostFormView {
    pub fn create(form: &PostForm, groups: &[Group]) -> Self {
        Self::build(form, groups, "/create/".to_string(), None)
    }

    pub fn edit(form: &PostForm, groups: &[Group], post: &Post) -> Self {
        Self::build(form, groups, format!("/posts/{}/edit/", post.id), Some(post.id))
    }

    fn build(form: &PostForm, groups: &[Group], action: String, post_id: Option<i64>) -> Self {
        Self {
            is_edit: post_id.is_some(),
            post_id: post_id.unwrap_or_default(),
            action,
            text: form.text.clone(),
            text_errors: form.errors().get("text").to_vec(),
            group_errors: form.errors().get("group").to_vec(),
            groups: GroupOption::list(groups, form.selected_group()),
        }
    }
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct CreatePostTemplate {
    pub view: LayoutContext<PostFormView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::LayoutChrome;
    use yatube_core::forms::REQUIRED;

    fn groups() -> Vec<Group> {
        vec![Group {
            id: 3,
            title: "Собаки".to_string(),
            slug: "dogs".to_string(),
            description: "Про собак".to_string(),
        }]
    }

    #[test]
    fn test_invalid_form_keeps_values_and_errors() {
        let mut form = PostForm::bound("   ", Some("3".to_string()));
        assert!(form.validate(&groups()).is_none());

        let view = PostFormView::create(&form, &groups());
        assert!(!view.is_edit);
        assert_eq!(view.text_errors, vec![REQUIRED.to_string()]);
        assert!(view.group_errors.is_empty());
        assert!(view.groups[0].selected);
    }

    #[test]
    fn test_create_page_renders_errors() {
        let mut form = PostForm::bound("", None);
        form.validate(&groups());
        let template = CreatePostTemplate {
            view: LayoutContext::new(
                LayoutChrome::default(),
                PostFormView::create(&form, &groups()),
            ),
        };
        let html = template.render().unwrap();
        assert!(html.contains(REQUIRED));
        assert!(html.contains("Собаки"));
        assert!(html.contains("action=\"/create/\""));
    }
}
