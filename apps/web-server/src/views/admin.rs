use askama::Template;
use yatube_core::admin::{DateFilter, GROUP_ADMIN, ModelAdmin, POST_ADMIN};
use yatube_core::domain::{Group, PostListing};
use yatube_core::forms::GroupForm;

use super::{DATE_FORMAT, GroupOption, LayoutContext, PageNav};

/// Column heading shown for a `list_display` entry.
fn column_label(column: &str) -> &str {
    match column {
        "pk" => "ID",
        "text" => "Текст",
        "pub_date" => "Дата публикации",
        "author" => "Автор",
        "group" => "Группа",
        "title" => "Название группы",
        "description" => "Описание",
        other => other,
    }
}

/// Long free-text columns keep their line breaks.
fn column_class(column: &str) -> &'static str {
    match column {
        "text" | "description" => "post-text",
        _ => "",
    }
}

fn headings(admin: &ModelAdmin) -> Vec<String> {
    admin
        .list_display
        .iter()
        .map(|column| column_label(column).to_string())
        .collect()
}

/// A cell of a staff table.
#[derive(Debug, Clone)]
pub struct AdminCell {
    pub value: String,
    pub editable: bool,
    pub class: &'static str,
}

#[derive(Debug, Clone)]
pub struct AdminPostRow {
    pub id: i64,
    pub cells: Vec<AdminCell>,
    pub group_options: Vec<GroupOption>,
}

impl AdminPostRow {
    pub fn new(listing: &PostListing, groups: &[Group]) -> Self {
        let admin = &POST_ADMIN;
        let cells = admin
            .list_display
            .iter()
            .map(|&column| {
                let value = match column {
                    "pk" => Some(listing.post.id.to_string()),
                    "text" => Some(listing.post.text.clone()),
                    "pub_date" => Some(listing.post.pub_date.format(DATE_FORMAT).to_string()),
                    "author" => Some(listing.author.username.clone()),
                    "group" => listing.group.as_ref().map(|g| g.title.clone()),
                    _ => None,
                };
                AdminCell {
                    value: admin.display(value.as_deref()),
                    editable: admin.is_editable(column),
                    class: column_class(column),
                }
            })
            .collect();

        Self {
            id: listing.post.id,
            cells,
            group_options: GroupOption::list(groups, listing.post.group_id),
        }
    }
}

/// One entry of the `pub_date` filter sidebar.
#[derive(Debug, Clone)]
pub struct DateFilterLink {
    pub label: String,
    pub href: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct AdminPostsView {
    pub columns: Vec<String>,
    pub rows: Vec<AdminPostRow>,
    pub searchable: bool,
    pub q: String,
    pub has_date_filter: bool,
    pub filters: Vec<DateFilterLink>,
    pub page: PageNav,
}

impl AdminPostsView {
    pub fn new(
        rows: Vec<AdminPostRow>,
        q: &str,
        selected: DateFilter,
        page: PageNav,
    ) -> Self {
        let admin = &POST_ADMIN;
        let filters = DateFilter::ALL
            .iter()
            .map(|filter| DateFilterLink {
                label: filter.label().to_string(),
                href: admin_posts_query(q, *filter),
                selected: *filter == selected,
            })
            .collect();

        Self {
            columns: headings(admin),
            rows,
            searchable: admin.is_searchable(),
            q: q.to_string(),
            has_date_filter: admin.is_filtered_by("pub_date"),
            filters,
            page,
        }
    }
}

/// `?q=..&pub_date=..` for the staff post list, ready for `page=` to be appended.
pub fn admin_posts_query(q: &str, filter: DateFilter) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if !q.is_empty() {
        query.append_pair("q", q);
    }
    if filter != DateFilter::AnyDate {
        query.append_pair("pub_date", filter.param());
    }
    let query = query.finish();
    if query.is_empty() {
        "?".to_string()
    } else {
        format!("?{query}&")
    }
}

#[derive(Template)]
#[template(path = "admin/posts.html")]
pub struct AdminPostsTemplate {
    pub view: LayoutContext<AdminPostsView>,
}

#[derive(Debug, Clone)]
pub struct AdminGroupRow {
    pub cells: Vec<AdminCell>,
}

impl AdminGroupRow {
    pub fn new(group: &Group) -> Self {
        let admin = &GROUP_ADMIN;
        let cells = admin
            .list_display
            .iter()
            .map(|&column| {
                let value = match column {
                    "pk" => Some(group.id.to_string()),
                    "title" => Some(group.title.clone()),
                    "description" => Some(group.description.clone()),
                    _ => None,
                };
                AdminCell {
                    value: admin.display(value.as_deref()),
                    editable: admin.is_editable(column),
                    class: column_class(column),
                }
            })
            .collect();
        Self { cells }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupFormView {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub title_errors: Vec<String>,
    pub slug_errors: Vec<String>,
    pub description_errors: Vec<String>,
}

impl From<&GroupForm> for GroupFormView {
    fn from(form: &GroupForm) -> Self {
        Self {
            title: form.title.clone(),
            slug: form.slug.clone(),
            description: form.description.clone(),
            title_errors: form.errors().get("title").to_vec(),
            slug_errors: form.errors().get("slug").to_vec(),
            description_errors: form.errors().get("description").to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminGroupsView {
    pub columns: Vec<String>,
    pub rows: Vec<AdminGroupRow>,
    pub form: GroupFormView,
}

impl AdminGroupsView {
    pub fn new(groups: &[Group], form: GroupFormView) -> Self {
        Self {
            columns: headings(&GROUP_ADMIN),
            rows: groups.iter().map(AdminGroupRow::new).collect(),
            form,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/groups.html")]
pub struct AdminGroupsTemplate {
    pub view: LayoutContext<AdminGroupsView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use yatube_core::admin::EMPTY_VALUE_DISPLAY;
    use yatube_core::domain::{Post, UserSummary};

    fn listing() -> PostListing {
        let author_id = Uuid::new_v4();
        PostListing {
            post: Post {
                id: 1,
                text: "Без группы".to_string(),
                pub_date: Utc::now(),
                author_id,
                group_id: None,
            },
            author: UserSummary {
                id: author_id,
                username: "auth".to_string(),
            },
            group: None,
        }
    }

    #[test]
    fn test_missing_group_uses_placeholder() {
        let row = AdminPostRow::new(&listing(), &[]);
        let group_cell = row.cells.last().unwrap();
        assert_eq!(group_cell.value, EMPTY_VALUE_DISPLAY);
        assert!(group_cell.editable);
        assert!(!row.cells[0].editable);
        assert_eq!(row.cells[1].value, "Без группы");
        assert_eq!(row.cells[1].class, "post-text");
        assert_eq!(row.cells[2].class, "");
    }

    #[test]
    fn test_query_prefix() {
        assert_eq!(admin_posts_query("", DateFilter::AnyDate), "?");
        assert_eq!(
            admin_posts_query("кот пёс", DateFilter::Today),
            "?q=%D0%BA%D0%BE%D1%82+%D0%BF%D1%91%D1%81&pub_date=today&"
        );
    }

    #[test]
    fn test_group_row_placeholder_for_blank_description() {
        let group = Group {
            id: 4,
            title: "Пустая".to_string(),
            slug: "empty".to_string(),
            description: "  ".to_string(),
        };
        let row = AdminGroupRow::new(&group);
        let values: Vec<&str> = row.cells.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["4", "Пустая", EMPTY_VALUE_DISPLAY]);
        assert_eq!(row.cells[0].class, "");
        assert_eq!(row.cells[2].class, "post-text");
    }
}
