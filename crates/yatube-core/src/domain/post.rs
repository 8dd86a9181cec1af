use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Group, UserSummary};

/// Characters of the text used when a post is shown as a label.
const LABEL_LEN: usize = 15;

/// Post entity - a short text entry written by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
}

/// Outcome of checking who may change a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAccess {
    Author,
    NotAuthor,
}

impl Post {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    pub fn edit_access(&self, user_id: Uuid) -> EditAccess {
        if self.is_authored_by(user_id) {
            EditAccess::Author
        } else {
            EditAccess::NotAuthor
        }
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: String = self.text.chars().take(LABEL_LEN).collect();
        f.write_str(&label)
    }
}

/// A post that has not been persisted yet.
///
/// `pub_date` is fixed here, at creation, and never written again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub text: String,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub pub_date: DateTime<Utc>,
}

impl NewPost {
    pub fn new(author_id: Uuid, text: String, group_id: Option<i64>) -> Self {
        Self {
            text,
            author_id,
            group_id,
            pub_date: Utc::now(),
        }
    }
}

/// A post with its author and group loaded alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListing {
    pub post: Post,
    pub author: UserSummary,
    pub group: Option<Group>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(author_id: Uuid, text: &str) -> Post {
        Post {
            id: 1,
            text: text.to_string(),
            pub_date: Utc::now(),
            author_id,
            group_id: None,
        }
    }

    #[test]
    fn test_label_is_first_fifteen_chars() {
        let post = post(Uuid::new_v4(), "Тестовый пост для проверки");
        assert_eq!(post.to_string(), "Тестовый пост д");

        let short = Post {
            text: "Коротко".to_string(),
            ..post
        };
        assert_eq!(short.to_string(), "Коротко");
    }

    #[test]
    fn test_edit_access() {
        let author = Uuid::new_v4();
        let post = post(author, "text");

        assert_eq!(post.edit_access(author), EditAccess::Author);
        assert_eq!(post.edit_access(Uuid::new_v4()), EditAccess::NotAuthor);
    }
}
