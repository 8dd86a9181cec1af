use std::fmt;

use serde::{Deserialize, Serialize};

/// Longest group title accepted.
pub const GROUP_TITLE_MAX_LEN: usize = 200;

/// Group entity - a named topic posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    /// Slugs are ASCII letters, digits, hyphens and underscores.
    pub fn is_valid_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A group that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_title() {
        let group = Group {
            id: 1,
            title: "тест-группа".to_string(),
            slug: "test_group".to_string(),
            description: "Тестирование".to_string(),
        };
        assert_eq!(group.to_string(), "тест-группа");
    }

    #[test]
    fn test_slug_rules() {
        assert!(Group::is_valid_slug("test_group"));
        assert!(Group::is_valid_slug("test-slug2"));
        assert!(!Group::is_valid_slug(""));
        assert!(!Group::is_valid_slug("with space"));
        assert!(!Group::is_valid_slug("тест"));
    }
}
