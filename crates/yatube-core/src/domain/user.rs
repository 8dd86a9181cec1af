use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest username accepted at signup.
pub const USERNAME_MAX_LEN: usize = 150;

/// Role carried in session tokens of staff users.
pub const STAFF_ROLE: &str = "staff";

/// User entity - the account posts are authored by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamp.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            is_staff: false,
            created_at: Utc::now(),
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Roles embedded into the session token.
    pub fn roles(&self) -> Vec<String> {
        let mut roles = vec!["user".to_string()];
        if self.is_staff {
            roles.push(STAFF_ROLE.to_string());
        }
        roles
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }

    /// Letters, digits and `@.+-_`, between 1 and 150 characters.
    pub fn is_valid_username(username: &str) -> bool {
        let len = username.chars().count();
        len > 0
            && len <= USERNAME_MAX_LEN
            && username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    }
}

/// Public face of a user, as shown next to their posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_role() {
        let user = User::new("leo".to_string(), "hash".to_string());
        assert_eq!(user.roles(), vec!["user".to_string()]);

        let admin = user.staff();
        assert!(admin.roles().iter().any(|r| r == STAFF_ROLE));
    }

    #[test]
    fn test_username_rules() {
        assert!(User::is_valid_username("Test_User"));
        assert!(User::is_valid_username("лев.толстой+1"));
        assert!(!User::is_valid_username(""));
        assert!(!User::is_valid_username("with space"));
        assert!(!User::is_valid_username(&"a".repeat(151)));
    }
}
