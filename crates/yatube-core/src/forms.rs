//! Form binding and validation for user-submitted data.
//!
//! Forms keep the raw submitted values so an invalid submission can be
//! re-rendered exactly as typed, together with per-field messages.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::domain::{GROUP_TITLE_MAX_LEN, Group, NewGroup, NewPost, Post};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }
}

/// Validated post fields, ready to be written onto a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub text: String,
    pub group_id: Option<i64>,
}

impl PostContent {
    /// Creation path: the author is supplied by the caller, never by the form.
    pub fn into_new_post(self, author_id: Uuid) -> NewPost {
        NewPost::new(author_id, self.text, self.group_id)
    }

    /// Edit path: only `text` and `group_id` change.
    pub fn apply_to(self, post: &mut Post) {
        post.text = self.text;
        post.group_id = self.group_id;
    }
}

/// Form for creating and editing posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    /// Raw text as submitted.
    pub text: String,
    /// Raw group id as submitted; empty means no group.
    pub group: String,
    errors: FieldErrors,
}

impl PostForm {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bound(text: impl Into<String>, group: Option<String>) -> Self {
        Self {
            text: text.into(),
            group: group.unwrap_or_default(),
            errors: FieldErrors::default(),
        }
    }

    /// Pre-filled with an existing post's values.
    pub fn for_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
            errors: FieldErrors::default(),
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Selected group id, if the raw value is a number.
    pub fn selected_group(&self) -> Option<i64> {
        self.group.trim().parse().ok()
    }

    /// Validate against the groups that currently exist.
    ///
    /// Returns the cleaned content, or `None` with errors recorded on the form.
    pub fn validate(&mut self, groups: &[Group]) -> Option<PostContent> {
        self.errors.clear();

        let text = self.text.trim();
        if text.is_empty() {
            self.errors.add("text", REQUIRED);
        }

        let raw_group = self.group.trim();
        let group_id = if raw_group.is_empty() {
            None
        } else {
            match raw_group.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    self.errors.add("group", INVALID_CHOICE);
                    None
                }
            }
        };

        if !self.errors.is_empty() {
            return None;
        }

        Some(PostContent {
            text: text.to_string(),
            group_id,
        })
    }
}

/// Admin form for creating groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupForm {
    pub title: String,
    pub slug: String,
    pub description: String,
    errors: FieldErrors,
}

impl GroupForm {
    pub fn bound(title: String, slug: String, description: String) -> Self {
        Self {
            title,
            slug,
            description,
            errors: FieldErrors::default(),
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Record an error found after validation, such as a taken slug.
    pub fn add_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.add(field, message);
    }

    pub fn validate(&mut self) -> Option<NewGroup> {
        self.errors.clear();

        let title = self.title.trim();
        if title.is_empty() {
            self.errors.add("title", REQUIRED);
        } else if title.chars().count() > GROUP_TITLE_MAX_LEN {
            self.errors.add(
                "title",
                format!("Ensure this value has at most {GROUP_TITLE_MAX_LEN} characters."),
            );
        }

        let slug = self.slug.trim();
        if slug.is_empty() {
            self.errors.add("slug", REQUIRED);
        } else if !Group::is_valid_slug(slug) {
            self.errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        }

        let description = self.description.trim();
        if description.is_empty() {
            self.errors.add("description", REQUIRED);
        }

        if !self.errors.is_empty() {
            return None;
        }

        Some(NewGroup {
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        })
    }
}
