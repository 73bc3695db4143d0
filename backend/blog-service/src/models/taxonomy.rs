//! Categories and tags.
//!
//! Both are looked up by slug on their filter pages, so slugs are unique per
//! kind and URL-safe once percent-encoded. Non-ASCII letters are kept
//! ("파이썬 공부" becomes "파이썬-공부").

use serde::Serialize;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Slug reserved for the page listing posts without a category
pub const UNCATEGORIZED_SLUG: &str = "no_category";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Category {
    pub fn url(&self) -> String {
        format!("/blog/category/{}/", urlencoding::encode(&self.slug))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn url(&self) -> String {
        format!("/blog/tag/{}/", urlencoding::encode(&self.slug))
    }
}

/// A category with the number of posts filed under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub post_count: i64,
}

/// Post counts per category plus the uncategorized bucket
///
/// Categories appear in creation order, including those with no posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub categories: Vec<CategoryCount>,
    pub uncategorized: i64,
}

impl CategoryCounts {
    /// Count for a category id, or for the uncategorized bucket when `None`.
    /// Unknown ids yield `None`.
    pub fn count_for(&self, category_id: Option<i64>) -> Option<i64> {
        match category_id {
            None => Some(self.uncategorized),
            Some(id) => self
                .categories
                .iter()
                .find(|entry| entry.category.id == id)
                .map(|entry| entry.post_count),
        }
    }

    pub fn total(&self) -> i64 {
        self.uncategorized + self.categories.iter().map(|c| c.post_count).sum::<i64>()
    }
}

/// Derive a slug from a display name.
///
/// Lower-cases, turns whitespace runs into `-`, and drops anything that is
/// not alphanumeric, `-` or `_`. Leading and trailing separators are trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.trim().chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = !slug.is_empty();
        } else if c.is_alphanumeric() || c == '_' {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.extend(c.to_lowercase());
        }
    }

    slug
}

/// Name and slug of a category or tag about to be created
#[derive(Debug, Clone, Validate)]
pub struct TaxonomyInput {
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,
}

/// Check a slug against the characters `slugify` can produce
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(invalid("slug_empty", "must not be empty".to_string()));
    }
    if slug.chars().count() > 200 {
        return Err(invalid("slug_length", "must be at most 200 characters".to_string()));
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(
            "slug_chars",
            format!("contains invalid character '{}'", bad),
        ));
    }
    Ok(())
}

pub(crate) fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}
