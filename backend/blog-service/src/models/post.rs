use super::taxonomy::{Category, Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Words kept in a list-page excerpt
const EXCERPT_WORDS: usize = 45;

/// Detail URL for a post id
pub fn post_url(id: i64) -> String {
    format!("/blog/{}/", id)
}

/// Stored post record
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub hook_text: Option<String>,
    pub content: String,
    pub author_id: i64,
    /// `None` means the post is uncategorized
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn url(&self) -> String {
        post_url(self.id)
    }
}

/// Insert payload for the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub hook_text: Option<String>,
    pub content: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
}

/// Fields submitted by the post-creation form
///
/// Missing fields deserialize as empty so they surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewPostForm {
    #[validate(length(min = 1, max = 30, message = "title must be 1-30 characters"))]
    pub title: String,
    #[validate(length(max = 100, message = "hook text must be at most 100 characters"))]
    pub hook_text: Option<String>,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
}

impl NewPostForm {
    /// Trim fields; an empty hook text counts as absent
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            hook_text: self
                .hook_text
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty()),
            content: self.content.trim().to_string(),
        }
    }
}

/// A post joined with its author, category and tags, ready for rendering
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: i64,
    pub title: String,
    pub hook_text: Option<String>,
    pub content: String,
    pub author_username: String,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
}

impl PostCard {
    pub fn url(&self) -> String {
        post_url(self.id)
    }

    pub fn excerpt(&self) -> String {
        truncate_words(&self.content, EXCERPT_WORDS)
    }

    pub fn created_display(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M").to_string()
    }

    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug == slug)
    }
}

fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        words.join(" ")
    } else {
        format!("{} …", words[..limit].join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_url() {
        assert_eq!(post_url(1), "/blog/1/");
    }

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("a b  c", 5), "a b c");
        assert_eq!(truncate_words("a b c d", 2), "a b …");
    }

    #[test]
    fn test_form_validation() {
        let ok = NewPostForm {
            title: "Post form 만들기".to_string(),
            hook_text: None,
            content: "Post form 페이지 만들기".to_string(),
        };
        assert!(ok.validate().is_ok());

        let long_title = NewPostForm {
            title: "가".repeat(31),
            ..ok.clone()
        };
        assert!(long_title.validate().is_err());

        // 30 Hangul syllables are 90 bytes but still within the limit
        let exact = NewPostForm {
            title: "가".repeat(30),
            ..ok.clone()
        };
        assert!(exact.validate().is_ok());

        let empty_content = NewPostForm {
            content: String::new(),
            ..ok
        };
        assert!(empty_content.validate().is_err());
    }

    #[test]
    fn test_normalized_drops_blank_hook_text() {
        let form = NewPostForm {
            title: "  title ".to_string(),
            hook_text: Some("   ".to_string()),
            content: "body".to_string(),
        }
        .normalized();

        assert_eq!(form.title, "title");
        assert!(form.hook_text.is_none());
    }
}
