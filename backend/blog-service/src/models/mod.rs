/// Data models for the blog service
///
/// - `User`: an author identity with a unique username
/// - `Category`: single-valued classification of a post (optional per post)
/// - `Tag`: multi-valued label, many-to-many with posts
/// - `Post`: a blog entry, plus the hydrated `PostCard` used by pages
pub mod post;
pub mod taxonomy;
pub mod user;

pub use post::{post_url, NewPost, NewPostForm, Post, PostCard};
pub use taxonomy::{
    slugify, validate_slug, Category, CategoryCount, CategoryCounts, Tag, TaxonomyInput,
    UNCATEGORIZED_SLUG,
};
pub use user::{validate_username, Registration, User};
