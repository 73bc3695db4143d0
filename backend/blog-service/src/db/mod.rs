/// Database access layer
///
/// `BlogRepository` is the storage seam used by the services. Two backends
/// implement it:
/// - `MemoryRepository`: records in id-ordered arenas with lookup indexes
/// - `PgRepository`: PostgreSQL through sqlx, schema from `migrations/`
use crate::error::Result;
use crate::models::{Category, CategoryCounts, NewPost, Post, Tag, User};
use async_trait::async_trait;
use std::collections::HashMap;

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::{PgRepository, MIGRATOR};

/// Storage operations for users, categories, tags and posts.
///
/// Post listings are returned in creation order (ascending id).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Short backend name for health output ("memory", "postgres")
    fn backend(&self) -> &'static str;

    /// Cheap liveness probe of the underlying store
    async fn ping(&self) -> Result<()>;

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;

    async fn create_category(&self, name: &str, slug: &str) -> Result<Category>;
    /// All categories in creation order
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;
    /// Fails with `Conflict` while any post references the category
    async fn delete_category(&self, id: i64) -> Result<bool>;

    async fn create_tag(&self, name: &str, slug: &str) -> Result<Tag>;
    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    async fn create_post(&self, post: NewPost) -> Result<Post>;
    async fn find_post(&self, id: i64) -> Result<Option<Post>>;
    async fn list_posts(&self) -> Result<Vec<Post>>;
    async fn posts_in_category(&self, category_id: i64) -> Result<Vec<Post>>;
    async fn uncategorized_posts(&self) -> Result<Vec<Post>>;
    async fn posts_with_tag(&self, tag_id: i64) -> Result<Vec<Post>>;
    async fn delete_post(&self, id: i64) -> Result<bool>;
    async fn delete_all_posts(&self) -> Result<u64>;

    /// Attach a tag; attaching twice is a no-op
    async fn add_tag_to_post(&self, post_id: i64, tag_id: i64) -> Result<()>;
    /// Tags per post id, each list ordered by tag id. Posts without tags may be absent.
    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>>;

    /// Live per-category counts plus the uncategorized bucket
    async fn category_post_counts(&self) -> Result<CategoryCounts>;
}
