/// PostgreSQL repository
use super::BlogRepository;
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{Category, CategoryCount, CategoryCounts, NewPost, Post, Tag, User};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool using the service database settings
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| AppError::Internal("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect(url)
            .await?;

        tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BlogRepository for PgRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_category(&self, name: &str, slug: &str) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;

        Ok(category)
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
                AppError::Conflict(format!("category {} is still used by posts", id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_tag(&self, name: &str, slug: &str) -> Result<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, hook_text, content, author_id, category_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, hook_text, content, author_id, category_id, created_at, updated_at
            "#,
        )
        .bind(&post.title)
        .bind(&post.hook_text)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, hook_text, content, author_id, category_id, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, hook_text, content, author_id, category_id, created_at, updated_at
            FROM posts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn posts_in_category(&self, category_id: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, hook_text, content, author_id, category_id, created_at, updated_at
            FROM posts
            WHERE category_id = $1
            ORDER BY id
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn uncategorized_posts(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, hook_text, content, author_id, category_id, created_at, updated_at
            FROM posts
            WHERE category_id IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn posts_with_tag(&self, tag_id: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.hook_text, p.content, p.author_id, p.category_id,
                   p.created_at, p.updated_at
            FROM posts p
            JOIN post_tags pt ON pt.post_id = p.id
            WHERE pt.tag_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        let done = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(done.rows_affected() > 0)
    }

    async fn delete_all_posts(&self) -> Result<u64> {
        let done = sqlx::query("DELETE FROM posts").execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    async fn add_tag_to_post(&self, post_id: i64, tag_id: i64) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
                AppError::NotFound(format!("post {} or tag {}", post_id, tag_id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>> {
        let rows = sqlx::query_as::<_, (i64, i64, String, String)>(
            r#"
            SELECT pt.post_id, t.id, t.name, t.slug
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY pt.post_id, t.id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for (post_id, id, name, slug) in rows {
            tags.entry(post_id).or_default().push(Tag { id, name, slug });
        }

        Ok(tags)
    }

    async fn category_post_counts(&self) -> Result<CategoryCounts> {
        // One statement so both buckets come from the same snapshot; the
        // uncategorized bucket is the row with a NULL id.
        let rows = sqlx::query_as::<_, (Option<i64>, Option<String>, Option<String>, i64)>(
            r#"
            SELECT c.id, c.name, c.slug, COUNT(p.id)
            FROM categories c
            LEFT JOIN posts p ON p.category_id = c.id
            GROUP BY c.id, c.name, c.slug
            UNION ALL
            SELECT NULL::BIGINT, NULL::TEXT, NULL::TEXT, COUNT(*)
            FROM posts
            WHERE category_id IS NULL
            ORDER BY 1 NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut counts = CategoryCounts::default();
        for row in rows {
            match row {
                (Some(id), Some(name), Some(slug), post_count) => {
                    counts.categories.push(CategoryCount {
                        category: Category { id, name, slug },
                        post_count,
                    })
                }
                (_, _, _, post_count) => counts.uncategorized = post_count,
            }
        }

        Ok(counts)
    }
}
