//! Integration Tests: PostgreSQL repository
//!
//! Ignored by default. Point `TEST_DATABASE_URL` at a scratch database and
//! run with `--ignored`; every test truncates the blog tables first, so the
//! tests run serially.
//!
//! Coverage:
//! - Migrations apply cleanly
//! - Category counts including empty categories and the uncategorized bucket
//! - Counts come back from a single statement even with no categories
//! - Category and tag filters
//! - Unique and referential constraints map to Conflict

use blog_service::config::DatabaseConfig;
use blog_service::db::{BlogRepository, PgRepository};
use blog_service::models::NewPost;
use blog_service::AppError;
use serial_test::serial;

async fn repository() -> PgRepository {
    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a scratch PostgreSQL database");

    let repo = PgRepository::connect(&DatabaseConfig {
        url: Some(url),
        max_connections: 2,
    })
    .await
    .expect("connect to test database");
    repo.migrate().await.expect("run migrations");

    sqlx::query("TRUNCATE post_tags, posts, tags, categories, users RESTART IDENTITY CASCADE")
        .execute(repo.pool())
        .await
        .expect("truncate tables");

    repo
}

fn new_post(title: &str, author_id: i64, category_id: Option<i64>) -> NewPost {
    NewPost {
        title: title.to_string(),
        hook_text: None,
        content: format!("{} content", title),
        author_id,
        category_id,
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_counts_and_filters() {
    let repo = repository().await;

    let james = repo.create_user("James", "hash").await.unwrap();
    let programming = repo.create_category("programming", "programming").await.unwrap();
    let culture = repo.create_category("culture", "culture").await.unwrap();
    let hello = repo.create_tag("hello", "hello").await.unwrap();

    let first = repo
        .create_post(new_post("first", james.id, Some(programming.id)))
        .await
        .unwrap();
    let second = repo.create_post(new_post("second", james.id, None)).await.unwrap();
    repo.create_post(new_post("third", james.id, None)).await.unwrap();

    repo.add_tag_to_post(first.id, hello.id).await.unwrap();
    // attaching twice is a no-op
    repo.add_tag_to_post(first.id, hello.id).await.unwrap();

    let counts = repo.category_post_counts().await.unwrap();
    assert_eq!(counts.categories.len(), 2);
    assert_eq!(counts.categories[0].category.id, programming.id);
    assert_eq!(counts.count_for(Some(programming.id)), Some(1));
    assert_eq!(counts.count_for(Some(culture.id)), Some(0));
    assert_eq!(counts.uncategorized, 2);

    let in_programming = repo.posts_in_category(programming.id).await.unwrap();
    assert_eq!(in_programming.len(), 1);
    assert_eq!(in_programming[0].id, first.id);

    let uncategorized = repo.uncategorized_posts().await.unwrap();
    assert_eq!(uncategorized[0].id, second.id);

    let tagged = repo.posts_with_tag(hello.id).await.unwrap();
    assert_eq!(tagged.len(), 1);

    let tags = repo.tags_for_posts(&[first.id, second.id]).await.unwrap();
    assert_eq!(tags[&first.id].len(), 1);
    assert!(!tags.contains_key(&second.id));

    assert_eq!(repo.delete_all_posts().await.unwrap(), 3);
    let counts = repo.category_post_counts().await.unwrap();
    assert_eq!(counts.total(), 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_constraints() {
    let repo = repository().await;

    let james = repo.create_user("James", "hash").await.unwrap();
    assert!(matches!(
        repo.create_user("James", "hash").await,
        Err(AppError::Conflict(_))
    ));

    let programming = repo.create_category("programming", "programming").await.unwrap();
    assert!(matches!(
        repo.create_category("other", "programming").await,
        Err(AppError::Conflict(_))
    ));

    let post = repo
        .create_post(new_post("first", james.id, Some(programming.id)))
        .await
        .unwrap();
    assert!(matches!(
        repo.delete_category(programming.id).await,
        Err(AppError::Conflict(_))
    ));

    assert!(repo.delete_post(post.id).await.unwrap());
    assert!(repo.delete_category(programming.id).await.unwrap());

    assert!(matches!(
        repo.add_tag_to_post(999, 999).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[serial]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_counts_without_categories() {
    let repo = repository().await;

    let counts = repo.category_post_counts().await.unwrap();
    assert!(counts.categories.is_empty());
    assert_eq!(counts.uncategorized, 0);

    let james = repo.create_user("James", "hash").await.unwrap();
    repo.create_post(new_post("first", james.id, None)).await.unwrap();
    repo.create_post(new_post("second", james.id, None)).await.unwrap();

    let counts = repo.category_post_counts().await.unwrap();
    assert!(counts.categories.is_empty());
    assert_eq!(counts.uncategorized, 2);

    let culture = repo.create_category("culture", "culture").await.unwrap();
    let counts = repo.category_post_counts().await.unwrap();
    assert_eq!(counts.count_for(Some(culture.id)), Some(0));
    assert_eq!(counts.total(), 2);
}
