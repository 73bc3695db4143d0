//! Shared fixtures for blog-service integration tests
//!
//! Seeds an in-memory store with two authors, two categories, three tags and
//! three posts (one of them uncategorized), and offers HTML helpers built on
//! `scraper`.

#![allow(dead_code)]

use actix_web::web;
use blog_service::db::{BlogRepository, MemoryRepository};
use blog_service::models::{Category, NewPost, Post, Tag, User};
use blog_service::{AppState, Config};
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;

pub const PASSWORD: &str = "somepassword";
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Build an initialized test service for a `web::Data<AppState>`
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap($state.session_auth())
                .configure(blog_service::handlers::configure),
        )
        .await
    };
}

/// Log in through the form and evaluate to the session cookie
macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/accounts/login/")
            .set_form([("username", $username), ("password", $password)])
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::FOUND,
            "login should redirect"
        );
        resp.response()
            .cookies()
            .find(|c| c.name() == actix_middleware::DEFAULT_SESSION_COOKIE)
            .map(|c| c.into_owned())
            .expect("login sets the session cookie")
    }};
}

pub struct Fixture {
    pub state: web::Data<AppState>,
    pub repo: Arc<MemoryRepository>,

    pub user_james: User,
    pub user_trump: User,

    pub category_programming: Category,
    pub category_culture: Category,

    pub tag_python_kor: Tag,
    pub tag_python: Tag,
    pub tag_hello: Tag,

    pub post_001: Post,
    pub post_002: Post,
    pub post_003: Post,
}

/// App state over an empty in-memory store
pub fn empty_state() -> (web::Data<AppState>, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(Config::local(TEST_SECRET), repo.clone())
        .expect("test state should build");
    (web::Data::new(state), repo)
}

pub async fn fixture() -> Fixture {
    let (state, repo) = empty_state();

    let user_james = state.accounts.register("James", PASSWORD).await.unwrap();
    let user_trump = state.accounts.register("Trump", PASSWORD).await.unwrap();

    let category_programming = state
        .blog
        .create_category("programming", Some("programming"))
        .await
        .unwrap();
    let category_culture = state
        .blog
        .create_category("culture", Some("culture"))
        .await
        .unwrap();

    let tag_python_kor = state
        .blog
        .create_tag("파이썬 공부", Some("파이썬-공부"))
        .await
        .unwrap();
    let tag_python = state.blog.create_tag("python", Some("python")).await.unwrap();
    let tag_hello = state.blog.create_tag("hello", Some("hello")).await.unwrap();

    let post_001 = create_post(
        &repo,
        "첫 번째 포스트 입니다.",
        "Hello world. We are the world",
        &user_james,
        Some(&category_programming),
    )
    .await;
    repo.add_tag_to_post(post_001.id, tag_hello.id).await.unwrap();

    let post_002 = create_post(
        &repo,
        "두 번째 포스트 입니다.",
        "1등이 전부가 아니잖아요",
        &user_trump,
        Some(&category_culture),
    )
    .await;

    let post_003 = create_post(
        &repo,
        "세 번째 포스트 입니다.",
        "세번째 포스트 입니다.",
        &user_trump,
        None,
    )
    .await;
    repo.add_tag_to_post(post_003.id, tag_python.id).await.unwrap();
    repo.add_tag_to_post(post_003.id, tag_python_kor.id).await.unwrap();

    Fixture {
        state,
        repo,
        user_james,
        user_trump,
        category_programming,
        category_culture,
        tag_python_kor,
        tag_python,
        tag_hello,
        post_001,
        post_002,
        post_003,
    }
}

pub async fn create_post(
    repo: &MemoryRepository,
    title: &str,
    content: &str,
    author: &User,
    category: Option<&Category>,
) -> Post {
    repo.create_post(NewPost {
        title: title.to_string(),
        hook_text: None,
        content: content.to_string(),
        author_id: author.id,
        category_id: category.map(|c| c.id),
    })
    .await
    .unwrap()
}

pub fn parse(body: &[u8]) -> Html {
    Html::parse_document(std::str::from_utf8(body).expect("response body is UTF-8"))
}

pub fn select<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).expect("valid selector");
    doc.select(&selector).next()
}

pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of the first element matching `css`; panics when absent
pub fn find_text(doc: &Html, css: &str) -> String {
    text_of(select(doc, css).unwrap_or_else(|| panic!("no element matches {}", css)))
}

/// `<title>` text
pub fn title(doc: &Html) -> String {
    find_text(doc, "title")
}

/// Navigation bar carries the brand and the three section links
pub fn assert_navbar(doc: &Html) {
    let nav = select(doc, "nav").expect("page has a navbar");
    let nav_text = text_of(nav);
    assert!(nav_text.contains("Blog"));
    assert!(nav_text.contains("About Me"));

    let anchors = Selector::parse("a").unwrap();
    let href_of = |label: &str| -> String {
        nav.select(&anchors)
            .find(|a| text_of(*a).trim() == label)
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_else(|| panic!("navbar has no '{}' link", label))
            .to_string()
    };

    assert_eq!(href_of("Internet Programming"), "/");
    assert_eq!(href_of("Home"), "/");
    assert_eq!(href_of("Blog"), "/blog/");
    assert_eq!(href_of("About Me"), "/about_me/");
}

/// Categories panel shows every category count and the uncategorized bucket
pub fn assert_categories_card(doc: &Html, expected: &[(&str, i64)], uncategorized: i64) {
    let card = find_text(doc, "div#categories-card");
    assert!(card.contains("Categories"));
    for (name, count) in expected {
        let entry = format!("{} ({})", name, count);
        assert!(card.contains(&entry), "missing '{}' in categories card", entry);
    }
    let bucket = format!("미분류 ({})", uncategorized);
    assert!(card.contains(&bucket), "missing '{}' in categories card", bucket);
}

impl Fixture {
    /// Counts for the seeded data: one post per category, one uncategorized
    pub fn assert_categories_card(&self, doc: &Html) {
        assert_categories_card(
            doc,
            &[
                (self.category_programming.name.as_str(), 1),
                (self.category_culture.name.as_str(), 1),
            ],
            1,
        );
    }
}
