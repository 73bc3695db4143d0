//! HTML rendering.
//!
//! Every page is an askama template driven by plain view data; the functions
//! here are pure and can be tested without an HTTP layer. Listings are given
//! in creation order and shown newest first.

use crate::models::{CategoryCounts, NewPostForm, PostCard, UNCATEGORIZED_SLUG};
use askama::Template;

pub type RenderResult = std::result::Result<String, askama::Error>;

/// Navigation bar data shared by every page
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    pub site_name: &'a str,
    /// Username of the signed-in viewer
    pub viewer: Option<&'a str>,
}

/// Categories panel data
#[derive(Debug, Clone)]
pub struct Sidebar<'a> {
    pub counts: &'a CategoryCounts,
    pub uncategorized_label: &'a str,
    pub uncategorized_url: String,
}

impl<'a> Sidebar<'a> {
    pub fn new(counts: &'a CategoryCounts, uncategorized_label: &'a str) -> Self {
        Self {
            counts,
            uncategorized_label,
            uncategorized_url: format!("/blog/category/{}/", UNCATEGORIZED_SLUG),
        }
    }
}

#[derive(Template)]
#[template(path = "post_list.html")]
struct PostListTemplate<'a> {
    layout: Layout<'a>,
    sidebar: &'a Sidebar<'a>,
    page_title: String,
    badge: Option<String>,
    posts: Vec<&'a PostCard>,
}

#[derive(Template)]
#[template(path = "post_detail.html")]
struct PostDetailTemplate<'a> {
    layout: Layout<'a>,
    sidebar: &'a Sidebar<'a>,
    post: &'a PostCard,
}

#[derive(Template)]
#[template(path = "post_form.html")]
struct PostFormTemplate<'a> {
    layout: Layout<'a>,
    form: &'a NewPostForm,
    errors: &'a [String],
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate<'a> {
    layout: Layout<'a>,
    next: &'a str,
    username: &'a str,
    error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "landing.html")]
struct LandingTemplate<'a> {
    layout: Layout<'a>,
    recent: Vec<&'a PostCard>,
}

#[derive(Template)]
#[template(path = "about_me.html")]
struct AboutMeTemplate<'a> {
    layout: Layout<'a>,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    status: u16,
    message: &'a str,
}

fn newest_first(posts: &[PostCard]) -> Vec<&PostCard> {
    posts.iter().rev().collect()
}

/// `/blog/`
pub fn post_list_page(layout: Layout<'_>, sidebar: &Sidebar<'_>, posts: &[PostCard]) -> RenderResult {
    PostListTemplate {
        layout,
        sidebar,
        page_title: "Blog".to_string(),
        badge: None,
        posts: newest_first(posts),
    }
    .render()
}

/// `/blog/category/{slug}/`; `name` is the category name or the uncategorized label
pub fn category_page(
    layout: Layout<'_>,
    sidebar: &Sidebar<'_>,
    name: &str,
    posts: &[PostCard],
) -> RenderResult {
    PostListTemplate {
        layout,
        sidebar,
        page_title: format!("{} - Blog", name),
        badge: Some(name.to_string()),
        posts: newest_first(posts),
    }
    .render()
}

/// `/blog/tag/{slug}/`
pub fn tag_page(
    layout: Layout<'_>,
    sidebar: &Sidebar<'_>,
    tag_name: &str,
    posts: &[PostCard],
) -> RenderResult {
    PostListTemplate {
        layout,
        sidebar,
        page_title: format!("#{} - Blog", tag_name),
        badge: Some(format!("#{}", tag_name)),
        posts: newest_first(posts),
    }
    .render()
}

pub fn post_detail_page(layout: Layout<'_>, sidebar: &Sidebar<'_>, post: &PostCard) -> RenderResult {
    PostDetailTemplate {
        layout,
        sidebar,
        post,
    }
    .render()
}

/// Creation form, optionally re-filled with a rejected submission
pub fn post_form_page(layout: Layout<'_>, form: &NewPostForm, errors: &[String]) -> RenderResult {
    PostFormTemplate {
        layout,
        form,
        errors,
    }
    .render()
}

pub fn login_page(
    layout: Layout<'_>,
    next: &str,
    username: &str,
    error: Option<&str>,
) -> RenderResult {
    LoginTemplate {
        layout,
        next,
        username,
        error,
    }
    .render()
}

/// Landing page with links to the five newest posts
pub fn landing_page(layout: Layout<'_>, posts: &[PostCard]) -> RenderResult {
    LandingTemplate {
        layout,
        recent: posts.iter().rev().take(5).collect(),
    }
    .render()
}

pub fn about_me_page(layout: Layout<'_>) -> RenderResult {
    AboutMeTemplate { layout }.render()
}

pub fn error_page(status: u16, message: &str) -> RenderResult {
    ErrorTemplate { status, message }.render()
}
