/// Blog service - category counts, filtered post listings and post creation
use super::AuthContext;
use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{
    slugify, Category, CategoryCounts, NewPost, NewPostForm, Post, PostCard, Tag, TaxonomyInput,
    UNCATEGORIZED_SLUG,
};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

/// Posts filed under one category, or under the uncategorized bucket
#[derive(Debug, Clone)]
pub struct CategoryListing {
    /// Category name, or the uncategorized label
    pub name: String,
    /// `None` for the uncategorized bucket
    pub category: Option<Category>,
    pub posts: Vec<PostCard>,
}

/// Posts carrying one tag
#[derive(Debug, Clone)]
pub struct TagListing {
    pub tag: Tag,
    pub posts: Vec<PostCard>,
}

pub struct BlogService {
    repo: Arc<dyn BlogRepository>,
    uncategorized_label: String,
}

impl BlogService {
    pub fn new(repo: Arc<dyn BlogRepository>, uncategorized_label: impl Into<String>) -> Self {
        Self {
            repo,
            uncategorized_label: uncategorized_label.into(),
        }
    }

    pub fn uncategorized_label(&self) -> &str {
        &self.uncategorized_label
    }

    pub fn repository(&self) -> &Arc<dyn BlogRepository> {
        &self.repo
    }

    /// Post count of every category plus the uncategorized bucket
    pub async fn category_post_counts(&self) -> Result<CategoryCounts> {
        self.repo.category_post_counts().await
    }

    /// All posts in creation order
    pub async fn list_posts(&self) -> Result<Vec<PostCard>> {
        let posts = self.repo.list_posts().await?;
        self.hydrate(posts).await
    }

    pub async fn post_detail(&self, post_id: i64) -> Result<PostCard> {
        let post = self
            .repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        self.hydrate(vec![post])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))
    }

    /// Posts of the category with `slug`. The reserved `no_category` slug
    /// selects posts without a category.
    pub async fn posts_by_category(&self, slug: &str) -> Result<CategoryListing> {
        if slug == UNCATEGORIZED_SLUG {
            let posts = self.repo.uncategorized_posts().await?;
            return Ok(CategoryListing {
                name: self.uncategorized_label.clone(),
                category: None,
                posts: self.hydrate(posts).await?,
            });
        }

        let category = self
            .repo
            .find_category_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category '{}'", slug)))?;

        let posts = self.repo.posts_in_category(category.id).await?;
        Ok(CategoryListing {
            name: category.name.clone(),
            category: Some(category),
            posts: self.hydrate(posts).await?,
        })
    }

    pub async fn posts_by_tag(&self, slug: &str) -> Result<TagListing> {
        let tag = self
            .repo
            .find_tag_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tag '{}'", slug)))?;

        let posts = self.repo.posts_with_tag(tag.id).await?;
        Ok(TagListing {
            tag,
            posts: self.hydrate(posts).await?,
        })
    }

    /// Create a post authored by the caller.
    ///
    /// Anonymous callers get `LoginRequired` before anything is stored. New
    /// posts start without a category or tags.
    pub async fn create_post(&self, auth: &AuthContext, form: NewPostForm) -> Result<Post> {
        let author = match auth {
            AuthContext::Anonymous => {
                tracing::warn!("anonymous post creation refused");
                return Err(AppError::LoginRequired);
            }
            AuthContext::User(user) => user,
        };

        let form = form.normalized();
        form.validate()?;

        let post = self
            .repo
            .create_post(NewPost {
                title: form.title,
                hook_text: form.hook_text,
                content: form.content,
                author_id: author.user_id,
                category_id: None,
            })
            .await?;

        metrics::record_post_created();
        tracing::info!(
            post_id = post.id,
            author = %author.username,
            "post created"
        );

        Ok(post)
    }

    /// Attach an existing tag to a post
    pub async fn add_tag(&self, post_id: i64, tag_slug: &str) -> Result<()> {
        let tag = self
            .repo
            .find_tag_by_slug(tag_slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tag '{}'", tag_slug)))?;

        self.repo.add_tag_to_post(post_id, tag.id).await
    }

    pub async fn create_category(&self, name: &str, slug: Option<&str>) -> Result<Category> {
        let input = resolve_name_and_slug(name, slug)?;
        let category = self.repo.create_category(&input.name, &input.slug).await?;
        tracing::info!(category_id = category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub async fn create_tag(&self, name: &str, slug: Option<&str>) -> Result<Tag> {
        let input = resolve_name_and_slug(name, slug)?;
        let tag = self.repo.create_tag(&input.name, &input.slug).await?;
        tracing::info!(tag_id = tag.id, slug = %tag.slug, "tag created");
        Ok(tag)
    }

    /// Join posts with their author, category and tags
    async fn hydrate(&self, posts: Vec<Post>) -> Result<Vec<PostCard>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let mut author_ids: Vec<i64> = posts.iter().map(|p| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<i64, String> = self
            .repo
            .find_users_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect();

        let categories: HashMap<i64, Category> = self
            .repo
            .list_categories()
            .await?
            .into_iter()
            .map(|category| (category.id, category))
            .collect();

        let post_ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut tags = self.repo.tags_for_posts(&post_ids).await?;

        posts
            .into_iter()
            .map(|post| {
                let author_username = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!(
                        "post {} references missing author {}",
                        post.id, post.author_id
                    ))
                })?;

                Ok(PostCard {
                    id: post.id,
                    title: post.title,
                    hook_text: post.hook_text,
                    content: post.content,
                    author_username,
                    category: post
                        .category_id
                        .and_then(|id| categories.get(&id).cloned()),
                    tags: tags.remove(&post.id).unwrap_or_default(),
                    created_at: post.created_at,
                })
            })
            .collect()
    }
}

fn resolve_name_and_slug(name: &str, slug: Option<&str>) -> Result<TaxonomyInput> {
    let name = name.trim();
    let input = TaxonomyInput {
        name: name.to_string(),
        slug: slug.map(str::to_string).unwrap_or_else(|| slugify(name)),
    };
    input.validate()?;

    if input.slug == UNCATEGORIZED_SLUG {
        return Err(AppError::Conflict(format!("slug '{}' is reserved", input.slug)));
    }

    Ok(input)
}
