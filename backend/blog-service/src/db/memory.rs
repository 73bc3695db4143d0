//! In-memory repository.
//!
//! Records live in id-keyed `BTreeMap` arenas, so iteration order is creation
//! order. Relations are plain ids plus index maps maintained on every write:
//! category -> posts, tag -> posts, post -> tags and the uncategorized set.
//! Ids are never reused after deletion.

use super::BlogRepository;
use crate::error::{AppError, Result};
use crate::models::{Category, CategoryCount, CategoryCounts, NewPost, Post, Tag, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Sequences {
    user: i64,
    category: i64,
    tag: i64,
    post: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Default)]
struct State {
    seq: Sequences,

    users: BTreeMap<i64, User>,
    user_by_name: HashMap<String, i64>,

    categories: BTreeMap<i64, Category>,
    category_by_slug: HashMap<String, i64>,

    tags: BTreeMap<i64, Tag>,
    tag_by_slug: HashMap<String, i64>,

    posts: BTreeMap<i64, Post>,
    category_posts: HashMap<i64, BTreeSet<i64>>,
    uncategorized: BTreeSet<i64>,
    tag_posts: HashMap<i64, BTreeSet<i64>>,
    post_tags: HashMap<i64, BTreeSet<i64>>,
}

impl State {
    fn collect_posts<'a>(&self, ids: impl IntoIterator<Item = &'a i64>) -> Vec<Post> {
        ids.into_iter()
            .filter_map(|id| self.posts.get(id).cloned())
            .collect()
    }

    fn collect_users(&self, ids: &BTreeSet<i64>) -> Vec<User> {
        ids.iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect()
    }

    fn unlink_post(&mut self, post: &Post) {
        match post.category_id {
            Some(category_id) => {
                if let Some(ids) = self.category_posts.get_mut(&category_id) {
                    ids.remove(&post.id);
                }
            }
            None => {
                self.uncategorized.remove(&post.id);
            }
        }

        for tag_id in self.post_tags.remove(&post.id).unwrap_or_default() {
            if let Some(ids) = self.tag_posts.get_mut(&tag_id) {
                ids.remove(&post.id);
            }
        }
    }
}

/// Process-local store; contents are lost on restart
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogRepository for MemoryRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut state = self.state.write().await;
        if state.user_by_name.contains_key(username) {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let id = next_id(&mut state.seq.user);
        let user = User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        state.user_by_name.insert(user.username.clone(), id);
        state.users.insert(id, user.clone());

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .user_by_name
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(state.collect_users(&wanted))
    }

    async fn create_category(&self, name: &str, slug: &str) -> Result<Category> {
        let mut state = self.state.write().await;
        if state.category_by_slug.contains_key(slug) {
            return Err(AppError::Conflict(format!(
                "category slug '{}' already exists",
                slug
            )));
        }
        if state.categories.values().any(|c| c.name == name) {
            return Err(AppError::Conflict(format!(
                "category '{}' already exists",
                name
            )));
        }

        let id = next_id(&mut state.seq.category);
        let category = Category {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.category_by_slug.insert(category.slug.clone(), id);
        state.categories.insert(id, category.clone());

        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let state = self.state.read().await;
        Ok(state
            .category_by_slug
            .get(slug)
            .and_then(|id| state.categories.get(id))
            .cloned())
    }

    async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&id) {
            return Ok(false);
        }

        let referenced = state
            .category_posts
            .get(&id)
            .map(|ids| ids.len())
            .unwrap_or(0);
        if referenced > 0 {
            return Err(AppError::Conflict(format!(
                "category {} is still used by {} post(s)",
                id, referenced
            )));
        }

        if let Some(category) = state.categories.remove(&id) {
            state.category_by_slug.remove(&category.slug);
        }
        state.category_posts.remove(&id);

        Ok(true)
    }

    async fn create_tag(&self, name: &str, slug: &str) -> Result<Tag> {
        let mut state = self.state.write().await;
        if state.tag_by_slug.contains_key(slug) {
            return Err(AppError::Conflict(format!("tag slug '{}' already exists", slug)));
        }
        if state.tags.values().any(|t| t.name == name) {
            return Err(AppError::Conflict(format!("tag '{}' already exists", name)));
        }

        let id = next_id(&mut state.seq.tag);
        let tag = Tag {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        };
        state.tag_by_slug.insert(tag.slug.clone(), id);
        state.tags.insert(id, tag.clone());

        Ok(tag)
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let state = self.state.read().await;
        Ok(state
            .tag_by_slug
            .get(slug)
            .and_then(|id| state.tags.get(id))
            .cloned())
    }

    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&new_post.author_id) {
            return Err(AppError::BadRequest(format!(
                "author {} does not exist",
                new_post.author_id
            )));
        }
        if let Some(category_id) = new_post.category_id {
            if !state.categories.contains_key(&category_id) {
                return Err(AppError::BadRequest(format!(
                    "category {} does not exist",
                    category_id
                )));
            }
        }

        let id = next_id(&mut state.seq.post);
        let now = Utc::now();
        let post = Post {
            id,
            title: new_post.title,
            hook_text: new_post.hook_text,
            content: new_post.content,
            author_id: new_post.author_id,
            category_id: new_post.category_id,
            created_at: now,
            updated_at: now,
        };

        match post.category_id {
            Some(category_id) => {
                state.category_posts.entry(category_id).or_default().insert(id);
            }
            None => {
                state.uncategorized.insert(id);
            }
        }
        state.posts.insert(id, post.clone());

        Ok(post)
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.values().cloned().collect())
    }

    async fn posts_in_category(&self, category_id: i64) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        Ok(match state.category_posts.get(&category_id) {
            Some(ids) => state.collect_posts(ids),
            None => Vec::new(),
        })
    }

    async fn uncategorized_posts(&self) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        Ok(state.collect_posts(&state.uncategorized))
    }

    async fn posts_with_tag(&self, tag_id: i64) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        Ok(match state.tag_posts.get(&tag_id) {
            Some(ids) => state.collect_posts(ids),
            None => Vec::new(),
        })
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.posts.remove(&id) {
            Some(post) => {
                state.unlink_post(&post);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_posts(&self) -> Result<u64> {
        let mut state = self.state.write().await;
        let removed = state.posts.len() as u64;

        state.posts.clear();
        state.category_posts.clear();
        state.uncategorized.clear();
        state.tag_posts.clear();
        state.post_tags.clear();

        Ok(removed)
    }

    async fn add_tag_to_post(&self, post_id: i64, tag_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }
        if !state.tags.contains_key(&tag_id) {
            return Err(AppError::NotFound(format!("tag {}", tag_id)));
        }

        state.post_tags.entry(post_id).or_default().insert(tag_id);
        state.tag_posts.entry(tag_id).or_default().insert(post_id);

        Ok(())
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>> {
        let state = self.state.read().await;
        let mut result = HashMap::new();

        for post_id in post_ids {
            if let Some(tag_ids) = state.post_tags.get(post_id) {
                let tags: Vec<Tag> = tag_ids
                    .iter()
                    .filter_map(|id| state.tags.get(id).cloned())
                    .collect();
                result.insert(*post_id, tags);
            }
        }

        Ok(result)
    }

    async fn category_post_counts(&self) -> Result<CategoryCounts> {
        let state = self.state.read().await;
        let categories = state
            .categories
            .values()
            .map(|category| CategoryCount {
                category: category.clone(),
                post_count: state
                    .category_posts
                    .get(&category.id)
                    .map(|ids| ids.len() as i64)
                    .unwrap_or(0),
            })
            .collect();

        Ok(CategoryCounts {
            categories,
            uncategorized: state.uncategorized.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryRepository, User, Category, Category, Tag, Tag) {
        let repo = MemoryRepository::new();
        let james = repo.create_user("James", "hash").await.unwrap();
        let programming = repo.create_category("programming", "programming").await.unwrap();
        let culture = repo.create_category("culture", "culture").await.unwrap();
        let python = repo.create_tag("python", "python").await.unwrap();
        let hello = repo.create_tag("hello", "hello").await.unwrap();
        (repo, james, programming, culture, python, hello)
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
    async fn test_ids_are_sequential_and_not_reused() {
        let (repo, james, ..) = seeded().await;
        let first = repo.create_post(new_post("one", james.id, None)).await.unwrap();
        let second = repo.create_post(new_post("two", james.id, None)).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        repo.delete_all_posts().await.unwrap();
        let third = repo.create_post(new_post("three", james.id, None)).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_category_index_tracks_posts() {
        let (repo, james, programming, culture, ..) = seeded().await;
        let a = repo
            .create_post(new_post("a", james.id, Some(programming.id)))
            .await
            .unwrap();
        repo.create_post(new_post("b", james.id, Some(culture.id)))
            .await
            .unwrap();
        let c = repo
            .create_post(new_post("c", james.id, Some(programming.id)))
            .await
            .unwrap();
        repo.create_post(new_post("d", james.id, None)).await.unwrap();

        let ids: Vec<i64> = repo
            .posts_in_category(programming.id)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![a.id, c.id]);

        let counts = repo.category_post_counts().await.unwrap();
        assert_eq!(counts.count_for(Some(programming.id)), Some(2));
        assert_eq!(counts.count_for(Some(culture.id)), Some(1));
        assert_eq!(counts.count_for(None), Some(1));

        repo.delete_post(a.id).await.unwrap();
        let counts = repo.category_post_counts().await.unwrap();
        assert_eq!(counts.count_for(Some(programming.id)), Some(1));
    }

    #[tokio::test]
    async fn test_tag_index_tracks_posts() {
        let (repo, james, _, _, python, hello) = seeded().await;
        let a = repo.create_post(new_post("a", james.id, None)).await.unwrap();
        let b = repo.create_post(new_post("b", james.id, None)).await.unwrap();

        repo.add_tag_to_post(a.id, hello.id).await.unwrap();
        repo.add_tag_to_post(b.id, python.id).await.unwrap();
        repo.add_tag_to_post(b.id, hello.id).await.unwrap();
        repo.add_tag_to_post(b.id, hello.id).await.unwrap();

        let with_python: Vec<i64> = repo
            .posts_with_tag(python.id)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(with_python, vec![b.id]);

        let tags = repo.tags_for_posts(&[a.id, b.id]).await.unwrap();
        assert_eq!(tags[&a.id], vec![hello.clone()]);
        assert_eq!(tags[&b.id], vec![python.clone(), hello.clone()]);

        repo.delete_post(b.id).await.unwrap();
        assert!(repo.posts_with_tag(python.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_conflict() {
        let (repo, ..) = seeded().await;
        assert!(matches!(
            repo.create_user("James", "hash").await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            repo.create_category("other", "programming").await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            repo.create_tag("hello", "hello-2").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_category_blocked_while_referenced() {
        let (repo, james, programming, culture, ..) = seeded().await;
        let post = repo
            .create_post(new_post("a", james.id, Some(programming.id)))
            .await
            .unwrap();

        assert!(matches!(
            repo.delete_category(programming.id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(repo.delete_category(culture.id).await.unwrap());
        assert!(repo.find_category_by_slug("culture").await.unwrap().is_none());

        repo.delete_post(post.id).await.unwrap();
        assert!(repo.delete_category(programming.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_post_checks_references() {
        let (repo, james, ..) = seeded().await;
        assert!(matches!(
            repo.create_post(new_post("a", 999, None)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            repo.create_post(new_post("a", james.id, Some(999))).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            repo.add_tag_to_post(999, 1).await,
            Err(AppError::NotFound(_))
        ));
    }
}
