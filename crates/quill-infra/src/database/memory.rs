//! In-memory repositories - used as fallback when the database is not
//! configured, and as the store behind handler-level tests.
//!
//! They honour the same contracts as the Postgres implementations
//! (creation-time ordering, offset/limit pagination, unique slug and
//! email), so behaviour observed against them carries over.
//! Note: data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

/// In-memory post store using a HashMap with an async RwLock.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn list(
        &self,
        status: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .store
            .read()
            .await
            .values()
            .filter(|p| status.is_none_or(|s| p.status.as_str() == s))
            .cloned()
            .collect();

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, status: Option<&str>) -> Result<u64, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .filter(|p| status.is_none_or(|s| p.status.as_str() == s))
            .count() as u64)
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if store.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }

        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        if store.values().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }
        if !store.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }

        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.store.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users_email_key".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use quill_core::domain::{NewPost, PostStatus};

    use super::*;

    fn post(slug: &str) -> Post {
        Post::new(
            Uuid::new_v4(),
            NewPost {
                title: "Title".to_string(),
                slug: slug.to_string(),
                content: "Body".to_string(),
                excerpt: None,
                featured_image: None,
                status: PostStatus::Draft,
                tags: Vec::new(),
            },
        )
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_slug() {
        let repo = InMemoryPostRepository::new();
        repo.insert(post("hello")).await.unwrap();

        let err = repo.insert(post("hello")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert_eq!(repo.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_allows_own_slug_but_not_anothers() {
        let repo = InMemoryPostRepository::new();
        let a = repo.insert(post("a")).await.unwrap();
        repo.insert(post("b")).await.unwrap();

        // Re-saving under its own slug is fine.
        repo.update(a.clone()).await.unwrap();

        let mut stolen = a;
        stolen.slug = "b".to_string();
        let err = repo.update(stolen).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let repo = InMemoryPostRepository::new();
        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }
}
