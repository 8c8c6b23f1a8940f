//! Post service.
//!
//! Validates input, enforces slug uniqueness and ownership, performs the
//! read-time author join and paginates listings. Stateless between calls;
//! all durable state lives behind the repository ports.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Actor, AuthorRef, NewPost, Post, PostChanges, PostWithAuthor, User};
use crate::error::{PostError, RepoError};
use crate::ports::{PostRepository, UserRepository};

/// One page of a listing, plus the counters the dashboard renders.
#[derive(Debug)]
pub struct PostPage {
    pub posts: Vec<PostWithAuthor>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Paginated listing, publicly readable. Drafts are not filtered out
    /// for anonymous callers; the status filter is exact-match only.
    pub async fn list(
        &self,
        status: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<PostPage, PostError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let offset = (page - 1) * limit;
        let posts = self.posts.list(status, offset, limit).await?;
        let total = self.posts.count(status).await?;

        let authors = self.load_authors(&posts).await?;
        let posts = posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned();
                PostWithAuthor { post, author }
            })
            .collect();

        Ok(PostPage {
            posts,
            total,
            total_pages: total.div_ceil(limit),
            current_page: page,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<PostWithAuthor, PostError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))?;
        self.join_author(post).await
    }

    pub async fn create(&self, actor: &Actor, new: NewPost) -> Result<PostWithAuthor, PostError> {
        let mut missing = Vec::new();
        if new.title.is_empty() {
            missing.push("title");
        }
        if new.content.is_empty() {
            missing.push("content");
        }
        if new.slug.is_empty() {
            missing.push("slug");
        }
        if !missing.is_empty() {
            return Err(PostError::Validation(missing));
        }

        // Best-effort pre-check; the unique index backstops the race.
        if self.posts.find_by_slug(&new.slug).await?.is_some() {
            return Err(PostError::SlugExists);
        }

        let post = Post::new(actor.id, new);
        let post = self.posts.insert(post).await.map_err(map_constraint)?;
        self.join_author(post).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: PostChanges,
    ) -> Result<PostWithAuthor, PostError> {
        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))?;

        authorize(actor, &post)?;

        let mut missing = Vec::new();
        if changes.title.is_empty() {
            missing.push("title");
        }
        if changes.content.is_empty() {
            missing.push("content");
        }
        if !missing.is_empty() {
            return Err(PostError::Validation(missing));
        }

        // Keeping the current slug is never a conflict.
        if !changes.slug.is_empty()
            && changes.slug != post.slug
            && self.posts.find_by_slug(&changes.slug).await?.is_some()
        {
            return Err(PostError::SlugExists);
        }

        post.apply(changes);
        let post = self.posts.update(post).await.map_err(map_constraint)?;
        self.join_author(post).await
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), PostError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(PostError::NotFound(id))?;

        authorize(actor, &post)?;

        self.posts.delete(id).await?;
        Ok(())
    }

    async fn join_author(&self, post: Post) -> Result<PostWithAuthor, PostError> {
        let author = self
            .users
            .find_by_id(post.author_id)
            .await?
            .map(author_ref);
        Ok(PostWithAuthor { post, author })
    }

    async fn load_authors(&self, posts: &[Post]) -> Result<HashMap<Uuid, AuthorRef>, PostError> {
        let mut ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self.users.find_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, author_ref(u))).collect())
    }
}

fn author_ref(user: User) -> AuthorRef {
    AuthorRef {
        name: user.name,
        email: user.email,
    }
}

fn authorize(actor: &Actor, post: &Post) -> Result<(), PostError> {
    if post.author_id != actor.id && !actor.is_admin() {
        return Err(PostError::Forbidden);
    }
    Ok(())
}

/// Collapse a store-level unique violation into the same conflict the
/// pre-check produces.
fn map_constraint(err: RepoError) -> PostError {
    match err {
        RepoError::Constraint(_) => PostError::SlugExists,
        other => PostError::Repo(other),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use tokio::sync::RwLock;

    use super::*;
    use crate::domain::{PostStatus, ROLE_ADMIN};

    #[derive(Default)]
    struct TestStore {
        posts: RwLock<Vec<Post>>,
        users: RwLock<Vec<User>>,
    }

    #[async_trait]
    impl PostRepository for TestStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
            Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
            Ok(self
                .posts
                .read()
                .await
                .iter()
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
                .posts
                .read()
                .await
                .iter()
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
                .posts
                .read()
                .await
                .iter()
                .filter(|p| status.is_none_or(|s| p.status.as_str() == s))
                .count() as u64)
        }

        async fn insert(&self, post: Post) -> Result<Post, RepoError> {
            let mut posts = self.posts.write().await;
            if posts.iter().any(|p| p.slug == post.slug) {
                return Err(RepoError::Constraint("posts.slug".to_string()));
            }
            posts.push(post.clone());
            Ok(post)
        }

        async fn update(&self, post: Post) -> Result<Post, RepoError> {
            let mut posts = self.posts.write().await;
            if posts.iter().any(|p| p.slug == post.slug && p.id != post.id) {
                return Err(RepoError::Constraint("posts.slug".to_string()));
            }
            let stored = posts
                .iter_mut()
                .find(|p| p.id == post.id)
                .ok_or(RepoError::NotFound)?;
            *stored = post.clone();
            Ok(post)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            let mut posts = self.posts.write().await;
            let before = posts.len();
            posts.retain(|p| p.id != id);
            if posts.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for TestStore {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
            Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
            Ok(self
                .users
                .read()
                .await
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self
                .users
                .read()
                .await
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn insert(&self, user: User) -> Result<User, RepoError> {
            self.users.write().await.push(user.clone());
            Ok(user)
        }
    }

    fn service() -> (Arc<TestStore>, PostService) {
        let store = Arc::new(TestStore::default());
        let svc = PostService::new(store.clone(), store.clone());
        (store, svc)
    }

    async fn seed_user(store: &TestStore, name: &str) -> Actor {
        let user = User::new(
            name.to_string(),
            format!("{name}@example.com"),
            "hash".to_string(),
        );
        let actor = Actor {
            id: user.id,
            roles: vec![user.role.clone()],
        };
        UserRepository::insert(store, user).await.unwrap();
        actor
    }

    fn new_post(title: &str, slug: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            slug: slug.to_string(),
            content: "World".to_string(),
            excerpt: None,
            featured_image: None,
            status: PostStatus::default(),
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_sets_author_and_defaults_status() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;

        let created = svc.create(&actor, new_post("Hello", "hello")).await.unwrap();

        assert_eq!(created.post.author_id, actor.id);
        assert_eq!(created.post.status, PostStatus::Draft);
        assert_eq!(created.author.unwrap().name, "u1");
    }

    #[tokio::test]
    async fn create_lists_every_missing_field() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;

        let mut empty = new_post("", "");
        empty.content = String::new();
        let err = svc.create(&actor, empty).await.map(|_| ()).unwrap_err();

        match err {
            PostError::Validation(fields) => {
                assert_eq!(fields, vec!["title", "content", "slug"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_slug_without_mutation() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;
        svc.create(&actor, new_post("First", "hello")).await.unwrap();

        let err = svc
            .create(&actor, new_post("Second", "hello"))
            .await
            .map(|_| ())
            .unwrap_err();

        assert!(matches!(err, PostError::SlugExists));
        assert_eq!(store.count(None).await.unwrap(), 1);
    }

    #[test]
    fn store_constraint_collapses_into_slug_conflict() {
        // A write that loses the pre-check race reports the same error
        // the pre-check would have.
        let err = map_constraint(RepoError::Constraint("posts_slug_key".to_string()));
        assert!(matches!(err, PostError::SlugExists));

        let err = map_constraint(RepoError::NotFound);
        assert!(matches!(err, PostError::Repo(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn update_partial_keeps_unrelated_fields() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;
        let created = svc.create(&actor, new_post("Hello", "hello")).await.unwrap();

        let updated = svc
            .update(
                &actor,
                created.post.id,
                PostChanges {
                    title: "Hi".to_string(),
                    content: "World".to_string(),
                    ..PostChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.post.title, "Hi");
        assert_eq!(updated.post.slug, "hello");
        assert_eq!(updated.post.content, "World");
        assert_eq!(updated.post.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn update_keeping_current_slug_is_not_a_conflict() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;
        let created = svc.create(&actor, new_post("Hello", "hello")).await.unwrap();

        let updated = svc
            .update(
                &actor,
                created.post.id,
                PostChanges {
                    title: "Hello".to_string(),
                    content: "World".to_string(),
                    slug: "hello".to_string(),
                    ..PostChanges::default()
                },
            )
            .await;

        assert!(updated.is_ok());
    }

    #[tokio::test]
    async fn update_requires_title_and_content() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;
        let created = svc.create(&actor, new_post("Hello", "hello")).await.unwrap();

        let err = svc
            .update(&actor, created.post.id, PostChanges::default())
            .await
            .map(|_| ())
            .unwrap_err();

        match err {
            PostError::Validation(fields) => assert_eq!(fields, vec!["title", "content"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_and_delete_forbidden_for_strangers() {
        let (store, svc) = service();
        let author = seed_user(&store, "u1").await;
        let stranger = seed_user(&store, "u2").await;
        let created = svc.create(&author, new_post("Hello", "hello")).await.unwrap();

        let err = svc
            .update(
                &stranger,
                created.post.id,
                PostChanges {
                    title: "Hijacked".to_string(),
                    content: "World".to_string(),
                    ..PostChanges::default()
                },
            )
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, PostError::Forbidden));

        let err = svc.delete(&stranger, created.post.id).await.unwrap_err();
        assert!(matches!(err, PostError::Forbidden));

        // The post survives untouched.
        let fetched = svc.get(created.post.id).await.unwrap();
        assert_eq!(fetched.post.title, "Hello");
    }

    #[tokio::test]
    async fn admin_bypasses_ownership() {
        let (store, svc) = service();
        let author = seed_user(&store, "u1").await;
        let admin = Actor {
            id: Uuid::new_v4(),
            roles: vec![ROLE_ADMIN.to_string()],
        };
        let created = svc.create(&author, new_post("Hello", "hello")).await.unwrap();

        svc.update(
            &admin,
            created.post.id,
            PostChanges {
                title: "Moderated".to_string(),
                content: "World".to_string(),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();

        svc.delete(&admin, created.post.id).await.unwrap();
        assert!(matches!(
            svc.get(created.post.id).await.unwrap_err(),
            PostError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (_store, svc) = service();
        let id = Uuid::new_v4();

        assert!(matches!(
            svc.get(id).await.unwrap_err(),
            PostError::NotFound(missing) if missing == id
        ));
    }

    #[tokio::test]
    async fn list_orders_pages_and_joins_authors() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;

        let base = Utc::now();
        for i in 0..5 {
            let mut post = Post::new(actor.id, new_post(&format!("Post {i}"), &format!("post-{i}")));
            post.created_at = base + Duration::seconds(i);
            PostRepository::insert(store.as_ref(), post).await.unwrap();
        }

        let page = svc.list(None, 2, 2).await.unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        // Descending creation time: page 2 of size 2 holds posts 2 and 1.
        let titles: Vec<&str> = page.posts.iter().map(|p| p.post.title.as_str()).collect();
        assert_eq!(titles, vec!["Post 2", "Post 1"]);
        assert!(page.posts.iter().all(|p| p.author.as_ref().unwrap().name == "u1"));
    }

    #[tokio::test]
    async fn list_filters_by_exact_status() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;

        let mut published = new_post("Live", "live");
        published.status = PostStatus::Published;
        svc.create(&actor, published).await.unwrap();
        svc.create(&actor, new_post("Draft", "draft-post")).await.unwrap();

        let page = svc.list(Some("published"), 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.posts[0].post.title, "Live");

        // Unknown status matches nothing rather than failing.
        let page = svc.list(Some("archived"), 1, 10).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn list_clamps_page_and_limit() {
        let (store, svc) = service();
        let actor = seed_user(&store, "u1").await;
        svc.create(&actor, new_post("Hello", "hello")).await.unwrap();

        let page = svc.list(None, 0, 0).await.unwrap();

        assert_eq!(page.current_page, 1);
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.total_pages, 1);
    }
}
