use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Post store.
///
/// Listing is offset/limit paginated and always ordered by creation time
/// descending; `status` filters by exact match when given. Implementations
/// must reject duplicate slugs from `insert` and `update` with
/// [`RepoError::Constraint`].
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn list(
        &self,
        status: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    async fn count(&self, status: Option<&str>) -> Result<u64, RepoError>;

    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Permanent removal; there is no soft delete.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// User store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Batch lookup backing the author join on listings.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn insert(&self, user: User) -> Result<User, RepoError>;
}
