//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PostRepository, UserRepository};
use quill_core::service::PostService;
use quill_infra::database::{InMemoryPostRepository, InMemoryUserRepository};

use crate::config::{AppConfig, UploadConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub post_service: PostService,
    pub users: Arc<dyn UserRepository>,
    pub upload: UploadConfig,
}

impl AppState {
    /// Build the application state with appropriate store implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let (posts, users): (Arc<dyn PostRepository>, Arc<dyn UserRepository>) = {
            if let Some(db_config) = config.database.as_ref() {
                match quill_infra::connect(db_config).await {
                    Ok(conn) => (
                        Arc::new(quill_infra::PostgresPostRepository::new(conn.clone())),
                        Arc::new(quill_infra::PostgresUserRepository::new(conn)),
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Self::memory_repos()
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::memory_repos()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (posts, users): (Arc<dyn PostRepository>, Arc<dyn UserRepository>) = {
            tracing::info!("Running without postgres feature - using in-memory repositories");
            Self::memory_repos()
        };

        tracing::info!("Application state initialized");

        Self {
            post_service: PostService::new(posts, users.clone()),
            users,
            upload: config.upload.clone(),
        }
    }

    fn memory_repos() -> (Arc<dyn PostRepository>, Arc<dyn UserRepository>) {
        (
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }
}
