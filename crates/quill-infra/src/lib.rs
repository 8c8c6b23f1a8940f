//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! store repositories and authentication services.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL store via SeaORM. Without it the
//!   crate offers only the in-memory repositories.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use database::{DatabaseConfig, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{PostgresPostRepository, PostgresUserRepository, connect};
