use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role that may edit and delete any post, not only its own.
pub const ROLE_ADMIN: &str = "admin";
/// Default role for newly registered users.
pub const ROLE_AUTHOR: &str = "author";

/// User entity - an account that can author posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default role and generated id.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: ROLE_AUTHOR.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The authenticated identity an operation runs as.
///
/// Handlers build this from the verified token and pass it explicitly into
/// every service call; the service never reads ambient request state.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub roles: Vec<String>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ROLE_ADMIN)
    }
}
