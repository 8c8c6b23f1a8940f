use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication state of a post.
///
/// There are no transition rules: an authorized actor may flip between the
/// two states freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post entity - a single piece of authored content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a post. `status` is already defaulted and `tags`
/// already normalized by the caller.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub tags: Vec<String>,
}

/// Field-level changes for an update.
///
/// `title`, `slug` and `content` use empty-means-keep semantics: an empty
/// incoming value leaves the stored field untouched. `status` and `tags`
/// are applied whenever present (an explicit empty tag list replaces).
/// `excerpt` and `featured_image` distinguish "absent" (outer `None`,
/// keep) from "explicitly cleared" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub excerpt: Option<Option<String>>,
    pub featured_image: Option<Option<String>>,
}

impl Post {
    /// Create a post owned by `author_id`, stamping both timestamps.
    pub fn new(author_id: Uuid, new: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: new.title,
            slug: new.slug,
            content: new.content,
            excerpt: new.excerpt,
            featured_image: new.featured_image,
            status: new.status,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the partial-overwrite update policy and bump `updated_at`.
    pub fn apply(&mut self, changes: PostChanges) {
        if !changes.title.is_empty() {
            self.title = changes.title;
        }
        if !changes.slug.is_empty() {
            self.slug = changes.slug;
        }
        if !changes.content.is_empty() {
            self.content = changes.content;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        if let Some(excerpt) = changes.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(image) = changes.featured_image {
            self.featured_image = image;
        }
        self.updated_at = Utc::now();
    }
}

/// Author fields exposed on API responses in place of the raw reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub name: String,
    pub email: String,
}

/// A post with its author reference joined down to [`AuthorRef`].
///
/// The join happens at read time in the service; a post whose author
/// record has been removed joins to `None`.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: Option<AuthorRef>,
}
