//! Post CRUD and image upload handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use futures::TryStreamExt;
use uuid::Uuid;

use quill_core::domain::{NewPost, PostChanges, PostStatus, PostWithAuthor};
use quill_core::service::PostPage;
use quill_shared::MessageResponse;
use quill_shared::dto::{
    AuthorResponse, CreatePostRequest, PostListResponse, PostResponse, UpdatePostRequest,
    UploadResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for the listing endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct ListQuery {
    status: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
}

/// GET /api/posts - public, paginated listing.
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    // An empty status parameter means "no filter", like the dashboard sends.
    let status = query.status.as_deref().filter(|s| !s.is_empty());

    let page = state
        .post_service
        .list(status, query.page.unwrap_or(1), query.limit.unwrap_or(10))
        .await?;

    Ok(HttpResponse::Ok().json(list_response(page)))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.post_service.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let status = parse_status(req.status.as_deref())?.unwrap_or_default();

    let new = NewPost {
        title: req.title,
        slug: req.slug,
        content: req.content,
        excerpt: req.excerpt,
        featured_image: req.featured_image,
        status,
        tags: req.tags.unwrap_or_default(),
    };

    let post = state.post_service.create(&identity.to_actor(), new).await?;

    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PUT /api/posts/{id}
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        slug: req.slug,
        content: req.content,
        status: parse_status(req.status.as_deref())?,
        tags: req.tags,
        excerpt: req.excerpt,
        featured_image: req.featured_image,
    };

    let post = state
        .post_service
        .update(&identity.to_actor(), path.into_inner(), changes)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .post_service
        .delete(&identity.to_actor(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted")))
}

/// Maximum accepted image size.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// POST /api/posts/upload
///
/// Upload stub: the file is read and size-checked but never persisted; the
/// response fabricates the object-storage URL the real bucket would serve.
pub async fn upload(
    _identity: Identity,
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        if field.name() != "image" {
            // Drain so the stream can move on to the next field.
            while field.try_next().await.map_err(bad_multipart)?.is_some() {}
            continue;
        }

        let filename = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload.bin")
            .to_owned();

        let mut size = 0usize;
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            size += chunk.len();
            if size > MAX_IMAGE_BYTES {
                return Err(AppError::BadRequest("File too large (max 5MB)".to_string()));
            }
        }

        let url = format!(
            "https://{}.s3.{}.amazonaws.com/uploads/{}-{}",
            state.upload.bucket,
            state.upload.region,
            Utc::now().timestamp_millis(),
            filename
        );

        return Ok(HttpResponse::Ok().json(UploadResponse { url }));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

fn bad_multipart(err: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(err.to_string())
}

fn parse_status(value: Option<&str>) -> AppResult<Option<PostStatus>> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => PostStatus::parse(v)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid status: {v}"))),
    }
}

fn post_response(joined: PostWithAuthor) -> PostResponse {
    let PostWithAuthor { post, author } = joined;

    PostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        content: post.content,
        excerpt: post.excerpt,
        featured_image: post.featured_image,
        status: post.status.as_str().to_string(),
        tags: post.tags,
        author: author.map(|a| AuthorResponse {
            name: a.name,
            email: a.email,
        }),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn list_response(page: PostPage) -> PostListResponse {
    PostListResponse {
        posts: page.posts.into_iter().map(post_response).collect(),
        total_pages: page.total_pages,
        current_page: page.current_page,
        total: page.total,
    }
}
