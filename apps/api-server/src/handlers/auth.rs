//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::ports::{PasswordService, TokenService};
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Check if the email is already taken
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    // Hash password
    let password_hash = password_service
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Create user; the unique index backstops concurrent registrations.
    let user = User::new(req.name, req.email, password_hash);
    let user = state.users.insert(user).await.map_err(|e| match e {
        RepoError::Constraint(_) => AppError::Conflict("Email already registered".to_string()),
        other => other.into(),
    })?;

    let token = issue_token(token_service.get_ref(), &user)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    let valid = password_service
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(token_service.get_ref(), &user)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds() as u64,
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    // A valid token for a since-deleted account is still unauthenticated.
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        created_at: user.created_at,
    }))
}

fn issue_token(token_service: &Arc<dyn TokenService>, user: &User) -> Result<String, AppError> {
    token_service
        .generate_token(user.id, &user.name, &user.email, vec![user.role.clone()])
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test, web};
    use serde_json::json;

    use quill_core::ports::{PasswordService, TokenService, UserRepository};
    use quill_core::service::PostService;
    use quill_infra::auth::{JwtConfig, JwtTokenService};
    use quill_infra::database::{InMemoryPostRepository, InMemoryUserRepository};
    use quill_infra::Argon2PasswordService;

    use crate::config::UploadConfig;
    use crate::handlers::configure_routes;
    use crate::state::AppState;

    fn services() -> (AppState, Arc<dyn TokenService>, Arc<dyn PasswordService>) {
        let posts = Arc::new(InMemoryPostRepository::new());
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());

        let state = AppState {
            post_service: PostService::new(posts, users.clone()),
            users,
            upload: UploadConfig {
                bucket: "test-bucket".to_string(),
                region: "eu-west-1".to_string(),
            },
        };
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
            issuer: "test".to_string(),
        }));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        (state, tokens, passwords)
    }

    macro_rules! service {
        ($state:expr, $tokens:expr, $passwords:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .app_data(web::Data::new($tokens.clone()))
                    .app_data(web::Data::new($passwords.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn register_login_me_round_trip() {
        let (state, tokens, passwords) = services();
        let srv = service!(state, tokens, passwords);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "hunter2hunter2"
            }))
            .to_request();
        let resp = test::call_service(&srv, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let token = body["access_token"].as_str().unwrap().to_owned();
        assert_eq!(body["token_type"], "Bearer");

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&srv, req).await;
        assert_eq!(body["name"], "Ada");
        assert_eq!(body["role"], "author");

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "hunter2hunter2"}))
            .to_request();
        let resp = test::call_service(&srv, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn register_rejects_duplicates_and_weak_passwords() {
        let (state, tokens, passwords) = services();
        let srv = service!(state, tokens, passwords);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({"name": "Ada", "email": "ada@example.com", "password": "short"}))
            .to_request();
        let resp = test::call_service(&srv, req).await;
        assert_eq!(resp.status(), 400);

        let register = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2hunter2"
        });
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register.clone())
            .to_request();
        assert_eq!(test::call_service(&srv, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(register)
            .to_request();
        let resp = test::call_service(&srv, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Email already registered");
    }

    #[actix_web::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let (state, tokens, passwords) = services();
        let srv = service!(state, tokens, passwords);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "hunter2hunter2"
            }))
            .to_request();
        assert_eq!(test::call_service(&srv, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ada@example.com", "password": "wrong-password"}))
            .to_request();
        let resp = test::call_service(&srv, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn me_requires_a_token() {
        let (state, tokens, passwords) = services();
        let srv = service!(state, tokens, passwords);

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&srv, req).await;

        assert_eq!(resp.status(), 401);
    }
}
