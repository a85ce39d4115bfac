use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::auth;
use super::blog;
use super::health;
use super::middleware::{logging_middleware, request_guard_middleware, security_headers_middleware};
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Accounts and sessions
        .nest("/auth", auth::create_auth_router())
        // Feed, posts, profiles and contact
        .merge(blog::create_blog_router())
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_guard_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::state::Backends;
    use crate::config::AppConfig;
    use crate::domain::notification::{MockNotifier, Notifier};
    use crate::domain::post::PostRepository;
    use crate::domain::user::{User, UserRepository};
    use crate::domain::PostId;
    use crate::infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};
    use crate::infrastructure::notification::LogNotifier;
    use crate::infrastructure::post::InMemoryPostRepository;
    use crate::infrastructure::services::test_support::{
        admin_user, post_by, seed_post, stores, unverified_user, verified_user,
    };
    use crate::infrastructure::trending::NoTrending;
    use crate::infrastructure::user::InMemoryUserRepository;

    struct TestApp {
        router: Router,
        users: Arc<InMemoryUserRepository>,
        posts: Arc<InMemoryPostRepository>,
        config: AppConfig,
    }

    impl TestApp {
        fn token_for(&self, user: &User) -> String {
            JwtService::new(JwtConfig::new(
                self.config.session.secret.clone(),
                self.config.session.expiration_hours,
            ))
            .generate(user)
            .unwrap()
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, body)
        }
    }

    async fn app_with(seed: &[User], notifier: Arc<dyn Notifier>) -> TestApp {
        let (users, posts) = stores(seed).await;
        let config = AppConfig::default();

        let state = AppState::new(
            Backends {
                users: users.clone(),
                posts: posts.clone(),
                notifier,
                trending: Arc::new(NoTrending),
            },
            &config,
        );

        TestApp {
            router: create_router(state),
            users,
            posts,
            config,
        }
    }

    async fn app(seed: &[User]) -> TestApp {
        app_with(seed, Arc::new(LogNotifier::new())).await
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_health_and_security_headers() {
        let app = app(&[]).await;

        let response = app.router.clone().oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get(header::X_FRAME_OPTIONS).unwrap(), "DENY");

        let (status, body) = app.send(get("/ready", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = app.send(get("/live", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_compose_requires_session() {
        let app = app(&[]).await;

        let (status, body) = app
            .send(post_json(
                "/compose",
                None,
                json!({"title": "Hi", "content": "Body"}),
            ))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["redirect"], "/signin");
        assert_eq!(body["message"]["type"], "danger");
    }

    #[tokio::test]
    async fn test_unverified_user_cannot_compose() {
        let ada = unverified_user("ada");
        let app = app(&[ada.clone()]).await;
        let token = app.token_for(&ada);

        let (status, body) = app
            .send(post_json(
                "/compose",
                Some(&token),
                json!({"title": "Hi", "content": "Body"}),
            ))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unverified");
        assert!(app.posts.find(&crate::domain::PostFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_compose_ignores_author_fields_and_sanitizes() {
        let ada = verified_user("ada");
        let app = app(&[ada.clone()]).await;
        let token = app.token_for(&ada);

        let (status, body) = app
            .send(post_json(
                "/compose",
                Some(&token),
                json!({
                    "title": "Hello",
                    "content": "World",
                    "markdown": "# Hi\n\n<script>alert(1)</script>",
                    "author_id": "mallory",
                    "author_handle": "mallory"
                }),
            ))
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["author_id"], "ada");
        assert_eq!(body["author_handle"], "ada");
        assert!(body["html"].as_str().unwrap().contains("<h1>"));
        assert!(!body["html"].as_str().unwrap().contains("<script"));
        assert!(body.get("author_email").is_none());

        let stored = app.users.get(ada.id()).await.unwrap().unwrap();
        assert_eq!(stored.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_like_is_idempotent_over_http() {
        let ada = verified_user("ada");
        let bob = verified_user("bob");
        let app = app(&[ada.clone(), bob.clone()]).await;
        seed_post(&app.users, &app.posts, post_by(&ada, "p1", "Hello")).await;
        let token = app.token_for(&bob);

        for _ in 0..2 {
            let (status, _) = app
                .send(post_json(
                    "/like",
                    Some(&token),
                    json!({"post_id": "p1", "liked": true}),
                ))
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let post_id = PostId::new("p1").unwrap();
        assert_eq!(app.posts.get(&post_id).await.unwrap().unwrap().like_count(), 1);

        let (_, body) = app.send(get("/", Some(&token))).await;
        assert_eq!(body["liked_post_ids"], json!(["p1"]));

        let (status, body) = app
            .send(post_json(
                "/like",
                Some(&token),
                json!({"post_id": "p1", "liked": false}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["like_count"], 0);
        assert_eq!(body["changed"], true);
    }

    #[tokio::test]
    async fn test_like_unknown_post_is_not_found() {
        let bob = verified_user("bob");
        let app = app(&[bob.clone()]).await;
        let token = app.token_for(&bob);

        let (status, body) = app
            .send(post_json(
                "/like",
                Some(&token),
                json!({"post_id": "nope", "liked": true}),
            ))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_delete_authorization() {
        let ada = verified_user("ada");
        let eve = verified_user("eve");
        let root = admin_user("root");
        let app = app(&[ada.clone(), eve.clone(), root.clone()]).await;
        seed_post(&app.users, &app.posts, post_by(&ada, "p1", "Hello")).await;
        let post_id = PostId::new("p1").unwrap();

        let (status, body) = app
            .send(post_json(
                "/delete",
                Some(&app.token_for(&eve)),
                json!({"post_id": "p1"}),
            ))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["message"]["text"],
            "You are not authorized to delete this post."
        );
        assert!(app.posts.get(&post_id).await.unwrap().is_some());

        let (status, body) = app
            .send(post_json(
                "/delete",
                Some(&app.token_for(&root)),
                json!({"post_id": "p1"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect"], "/profile");
        assert!(app.posts.get(&post_id).await.unwrap().is_none());
        assert!(app.users.get(ada.id()).await.unwrap().unwrap().posts().is_empty());
    }

    #[tokio::test]
    async fn test_search_blank_query_redirects_home() {
        let app = app(&[]).await;

        let (status, body) = app.send(get("/search?query=", None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["redirect"], "/");
    }

    #[tokio::test]
    async fn test_post_view_and_profiles() {
        let ada = verified_user("ada");
        let bob = verified_user("bob");
        let app = app(&[ada.clone(), bob.clone()]).await;
        seed_post(&app.users, &app.posts, post_by(&ada, "p1", "Hello")).await;

        let (status, body) = app.send(get("/posts/p1", Some(&app.token_for(&ada)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_author"], true);

        let (_, body) = app.send(get("/posts/p1", None)).await;
        assert_eq!(body["is_author"], false);

        let (status, _) = app.send(get("/posts/missing", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = app.send(get("/profile/ada", Some(&app.token_for(&bob)))).await;
        assert_eq!(body["visitor"], true);
        assert_eq!(body["posts"].as_array().unwrap().len(), 1);

        let (_, body) = app.send(get("/profile", Some(&app.token_for(&ada)))).await;
        assert_eq!(body["visitor"], false);

        let (status, _) = app.send(get("/profile", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_session_on_public_route_is_anonymous() {
        let app = app(&[]).await;

        let (status, body) = app.send(get("/", Some("not-a-jwt"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["liked_post_ids"], json!([]));
    }

    #[tokio::test]
    async fn test_signup_verify_and_signin() {
        let mut notifier = MockNotifier::new();
        notifier.expect_is_configured().return_const(true);
        notifier.expect_send().times(1).returning(|_| Ok(()));
        let app = app_with(&[], Arc::new(notifier)).await;

        let (status, body) = app
            .send(post_json(
                "/auth/signup",
                None,
                json!({"email": "ada@example.com", "handle": "ada", "password": "password123"}),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"]["type"], "info");
        assert_eq!(body["user"]["is_verified"], false);

        let (status, body) = app
            .send(post_json(
                "/auth/signin",
                None,
                json!({"email": "ada@example.com", "password": "password123"}),
            ))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unverified");

        let stored = app
            .users
            .get_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        let token = stored.verification().unwrap().token.clone();

        let (status, body) = app.send(get(&format!("/auth/verify/{}", token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["is_verified"], true);

        let (status, _) = app.send(get(&format!("/auth/verify/{}", token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = app
            .send(post_json(
                "/auth/signin",
                None,
                json!({"email": "ada@example.com", "password": "password123"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        let session = body["token"].as_str().unwrap().to_string();

        let (status, body) = app.send(get("/auth/me", Some(&session))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["handle"], "ada");
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_rejected() {
        let ada = verified_user("ada");
        let app = app(&[ada]).await;

        let (status, body) = app
            .send(post_json(
                "/auth/signup",
                None,
                json!({"email": "ada@example.com", "handle": "someone", "password": "password123"}),
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"]["text"],
            "An account with this email already exists."
        );
    }

    #[tokio::test]
    async fn test_contact_without_mail_is_dependency_failure() {
        let app = app(&[]).await;

        let (status, body) = app
            .send(post_json(
                "/contact",
                None,
                json!({"name": "Ada", "email": "ada@example.com", "message": "Hello"}),
            ))
            .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["message"]["text"],
            "Server error: Email service not configured."
        );
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_shape() {
        let bob = verified_user("bob");
        let app = app(&[bob.clone()]).await;

        let (status, body) = app
            .send(post_json("/like", Some(&app.token_for(&bob)), json!({"liked": true})))
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "json_parse_error");
    }
}
