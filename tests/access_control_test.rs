//! HTTP-level access control: bearer tokens, the role policy on routes, and
//! the usage-limited delete key.

mod common;

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;

use freightbook_api::{config::AppConfig, entities::user, migrator::Migrator, AppState};

const TEST_JWT_SECRET: &str = "k9EjR2mXv7QpLw4ZtYhN8cBgA5sDuF6iOeT1rJ3nMqWxVbK0yHdGzPfCaUlS_test";

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt_secret: TEST_JWT_SECRET.into(),
        jwt_expiration: 3600,
        host: "127.0.0.1".into(),
        port: 18080,
        environment: "development".into(),
        log_level: "warn".into(),
        log_json: false,
        auto_migrate: false,
        cors_allowed_origins: None,
        cors_allow_any_origin: false,
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 60,
        db_acquire_timeout_secs: 5,
        bootstrap_admin_username: "admin".into(),
        bootstrap_admin_password: None,
    }
}

struct HttpApp {
    router: Router,
    state: AppState,
}

impl HttpApp {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        Migrator::up(&db, None).await.expect("migrations");

        let state = AppState::new(Arc::new(db), test_config());
        state
            .services
            .years
            .ensure_year(2024)
            .await
            .expect("register year");

        let router = freightbook_api::app_router(state.clone());
        Self { router, state }
    }

    fn token_for(&self, id: i32, username: &str, role: &str) -> String {
        let model = user::Model {
            id,
            username: username.to_string(),
            password_hash: String::new(),
            role: role.to_string(),
            created_at: Utc::now(),
        };
        self.state
            .auth
            .generate_token(&model)
            .expect("token")
            .token
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json_body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json_body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }
}

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn memo_body(no: &str) -> Value {
    json!({
        "memo_no": no,
        "memo_date": "2024-06-10",
        "arrival_date": "2024-06-12",
        "truck_no": "GJ-01-AB-1234"
    })
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = HttpApp::new().await;

    let response = app
        .request(Method::GET, "/api/memos?year=2024", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = HttpApp::new().await;

    let response = app
        .request(
            Method::GET,
            "/api/memos?year=2024",
            Some("not-a-real-token"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_returns_token_usable_on_protected_routes() {
    let app = HttpApp::new().await;
    app.state
        .services
        .users
        .bootstrap_admin("admin", "correct horse battery")
        .await
        .expect("seed admin");

    let response = app
        .request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "admin", "password": "correct horse battery"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let token = body["token"].as_str().expect("token in login response");

    let me = app.request(Method::GET, "/api/me", Some(token), None).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me_body = response_json(me).await;
    assert_eq!(me_body["username"], "admin");
    assert_eq!(me_body["role"], "admin");
}

#[tokio::test]
async fn wrong_password_is_rejected_like_unknown_user() {
    let app = HttpApp::new().await;
    app.state
        .services
        .users
        .bootstrap_admin("admin", "correct horse battery")
        .await
        .expect("seed admin");

    let wrong = app
        .request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "admin", "password": "nope"})),
        )
        .await;
    let unknown = app
        .request(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "ghost", "password": "nope"})),
        )
        .await;

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn clerk_can_write_but_not_delete() {
    let app = HttpApp::new().await;
    let clerk = app.token_for(2, "clerk1", "clerk");

    let create = app
        .request(
            Method::POST,
            "/api/memos?year=2024",
            Some(&clerk),
            Some(memo_body("M-301")),
        )
        .await;
    assert_eq!(create.status(), StatusCode::CREATED);
    let created = response_json(create).await;
    let memo_id = created["id"].as_i64().expect("memo id");

    let delete = app
        .request(
            Method::DELETE,
            &format!("/api/memos/{memo_id}?year=2024"),
            Some(&clerk),
            None,
        )
        .await;
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);

    let admin = app.token_for(1, "admin", "admin");
    let delete = app
        .request(
            Method::DELETE,
            &format!("/api/memos/{memo_id}?year=2024"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(delete.status(), StatusCode::OK);
}

#[tokio::test]
async fn low_role_is_read_only_over_http() {
    let app = HttpApp::new().await;
    let low = app.token_for(3, "viewer", "low");

    let list = app
        .request(Method::GET, "/api/memos?year=2024", Some(&low), None)
        .await;
    assert_eq!(list.status(), StatusCode::OK);

    let create = app
        .request(
            Method::POST,
            "/api/memos?year=2024",
            Some(&low),
            Some(memo_body("M-302")),
        )
        .await;
    assert_eq!(create.status(), StatusCode::FORBIDDEN);

    let reports = app
        .request(
            Method::GET,
            "/api/reports/door-delivery?year=2024",
            Some(&low),
            None,
        )
        .await;
    assert_eq!(reports.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = HttpApp::new().await;
    let clerk = app.token_for(2, "clerk1", "clerk");

    let response = app
        .request(Method::GET, "/api/users", Some(&clerk), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = app.token_for(1, "admin", "admin");
    let register = app
        .request(
            Method::POST,
            "/api/register",
            Some(&admin),
            Some(json!({"username": "newclerk", "password": "longenough1", "role": "clerk"})),
        )
        .await;
    assert_eq!(register.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn delete_key_gate_enforces_usage_limit() {
    let app = HttpApp::new().await;
    let admin = app.token_for(1, "admin", "admin");
    let clerk = app.token_for(2, "clerk1", "clerk");

    let set = app
        .request(
            Method::POST,
            "/api/admin/app-key",
            Some(&admin),
            Some(json!({"key": "9988", "usage_limit": 2})),
        )
        .await;
    assert_eq!(set.status(), StatusCode::OK);

    // Only the admin may configure the key.
    let forbidden = app
        .request(
            Method::POST,
            "/api/admin/app-key",
            Some(&clerk),
            Some(json!({"key": "1111"})),
        )
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // Wrong key reports invalid without consuming the limit.
    let wrong = app
        .request(
            Method::POST,
            "/api/app-key/validate",
            Some(&clerk),
            Some(json!({"key": "0000"})),
        )
        .await;
    assert_eq!(wrong.status(), StatusCode::OK);
    assert_eq!(response_json(wrong).await["valid"], json!(false));

    for _ in 0..2 {
        let ok = app
            .request(
                Method::POST,
                "/api/app-key/validate",
                Some(&clerk),
                Some(json!({"key": "9988"})),
            )
            .await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(response_json(ok).await["valid"], json!(true));
    }

    // Limit exhausted: further validations are refused outright.
    let exhausted = app
        .request(
            Method::POST,
            "/api/app-key/validate",
            Some(&clerk),
            Some(json!({"key": "9988"})),
        )
        .await;
    assert_eq!(exhausted.status(), StatusCode::FORBIDDEN);

    let status = app
        .request(Method::GET, "/api/app-key/status", Some(&clerk), None)
        .await;
    let status_body = response_json(status).await;
    assert_eq!(status_body["configured"], json!(true));
    assert_eq!(status_body["exhausted"], json!(true));
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = HttpApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}
