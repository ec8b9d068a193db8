use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use user_service::{
    AppState,
    config::{Config, MEMORY_DATABASE_URL},
    database::{Datastore, MemoryStore, NewUser, Role},
    router::create_router,
    utils::{generate_token, hash_password},
};
use uuid::Uuid;

fn test_config() -> Config {
    Config {
        database_url: MEMORY_DATABASE_URL.into(),
        jwt_secret: "integration-secret".into(),
        jwt_expiration_secs: 3600,
        bcrypt_cost: 4 /* bcrypt minimum cost */,
        server_host: "127.0.0.1".into(),
        server_port: 0,
        api_base_uri: "/api".into(),
    }
}

fn app(store: Arc<MemoryStore>) -> Router {
    create_router(AppState {
        store,
        config: test_config(),
    })
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Value of the `token` cookie and whether it was marked HttpOnly.
fn token_cookie(response: &Response) -> Option<(String, bool)> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("token="))
        .map(|v| {
            let value = v
                .trim_start_matches("token=")
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string();
            (value, v.contains("HttpOnly"))
        })
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/users/register",
            None,
            json!({ "email": email, "username": "a", "password": password }),
        ))
        .await
        .unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/users/login",
            None,
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn register_sets_http_only_token_cookie() {
    let app = app(Arc::new(MemoryStore::new()));

    let response = register(&app, "a@x.com", "secret").await;
    assert_eq!(response.status(), StatusCode::OK);
    let (token, http_only) = token_cookie(&response).expect("token cookie");
    assert!(!token.is_empty());
    assert!(http_only);

    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["resp_data"]["user"]["email"], "a@x.com");
    assert_eq!(json["resp_data"]["user"]["role"], "user");
    assert!(json["resp_data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_round_trip() {
    let app = app(Arc::new(MemoryStore::new()));
    register(&app, "a@x.com", "secret").await;

    let response = login(&app, "a@x.com", "secret").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(token_cookie(&response).is_some());

    let json = body_json(response).await;
    assert_eq!(json["resp_data"]["role"], "user");
}

#[tokio::test]
async fn login_with_unknown_email() {
    let app = app(Arc::new(MemoryStore::new()));

    let response = login(&app, "nobody@x.com", "secret").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(token_cookie(&response).is_none());
    assert_eq!(body_text(response).await, "User not found");
}

#[tokio::test]
async fn login_with_wrong_password() {
    let app = app(Arc::new(MemoryStore::new()));
    register(&app, "a@x.com", "secret").await;

    let response = login(&app, "a@x.com", "nope").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(token_cookie(&response).is_none());
    assert_eq!(body_text(response).await, "Incorrect password");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app(Arc::new(MemoryStore::new()));
    register(&app, "a@x.com", "secret").await;

    let response = register(&app, "a@x.com", "secret").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(token_cookie(&response).is_none());
}

#[tokio::test]
async fn listing_requires_a_token() {
    let app = app(Arc::new(MemoryStore::new()));

    let response = app
        .clone()
        .oneshot(get_request("/api/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_request("/api/users", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_empty_store() {
    let app = app(Arc::new(MemoryStore::new()));
    let (token, _) = generate_token(Uuid::new_v4(), Role::Admin, &test_config()).unwrap();

    let response = app
        .oneshot(get_request("/api/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["resp_data"], json!([]));
}

#[tokio::test]
async fn listing_during_outage_is_a_server_error() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());
    let (token, _) = generate_token(Uuid::new_v4(), Role::User, &test_config()).unwrap();
    store.set_offline(true);

    let response = app
        .oneshot(get_request("/api/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], 5000);
}

#[tokio::test]
async fn delete_own_account_cascades() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());

    let response = register(&app, "a@x.com", "secret").await;
    let (token, _) = token_cookie(&response).unwrap();
    let user_id: Uuid = body_json(response).await["resp_data"]["user"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    store.insert_post(user_id).await;
    store.insert_comment(user_id).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/users",
            Some(&token),
            json!({ "user_id": user_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["resp_data"]["posts_deleted"], 1);
    assert_eq!(json["resp_data"]["comments_deleted"], 1);
    assert!(store.posts_by_user(user_id).await.is_empty());
    assert!(store.comments_by_user(user_id).await.is_empty());

    let response = login(&app, "a@x.com", "secret").await;
    assert_eq!(body_text(response).await, "User not found");

    // 第二次删除应报告用户不存在
    let response = app
        .oneshot(json_request(
            "DELETE",
            "/api/users",
            Some(&token),
            json!({ "user_id": user_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_someone_else_needs_admin() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());
    let victim = store
        .create_user(NewUser {
            email: "victim@x.com".into(),
            username: "victim".into(),
            password_hash: hash_password("secret", 4 /* bcrypt minimum cost */).unwrap(),
            role: Role::User,
        })
        .await
        .unwrap();

    let (user_token, _) = generate_token(Uuid::new_v4(), Role::User, &test_config()).unwrap();
    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            "/api/users",
            Some(&user_token),
            json!({ "user_id": victim.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.find_users().await.unwrap().len(), 1);

    let (admin_token, _) = generate_token(Uuid::new_v4(), Role::Admin, &test_config()).unwrap();
    let response = app
        .oneshot(json_request(
            "DELETE",
            "/api/users",
            Some(&admin_token),
            json!({ "user_id": victim.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.find_users().await.unwrap().is_empty());
}
