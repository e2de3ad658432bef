use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use slms::domain::config::ApiConfig;
use slms_server::Server;
use tower::util::ServiceExt;

async fn build_router(config: ApiConfig) -> Router {
    let server = Server::builder().config(config).build().await.unwrap();
    server.router()
}

async fn router() -> Router {
    build_router(ApiConfig::default()).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_up_and_is_not_cached() {
    let app = router().await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cache = response.headers().get(header::CACHE_CONTROL).unwrap().to_str().unwrap();
    assert!(cache.contains("no-store"));

    let body = body_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["service"], "slms");
}

#[tokio::test]
async fn uptime_counts_from_startup_not_from_the_first_probe() {
    let app = router().await;

    // The clock is anchored in Server::build, so a probe arriving a second
    // later must already see that second even if nothing probed before it.
    tokio::time::sleep(std::time::Duration::from_millis(1_100)).await;
    let response = app.oneshot(get("/health")).await.unwrap();

    let body = body_json(response).await;
    assert!(body["uptime_seconds"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn unknown_routes_answer_404() {
    let app = router().await;

    let response = app.oneshot(get("/definitely-not-here")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_sign_in_and_me_flow() {
    let app = router().await;

    let register = json!({
        "username": "walter",
        "email": "walter@example.com",
        "password": "s3curepass",
        "first_name": "Walter",
        "last_name": "White"
    });
    let response =
        app.clone().oneshot(post_json("/api/v2/auth/register", &register)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["username"], "walter");

    let sign_in = json!({"username": "walter", "password": "s3curepass"});
    let response =
        app.clone().oneshot(post_json("/api/v2/auth/sign-in", &sign_in)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tokens = body_json(response).await;
    let access = tokens["access"].as_str().unwrap().to_owned();
    assert!(tokens["refresh"].as_str().is_some());

    let me = Request::builder()
        .uri("/api/v2/users/me")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(me).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["username"], "walter");
    assert_eq!(profile["first_name"], "Walter");

    let response = app.oneshot(get("/api/v2/users/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_surface_is_throttled_but_health_is_not() {
    let mut config = ApiConfig::default();
    config.security.throttle.limit = 3;
    let app = build_router(config).await;

    // Requests without a socket address share the fallback bucket.
    for _ in 0..3 {
        let response = app.clone().oneshot(get("/api/v2/courses")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get("/api/v2/courses")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["code"], "too_many_requests");

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn static_files_are_served_from_the_configured_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("robots.txt"), "User-agent: *\n").unwrap();

    let mut config = ApiConfig::default();
    config.storage.static_dir = dir.path().to_path_buf();
    let app = build_router(config).await;

    let response = app.clone().oneshot(get("/static/robots.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"User-agent: *\n");

    let response = app.oneshot(get("/static/missing.txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scalar_ui_is_mounted() {
    let app = router().await;

    let response = app.oneshot(get("/api")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
