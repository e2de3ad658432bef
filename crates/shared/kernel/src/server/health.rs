use super::SYSTEM_TAG;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Instant;
use utoipa::ToSchema;

/// Liveness payload served at `/health`.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    uptime_seconds: u64,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Anchors the uptime clock. Call once during startup; otherwise the clock
/// starts at the first `/health` probe instead of process start.
pub fn mark_startup() {
    LazyLock::force(&START_TIME);
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = OK, description = "Liveness probe", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        service: "slms",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: START_TIME.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
