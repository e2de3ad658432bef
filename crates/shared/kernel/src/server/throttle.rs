//! Sliding-window request throttle keyed by client IP.
//!
//! Applied as middleware to the public API surface only; `/health` and the
//! static file service stay reachable for probes even when a client is
//! being limited.

use crate::server::problem::Problem;
use crate::server::state::ApiState;
use axum::Extension;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::sync::Cache;
use parking_lot::Mutex;
use slms_domain::config::ThrottleConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Hit timestamps for one client, newest last.
type History = Arc<Mutex<Vec<Instant>>>;

/// Per-client sliding-window limiter: at most `limit` requests within the
/// last `window`. Idle clients are evicted by the cache once a full window
/// has passed without traffic.
#[derive(Debug, Clone)]
pub struct Throttle {
    history: Cache<String, History>,
    limit: usize,
    window: Duration,
}

impl Throttle {
    #[must_use]
    pub fn new(config: &ThrottleConfig) -> Self {
        let window = Duration::from_secs(config.window_seconds.max(1));
        Self {
            history: Cache::builder().time_to_idle(window).build(),
            limit: usize::try_from(config.limit.max(1)).unwrap_or(usize::MAX),
            window,
        }
    }

    /// Records a hit for `key` and reports whether it stays within the limit.
    ///
    /// Rejected hits are not recorded, so a blocked client regains access as
    /// soon as its oldest allowed hit leaves the window.
    #[must_use]
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let history = self
            .history
            .entry_by_ref(key)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .into_value();

        let mut hits = history.lock();
        // Keep only hits inside the window. checked_sub covers processes
        // younger than the window where Instant cannot go further back.
        let cutoff = now.checked_sub(self.window);
        hits.retain(|hit| cutoff.is_none_or(|cutoff| *hit > cutoff));

        if hits.len() >= self.limit {
            return false;
        }
        hits.push(now);
        true
    }

    /// The configured per-window request limit.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// The configured window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

/// Axum middleware enforcing [`Throttle`] from the shared state.
///
/// The client key is the peer IP from [`ConnectInfo`]; when the router is
/// driven without connection info (tests, `oneshot`) every request shares
/// the `"unknown"` bucket.
pub async fn throttle_middleware(
    State(state): State<ApiState>,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    request: Request,
    next: Next,
) -> Response {
    let key = connect_info
        .map_or_else(|| "unknown".to_owned(), |Extension(ConnectInfo(addr))| addr.ip().to_string());

    if state.throttle.allow(&key) {
        return next.run(request).await;
    }

    tracing::warn!(client = %key, path = %request.uri().path(), "Request rejected by throttle");
    Problem::too_many_requests("request limit exceeded, slow down").into_response()
}
