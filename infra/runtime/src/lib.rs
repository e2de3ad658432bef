//! # Runtime
//!
//! Tokio runtime construction for the SimpleLMS binaries.
//!
//! Binaries keep a synchronous `main`, build a runtime from a
//! [`RuntimeConfig`] profile, and `block_on` their async entry point. The
//! worker count honors `TOKIO_WORKER_THREADS` and otherwise follows the
//! available parallelism of the host.

pub use anyhow::Result;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

/// Worker count when neither the environment nor the host answer.
const FALLBACK_WORKERS: usize = 4;
/// Upper bound on configured workers.
const MAX_WORKERS: usize = 1024;
/// Stack bounds per worker thread, 1 to 16 `MiB`.
const STACK_BOUNDS: (usize, usize) = (1024 * 1024, 16 * 1024 * 1024);
/// Name given to worker threads unless a profile overrides it.
const WORKER_NAME: &str = "slms-worker";

static DETECTED_WORKERS: OnceLock<usize> = OnceLock::new();

fn detect_workers() -> usize {
    *DETECTED_WORKERS.get_or_init(|| {
        let from_env = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|&n| (1..=MAX_WORKERS).contains(&n));

        match from_env {
            Some(n) => n,
            None => available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(FALLBACK_WORKERS),
        }
    })
}

/// Sizing profile for a Tokio runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: detect_workers(),
            stack_size: 3 * 1024 * 1024,
            thread_name: WORKER_NAME.to_owned(),
            thread_keep_alive: Duration::from_secs(60),
        }
    }
}

impl RuntimeConfig {
    /// Profile for the request-serving binary: wider stacks, workers kept
    /// warm across idle periods.
    #[must_use]
    pub fn high_performance() -> Self {
        Self {
            stack_size: 4 * 1024 * 1024,
            thread_name: "slms-server".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKERS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(STACK_BOUNDS.0, STACK_BOUNDS.1);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name = if name.trim().is_empty() { WORKER_NAME.to_owned() } else { name };
        self
    }

    #[must_use]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }

    /// Copy of this profile with every field forced into safe bounds.
    fn normalized(&self) -> Self {
        self.clone()
            .with_worker_threads(self.worker_threads)
            .with_stack_size(self.stack_size)
            .with_thread_name(self.thread_name.clone())
    }
}

/// Creates a multithreaded Tokio runtime from the given profile.
///
/// All Tokio features (I/O, timers, signal handling) are enabled; the
/// profile is normalized to safe bounds before use.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the runtime cannot be created, typically
/// due to OS-level limits on thread creation.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Assembling tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

/// Builds a runtime with the default profile, suitable for short-lived
/// tooling like the importer.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the runtime cannot be created.
pub fn build_service_runtime() -> Result<Runtime> {
    let config = RuntimeConfig::default();
    info!(
        threads = config.worker_threads,
        stack = config.stack_size,
        "Spawning service runtime"
    );
    build_runtime_with_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_counts_clamp_to_bounds() {
        let config = RuntimeConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, 1);

        let config = RuntimeConfig::default().with_worker_threads(2000);
        assert_eq!(config.worker_threads, MAX_WORKERS);
    }

    #[test]
    fn stack_sizes_clamp_to_bounds() {
        let config = RuntimeConfig::default().with_stack_size(100);
        assert_eq!(config.stack_size, STACK_BOUNDS.0);

        let config = RuntimeConfig::default().with_stack_size(100 * 1024 * 1024);
        assert_eq!(config.stack_size, STACK_BOUNDS.1);
    }

    #[test]
    fn blank_thread_names_fall_back() {
        let config = RuntimeConfig::high_performance().with_thread_name("   ");
        assert_eq!(config.thread_name, WORKER_NAME);
    }

    #[test]
    fn the_server_profile_keeps_workers_warm() {
        let config = RuntimeConfig::high_performance();
        assert_eq!(config.thread_name, "slms-server");
        assert!(config.thread_keep_alive > RuntimeConfig::default().thread_keep_alive);
    }
}
