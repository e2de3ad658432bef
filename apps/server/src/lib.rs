//! # SimpleLMS Server
//!
//! The HTTP binary for the course service, built on `Axum`, `SurrealDB`,
//! and a type-safe event bus.
//!
//! ## Example
//! ```no_run
//! use slms_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8000)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod activity;
mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use slms::domain::config::ApiConfig;
use slms::kernel::server::ApiState;
use slms_database::Database;
use slms_event_bus::EventBus;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

/// Collects configuration before the server touches the network.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    async fn init_database(&self) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        let mut builder =
            Database::builder().url(&db_cfg.url).session(&db_cfg.namespace, &db_cfg.database);

        if let Some(creds) = &db_cfg.credentials {
            builder = builder.auth(&creds.username, &creds.password);
        }

        builder.init().await.context("Database connection could not be established")
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("TLS certificate missing at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("TLS key missing at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    tracing::warn!(
                        "TLS private key {} is too permissive, tighten it to 600",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Finalizes the builder into a bound-ready [`Server`].
    ///
    /// # Process
    /// 1. Validates TLS files when TLS is configured
    /// 2. Establishes the database connection (migrations apply here)
    /// 3. Creates the event bus and subscribes the activity log
    /// 4. Initializes every feature slice through the facade
    /// 5. Constructs application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * The database connection cannot be established
    /// * A feature slice fails to initialize
    /// * A configured TLS certificate or key file is unreadable
    pub async fn build(self) -> Result<Server> {
        slms::kernel::server::mark_startup();
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);

        info!(
            address = %address,
            "Bootstrapping server"
        );

        if !self.cfg.storage.static_dir.is_dir() {
            warn!(
                dir = %self.cfg.storage.static_dir.display(),
                "Static directory missing; /static requests will answer 404"
            );
        }

        let db = self.init_database().await?;

        let events = EventBus::new();
        activity::spawn(&events)?;

        let slices = slms::init(&self.cfg, &db, &events)
            .map_err(|e| anyhow!("Feature slice initialization failed: {e}"))?;

        let state = slices
            .into_iter()
            .fold(ApiState::builder().config(self.cfg).db(db).events(events), |builder, slice| {
                info!(slice = slice.name(), "Feature slice registered");
                builder.register_slice(slice)
            })
            .build()
            .context("API state registry could not be finalized")?;
        Ok(Server { state })
    }
}

/// An initialized server holding state and config, one `run()` from serving.
///
/// This struct is returned by [`ServerBuilder::build`] and contains
/// all necessary runtime state.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    /// Entry point: a [`ServerBuilder`] with defaults loaded.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if binding the configured address fails
    /// or if TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            "Server starting"
        );

        let app = router::init(self.state);

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        // Container runtimes send SIGTERM; drain in-flight requests first.
        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Waiting for the shutdown signal failed: {e}");
                return;
            }
            info!("Shutdown signal received, draining connections");
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Listening on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("TLS certificate or key could not be loaded")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .context("HTTPS listener terminated abnormally")?;
        } else {
            info!("Listening on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .context("HTTP listener terminated abnormally")?;
        }

        info!("Server stopped cleanly");
        Ok(())
    }

    /// The shared application state, mainly for tests.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }

    /// Builds the full application router without binding a socket.
    ///
    /// Integration tests drive this router in-process.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        router::init(self.state.clone())
    }
}

/// Applies the `PORT` environment override container platforms inject at
/// deploy time. Invalid values are logged and ignored.
pub fn apply_platform_port(config: &mut ApiConfig) {
    if let Ok(raw) = std::env::var("PORT") {
        apply_port_value(config, &raw);
    }
}

fn apply_port_value(config: &mut ApiConfig, raw: &str) {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => {
            info!(port, "Applying platform PORT override");
            config.server.port = port;
        },
        _ => warn!(value = raw, "Ignoring invalid PORT override"),
    }
}

/// Resolves when Ctrl+C or SIGTERM arrives.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("SIGTERM handler installation failed")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_override_applies_valid_values() {
        let mut config = ApiConfig::default();
        apply_port_value(&mut config, "9005");
        assert_eq!(config.server.port, 9005);
        apply_port_value(&mut config, " 8443 ");
        assert_eq!(config.server.port, 8443);
    }

    #[test]
    fn port_override_ignores_garbage() {
        let mut config = ApiConfig::default();
        let original = config.server.port;

        for raw in ["no-port", "", "0", "70000", "-1"] {
            apply_port_value(&mut config, raw);
            assert_eq!(config.server.port, original);
        }
    }
}
