//! # Database Infrastructure
//!
//! A unified interface for initializing and managing [SurrealDB](https://surrealdb.com)
//! connections across the workspace.
//!
//! ## Key Features
//! - **Engine Agnostic**: Supports `mem://`, `ws://`, and `http://` via the `any` engine.
//! - **Resilient Connectivity**: Built-in retry logic for health checks during engine startup.
//! - **Embedded Migrations**: Schema scripts ship inside the binary and apply on connect.
//! - **Integer Ids**: Per-table counters allocate the numeric record ids the API exposes.
//!
//! ## Example
//!
//! ```rust
//! use slms_database::{Database, DatabaseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("slms", "core")
//!         .init()
//!         .await?;
//!
//!     let id = db.next_id("course").await?;
//!     assert_eq!(id, 1);
//!
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
use migrations::MigrationRunner;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, trace, warn};

/// Shared connection state behind [`Database`].
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// Cloneable handle to a single `SurrealDB` session.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Starts a [`DatabaseBuilder`] with nothing configured.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// Collects connection parameters before anything touches the engine.
///
/// URL, namespace, and database name are mandatory; [`DatabaseBuilder::init`]
/// rejects a builder that is missing any of them.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection URL understood by the `any` engine (`mem://`, `ws://`, `http://`).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Namespace and database the session binds to.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Root credentials, needed for remote engines only.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Opens the connection and prepares the schema.
    ///
    /// Covers the whole lifecycle: engine startup, health probes with
    /// exponential backoff, optional root sign-in, session activation, and
    /// the embedded migrations.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] when a required parameter is missing.
    /// * [`DatabaseError::Connection`] when the engine never becomes healthy.
    /// * [`DatabaseError::Auth`] when the credentials are rejected.
    /// * [`DatabaseError::Surreal`] when `use_ns`/`use_db` fails.
    /// * [`DatabaseError::Migration`] if an embedded migration cannot be applied.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self.url.ok_or(DatabaseError::Validation {
            message: "Connection URL is missing".into(),
            context: None,
        })?;
        let ns = self.ns.ok_or(DatabaseError::Validation {
            message: "Namespace is missing".into(),
            context: None,
        })?;
        let db = self.db.ok_or(DatabaseError::Validation {
            message: "Database name is missing".into(),
            context: None,
        })?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Starting storage engine".into()),
        })?;

        // The engine may still be starting; probe it with backoff.
        let mut delay = Duration::from_millis(500);
        for attempt in 1..=3 {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == 3 {
                return Err(DatabaseError::Connection {
                    message: "Engine stayed unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Database is not ready yet, backing off");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        // Root sign-in only applies to remote engines.
        if let Some((u, p)) = self.auth {
            instance.signin(Root { username: u, password: p }).await.map_err(|e| {
                DatabaseError::Auth { message: e.to_string().into(), context: Some(url.into()) }
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Selecting namespace and database")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB session ready");

        info!("Checking embedded migrations");
        let migration_report = MigrationRunner::new(instance.clone()).run().await?;
        for skipped in migration_report.skipped {
            trace!(migration = skipped.name, "Skipping migration");
        }
        for applied in migration_report.applied {
            info!(migration = applied.name, "Applied migration");
        }
        info!("Schema is up to date");

        Ok(Database { inner: Arc::new(DatabaseInner { instance, ns, db }) })
    }
}

impl Database {
    /// Allocates the next integer id for `table` from its counter row.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the query fails, or
    /// [`DatabaseError::Internal`] if the counter yields no value.
    pub async fn next_id(&self, table: &str) -> Result<i64, DatabaseError> {
        let mut response = self
            .inner
            .instance
            .query("RETURN fn::next_id($tb)")
            .bind(("tb", table.to_owned()))
            .await
            .context("Allocating record id")?;

        response.take::<Option<i64>>(0)?.ok_or_else(|| DatabaseError::Internal {
            message: "Counter did not return an id".into(),
            context: Some(table.to_owned().into()),
        })
    }

    /// Raises the counter for `table` to at least `value`.
    ///
    /// Called after records are inserted with caller-chosen ids, so later
    /// [`Database::next_id`] calls cannot collide with them.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the query fails.
    pub async fn sync_counter(&self, table: &str, value: i64) -> Result<(), DatabaseError> {
        self.inner
            .instance
            .query("RETURN fn::sync_counter($tb, $value)")
            .bind(("tb", table.to_owned()))
            .bind(("value", value))
            .await
            .context("Syncing record id counter")?
            .check()
            .map_err(surrealdb::Error::from)?;

        Ok(())
    }

    /// The namespace this session is bound to.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    /// The database this session is bound to.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }
}
