use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// The full configuration tree the binaries load at startup.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
}

/// Arc-backed config handle, cheap to clone into every subsystem.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Listener settings for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// Where the TLS certificate and key live on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// How to reach the `SurrealDB` engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// Root credentials; unauthenticated engines such as mem:// leave these unset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Filesystem roots for data files and static assets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
}

/// API security knobs: token signing, registration policy and request
/// throttling.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt: JwtConfig,
    pub register: RegisterConfig,
    pub throttle: ThrottleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: Option<String>,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub clock_skew_seconds: u64,
}

/// Self-service registration policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    /// When `false`, `POST /auth/register` answers `403` for everyone.
    pub open: bool,
}

/// Sliding-window rate limit applied to the public API surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    pub limit: u32,
    pub window_seconds: u64,
}

// Defaults mirror a local development setup.

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8000, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        // The embedded engine rejects root sign-in, so no credentials by
        // default; remote deployments set them in config.
        Self {
            url: "mem://".to_owned(),
            namespace: "slms".to_owned(),
            database: "core".to_owned(),
            credentials: None,
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), static_dir: PathBuf::from("static") }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-only-change-me".to_owned(),
            issuer: "slms".to_owned(),
            audience: None,
            access_ttl_seconds: 3600,
            refresh_ttl_seconds: 86_400,
            clock_skew_seconds: 60,
        }
    }
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self { open: true }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { limit: 10, window_seconds: 60 }
    }
}
