//! # Logger
//!
//! Centralized tracing setup for SimpleLMS binaries. Configures a console
//! layer, an optional rolling file layer with non-blocking I/O, and
//! environment-based filtering.
//!
//! * Use [`LoggerBuilder::env_filter`] to set module-directed defaults
//!   (e.g., `"slms=debug,hyper=info"`); `RUST_LOG` still overrides them.
//! * Keep the returned [`Logger`] handle alive for the whole program run,
//!   it owns the worker that flushes file logs.
//!
//! ## Example
//!
//! ```rust
//! # use slms_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Stage;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const FILE_SUFFIX: &str = "log";

#[derive(Debug)]
pub struct LoggerConfig {
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct Unnamed;
#[derive(Debug)]
pub struct Named(String);
#[derive(Debug)]
pub struct NoFileSink;
#[derive(Debug)]
pub struct FileSink;

mod private {
    pub trait Stage {}
}
impl Stage for Unnamed {}
impl Stage for Named {}
impl Stage for NoFileSink {}
impl Stage for FileSink {}

/// Builds and installs the process-wide tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Stage = Unnamed, F: Stage = NoFileSink> {
    config: LoggerConfig,
    name: N,
    sink: std::marker::PhantomData<F>,
}

impl<F: Stage> LoggerBuilder<Unnamed, F> {
    /// Names the service; log records and rolling files carry this prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<Named, F> {
        LoggerBuilder {
            name: Named(name.into()),
            config: self.config,
            sink: std::marker::PhantomData,
        }
    }
}

impl LoggerBuilder<Named, FileSink> {
    /// Caps how many rolled files stay on disk.
    #[must_use = "configure and call init() to install the subscriber"]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// Picks when the file sink rolls over to a new file.
    #[must_use = "configure and call init() to install the subscriber"]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Switches the file layer to JSON lines.
    #[must_use = "configure and call init() to install the subscriber"]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl<F: Stage> LoggerBuilder<Named, F> {
    /// Sets the level floor; records below it are dropped.
    #[must_use = "configure and call init() to install the subscriber"]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `slms=debug,hyper=info`).
    ///
    /// `RUST_LOG` still overrides this; it is only a programmatic default.
    /// Invalid filters make [`LoggerBuilder::init`] return an error.
    #[must_use = "configure and call init() to install the subscriber"]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Toggles the stdout layer.
    #[must_use = "configure and call init() to install the subscriber"]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Sets the directory that receives rolling log files.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<Named, FileSink> {
        let mut config = self.config;
        config.path = Some(path.into());
        LoggerBuilder { config, name: self.name, sink: std::marker::PhantomData }
    }

    /// Consumes the builder and installs the global tracing subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. **Note:** the handle contains the [`WorkerGuard`]
    /// of the file worker; dropping it early stops log flushing.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        if self.name.0.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.config.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }

        let env_filter = build_env_filter(&self.config)?;
        let mut layers = Vec::new();

        if self.config.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match self.config.path {
            Some(ref path) => {
                let (file_layer, guard) = build_file_layer(&self.config, path, &self.name.0)?;
                layers.push(file_layer);
                Some(guard)
            }
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }
}

/// Handle to the installed subscriber.
///
/// Owns the non-blocking file worker; drop it only when the application
/// shuts down.
#[must_use = "dropping the handle stops the file log worker"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a fresh [`LoggerBuilder`].
    ///
    /// The service name set on it prefixes rolling log files
    /// (e.g., `my-app.2026-08-24.log`).
    #[must_use = "configure and call init() to install the subscriber"]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig::default(),
            name: Unnamed,
            sink: std::marker::PhantomData,
        }
    }

    /// Best-effort synchronization point before shutdown; actual flushing
    /// happens when the handle is dropped.
    pub fn flush(&self) {
        tracing::debug!("Logger flush requested");
    }

    /// Exposes the file worker guard when a file sink is configured.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging worker stopping, draining buffered records");
        }
    }
}

fn build_file_layer<S>(
    config: &LoggerConfig,
    path: &PathBuf,
    name: &str,
) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard), LoggerError>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fs::create_dir_all(path).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Could not create log directory: {}", path.display()).into()),
    })?;

    let file_appender = RollingFileAppender::builder()
        .rotation(config.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(FILE_SUFFIX)
        .max_log_files(config.max_files)
        .build(path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = layer().with_writer(non_blocking).with_ansi(false);

    let boxed = if config.json { file_layer.json().boxed() } else { file_layer.boxed() };
    Ok((boxed, guard))
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn builder_starts_from_defaults() {
        let builder = Logger::builder().name("test-app").env_filter("slms=debug");
        assert!(builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert_eq!(builder.config.env_filter.as_deref(), Some("slms=debug"));
        assert!(builder.config.path.is_none());
    }

    #[test]
    #[serial]
    fn builder_records_file_settings() {
        let builder = Logger::builder()
            .name("test-app")
            .console(false)
            .level(LevelFilter::WARN)
            .path("/tmp/slms-logs")
            .max_files(3)
            .json();

        assert!(!builder.config.console);
        assert_eq!(builder.config.level, LevelFilter::WARN);
        assert_eq!(builder.config.max_files, 3);
        assert!(builder.config.json);
        assert_eq!(builder.config.path.as_deref(), Some(std::path::Path::new("/tmp/slms-logs")));
    }

    #[test]
    #[serial]
    fn rejects_blank_name() {
        let err = Logger::builder().name("  ").init().expect_err("blank name must be rejected");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
