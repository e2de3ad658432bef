use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use tracing::info;

/// Failure modes of the layered config loader.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config {
        #[source]
        source: config::ConfigError,
        context: Option<Cow<'static, str>>,
    },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl From<config::ConfigError> for ConfigError {
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source, context: None }
    }
}

/// Adds `.context(...)` to results whose error converts into [`ConfigError`].
pub trait ConfigErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError>;
}

impl<T, E: Into<ConfigError>> ConfigErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|err| {
            let ConfigError::Config { source, .. } = err.into();
            ConfigError::Config { source, context: Some(context.into()) }
        })
    }
}

/// A reusable configuration loader that layers file-based settings with
/// environment overrides.
///
/// Sources are applied in order, later ones winning:
/// 1. **Base file**: `config/default.toml` (optional).
/// 2. **Profile file**: `config/{profile}.toml` when a profile is given
///    (optional), e.g. `config/server.toml`.
/// 3. **Local overrides**: `config/local.toml`, never committed (optional).
/// 4. **Environment**: variables prefixed with `SLMS__`, nested keys
///    separated by double underscores (e.g. `SLMS__SERVER__PORT=9000` maps
///    to `server.port`).
///
/// Every file layer is optional: with no files present, the target type's
/// own defaults apply.
///
/// # Errors
/// Returns [`ConfigError`] if a present file is malformed, an environment
/// variable cannot be parsed, or deserialization into `T` fails.
///
/// # Example
/// ```rust
/// use slms_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// #[serde(default)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("server")).unwrap();
/// ```
pub fn load_config<T>(profile: Option<&str>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder =
        Config::builder().add_source(File::with_name("config/default").required(false));

    if let Some(profile) = profile {
        builder = builder
            .add_source(File::with_name(&format!("config/{profile}")).required(false));
    }

    builder = builder.add_source(File::with_name("config/local").required(false)).add_source(
        Environment::with_prefix("SLMS").separator("__").convert_case(config::Case::Snake),
    );

    info!(profile = profile.unwrap_or("default"), "Loading configuration");

    let config = builder
        .build()
        .context("Layering config sources failed")?
        .try_deserialize::<T>()
        .context("Config did not match the expected shape")?;

    Ok(config)
}
