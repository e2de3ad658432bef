//! Facade crate for `SimpleLMS` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization
//! and routing. Keep this crate thin: it should compose other crates, not
//! implement business logic.
//!
//! ## Usage
//! - Call [`init`] to initialize every feature slice for the state builder.
//! - Call [`api_router`] for the merged feature router and mount it under
//!   the API prefix.

use slms_database::Database;
pub use slms_domain as domain;
use slms_domain::config::ApiConfig;
use slms_domain::registry::InitializedSlice;
use slms_event_bus::EventBus;
pub use slms_kernel as kernel;
use slms_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;

pub mod server {
    pub mod router {
        pub use slms_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use slms_catalog as catalog;
    pub use slms_comments as comments;
    pub use slms_enrollment as enrollment;
    pub use slms_identity as identity;

    /// Slices compiled into this build, in initialization order.
    pub const ENABLED: &[&str] = &["identity", "catalog", "enrollment", "comments"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initializes every feature slice against the shared database and bus.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error>> {
    Ok(vec![
        features::identity::init(config, database, events)?,
        features::catalog::init(config, database, events)?,
        features::enrollment::init(config, database, events)?,
        features::comments::init(config, database, events)?,
    ])
}

/// All feature routers merged into one API surface. The caller mounts the
/// result under its version prefix and applies middleware.
#[must_use]
pub fn api_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .merge(features::identity::router())
        .merge(features::catalog::router())
        .merge(features::enrollment::router())
        .merge(features::comments::router())
}

#[cfg(test)]
mod tests {
    use super::features;

    #[test]
    fn registry_knows_its_slices() {
        assert!(features::is_enabled("identity"));
        assert!(features::is_enabled("catalog"));
        assert!(features::is_enabled("enrollment"));
        assert!(features::is_enabled("comments"));
        assert!(!features::is_enabled("licensing"));
    }
}
