//! Convenience re-exports for feature slices and server binaries.

pub use crate::config::{ConfigError, load_config};
pub use crate::domain::config::ApiConfig;
pub use crate::domain::registry::{FeatureSlice, InitializedSlice};
pub use crate::security::token::{Claims, TokenPair, TokenService};
pub use crate::security::{SecurityError, hash_password, verify_password};
pub use crate::server::extract::AuthUser;
pub use crate::server::page::{Page, PageParams};
pub use crate::server::problem::Problem;
pub use crate::server::state::{ApiState, ApiStateBuilder, ApiStateError};
pub use crate::server::throttle::Throttle;
