use super::health;
use super::state::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// OpenAPI tag for the endpoints living outside the versioned API prefix.
pub const SYSTEM_TAG: &str = "system";

/// Router for the unversioned system surface, currently just `/health`.
///
/// Mounted at the application root so probes reach it without the API
/// prefix and without passing the request throttle.
#[must_use]
pub fn system_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(health::health_handler))
}
