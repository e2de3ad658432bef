use axum::{Router, middleware};
use slms::kernel::prelude::ApiState;
use slms::kernel::server::throttle_middleware;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SimpleLMS API",
        description = "Course catalog, enrollment and discussion service",
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

/// Registers the `bearer` scheme the slice routes reference in their
/// `security(...)` attributes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();

    // Throttle the public API only; /health and /static stay exempt.
    let throttled_api = slms::api_router()
        .layer(middleware::from_fn_with_state(state.clone(), throttle_middleware));

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(slms::server::router::system_router())
        .nest("/api/v2", throttled_api)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone())
        .split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    // Merge all routes and then apply the state to the final router
    Router::new()
        .merge(openapi_routes)
        .nest_service("/static", ServeDir::new(&state.config.storage.static_dir))
        .merge(scalar_routes)
}
