//! Request extractors shared by every feature slice.

use crate::server::problem::Problem;
use crate::server::state::ApiState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The authenticated caller, proven by a bearer access token.
///
/// Handlers take `AuthUser` as an argument to require authentication; the
/// extractor rejects with `401` before the handler body runs. Refresh tokens
/// are not accepted here.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl FromRequestParts<ApiState> for AuthUser {
    type Rejection = Problem;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Problem::unauthorized("missing bearer token"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Problem::unauthorized("missing bearer token"))?;

        let claims = state.tokens.verify_access(token).map_err(|err| {
            tracing::debug!(error = %err, "Access token rejected");
            Problem::unauthorized("invalid or expired access token")
        })?;

        Ok(Self { id: claims.sub, username: claims.username })
    }
}
