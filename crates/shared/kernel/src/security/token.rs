//! HS256 access/refresh token service.

use super::SecurityError;
use crate::safe_nanoid;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use slms_domain::config::JwtConfig;
use std::fmt;
use std::sync::Arc;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub username: String,
    /// Unique token id.
    pub jti: String,
    pub iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

/// An access/refresh pair issued at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

struct TokenServiceInner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: Option<String>,
    access_ttl: i64,
    refresh_ttl: i64,
}

/// Signs and verifies the API's bearer tokens.
///
/// Verification enforces signature, expiry (with configured leeway), issuer,
/// audience when configured, and the `token_type` discriminator so refresh
/// tokens cannot be replayed as access tokens.
#[derive(Clone)]
pub struct TokenService {
    inner: Arc<TokenServiceInner>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.inner.issuer)
            .field("audience", &self.inner.audience)
            .field("access_ttl", &self.inner.access_ttl)
            .field("refresh_ttl", &self.inner.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.clock_skew_seconds;
        validation.set_issuer(&[&config.issuer]);
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            inner: Arc::new(TokenServiceInner {
                encoding: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.secret.as_bytes()),
                validation,
                issuer: config.issuer.clone(),
                audience: config.audience.clone(),
                access_ttl: i64::try_from(config.access_ttl_seconds).unwrap_or(i64::MAX),
                refresh_ttl: i64::try_from(config.refresh_ttl_seconds).unwrap_or(i64::MAX),
            }),
        }
    }

    /// Issues a fresh access/refresh pair for a signed-in user.
    ///
    /// # Errors
    /// Returns [`SecurityError::Token`] if signing fails.
    pub fn issue_pair(&self, user_id: i64, username: &str) -> Result<TokenPair, SecurityError> {
        Ok(TokenPair {
            access: self.issue(user_id, username, TOKEN_TYPE_ACCESS, self.inner.access_ttl)?,
            refresh: self.issue(user_id, username, TOKEN_TYPE_REFRESH, self.inner.refresh_ttl)?,
        })
    }

    /// Issues a new access token, used by the refresh flow.
    ///
    /// # Errors
    /// Returns [`SecurityError::Token`] if signing fails.
    pub fn issue_access(&self, user_id: i64, username: &str) -> Result<String, SecurityError> {
        self.issue(user_id, username, TOKEN_TYPE_ACCESS, self.inner.access_ttl)
    }

    /// Verifies an access token and returns its claims.
    ///
    /// # Errors
    /// Returns [`SecurityError::Token`] for invalid signatures, expired or
    /// not-yet-valid tokens, issuer/audience mismatches, and refresh tokens
    /// presented as access tokens.
    pub fn verify_access(&self, token: &str) -> Result<Claims, SecurityError> {
        self.verify(token, TOKEN_TYPE_ACCESS)
    }

    /// Verifies a refresh token and returns its claims.
    ///
    /// # Errors
    /// Same conditions as [`TokenService::verify_access`], with the type
    /// check inverted.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, SecurityError> {
        self.verify(token, TOKEN_TYPE_REFRESH)
    }

    fn issue(
        &self,
        user_id: i64,
        username: &str,
        token_type: &str,
        ttl: i64,
    ) -> Result<String, SecurityError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_owned(),
            jti: safe_nanoid!(),
            iss: self.inner.issuer.clone(),
            aud: self.inner.audience.clone(),
            iat: now,
            exp: now.saturating_add(ttl),
            token_type: token_type.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.inner.encoding).map_err(|e| {
            SecurityError::Token {
                message: e.to_string().into(),
                context: Some("Failed to encode token".into()),
            }
        })
    }

    fn verify(&self, token: &str, expected_type: &str) -> Result<Claims, SecurityError> {
        let data = decode::<Claims>(token, &self.inner.decoding, &self.inner.validation)
            .map_err(|e| SecurityError::Token { message: e.to_string().into(), context: None })?;

        if data.claims.token_type != expected_type {
            return Err(SecurityError::Token {
                message: format!(
                    "Expected a {expected_type} token, got {}",
                    data.claims.token_type
                )
                .into(),
                context: None,
            });
        }

        Ok(data.claims)
    }
}
