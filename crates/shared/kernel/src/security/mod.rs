//! Security primitives shared by slices: password hashing and token signing.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenPair, TokenService};

use std::borrow::Cow;

/// A specialized [`SecurityError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum SecurityError {
    /// Password hashing or encoded-hash parsing failures.
    #[error("Password hash error{}: {message}", format_context(.context))]
    Hash { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Token signing, parsing, or claim validation failures.
    #[error("Token error{}: {message}", format_context(.context))]
    Token { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal security error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl SecurityError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::Hash { context, .. }
            | Self::Token { context, .. }
            | Self::Internal { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<&'static str> for SecurityError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for SecurityError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

/// Adds `.context(...)` to results whose error converts into [`SecurityError`].
pub trait SecurityErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SecurityError>;
}

impl<T, E: Into<SecurityError>> SecurityErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, SecurityError> {
        self.map_err(|err| {
            let mut err: SecurityError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
