use slms_database::DatabaseError;
use slms_kernel::security::SecurityError;
use slms_kernel::server::Problem;
use std::borrow::Cow;

/// A specialized [`IdentityError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Input rejected by the registration rules.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The username is already registered.
    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Unknown account, wrong password, inactive account, or a bad token.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The operation is disabled by policy.
    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for storage-layer errors.
    #[error("Database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// A wrapper for hashing and token-signing errors.
    #[error("Security error{}: {source}", format_context(.context))]
    Security {
        #[source]
        source: SecurityError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl IdentityError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::Validation { context, .. }
            | Self::Conflict { context, .. }
            | Self::Unauthorized { context, .. }
            | Self::Forbidden { context, .. }
            | Self::Database { context, .. }
            | Self::Security { context, .. }
            | Self::Internal { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<DatabaseError> for IdentityError {
    fn from(source: DatabaseError) -> Self {
        Self::Database { source, context: None }
    }
}

impl From<SecurityError> for IdentityError {
    fn from(source: SecurityError) -> Self {
        Self::Security { source, context: None }
    }
}

impl From<&'static str> for IdentityError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for IdentityError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

/// Maps slice errors onto problem responses at the handler boundary.
/// Internal variants are logged here and never leak details to clients.
impl From<IdentityError> for Problem {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Validation { message, .. } => Self::bad_request(message),
            IdentityError::Conflict { message, .. } => Self::conflict(message),
            IdentityError::Unauthorized { message, .. } => Self::unauthorized(message),
            IdentityError::Forbidden { message, .. } => Self::forbidden(message),
            err @ (IdentityError::Database { .. }
            | IdentityError::Security { .. }
            | IdentityError::Internal { .. }) => {
                tracing::error!(error = %err, "Identity operation failed");
                Self::internal("internal server error")
            },
        }
    }
}

/// Adds `.context(...)` to results whose error converts into [`IdentityError`].
pub trait IdentityErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IdentityError>;
}

impl<T, E: Into<IdentityError>> IdentityErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, IdentityError> {
        self.map_err(|err| {
            let mut err: IdentityError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
