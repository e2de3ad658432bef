use slms_database::DatabaseError;
use slms_kernel::server::Problem;
use std::borrow::Cow;

/// A specialized [`CatalogError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Input rejected before touching storage.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The course or content does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The caller lacks the course role the operation requires.
    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for storage-layer errors.
    #[error("Database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl CatalogError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::Validation { context, .. }
            | Self::NotFound { context, .. }
            | Self::Forbidden { context, .. }
            | Self::Database { context, .. }
            | Self::Internal { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<DatabaseError> for CatalogError {
    fn from(source: DatabaseError) -> Self {
        Self::Database { source, context: None }
    }
}

impl From<&'static str> for CatalogError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for CatalogError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<CatalogError> for Problem {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation { message, .. } => Self::bad_request(message),
            CatalogError::NotFound { message, .. } => Self::not_found(message),
            CatalogError::Forbidden { message, .. } => Self::forbidden(message),
            err @ (CatalogError::Database { .. } | CatalogError::Internal { .. }) => {
                tracing::error!(error = %err, "Catalog operation failed");
                Self::internal("internal server error")
            },
        }
    }
}

/// Adds `.context(...)` to results whose error converts into [`CatalogError`].
pub trait CatalogErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CatalogError>;
}

impl<T, E: Into<CatalogError>> CatalogErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CatalogError> {
        self.map_err(|err| {
            let mut err: CatalogError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
