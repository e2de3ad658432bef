use slms_database::DatabaseError;
use slms_kernel::server::Problem;
use std::borrow::Cow;

/// A specialized [`CommentsError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum CommentsError {
    /// The content does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The caller is not a member of the course owning the content.
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
    #[error("Internal comments error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl CommentsError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::NotFound { context, .. }
            | Self::Forbidden { context, .. }
            | Self::Database { context, .. }
            | Self::Internal { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<DatabaseError> for CommentsError {
    fn from(source: DatabaseError) -> Self {
        Self::Database { source, context: None }
    }
}

impl From<&'static str> for CommentsError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for CommentsError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<CommentsError> for Problem {
    fn from(err: CommentsError) -> Self {
        match err {
            CommentsError::NotFound { message, .. } => Self::not_found(message),
            CommentsError::Forbidden { message, .. } => Self::forbidden(message),
            err @ (CommentsError::Database { .. } | CommentsError::Internal { .. }) => {
                tracing::error!(error = %err, "Comments operation failed");
                Self::internal("internal server error")
            },
        }
    }
}

/// Adds `.context(...)` to results whose error converts into
/// [`CommentsError`].
pub trait CommentsErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CommentsError>;
}

impl<T, E: Into<CommentsError>> CommentsErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, CommentsError> {
        self.map_err(|err| {
            let mut err: CommentsError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
