use slms_database::DatabaseError;
use slms_kernel::server::Problem;
use std::borrow::Cow;

/// A specialized [`EnrollmentError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    /// The course does not exist.
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for storage-layer errors.
    #[error("Database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: DatabaseError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal enrollment error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl EnrollmentError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::NotFound { context, .. }
            | Self::Database { context, .. }
            | Self::Internal { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<DatabaseError> for EnrollmentError {
    fn from(source: DatabaseError) -> Self {
        Self::Database { source, context: None }
    }
}

impl From<&'static str> for EnrollmentError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for EnrollmentError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<EnrollmentError> for Problem {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::NotFound { message, .. } => Self::not_found(message),
            err @ (EnrollmentError::Database { .. } | EnrollmentError::Internal { .. }) => {
                tracing::error!(error = %err, "Enrollment operation failed");
                Self::internal("internal server error")
            },
        }
    }
}

/// Adds `.context(...)` to results whose error converts into
/// [`EnrollmentError`].
pub trait EnrollmentErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EnrollmentError>;
}

impl<T, E: Into<EnrollmentError>> EnrollmentErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EnrollmentError> {
        self.map_err(|err| {
            let mut err: EnrollmentError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
