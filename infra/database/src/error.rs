use std::borrow::Cow;

/// A specialized [`DatabaseError`] enum of this crate.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Validation errors.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when connectivity or health checks fail.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when authentication fails.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// Migration failures or invariant violations.
    #[error("Migration error{}: {message}", format_context(.context))]
    Migration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl DatabaseError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::Validation { context, .. }
            | Self::Connection { context, .. }
            | Self::Auth { context, .. }
            | Self::Surreal { context, .. }
            | Self::Migration { context, .. }
            | Self::Internal { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<surrealdb::Error> for DatabaseError {
    fn from(source: surrealdb::Error) -> Self {
        Self::Surreal { source, context: None }
    }
}

impl From<&'static str> for DatabaseError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for DatabaseError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

/// Adds `.context(...)` to results whose error converts into [`DatabaseError`].
pub trait DatabaseErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DatabaseError>;
}

impl<T, E: Into<DatabaseError>> DatabaseErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, DatabaseError> {
        self.map_err(|err| {
            let mut err: DatabaseError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
