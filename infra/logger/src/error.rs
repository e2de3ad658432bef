use std::borrow::Cow;

/// Errors that can occur during logger initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Failure when configuring the rolling file appender (e.g., invalid path).
    #[error("Rolling file appender error{}: {source}", format_context(.context))]
    Appender { source: tracing_appender::rolling::InitError, context: Option<Cow<'static, str>> },

    /// Occurs if a global tracing subscriber has already been initialized in the current process.
    #[error("Tracing subscriber error{}: {source}", format_context(.context))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal logic errors.
    #[error("Internal logger error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Invalid configuration supplied to the logger builder.
    #[error("Invalid logger configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl LoggerError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::Appender { context, .. }
            | Self::Subscriber { context, .. }
            | Self::Internal { context, .. }
            | Self::InvalidConfiguration { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<tracing_appender::rolling::InitError> for LoggerError {
    fn from(source: tracing_appender::rolling::InitError) -> Self {
        Self::Appender { source, context: None }
    }
}

impl From<tracing_subscriber::util::TryInitError> for LoggerError {
    fn from(source: tracing_subscriber::util::TryInitError) -> Self {
        Self::Subscriber { source, context: None }
    }
}

impl From<&'static str> for LoggerError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for LoggerError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

/// Adds `.context(...)` to results whose error converts into [`LoggerError`].
pub trait LoggerErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, LoggerError>;
}

impl<T, E: Into<LoggerError>> LoggerErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, LoggerError> {
        self.map_err(|err| {
            let mut err: LoggerError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
