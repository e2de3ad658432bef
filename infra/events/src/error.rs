use std::borrow::Cow;

/// Errors that can occur during event bus operations.
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    /// Occurs when an internal dynamic cast fails.
    /// This usually indicates an invariant violation in the type registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Capacity must be greater than zero for bounded channels.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal logic errors.
    #[error("Internal event bus error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

impl EventBusError {
    fn set_context(&mut self, ctx: Cow<'static, str>) {
        match self {
            Self::TypeMismatch { context, .. }
            | Self::InvalidCapacity { context, .. }
            | Self::Internal { context, .. } => *context = Some(ctx),
        }
    }
}

impl From<&'static str> for EventBusError {
    fn from(message: &'static str) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

impl From<String> for EventBusError {
    fn from(message: String) -> Self {
        Self::Internal { message: message.into(), context: None }
    }
}

/// Adds `.context(...)` to results whose error converts into [`EventBusError`].
pub trait EventBusErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EventBusError>;
}

impl<T, E: Into<EventBusError>> EventBusErrorExt<T> for Result<T, E> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, EventBusError> {
        self.map_err(|err| {
            let mut err: EventBusError = err.into();
            err.set_context(context.into());
            err
        })
    }
}
