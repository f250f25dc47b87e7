use std::borrow::Cow;

/// Boxed error type carried by subscribers that reject a result.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while fanning results out to subscribers.
#[tweaker_derive::tweaker_error]
pub enum HandlerError {
    /// A subscriber refused the published result.
    #[error("Result rejected{}: {source}", format_context(.context))]
    Rejected { source: BoxError, context: Option<Cow<'static, str>> },

    /// An internal dynamic cast failed.
    /// This indicates an invariant violation in the provider table.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues.
    #[error("Internal result handler error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl HandlerError {
    /// Wraps any error raised by a subscriber.
    pub fn rejected(err: impl Into<BoxError>) -> Self {
        Self::Rejected { source: err.into(), context: None }
    }
}
