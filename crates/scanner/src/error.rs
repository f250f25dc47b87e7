use std::borrow::Cow;
use tweaker_events::HandlerError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by a scan.
#[tweaker_derive::tweaker_error]
pub enum ScanError {
    /// A processor failed to turn a match into a result.
    #[error("Processor failed{}: {source}", format_context(.context))]
    Processor { source: BoxError, context: Option<Cow<'static, str>> },

    /// A consumer rejected a result while it was being forwarded.
    #[error("Result handler failed{}: {source}", format_context(.context))]
    Handler { source: HandlerError, context: Option<Cow<'static, str>> },

    /// A scan filter pattern does not compile.
    #[error("Invalid filter pattern{}: {source}", format_context(.context))]
    InvalidPattern { source: regex::Error, context: Option<Cow<'static, str>> },

    #[error("Internal scanner error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ScanError {
    pub(crate) fn processor(err: impl Into<BoxError>, context: String) -> Self {
        Self::Processor { source: err.into(), context: Some(Cow::Owned(context)) }
    }
}
