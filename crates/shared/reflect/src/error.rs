use crate::value::ValueKind;
use std::borrow::Cow;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised while calling through an erased member accessor.
#[tweaker_derive::tweaker_error]
pub enum CallError {
    #[error("Argument count mismatch{}: expected {expected}, got {actual}", format_context(.context))]
    ArgumentCount { expected: usize, actual: usize, context: Option<Cow<'static, str>> },

    #[error("Argument #{index} has the wrong type{}: expected {expected}, got {actual}", format_context(.context))]
    ArgumentType {
        index: usize,
        expected: ValueKind,
        actual: ValueKind,
        context: Option<Cow<'static, str>>,
    },

    #[error("Instance member called without an instance{}", format_context(.context))]
    MissingInstance { context: Option<Cow<'static, str>> },

    #[error("Instance is not a '{expected}'{}", format_context(.context))]
    InstanceType { expected: &'static str, context: Option<Cow<'static, str>> },

    #[error("Bound instance #{id} no longer exists{}", format_context(.context))]
    DeadInstance { id: u64, context: Option<Cow<'static, str>> },

    #[error("Unsupported operation{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Call target failed{}: {source}", format_context(.context))]
    Target { source: BoxError, context: Option<Cow<'static, str>> },

    #[error("Internal call error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CallError {
    /// Wraps a failure reported by the called code itself.
    pub fn target(err: impl Into<BoxError>) -> Self {
        Self::Target { source: err.into(), context: None }
    }

    pub(crate) const fn argument_type(index: usize, expected: ValueKind, actual: ValueKind) -> Self {
        Self::ArgumentType { index, expected, actual, context: None }
    }
}
