use std::borrow::Cow;
use tweaker_reflect::{BoxError, CallError};
use tweaker_scanner::ScanError;

/// Failures surfaced by domain objects, factories and registries.
#[tweaker_derive::tweaker_error]
pub enum TweakerError {
    #[error("The name '{name}' is already in use{}", format_context(.context))]
    NameAlreadyRegistered { name: String, context: Option<Cow<'static, str>> },

    #[error("Instance #{id} is already registered as '{existing}'{}", format_context(.context))]
    InstanceAlreadyRegistered { id: u64, existing: String, context: Option<Cow<'static, str>> },

    #[error("The name '{name}' is not currently in use{}", format_context(.context))]
    NotFound { name: String, context: Option<Cow<'static, str>> },

    /// The bound instance of the object has been dropped.
    #[error("'{name}' refers to an instance that no longer exists{}", format_context(.context))]
    ObjectInvalid { name: String, context: Option<Cow<'static, str>> },

    #[error("Invoking '{name}' failed{}: {source}", format_context(.context))]
    Invoke { name: String, source: CallError, context: Option<Cow<'static, str>> },

    #[error("Getting '{name}' failed{}: {message}", format_context(.context))]
    TweakableGet { name: String, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Setting '{name}' to {value} failed{}: {message}", format_context(.context))]
    TweakableSet {
        name: String,
        value: String,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A marker could not be turned into a domain object.
    #[error("Processing '{member}' failed{}: {source}", format_context(.context))]
    Processor { member: String, source: BoxError, context: Option<Cow<'static, str>> },

    #[error("Scan failed{}: {source}", format_context(.context))]
    Scan { source: ScanError, context: Option<Cow<'static, str>> },

    #[error("Invalid search pattern{}: {source}", format_context(.context))]
    InvalidPattern { source: regex::Error, context: Option<Cow<'static, str>> },

    #[error("Internal tweaker error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl TweakerError {
    pub(crate) fn get(name: &str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::TweakableGet { name: name.to_owned(), message: message.into(), context: None }
    }

    pub(crate) fn set(name: &str, value: impl ToString, message: impl Into<Cow<'static, str>>) -> Self {
        Self::TweakableSet { name: name.to_owned(), value: value.to_string(), message: message.into(), context: None }
    }

    pub(crate) fn processor(member: impl Into<String>, err: impl Into<BoxError>) -> Self {
        Self::Processor { member: member.into(), source: err.into(), context: None }
    }

    pub(crate) fn invalid(name: &str) -> Self {
        Self::ObjectInvalid { name: name.to_owned(), context: None }
    }
}
