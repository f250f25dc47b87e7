use crate::error::TweakerError;
use crate::object::{ObjectInfo, TweakerObject};
use std::fmt;
use tracing::trace;
use tweaker_reflect::{CallError, MethodFn, Parameter, StorageFn, Value, ValueKind};

/// What an invokable calls.
#[derive(Clone)]
pub(crate) enum Target {
    /// A method or delegate: one erased call.
    Call(MethodFn),
    /// An event: every handler of the backing multicast.
    Event(StorageFn),
}

/// A callable handle on a method, delegate or event.
pub struct Invokable {
    info: ObjectInfo,
    target: Target,
    parameters: Vec<Parameter>,
    returns: ValueKind,
    return_description: Option<String>,
}

impl Invokable {
    pub(crate) const fn new(
        info: ObjectInfo,
        target: Target,
        parameters: Vec<Parameter>,
        returns: ValueKind,
        return_description: Option<String>,
    ) -> Self {
        Self { info, target, parameters, returns, return_description }
    }

    /// Calls the target with positional `args`.
    ///
    /// Events call every subscribed handler in order and return the last result,
    /// or [`Value::Unit`] when nobody is subscribed.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, TweakerError> {
        let target = self.info.target()?;
        trace!(invokable = self.name(), args = args.len(), "Invoking");

        let result = match &self.target {
            Target::Call(call) => call(target.as_deref(), args),
            Target::Event(storage) => storage(target.as_deref()).and_then(|handlers| handlers.invoke(args)),
        };
        result.map_err(|source| self.failed(source))
    }

    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self.target, Target::Event(_))
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.info.description()
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn parameter_kinds(&self) -> Vec<ValueKind> {
        self.parameters.iter().map(|p| p.kind).collect()
    }

    /// One entry per parameter, empty when undescribed.
    #[must_use]
    pub fn arg_descriptions(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.description.as_deref().unwrap_or_default()).collect()
    }

    #[must_use]
    pub const fn return_kind(&self) -> ValueKind {
        self.returns
    }

    #[must_use]
    pub fn return_description(&self) -> &str {
        self.return_description.as_deref().unwrap_or_default()
    }

    fn failed(&self, source: CallError) -> TweakerError {
        match source {
            CallError::DeadInstance { .. } => TweakerError::invalid(self.name()),
            source => TweakerError::Invoke { name: self.name().to_owned(), source, context: None },
        }
    }
}

impl TweakerObject for Invokable {
    fn info(&self) -> &ObjectInfo {
        &self.info
    }
}

impl fmt::Debug for Invokable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invokable")
            .field("name", &self.name())
            .field("event", &self.is_event())
            .field("parameters", &self.parameter_kinds())
            .field("returns", &self.returns)
            .field("instance", &self.instance())
            .finish()
    }
}
