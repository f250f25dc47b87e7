use crate::error::TweakerError;
use crate::object::TweakerObject;
use regex::Regex;
use std::borrow::Cow;
use tweaker_reflect::Binding;
use tweaker_scanner::{BindingFilter, Scope};

/// Registry query filter. The default matches every object.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    name: Option<Regex>,
    module: Option<Regex>,
    scope: Scope,
    binding: BindingFilter,
}

impl SearchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only objects whose registration name matches `pattern`.
    pub fn with_name_pattern(mut self, pattern: &str) -> Result<Self, TweakerError> {
        self.name = Some(compile(pattern)?);
        Ok(self)
    }

    /// Only objects declared in a module whose name matches `pattern`.
    pub fn with_module_pattern(mut self, pattern: &str) -> Result<Self, TweakerError> {
        self.module = Some(compile(pattern)?);
        Ok(self)
    }

    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub const fn with_binding(mut self, binding: BindingFilter) -> Self {
        self.binding = binding;
        self
    }

    #[must_use]
    pub fn matches<O: TweakerObject + ?Sized>(&self, object: &O) -> bool {
        let binding = if object.instance().is_some() { Binding::Instance } else { Binding::Static };
        self.name.as_ref().is_none_or(|re| re.is_match(object.name()))
            && self.module.as_ref().is_none_or(|re| re.is_match(object.module()))
            && self.scope.admits(object.is_public())
            && self.binding.admits(binding)
    }
}

fn compile(pattern: &str) -> Result<Regex, TweakerError> {
    Regex::new(pattern).map_err(|source| TweakerError::InvalidPattern {
        source,
        context: Some(Cow::Owned(format!("pattern '{pattern}'"))),
    })
}
