use crate::error::ScanError;
use bitflags::bitflags;
use regex::Regex;
use std::any::TypeId;
use tweaker_reflect::{Binding, MemberInfo, TypeInfo};

bitflags! {
    /// Which visibilities a filter accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct Scope: u8 {
        const PUBLIC = 1 << 0;
        const NON_PUBLIC = 1 << 1;
        const ALL = Self::PUBLIC.bits() | Self::NON_PUBLIC.bits();
    }
}

bitflags! {
    /// Which bindings (static or per instance) a filter accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct BindingFilter: u8 {
        const STATIC = 1 << 0;
        const INSTANCE = 1 << 1;
        const ALL = Self::STATIC.bits() | Self::INSTANCE.bits();
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::ALL
    }
}

impl Default for BindingFilter {
    fn default() -> Self {
        Self::ALL
    }
}

impl Scope {
    #[must_use]
    pub const fn admits(self, public: bool) -> bool {
        if public { self.contains(Self::PUBLIC) } else { self.contains(Self::NON_PUBLIC) }
    }
}

impl BindingFilter {
    #[must_use]
    pub const fn admits(self, binding: Binding) -> bool {
        match binding {
            Binding::Static => self.contains(Self::STATIC),
            Binding::Instance => self.contains(Self::INSTANCE),
        }
    }
}

/// Filters applied while walking modules, types and members.
///
/// Every predicate is optional and all present predicates must match. The default
/// value matches everything.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    module: Option<Regex>,
    type_name: Option<Regex>,
    types: Vec<TypeId>,
    member: Option<Regex>,
    scope: Scope,
    binding: BindingFilter,
    isolate_failures: bool,
}

impl ScanOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only modules whose name matches `pattern`.
    pub fn with_module_pattern(mut self, pattern: &str) -> Result<Self, ScanError> {
        self.module = Some(compile(pattern)?);
        Ok(self)
    }

    /// Only types whose short or full name matches `pattern`.
    pub fn with_type_pattern(mut self, pattern: &str) -> Result<Self, ScanError> {
        self.type_name = Some(compile(pattern)?);
        Ok(self)
    }

    /// Only members whose name matches `pattern`.
    pub fn with_member_pattern(mut self, pattern: &str) -> Result<Self, ScanError> {
        self.member = Some(compile(pattern)?);
        Ok(self)
    }

    /// Adds `T` to the type allow-list. Once the list is non-empty, other types are skipped.
    #[must_use]
    pub fn allow_type<T: ?Sized + 'static>(mut self) -> Self {
        self.types.push(TypeId::of::<T>());
        self
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

    /// Log and skip failing dispatches instead of aborting the scan.
    #[must_use]
    pub const fn isolate_failures(mut self, isolate: bool) -> Self {
        self.isolate_failures = isolate;
        self
    }

    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    #[must_use]
    pub const fn binding(&self) -> BindingFilter {
        self.binding
    }

    #[must_use]
    pub const fn isolates_failures(&self) -> bool {
        self.isolate_failures
    }

    #[must_use]
    pub fn matches_module(&self, name: &str) -> bool {
        self.module.as_ref().is_none_or(|re| re.is_match(name))
    }

    /// Module, type name and allow-list predicates.
    #[must_use]
    pub fn matches_type(&self, ty: &TypeInfo) -> bool {
        self.matches_module(ty.module())
            && self.type_name.as_ref().is_none_or(|re| re.is_match(ty.name()) || re.is_match(ty.full_name()))
            && (self.types.is_empty() || self.types.contains(&ty.type_id()))
    }

    /// Member name, scope and binding predicates.
    #[must_use]
    pub fn matches_member(&self, member: &MemberInfo) -> bool {
        self.member.as_ref().is_none_or(|re| re.is_match(member.name()))
            && self.scope.admits(member.is_public())
            && self.binding.admits(member.binding())
    }
}

fn compile(pattern: &str) -> Result<Regex, ScanError> {
    Regex::new(pattern).map_err(|source| ScanError::InvalidPattern {
        source,
        context: Some(format!("pattern '{pattern}'").into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_follows_flags() {
        assert!(Scope::ALL.admits(true) && Scope::ALL.admits(false));
        assert!(!Scope::PUBLIC.admits(false));
        assert!(BindingFilter::STATIC.admits(Binding::Static));
        assert!(!BindingFilter::STATIC.admits(Binding::Instance));
    }

    #[test]
    fn invalid_patterns_are_reported() {
        let err = ScanOptions::new().with_member_pattern("(unclosed").unwrap_err();
        assert_eq!(err.kind(), "invalid_pattern");
        assert!(err.to_string().contains("(unclosed"));
    }
}
