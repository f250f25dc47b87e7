//! Declarative markers recognised by the built-in processors.
//!
//! Attach them with `Member::marker` / `TypeBuilder::marker`:
//!
//! ```rust
//! use tweaker_core::{InvokableMarker, Range, StepSize, TweakableMarker};
//! use tweaker_reflect::{Member, Scannable, TypeInfo};
//! use parking_lot::RwLock;
//!
//! static SPEED: RwLock<i32> = RwLock::new(10);
//!
//! struct Player;
//!
//! impl Scannable for Player {
//!     fn describe() -> TypeInfo {
//!         TypeInfo::builder::<Self>("Player")
//!             .member(
//!                 Member::static_field("speed", &SPEED)
//!                     .marker(TweakableMarker::new("player.speed"))
//!                     .marker(Range::new(0, 100))
//!                     .marker(StepSize::new(5)),
//!             )
//!             .member(
//!                 Member::static_method("respawn", || {})
//!                     .marker(InvokableMarker::new("player.respawn").with_description("Back to the start")),
//!             )
//!             .build()
//!     }
//! }
//! ```

use std::borrow::Cow;
use tweaker_reflect::Value;

/// Exposes a method or event (or, on a type, all its methods and events) as an Invokable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokableMarker {
    pub name: Cow<'static, str>,
    pub description: Option<Cow<'static, str>>,
}

impl InvokableMarker {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), description: None }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The marker a type-level marker implies for one of the type's members.
    #[must_use]
    pub fn for_member(&self, member: &str) -> Self {
        Self { name: Cow::Owned(format!("{}.{member}", self.name)), description: self.description.clone() }
    }
}

/// Exposes a field or property (or, on a type, all its fields and properties) as a Tweakable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakableMarker {
    pub name: Cow<'static, str>,
    pub description: Option<Cow<'static, str>>,
}

impl TweakableMarker {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), description: None }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn for_member(&self, member: &str) -> Self {
        Self { name: Cow::Owned(format!("{}.{member}", self.name)), description: self.description.clone() }
    }
}

/// Inclusive bounds every write is clamped into.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub min: Value,
    pub max: Value,
}

impl Range {
    #[must_use]
    pub fn new(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Self { min: min.into(), max: max.into() }
    }
}

/// Increment used by `step_next` / `step_previous`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSize {
    pub size: Value,
}

impl StepSize {
    #[must_use]
    pub fn new(size: impl Into<Value>) -> Self {
        Self { size: size.into() }
    }
}

/// One entry of a toggle cycle. Entries are sorted by `order`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedToggleValue {
    pub name: Cow<'static, str>,
    pub value: Value,
    pub order: u32,
}

impl NamedToggleValue {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<Value>, order: u32) -> Self {
        Self { name: name.into(), value: value.into(), order }
    }
}

/// Shorthand for a [`NamedToggleValue`] named after its value.
#[derive(Debug, Clone, Copy)]
pub struct ToggleValue;

impl ToggleValue {
    #[must_use]
    pub fn new(value: impl Into<Value>, order: u32) -> NamedToggleValue {
        let value = value.into();
        NamedToggleValue { name: Cow::Owned(value.to_string()), value, order }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_value_is_named_after_its_value() {
        let entry = ToggleValue::new(11, 2);
        assert_eq!(entry, NamedToggleValue::new("11", 11, 2));
    }

    #[test]
    fn member_markers_extend_the_type_name() {
        let marker = InvokableMarker::new("Audio").with_description("mixer");
        let derived = marker.for_member("mute");
        assert_eq!(derived.name, "Audio.mute");
        assert_eq!(derived.description.as_deref(), Some("mixer"));
        assert_eq!(TweakableMarker::new("Audio").for_member("volume").name, "Audio.volume");
    }
}
