//! Construction of domain objects from member metadata.
//!
//! Both factories validate everything they can up front, so a domain object that
//! exists is callable as long as its bound instance lives.

use crate::error::TweakerError;
use crate::invokable::{Invokable, Target};
use crate::markers::{InvokableMarker, NamedToggleValue, Range, StepSize, TweakableMarker};
use crate::object::ObjectInfo;
use crate::tweakable::Tweakable;
use std::borrow::Cow;
use tweaker_reflect::{
    Accessor, AnyMarker, BoundInstance, Getter, IntoMethod, MemberInfo, MethodFn, Parameter, Setter, Value,
    ValueKind, markers_of,
};

/// Module name given to objects registered by hand rather than by a scan.
pub const MANUAL_MODULE: &str = "manual";

/// Builds [`Invokable`]s from methods, events and plain closures.
#[derive(Debug, Clone, Copy)]
pub struct InvokableFactory;

impl InvokableFactory {
    /// Wraps a method or event member.
    ///
    /// Instance members need `instance`, static members must not get one. Events need
    /// backing storage.
    pub fn from_member(
        marker: &InvokableMarker,
        member: &MemberInfo,
        instance: Option<&BoundInstance>,
    ) -> Result<Invokable, TweakerError> {
        check_binding(member, instance)?;
        let info = ObjectInfo::new(&marker.name, member.is_public(), member.module(), instance.cloned())
            .with_description(marker.description.clone());

        match member.accessor() {
            Accessor::Method(method) => Ok(Invokable::new(
                info,
                Target::Call(MethodFn::clone(&method.call)),
                method.parameters.clone(),
                method.returns,
                method.return_description.as_deref().map(str::to_owned),
            )),
            Accessor::Event(event) => {
                let storage = event.storage.clone().ok_or_else(|| {
                    TweakerError::processor(member.qualified_name(), "could not find the backing storage of the event")
                })?;
                Ok(Invokable::new(info, Target::Event(storage), event.parameters.clone(), event.returns, None))
            },
            Accessor::Field(_) | Accessor::Property(_) => Err(TweakerError::processor(
                member.qualified_name(),
                format!("a {:?} cannot be invoked", member.kind()),
            )),
        }
    }

    /// Wraps a closure. A bound `instance` only gates the call: once it is dropped the
    /// invokable reports itself invalid.
    pub fn from_delegate<M, F>(
        name: impl Into<Cow<'static, str>>,
        handler: F,
        instance: Option<BoundInstance>,
    ) -> Invokable
    where
        F: IntoMethod<M>,
    {
        let name = name.into();
        let parameters = F::parameter_kinds()
            .into_iter()
            .enumerate()
            .map(|(index, kind)| Parameter { name: Cow::Owned(format!("arg{index}")), kind, description: None })
            .collect();
        let info = ObjectInfo::new(&name, true, MANUAL_MODULE, instance);
        Invokable::new(info, Target::Call(handler.into_call()), parameters, F::return_kind(), None)
    }
}

/// Builds [`Tweakable`]s from fields, properties and explicit accessor pairs.
#[derive(Debug, Clone, Copy)]
pub struct TweakableFactory;

impl TweakableFactory {
    /// Wraps a field or property member.
    ///
    /// Constraint markers ([`Range`], [`StepSize`], [`NamedToggleValue`]) are read from
    /// `container` when given, otherwise from `member` itself.
    pub fn from_member(
        marker: &TweakableMarker,
        member: &MemberInfo,
        instance: Option<&BoundInstance>,
        container: Option<&MemberInfo>,
    ) -> Result<Tweakable, TweakerError> {
        check_binding(member, instance)?;
        let info = ObjectInfo::new(&marker.name, member.is_public(), member.module(), instance.cloned())
            .with_description(marker.description.clone());
        let constraints = container.unwrap_or(member).markers();

        match member.accessor() {
            Accessor::Field(field) => {
                let getter = Getter { kind: field.kind, get: field.get.clone() };
                let setter = Setter { kind: field.kind, set: field.set.clone() };
                Self::from_accessors(info, field.kind, Some(getter), Some(setter), constraints)
            },
            Accessor::Property(property) => Self::from_accessors(
                info,
                property.kind,
                property.getter.clone(),
                property.setter.clone(),
                constraints,
            ),
            Accessor::Method(_) | Accessor::Event(_) => Err(TweakerError::processor(
                member.qualified_name(),
                format!("a {:?} cannot be tweaked", member.kind()),
            )),
        }
    }

    /// Assembles a tweakable of `kind` from erased accessors.
    ///
    /// Both accessors must exist and speak exactly `kind`. Constraint values must be of
    /// `kind` too, ranges need an ordered kind and step sizes a steppable one.
    pub fn from_accessors(
        info: ObjectInfo,
        kind: ValueKind,
        getter: Option<Getter>,
        setter: Option<Setter>,
        constraints: &[AnyMarker],
    ) -> Result<Tweakable, TweakerError> {
        let name = info.name().to_owned();
        let getter = getter.ok_or_else(|| TweakerError::get(&name, "no getter"))?;
        if getter.kind != kind {
            return Err(TweakerError::get(&name, format!("getter returns {}, expected {kind}", getter.kind)));
        }
        let setter = setter.ok_or_else(|| TweakerError::set(&name, kind, "no setter"))?;
        if setter.kind != kind {
            return Err(TweakerError::set(&name, kind, format!("setter takes {}, expected {kind}", setter.kind)));
        }

        let mut tweakable = Tweakable::new(info, kind, getter.get, setter.set);

        if let Some(range) = single::<Range>(&name, constraints)? {
            expect_kind(&name, kind, &range.min)?;
            expect_kind(&name, kind, &range.max)?;
            if !kind.is_ordered() {
                return Err(TweakerError::processor(&name, format!("{kind} values cannot be range-limited")));
            }
            if range.min.ordinal_cmp(&range.max).is_none_or(|order| order.is_gt()) {
                return Err(TweakerError::processor(&name, format!("empty range {}..={}", range.min, range.max)));
            }
            tweakable = tweakable.with_range(range.clone());
        }

        if let Some(step) = single::<StepSize>(&name, constraints)? {
            expect_kind(&name, kind, &step.size)?;
            if !kind.is_steppable() {
                return Err(TweakerError::processor(&name, format!("{kind} values cannot be stepped")));
            }
            tweakable = tweakable.with_step(step.size.clone());
        }

        let mut toggles: Vec<NamedToggleValue> = markers_of::<NamedToggleValue>(constraints).cloned().collect();
        if !toggles.is_empty() {
            for toggle in &toggles {
                expect_kind(&name, kind, &toggle.value)?;
            }
            toggles.sort_by_key(|toggle| toggle.order);
            tweakable = tweakable.with_toggle(toggles);
        }

        Ok(tweakable)
    }
}

fn check_binding(member: &MemberInfo, instance: Option<&BoundInstance>) -> Result<(), TweakerError> {
    match (member.is_static(), instance) {
        (true, Some(bound)) => Err(TweakerError::processor(
            member.qualified_name(),
            format!("static member cannot be bound to instance #{}", bound.id()),
        )),
        (false, None) => Err(TweakerError::processor(member.qualified_name(), "instance member needs a bound instance")),
        _ => Ok(()),
    }
}

/// At most one marker of type `M`.
fn single<'a, M: tweaker_reflect::Marker>(
    name: &str,
    markers: &'a [AnyMarker],
) -> Result<Option<&'a M>, TweakerError> {
    let mut found = markers_of::<M>(markers);
    let first = found.next();
    if found.next().is_some() {
        let marker = std::any::type_name::<M>().rsplit("::").next().unwrap_or_default();
        return Err(TweakerError::processor(name, format!("more than one {marker} marker")));
    }
    Ok(first)
}

fn expect_kind(name: &str, kind: ValueKind, value: &Value) -> Result<(), TweakerError> {
    if value.kind() == kind {
        Ok(())
    } else {
        Err(TweakerError::processor(name, format!("constraint value {value} is a {}, expected {kind}", value.kind())))
    }
}
