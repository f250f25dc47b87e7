//! Member metadata: methods, fields, properties and events with erased accessors.

use crate::error::CallError;
use crate::instance::{Instance, receiver};
use crate::marker::{AnyMarker, Marker};
use crate::method::{IntoInstanceMethod, IntoMethod, MethodFn};
use crate::multicast::Multicast;
use crate::types::TypeKey;
use crate::value::{TweakValue, Value, ValueKind};
use parking_lot::RwLock;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Reads a value through an optional receiver.
pub type GetFn = Arc<dyn Fn(Option<&Instance>) -> Result<Value, CallError> + Send + Sync>;
/// Writes a value through an optional receiver.
pub type SetFn = Arc<dyn Fn(Option<&Instance>, Value) -> Result<(), CallError> + Send + Sync>;
/// Resolves the backing storage of an event.
pub type StorageFn = Arc<dyn Fn(Option<&Instance>) -> Result<&Multicast, CallError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Field,
    Property,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    NonPublic,
}

impl Visibility {
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Static,
    Instance,
}

/// One positional parameter of a method or event.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Cow<'static, str>,
    pub kind: ValueKind,
    pub description: Option<Cow<'static, str>>,
}

#[derive(Clone)]
pub struct MethodAccessor {
    pub parameters: Vec<Parameter>,
    pub returns: ValueKind,
    pub return_description: Option<Cow<'static, str>>,
    pub call: MethodFn,
}

#[derive(Clone)]
pub struct FieldAccessor {
    pub kind: ValueKind,
    pub get: GetFn,
    pub set: SetFn,
}

#[derive(Clone)]
pub struct Getter {
    pub kind: ValueKind,
    pub get: GetFn,
}

#[derive(Clone)]
pub struct Setter {
    pub kind: ValueKind,
    pub set: SetFn,
}

#[derive(Clone)]
pub struct PropertyAccessor {
    pub kind: ValueKind,
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
}

#[derive(Clone)]
pub struct EventAccessor {
    pub parameters: Vec<Parameter>,
    pub returns: ValueKind,
    /// `None` models an event with custom add/remove logic and no backing list.
    pub storage: Option<StorageFn>,
}

#[derive(Clone)]
pub enum Accessor {
    Method(MethodAccessor),
    Field(FieldAccessor),
    Property(PropertyAccessor),
    Event(EventAccessor),
}

impl Accessor {
    #[must_use]
    pub const fn kind(&self) -> MemberKind {
        match self {
            Self::Method(_) => MemberKind::Method,
            Self::Field(_) => MemberKind::Field,
            Self::Property(_) => MemberKind::Property,
            Self::Event(_) => MemberKind::Event,
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(m) => f
                .debug_struct("Method")
                .field("parameters", &m.parameters)
                .field("returns", &m.returns)
                .finish_non_exhaustive(),
            Self::Field(a) => f.debug_struct("Field").field("kind", &a.kind).finish_non_exhaustive(),
            Self::Property(p) => f
                .debug_struct("Property")
                .field("kind", &p.kind)
                .field("getter", &p.getter.as_ref().map(|g| g.kind))
                .field("setter", &p.setter.as_ref().map(|s| s.kind))
                .finish(),
            Self::Event(e) => f
                .debug_struct("Event")
                .field("parameters", &e.parameters)
                .field("storage", &e.storage.is_some())
                .finish_non_exhaustive(),
        }
    }
}

macro_rules! debug_opaque {
    ($($ty:ident),*) => {$(
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty)).field("kind", &self.kind).finish_non_exhaustive()
            }
        }
    )*};
}

debug_opaque!(FieldAccessor, Getter, Setter, PropertyAccessor);

impl fmt::Debug for MethodAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Accessor::Method(self.clone()), f)
    }
}

impl fmt::Debug for EventAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Accessor::Event(self.clone()), f)
    }
}

/// Metadata of one member of a scannable type.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub(crate) name: Cow<'static, str>,
    pub(crate) visibility: Visibility,
    pub(crate) binding: Binding,
    pub(crate) declaring: TypeKey,
    pub(crate) module: Arc<str>,
    pub(crate) markers: Vec<AnyMarker>,
    pub(crate) accessor: Accessor,
}

impl MemberInfo {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> MemberKind {
        self.accessor.kind()
    }

    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    #[must_use]
    pub const fn binding(&self) -> Binding {
        self.binding
    }

    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self.binding, Binding::Static)
    }

    #[must_use]
    pub const fn declaring_type(&self) -> &TypeKey {
        &self.declaring
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn markers(&self) -> &[AnyMarker] {
        &self.markers
    }

    #[must_use]
    pub const fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// The value kind of a field or property, `None` for methods and events.
    #[must_use]
    pub const fn value_kind(&self) -> Option<ValueKind> {
        match &self.accessor {
            Accessor::Field(field) => Some(field.kind),
            Accessor::Property(property) => Some(property.kind),
            _ => None,
        }
    }

    /// `Declaring.member`, used in logs and processing keys.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring.name(), self.name)
    }

    pub(crate) fn set_module(&mut self, module: &Arc<str>) {
        self.module = Arc::clone(module);
    }
}

/// Builder for one member of `S`, attached with [`TypeBuilder::member`](crate::TypeBuilder::member).
///
/// Instance closures receive `&S`; static ones do not.
#[must_use = "attach the member with TypeBuilder::member"]
pub struct Member<S> {
    info: MemberInfo,
    _owner: PhantomData<fn() -> S>,
}

impl<S> fmt::Debug for Member<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Member").field(&self.info).finish()
    }
}

impl<S: Any + Send + Sync> Member<S> {
    fn with(name: impl Into<Cow<'static, str>>, binding: Binding, accessor: Accessor) -> Self {
        let info = MemberInfo {
            name: name.into(),
            visibility: Visibility::Public,
            binding,
            declaring: TypeKey::of::<S>(),
            module: Arc::from(crate::types::crate_of(std::any::type_name::<S>())),
            markers: Vec::new(),
            accessor,
        };
        Self { info, _owner: PhantomData }
    }

    /// An instance method: `|this: &S, a: A, ...| -> R`.
    pub fn method<M, F>(name: impl Into<Cow<'static, str>>, method: F) -> Self
    where
        F: IntoInstanceMethod<S, M>,
    {
        let accessor = MethodAccessor {
            parameters: unnamed(F::parameter_kinds()),
            returns: F::return_kind(),
            return_description: None,
            call: method.into_call(),
        };
        Self::with(name, Binding::Instance, Accessor::Method(accessor))
    }

    /// A static method: `|a: A, ...| -> R`.
    pub fn static_method<M, F>(name: impl Into<Cow<'static, str>>, method: F) -> Self
    where
        F: IntoMethod<M>,
    {
        let accessor = MethodAccessor {
            parameters: unnamed(F::parameter_kinds()),
            returns: F::return_kind(),
            return_description: None,
            call: method.into_call(),
        };
        Self::with(name, Binding::Static, Accessor::Method(accessor))
    }

    /// An instance field stored in a lock inside `S`.
    pub fn field<T: TweakValue>(name: impl Into<Cow<'static, str>>, slot: fn(&S) -> &RwLock<T>) -> Self {
        let get = get_fn(move |target| Ok(slot(receiver::<S>(target)?).read().clone().into_value()));
        let set = set_fn(move |target, value| {
            let value = typed::<T>(value)?;
            *slot(receiver::<S>(target)?).write() = value;
            Ok(())
        });
        Self::with(name, Binding::Instance, Accessor::Field(FieldAccessor { kind: T::kind(), get, set }))
    }

    /// A static field.
    pub fn static_field<T: TweakValue>(name: impl Into<Cow<'static, str>>, slot: &'static RwLock<T>) -> Self {
        let get = get_fn(move |_| Ok(slot.read().clone().into_value()));
        let set = set_fn(move |_, value| {
            *slot.write() = typed::<T>(value)?;
            Ok(())
        });
        Self::with(name, Binding::Static, Accessor::Field(FieldAccessor { kind: T::kind(), get, set }))
    }

    /// A read/write instance property.
    pub fn property<T, G, W>(name: impl Into<Cow<'static, str>>, get: G, set: W) -> Self
    where
        T: TweakValue,
        G: Fn(&S) -> T + Send + Sync + 'static,
        W: Fn(&S, T) + Send + Sync + 'static,
    {
        let getter = instance_getter(get);
        let setter = Setter {
            kind: T::kind(),
            set: set_fn(move |target, value| {
                let value = typed::<T>(value)?;
                set(receiver::<S>(target)?, value);
                Ok(())
            }),
        };
        Self::raw_property(name, Binding::Instance, T::kind(), Some(getter), Some(setter))
    }

    /// An instance property without a setter.
    pub fn readonly_property<T, G>(name: impl Into<Cow<'static, str>>, get: G) -> Self
    where
        T: TweakValue,
        G: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self::raw_property(name, Binding::Instance, T::kind(), Some(instance_getter(get)), None)
    }

    /// A read/write static property.
    pub fn static_property<T, G, W>(name: impl Into<Cow<'static, str>>, get: G, set: W) -> Self
    where
        T: TweakValue,
        G: Fn() -> T + Send + Sync + 'static,
        W: Fn(T) + Send + Sync + 'static,
    {
        let getter = Getter { kind: T::kind(), get: get_fn(move |_| Ok(get().into_value())) };
        let setter = Setter {
            kind: T::kind(),
            set: set_fn(move |_, value| {
                set(typed::<T>(value)?);
                Ok(())
            }),
        };
        Self::raw_property(name, Binding::Static, T::kind(), Some(getter), Some(setter))
    }

    /// A property assembled from pre-erased accessors. The declared kind and the
    /// accessor kinds are not required to agree here; consumers validate them.
    pub fn raw_property(
        name: impl Into<Cow<'static, str>>,
        binding: Binding,
        kind: ValueKind,
        getter: Option<Getter>,
        setter: Option<Setter>,
    ) -> Self {
        Self::with(name, binding, Accessor::Property(PropertyAccessor { kind, getter, setter }))
    }

    /// An instance event backed by a [`Multicast`] inside `S`.
    pub fn event(name: impl Into<Cow<'static, str>>, storage: fn(&S) -> &Multicast) -> Self {
        let storage = storage_fn(move |target| Ok(storage(receiver::<S>(target)?)));
        Self::event_with(name, Binding::Instance, Some(storage))
    }

    /// A static event backed by a static [`Multicast`].
    pub fn static_event(name: impl Into<Cow<'static, str>>, storage: &'static Multicast) -> Self {
        let storage = storage_fn(move |_| Ok(storage));
        Self::event_with(name, Binding::Static, Some(storage))
    }

    /// An event whose handlers live somewhere the metadata cannot reach.
    pub fn event_without_storage(name: impl Into<Cow<'static, str>>, binding: Binding) -> Self {
        Self::event_with(name, binding, None)
    }

    fn event_with(name: impl Into<Cow<'static, str>>, binding: Binding, storage: Option<StorageFn>) -> Self {
        Self::with(
            name,
            binding,
            Accessor::Event(EventAccessor { parameters: Vec::new(), returns: ValueKind::Unit, storage }),
        )
    }

    pub fn marker<M: Marker>(mut self, marker: M) -> Self {
        self.info.markers.push(AnyMarker::new(marker));
        self
    }

    pub fn non_public(mut self) -> Self {
        self.info.visibility = Visibility::NonPublic;
        self
    }

    /// Declares an event parameter. Method parameters come from the closure signature.
    pub fn parameter(mut self, name: impl Into<Cow<'static, str>>, kind: ValueKind) -> Self {
        if let Accessor::Event(event) = &mut self.info.accessor {
            event.parameters.push(Parameter { name: name.into(), kind, description: None });
        }
        self
    }

    /// Declares the return kind of an event's handlers.
    pub fn returns(mut self, kind: ValueKind) -> Self {
        if let Accessor::Event(event) = &mut self.info.accessor {
            event.returns = kind;
        }
        self
    }

    /// Names the positional parameters of a method or event, in order.
    pub fn parameter_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Cow<'static, str>>,
    {
        if let Some(parameters) = self.parameters_mut() {
            for (parameter, name) in parameters.iter_mut().zip(names) {
                parameter.name = name.into();
            }
        }
        self
    }

    /// Describes the parameter at `index`. Out of range indices are ignored.
    pub fn arg_description(mut self, index: usize, description: impl Into<Cow<'static, str>>) -> Self {
        if let Some(parameter) = self.parameters_mut().and_then(|p| p.get_mut(index)) {
            parameter.description = Some(description.into());
        }
        self
    }

    pub fn return_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        if let Accessor::Method(method) = &mut self.info.accessor {
            method.return_description = Some(description.into());
        }
        self
    }

    fn parameters_mut(&mut self) -> Option<&mut Vec<Parameter>> {
        match &mut self.info.accessor {
            Accessor::Method(method) => Some(&mut method.parameters),
            Accessor::Event(event) => Some(&mut event.parameters),
            _ => None,
        }
    }

    pub(crate) fn into_info(self) -> MemberInfo {
        self.info
    }
}

fn unnamed(kinds: Vec<ValueKind>) -> Vec<Parameter> {
    kinds
        .into_iter()
        .enumerate()
        .map(|(index, kind)| Parameter { name: Cow::Owned(format!("arg{index}")), kind, description: None })
        .collect()
}

fn instance_getter<S, T, G>(get: G) -> Getter
where
    S: Any + Send + Sync,
    T: TweakValue,
    G: Fn(&S) -> T + Send + Sync + 'static,
{
    Getter {
        kind: T::kind(),
        get: get_fn(move |target| Ok(get(receiver::<S>(target)?).into_value())),
    }
}

/// Erases a getter closure.
pub fn get_fn<F>(get: F) -> GetFn
where
    F: Fn(Option<&Instance>) -> Result<Value, CallError> + Send + Sync + 'static,
{
    Arc::new(get)
}

/// Erases a setter closure.
pub fn set_fn<F>(set: F) -> SetFn
where
    F: Fn(Option<&Instance>, Value) -> Result<(), CallError> + Send + Sync + 'static,
{
    Arc::new(set)
}

fn storage_fn<F>(storage: F) -> StorageFn
where
    F: for<'a> Fn(Option<&'a Instance>) -> Result<&'a Multicast, CallError> + Send + Sync + 'static,
{
    Arc::new(storage)
}

fn typed<T: TweakValue>(value: Value) -> Result<T, CallError> {
    T::from_value(value).map_err(|rejected| CallError::argument_type(0, T::kind(), rejected.kind()))
}

impl Getter {
    /// A getter from a typed closure that ignores the receiver.
    pub fn from_fn<T: TweakValue>(get: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self { kind: T::kind(), get: get_fn(move |_| Ok(get().into_value())) }
    }
}

impl Setter {
    /// A setter from a typed closure that ignores the receiver.
    pub fn from_fn<T: TweakValue>(set: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            kind: T::kind(),
            set: set_fn(move |_, value| {
                set(typed::<T>(value)?);
                Ok(())
            }),
        }
    }
}
