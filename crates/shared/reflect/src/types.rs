use crate::marker::{AnyMarker, Marker};
use crate::member::{Member, MemberInfo};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Identity of a Rust type as seen by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    full_name: &'static str,
}

impl TypeKey {
    /// Key of `S`, named after the last path segment of its type name.
    #[must_use]
    pub fn of<S: ?Sized + Any>() -> Self {
        let full_name = std::any::type_name::<S>();
        Self { id: TypeId::of::<S>(), name: short_name(full_name), full_name }
    }

    #[must_use]
    pub fn named<S: ?Sized + Any>(name: &'static str) -> Self {
        Self { name, ..Self::of::<S>() }
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn full_name(&self) -> &'static str {
        self.full_name
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Metadata of one scannable type: its markers, declared bases and members.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    key: TypeKey,
    module: Arc<str>,
    bases: Vec<TypeKey>,
    markers: Vec<AnyMarker>,
    members: Vec<Arc<MemberInfo>>,
}

impl TypeInfo {
    /// Starts describing `S` under the display name `name`.
    pub fn builder<S: Any + Send + Sync>(name: &'static str) -> TypeBuilder<S> {
        let key = TypeKey::named::<S>(name);
        TypeBuilder {
            info: Self {
                key,
                module: Arc::from(crate_of(key.full_name)),
                bases: Vec::new(),
                markers: Vec::new(),
                members: Vec::new(),
            },
            _owner: PhantomData,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.key.name
    }

    #[must_use]
    pub const fn full_name(&self) -> &'static str {
        self.key.full_name
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.key.id
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn bases(&self) -> &[TypeKey] {
        &self.bases
    }

    /// Whether this type is `id` or declares it as a base.
    #[must_use]
    pub fn is_or_derives(&self, id: TypeId) -> bool {
        self.key.id == id || self.bases.iter().any(|base| base.id == id)
    }

    #[must_use]
    pub fn markers(&self) -> &[AnyMarker] {
        &self.markers
    }

    #[must_use]
    pub fn members(&self) -> &[Arc<MemberInfo>] {
        &self.members
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Arc<MemberInfo>> {
        self.members.iter().find(|member| member.name() == name)
    }

    pub(crate) fn assign_module(&mut self, module: &Arc<str>) {
        self.module = Arc::clone(module);
        for member in &mut self.members {
            Arc::make_mut(member).set_module(module);
        }
    }
}

/// Fluent description of a type `S`.
///
/// ```rust
/// use parking_lot::RwLock;
/// use tweaker_reflect::{Member, TypeInfo};
///
/// #[derive(Debug)]
/// struct Lamp { brightness: RwLock<u8> }
///
/// let info = TypeInfo::builder::<Lamp>("Lamp")
///     .member(Member::field("brightness", |lamp: &Lamp| &lamp.brightness))
///     .member(Member::method("toggle", |lamp: &Lamp| {
///         let mut level = lamp.brightness.write();
///         *level = if *level == 0 { 255 } else { 0 };
///     }))
///     .build();
///
/// assert_eq!(info.members().len(), 2);
/// ```
#[must_use = "finish the description with .build()"]
pub struct TypeBuilder<S> {
    info: TypeInfo,
    _owner: PhantomData<fn() -> S>,
}

impl<S> fmt::Debug for TypeBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeBuilder").field(&self.info).finish()
    }
}

impl<S: Any + Send + Sync> TypeBuilder<S> {
    /// Attaches a type-level marker.
    pub fn marker<M: Marker>(mut self, marker: M) -> Self {
        self.info.markers.push(AnyMarker::new(marker));
        self
    }

    /// Declares `B` as a base or interface of `S`, visible to type processors.
    pub fn base<B: ?Sized + Any>(mut self) -> Self {
        self.info.bases.push(TypeKey::of::<B>());
        self
    }

    pub fn member(mut self, member: Member<S>) -> Self {
        let mut info = member.into_info();
        info.declaring = self.info.key;
        info.module = Arc::clone(&self.info.module);
        self.info.members.push(Arc::new(info));
        self
    }

    #[must_use]
    pub fn build(self) -> TypeInfo {
        self.info
    }
}

/// Last path segment of a type name, ignoring generic arguments.
pub(crate) fn short_name(full_name: &'static str) -> &'static str {
    let base = full_name.split('<').next().unwrap_or(full_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// First path segment of a type name: the crate that defines it.
pub(crate) fn crate_of(full_name: &str) -> &str {
    full_name.split("::").next().unwrap_or(full_name)
}
