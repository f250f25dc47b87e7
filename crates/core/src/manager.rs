//! Registries wired to a scanner.
//!
//! A [`Manager`] owns one [`Registry`]. Once attached to a [`Scanner`] it registers the
//! built-in processor for its object kind and subscribes the registry to the results,
//! so every object a scan produces lands in the registry. Dropping the manager (or
//! re-attaching it) removes both again.

use crate::error::TweakerError;
use crate::factory::{InvokableFactory, MANUAL_MODULE, TweakableFactory};
use crate::holder::link_holder;
use crate::invokable::Invokable;
use crate::markers::{InvokableMarker, TweakableMarker};
use crate::object::{ObjectInfo, TweakerObject};
use crate::processor::{InvokableProcessor, TweakableProcessor};
use crate::registry::Registry;
use crate::search::SearchOptions;
use crate::tweakable::Tweakable;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;
use tweaker_events::{HandlerError, ResultProvider, SubscriptionId};
use tweaker_reflect::{AnyMarker, BoundInstance, Getter, IntoMethod, MemberInfo, Setter, TweakValue, Value};
use tweaker_scanner::{ProcessorId, ScanError, Scanner};

/// A domain object kind with a built-in processor.
pub trait Managed: TweakerObject + fmt::Debug {
    /// Registers the processor producing `Arc<Self>` results with `scanner`.
    fn add_processor(scanner: &Scanner) -> Result<ProcessorId, ScanError>;
}

impl Managed for Invokable {
    fn add_processor(scanner: &Scanner) -> Result<ProcessorId, ScanError> {
        scanner.add_attribute_processor::<InvokableMarker, _>(Arc::new(InvokableProcessor::default()))
    }
}

impl Managed for Tweakable {
    fn add_processor(scanner: &Scanner) -> Result<ProcessorId, ScanError> {
        scanner.add_attribute_processor::<TweakableMarker, _>(Arc::new(TweakableProcessor::default()))
    }
}

pub type InvokableManager = Manager<Invokable>;
pub type TweakableManager = Manager<Tweakable>;

/// The scanner side of an attached manager. Detaches on drop.
struct Attachment<O: Managed> {
    scanner: Weak<Scanner>,
    processor: ProcessorId,
    provider: Arc<ResultProvider<Arc<O>>>,
    subscription: SubscriptionId,
}

impl<O: Managed> Drop for Attachment<O> {
    fn drop(&mut self) {
        self.provider.unsubscribe(self.subscription);
        if let Some(scanner) = self.scanner.upgrade() {
            scanner.remove_processor(self.processor);
        }
        debug!(processor = ?self.processor, "Manager detached");
    }
}

/// A [`Registry`] plus its optional scanner attachment.
pub struct Manager<O: Managed> {
    registry: Arc<Registry<O>>,
    attachment: Option<Attachment<O>>,
}

impl<O: Managed> Default for Manager<O> {
    fn default() -> Self {
        Self::with_registry(Registry::default())
    }
}

impl<O: Managed> fmt::Debug for Manager<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("registry", &self.registry)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl<O: Managed> Manager<O> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_registry(registry: Registry<O>) -> Self {
        Self { registry: Arc::new(registry), attachment: None }
    }

    /// Feeds every object `scanner` produces into this manager's registry.
    ///
    /// A previous attachment is dropped first. A name conflict while a scan publishes
    /// surfaces from that scan as a rejected result.
    pub fn attach(mut self, scanner: &Arc<Scanner>) -> Result<Self, TweakerError> {
        self.attachment = None;

        let provider = scanner.result_provider::<Arc<O>>()?;
        let processor = O::add_processor(scanner)?;
        let registry = Arc::clone(&self.registry);
        let subscription = provider.subscribe(move |object: &Arc<O>| {
            registry.register(Arc::clone(object)).map_err(HandlerError::rejected)
        });

        debug!(processor = ?processor, "Manager attached");
        self.attachment = Some(Attachment { scanner: Arc::downgrade(scanner), processor, provider, subscription });
        Ok(self)
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attachment.is_some()
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry<O>> {
        &self.registry
    }

    pub fn register(&self, object: Arc<O>) -> Result<(), TweakerError> {
        self.registry.register(object)
    }

    pub fn unregister(&self, name: &str) -> Result<Arc<O>, TweakerError> {
        self.registry.unregister(name)
    }

    #[must_use]
    pub fn get_objects(&self, filter: Option<&SearchOptions>) -> BTreeMap<String, Arc<O>> {
        self.registry.get_objects(filter)
    }

    #[must_use]
    pub fn get_object(&self, filter: Option<&SearchOptions>) -> Option<Arc<O>> {
        self.registry.get_object(filter)
    }

    #[must_use]
    pub fn get_object_by_name(&self, name: &str) -> Option<Arc<O>> {
        self.registry.get_object_by_name(name)
    }

    pub fn prune_dead_instances(&self) -> usize {
        self.registry.prune_dead_instances()
    }

    fn lookup(&self, name: &str) -> Result<Arc<O>, TweakerError> {
        self.registry
            .get_object_by_name(name)
            .ok_or_else(|| TweakerError::NotFound { name: name.to_owned(), context: None })
    }

    fn add(&self, object: O) -> Result<Arc<O>, TweakerError> {
        let object = Arc::new(object);
        self.registry.register(Arc::clone(&object))?;
        Ok(object)
    }
}

impl Manager<Invokable> {
    #[must_use]
    pub fn get_invokables(&self, filter: Option<&SearchOptions>) -> BTreeMap<String, Arc<Invokable>> {
        self.get_objects(filter)
    }

    #[must_use]
    pub fn get_invokable(&self, name: &str) -> Option<Arc<Invokable>> {
        self.get_object_by_name(name)
    }

    /// Builds an invokable from a method or event member and registers it.
    pub fn register_method(
        &self,
        marker: &InvokableMarker,
        member: &MemberInfo,
        instance: Option<&BoundInstance>,
    ) -> Result<Arc<Invokable>, TweakerError> {
        self.add(InvokableFactory::from_member(marker, member, instance)?)
    }

    /// Registers a closure under `name` in the [`MANUAL_MODULE`].
    ///
    /// With `instance` set, the invokable is named `name#id` and stops working once the
    /// instance is dropped.
    pub fn register_delegate<M, F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        handler: F,
        instance: Option<BoundInstance>,
    ) -> Result<Arc<Invokable>, TweakerError>
    where
        F: IntoMethod<M>,
    {
        self.add(InvokableFactory::from_delegate(name, handler, instance))
    }

    /// Looks `name` up and invokes it outside the registry lock.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, TweakerError> {
        self.lookup(name)?.invoke(args)
    }
}

impl Manager<Tweakable> {
    #[must_use]
    pub fn get_tweakables(&self, filter: Option<&SearchOptions>) -> BTreeMap<String, Arc<Tweakable>> {
        self.get_objects(filter)
    }

    #[must_use]
    pub fn get_tweakable(&self, name: &str) -> Option<Arc<Tweakable>> {
        self.get_object_by_name(name)
    }

    /// Builds a tweakable from a field or property member and registers it.
    pub fn register_member(
        &self,
        marker: &TweakableMarker,
        member: &MemberInfo,
        instance: Option<&BoundInstance>,
        container: Option<&MemberInfo>,
    ) -> Result<Arc<Tweakable>, TweakerError> {
        let tweakable = self.add(TweakableFactory::from_member(marker, member, instance, container)?)?;
        link_holder(member, &tweakable)?;
        Ok(tweakable)
    }

    /// Registers a shared slot as a tweakable.
    pub fn register_field<T: TweakValue>(
        &self,
        marker: &TweakableMarker,
        field: Arc<RwLock<T>>,
        constraints: &[AnyMarker],
    ) -> Result<Arc<Tweakable>, TweakerError> {
        let reader = Arc::clone(&field);
        let getter = Getter::from_fn(move || reader.read().clone());
        let setter = Setter::from_fn(move |value: T| *field.write() = value);
        self.add(TweakableFactory::from_accessors(manual_info(marker), T::kind(), Some(getter), Some(setter), constraints)?)
    }

    /// Registers a getter/setter pair as a tweakable.
    pub fn register_property<T, G, S>(
        &self,
        marker: &TweakableMarker,
        get: G,
        set: S,
        constraints: &[AnyMarker],
    ) -> Result<Arc<Tweakable>, TweakerError>
    where
        T: TweakValue,
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        let getter = Getter::from_fn(get);
        let setter = Setter::from_fn(set);
        self.add(TweakableFactory::from_accessors(manual_info(marker), T::kind(), Some(getter), Some(setter), constraints)?)
    }

    pub fn get_value(&self, name: &str) -> Result<Value, TweakerError> {
        self.lookup(name)?.get_value()
    }

    /// Looks `name` up and sets it, clamped and type-checked, outside the registry lock.
    pub fn set_value(&self, name: &str, value: Value) -> Result<(), TweakerError> {
        self.lookup(name)?.set_value(value)
    }
}

fn manual_info(marker: &TweakableMarker) -> ObjectInfo {
    ObjectInfo::new(&marker.name, true, MANUAL_MODULE, None).with_description(marker.description.clone())
}
