use crate::error::TweakerError;
use crate::invokable::Invokable;
use crate::manager::{InvokableManager, Managed, Manager, TweakableManager};
use crate::object::TweakerObject;
use crate::tweakable::Tweakable;
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use tweaker_events::{ResultProvider, SubscriptionId};
use tweaker_reflect::{BoundInstance, Scannable};
use tweaker_scanner::{ScanError, ScanOptions, Scanner};

/// Registers the objects of one live instance for as long as the guard lives.
///
/// [`AutoScan::scan`] scans the instance members of an `Arc<S>`, records every
/// invokable and tweakable produced for it and makes sure each one is registered with
/// the matching manager. Dropping the guard unregisters them again. The guard never
/// keeps the instance alive.
///
/// Scanners never dispatch a match twice, so a second guard over an instance the same
/// scanner already scanned records nothing.
///
/// ```rust
/// use std::sync::Arc;
/// use tweaker_core::{AutoScan, InvokableManager, InvokableMarker};
/// use tweaker_reflect::{Member, Scannable, TypeInfo};
/// use tweaker_scanner::{ScanOptions, Scanner};
///
/// struct Lamp;
///
/// impl Scannable for Lamp {
///     fn describe() -> TypeInfo {
///         TypeInfo::builder::<Self>("Lamp")
///             .member(Member::method("toggle", |_: &Self| {}).marker(InvokableMarker::new("lamp.toggle")))
///             .build()
///     }
/// }
///
/// let scanner = Arc::new(Scanner::new());
/// let invokables = Arc::new(InvokableManager::new().attach(&scanner).unwrap());
/// let lamp = Arc::new(Lamp);
///
/// let guard = AutoScan::scan(&scanner, &lamp, Some(Arc::clone(&invokables)), None, &ScanOptions::default()).unwrap();
/// assert_eq!(invokables.get_invokables(None).len(), 1);
///
/// drop(guard);
/// assert!(invokables.get_invokables(None).is_empty());
/// ```
pub struct AutoScan<S: Scannable> {
    bound: BoundInstance,
    invokables: Option<Arc<InvokableManager>>,
    tweakables: Option<Arc<TweakableManager>>,
    invokable_names: Vec<String>,
    tweakable_names: Vec<String>,
    _target: PhantomData<fn() -> S>,
}

impl<S: Scannable> AutoScan<S> {
    pub fn scan(
        scanner: &Scanner,
        instance: &Arc<S>,
        invokables: Option<Arc<InvokableManager>>,
        tweakables: Option<Arc<TweakableManager>>,
        options: &ScanOptions,
    ) -> Result<Self, TweakerError> {
        let bound = scanner.bind_instance(instance);
        // Built before anything is registered so an early return still unregisters.
        let mut guard = Self {
            bound: bound.clone(),
            invokables,
            tweakables,
            invokable_names: Vec::new(),
            tweakable_names: Vec::new(),
            _target: PhantomData,
        };

        let invokable_recorder = Recorder::<Invokable>::start(scanner, &bound)?;
        let tweakable_recorder = Recorder::<Tweakable>::start(scanner, &bound)?;
        let scanned = scanner.scan_bound(&S::describe(), &bound, options);
        let found_invokables = invokable_recorder.finish();
        let found_tweakables = tweakable_recorder.finish();
        scanned?;

        adopt(guard.invokables.as_deref(), found_invokables, &mut guard.invokable_names)?;
        adopt(guard.tweakables.as_deref(), found_tweakables, &mut guard.tweakable_names)?;

        debug!(
            instance = bound.id(),
            invokables = guard.invokable_names.len(),
            tweakables = guard.tweakable_names.len(),
            "Instance auto-registered"
        );
        Ok(guard)
    }

    #[must_use]
    pub const fn bound(&self) -> &BoundInstance {
        &self.bound
    }

    /// Names of the invokables this guard keeps registered.
    #[must_use]
    pub fn invokable_names(&self) -> &[String] {
        &self.invokable_names
    }

    /// Names of the tweakables this guard keeps registered.
    #[must_use]
    pub fn tweakable_names(&self) -> &[String] {
        &self.tweakable_names
    }
}

impl<S: Scannable> Drop for AutoScan<S> {
    fn drop(&mut self) {
        if let Some(manager) = &self.invokables {
            release(manager, &self.invokable_names);
        }
        if let Some(manager) = &self.tweakables {
            release(manager, &self.tweakable_names);
        }
    }
}

impl<S: Scannable> fmt::Debug for AutoScan<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoScan")
            .field("instance", &self.bound.id())
            .field("invokables", &self.invokable_names)
            .field("tweakables", &self.tweakable_names)
            .finish()
    }
}

/// Collects the results one scan publishes for a bound instance.
struct Recorder<O: Managed> {
    provider: Arc<ResultProvider<Arc<O>>>,
    subscription: SubscriptionId,
    found: Arc<Mutex<Vec<Arc<O>>>>,
}

impl<O: Managed> Recorder<O> {
    fn start(scanner: &Scanner, bound: &BoundInstance) -> Result<Self, ScanError> {
        let provider = scanner.result_provider::<Arc<O>>()?;
        let found = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&found);
        let id = bound.id();
        let subscription = provider.subscribe(move |object: &Arc<O>| {
            if object.instance().is_some_and(|theirs| theirs.id() == id) {
                sink.lock().push(Arc::clone(object));
            }
            Ok(())
        });
        Ok(Self { provider, subscription, found })
    }

    fn finish(self) -> Vec<Arc<O>> {
        std::mem::take(&mut *self.found.lock())
    }
}

impl<O: Managed> Drop for Recorder<O> {
    fn drop(&mut self) {
        self.provider.unsubscribe(self.subscription);
    }
}

/// Registers what an attached manager has not registered already, recording every name.
fn adopt<O: Managed>(
    manager: Option<&Manager<O>>,
    objects: Vec<Arc<O>>,
    names: &mut Vec<String>,
) -> Result<(), TweakerError> {
    let Some(manager) = manager else {
        return Ok(());
    };
    for object in objects {
        match manager.get_object_by_name(object.name()) {
            Some(existing) if Arc::ptr_eq(&existing, &object) => {},
            _ => manager.register(Arc::clone(&object))?,
        }
        names.push(object.name().to_owned());
    }
    Ok(())
}

fn release<O: Managed>(manager: &Manager<O>, names: &[String]) {
    for name in names {
        if let Err(err) = manager.unregister(name) {
            debug!(name, error = %err, "Auto-registered object already gone");
        }
    }
}
