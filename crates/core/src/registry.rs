use crate::error::TweakerError;
use crate::object::TweakerObject;
use crate::search::SearchOptions;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Thread-safe, name-keyed store of one kind of domain object.
///
/// Every operation holds the single registry lock for its whole duration and never
/// calls out of the registry while holding it. Objects are handed out as `Arc`s, so
/// invoking or setting them happens outside the lock.
pub struct Registry<O> {
    objects: Mutex<BTreeMap<String, Arc<O>>>,
    unique_instances: bool,
}

impl<O: TweakerObject> Default for Registry<O> {
    fn default() -> Self {
        Self { objects: Mutex::new(BTreeMap::new()), unique_instances: false }
    }
}

impl<O: TweakerObject> fmt::Debug for Registry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("objects", &self.len())
            .field("unique_instances", &self.unique_instances)
            .finish()
    }
}

impl<O: TweakerObject> Registry<O> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also rejects a second object bound to an already registered live instance.
    #[must_use]
    pub const fn with_unique_instances(mut self) -> Self {
        self.unique_instances = true;
        self
    }

    pub fn register(&self, object: Arc<O>) -> Result<(), TweakerError> {
        let mut objects = self.objects.lock();
        if objects.contains_key(object.name()) {
            return Err(TweakerError::NameAlreadyRegistered { name: object.name().to_owned(), context: None });
        }
        if self.unique_instances
            && let Some(bound) = object.instance()
            && let Some(existing) =
                objects.values().find(|other| other.instance().is_some_and(|theirs| theirs.same_target(bound)))
        {
            return Err(TweakerError::InstanceAlreadyRegistered {
                id: bound.id(),
                existing: existing.name().to_owned(),
                context: None,
            });
        }

        debug!(name = object.name(), "Object registered");
        objects.insert(object.name().to_owned(), object);
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> Result<Arc<O>, TweakerError> {
        let removed = self.objects.lock().remove(name);
        let object = removed.ok_or_else(|| TweakerError::NotFound { name: name.to_owned(), context: None })?;
        debug!(name, "Object unregistered");
        Ok(object)
    }

    /// Prunes dead objects, then snapshots the ones matching `filter` (all when `None`).
    #[must_use]
    pub fn get_objects(&self, filter: Option<&SearchOptions>) -> BTreeMap<String, Arc<O>> {
        let mut objects = self.objects.lock();
        prune(&mut objects);
        objects
            .iter()
            .filter(|(_, object)| filter.is_none_or(|f| f.matches::<O>(object)))
            .map(|(name, object)| (name.clone(), Arc::clone(object)))
            .collect()
    }

    /// Prunes dead objects, then returns the first live match in name order.
    #[must_use]
    pub fn get_object(&self, filter: Option<&SearchOptions>) -> Option<Arc<O>> {
        let mut objects = self.objects.lock();
        prune(&mut objects);
        objects.values().find(|object| filter.is_none_or(|f| f.matches::<O>(object))).cloned()
    }

    /// Direct lookup. Does not prune.
    #[must_use]
    pub fn get_object_by_name(&self, name: &str) -> Option<Arc<O>> {
        self.objects.lock().get(name).cloned()
    }

    /// Removes every object whose bound instance is gone. Returns how many were removed.
    pub fn prune_dead_instances(&self) -> usize {
        prune(&mut self.objects.lock())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.objects.lock().contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

fn prune<O: TweakerObject>(objects: &mut BTreeMap<String, Arc<O>>) -> usize {
    let before = objects.len();
    objects.retain(|_, object| object.is_valid());
    let pruned = before - objects.len();
    if pruned > 0 {
        debug!(pruned, "Pruned objects of dropped instances");
    }
    pruned
}
