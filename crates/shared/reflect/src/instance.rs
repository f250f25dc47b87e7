use crate::error::CallError;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// The erased receiver handed to instance accessors.
pub type Instance = dyn Any + Send + Sync;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// A non-owning reference to a live object plus a process-unique id.
///
/// Holding a `BoundInstance` never keeps the object alive. Ids start at 1 and are
/// never reused within a process.
#[derive(Clone)]
pub struct BoundInstance {
    id: u64,
    type_name: &'static str,
    target: Weak<Instance>,
}

impl BoundInstance {
    /// Binds `instance` under a freshly allocated id.
    pub fn bind<S: Any + Send + Sync>(instance: &Arc<S>) -> Self {
        let erased: Arc<Instance> = Arc::clone(instance) as Arc<Instance>;
        Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            type_name: std::any::type_name::<S>(),
            target: Arc::downgrade(&erased),
        }
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Temporarily upgrades to a strong reference for the duration of a call.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<Instance>> {
        self.target.upgrade()
    }

    /// Like [`BoundInstance::upgrade`] but reports a dead target as an error.
    pub fn live(&self) -> Result<Arc<Instance>, CallError> {
        self.upgrade().ok_or(CallError::DeadInstance { id: self.id, context: None })
    }

    /// Whether both handles point at the same object, regardless of id.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.target, &other.target)
    }

    /// Whether this handle points at `instance`.
    #[must_use]
    pub fn refers_to<S: Any + Send + Sync>(&self, instance: &Arc<S>) -> bool {
        std::ptr::addr_eq(self.target.as_ptr(), Arc::as_ptr(instance))
    }

    /// The underlying weak reference, for consumers that track liveness themselves.
    #[must_use]
    pub fn downgrade(&self) -> Weak<Instance> {
        Weak::clone(&self.target)
    }
}

impl fmt::Debug for BoundInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundInstance")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Downcasts an erased receiver to the declaring type of an instance member.
pub fn receiver<S: Any>(target: Option<&Instance>) -> Result<&S, CallError> {
    let target = target.ok_or(CallError::MissingInstance { context: None })?;
    target
        .downcast_ref::<S>()
        .ok_or(CallError::InstanceType { expected: std::any::type_name::<S>(), context: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_positive() {
        let a = Arc::new(1_u8);
        let first = BoundInstance::bind(&a);
        let second = BoundInstance::bind(&a);

        assert!(first.id() >= 1);
        assert_ne!(first.id(), second.id());
        assert!(first.same_target(&second));
        assert!(first.refers_to(&a));
    }

    #[test]
    fn binding_does_not_keep_the_target_alive() {
        let a = Arc::new(String::from("gone soon"));
        let bound = BoundInstance::bind(&a);
        assert!(bound.is_alive());

        drop(a);
        assert!(!bound.is_alive());
        assert!(matches!(bound.live(), Err(CallError::DeadInstance { .. })));
    }

    #[test]
    fn receiver_checks_presence_and_type() {
        let value: Arc<Instance> = Arc::new(7_i32);
        assert_eq!(receiver::<i32>(Some(&*value)).ok(), Some(&7));
        assert!(matches!(receiver::<u8>(Some(&*value)), Err(CallError::InstanceType { .. })));
        assert!(matches!(receiver::<i32>(None), Err(CallError::MissingInstance { .. })));
    }
}
