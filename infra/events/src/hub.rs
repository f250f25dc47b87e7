use crate::error::HandlerError;
use crate::provider::ResultProvider;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::trace;

/// Marker trait for values that can flow through a [`ResultHub`].
///
/// Any `Send + Sync + 'static` type implements it automatically.
pub trait ScanResult: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> ScanResult for T {}

/// A set of [`ResultProvider`]s indexed by the [`TypeId`] of the result they carry.
///
/// Cloning a hub is cheap and every clone shares the same providers.
#[derive(Debug, Clone, Default)]
pub struct ResultHub {
    providers: Arc<RwLock<FxHashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl ResultHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the provider for results of type `T`, creating it on first use.
    ///
    /// # Errors
    /// Returns [`HandlerError::TypeMismatch`] if the slot for `T` holds another type,
    /// which indicates a corrupted hub.
    pub fn provider<T: ScanResult>(&self) -> Result<Arc<ResultProvider<T>>, HandlerError> {
        let id = TypeId::of::<T>();

        let existing = self.providers.read().get(&id).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let mut providers = self.providers.write();
                let slot = providers
                    .entry(id)
                    .or_insert_with(|| {
                        trace!(result = std::any::type_name::<T>(), "Initializing result provider");
                        Arc::new(ResultProvider::<T>::new())
                    })
                    .clone();
                drop(providers);
                slot
            },
        };

        slot.downcast::<ResultProvider<T>>().map_err(|_| HandlerError::TypeMismatch {
            message: std::any::type_name::<T>().into(),
            context: Some("Unexpected result provider type".into()),
        })
    }

    /// Returns the provider for `T` only if one was already created.
    #[must_use]
    pub fn existing<T: ScanResult>(&self) -> Option<Arc<ResultProvider<T>>> {
        let slot = self.providers.read().get(&TypeId::of::<T>()).cloned()?;
        slot.downcast::<ResultProvider<T>>().ok()
    }

    /// Publishes `result` on the provider for `T`, if any exists.
    ///
    /// Returns `Ok(0)` when nobody ever asked for a provider of `T`.
    ///
    /// # Errors
    /// Propagates the first subscriber rejection.
    pub fn publish<T: ScanResult>(&self, result: &T) -> Result<usize, HandlerError> {
        self.existing::<T>().map_or(Ok(0), |provider| provider.publish(result))
    }

    /// Number of result types with a provider.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.providers.read().len()
    }

    /// Drops every provider. Subscribers holding an `Arc` to a provider keep it alive,
    /// but the hub no longer publishes to it.
    ///
    /// Returns the number of providers that were released.
    pub fn shutdown(&self) -> usize {
        let mut providers = self.providers.write();
        let count = providers.len();
        providers.clear();
        drop(providers);
        trace!(count, "Result hub shut down");
        count
    }
}
