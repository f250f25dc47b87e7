use crate::error::HandlerError;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

/// A subscriber callback attached to a [`ResultProvider`].
pub type Handler<T> = Arc<dyn Fn(&T) -> Result<(), HandlerError> + Send + Sync>;

/// Opaque handle returned by [`ResultProvider::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A synchronous, typed publish/subscribe channel for one result type.
///
/// Publishing invokes every subscriber in-line on the calling thread, in subscription
/// order. The handler list is snapshotted before delivery, so subscribers may
/// subscribe or unsubscribe from inside a callback without deadlocking.
pub struct ResultProvider<T> {
    handlers: RwLock<Vec<(SubscriptionId, Handler<T>)>>,
    next_id: AtomicU64,
}

impl<T> Default for ResultProvider<T> {
    fn default() -> Self {
        Self { handlers: RwLock::new(Vec::new()), next_id: AtomicU64::new(1) }
    }
}

impl<T> fmt::Debug for ResultProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultProvider")
            .field("result", &std::any::type_name::<T>())
            .field("subscribers", &self.handlers.read().len())
            .finish()
    }
}

impl<T: 'static> ResultProvider<T> {
    /// Creates a provider with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a subscriber. Every call creates a distinct subscription, so the same
    /// closure subscribed twice is delivered to twice.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        trace!(result = std::any::type_name::<T>(), ?id, "Subscriber attached");
        id
    }

    /// Detaches a subscriber. Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        let removed = handlers.len() != before;
        drop(handlers);
        if removed {
            trace!(result = std::any::type_name::<T>(), ?id, "Subscriber detached");
        }
        removed
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Delivers `result` to every subscriber.
    ///
    /// All subscribers are invoked even if one rejects the result; the first rejection is
    /// returned once delivery completes.
    ///
    /// # Returns
    /// The number of subscribers that accepted the result.
    ///
    /// # Errors
    /// The first [`HandlerError`] raised by a subscriber.
    pub fn publish(&self, result: &T) -> Result<usize, HandlerError> {
        let snapshot: Vec<Handler<T>> =
            self.handlers.read().iter().map(|(_, handler)| Arc::clone(handler)).collect();

        if snapshot.is_empty() {
            trace!(result = std::any::type_name::<T>(), "Result dropped: no subscribers");
            return Ok(0);
        }

        let mut accepted = 0;
        let mut first_error = None;
        for handler in snapshot {
            match handler(result) {
                Ok(()) => accepted += 1,
                Err(err) => {
                    warn!(result = std::any::type_name::<T>(), error = %err, "Subscriber rejected result");
                    first_error.get_or_insert(err);
                },
            }
        }

        trace!(result = std::any::type_name::<T>(), accepted, "Result dispatched");
        first_error.map_or(Ok(accepted), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn subscriber_can_unsubscribe_itself_during_publish() {
        let provider = Arc::new(ResultProvider::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = Arc::new(parking_lot::Mutex::new(None::<SubscriptionId>));

        let id = {
            let inner = Arc::clone(&provider);
            let calls = Arc::clone(&calls);
            let slot = Arc::clone(&slot);
            provider.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(id) = *slot.lock() {
                    inner.unsubscribe(id);
                }
                Ok(())
            })
        };
        *slot.lock() = Some(id);

        assert_eq!(provider.publish(&1).unwrap(), 1);
        assert_eq!(provider.publish(&2).unwrap(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
