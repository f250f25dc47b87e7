use crate::error::CallError;
use crate::method::{IntoMethod, MethodFn, erase_static};
use crate::value::Value;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Handle returned by [`Multicast::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Backing storage of an event: an ordered list of handlers.
///
/// Invoking a multicast calls every handler with the same arguments, in subscription
/// order, and yields the result of the last one. With no handlers nothing is called
/// and the result is [`Value::Unit`].
pub struct Multicast {
    handlers: RwLock<Vec<(HandlerId, MethodFn)>>,
    next_id: AtomicU64,
}

impl Multicast {
    #[must_use]
    pub const fn new() -> Self {
        Self { handlers: RwLock::new(Vec::new()), next_id: AtomicU64::new(1) }
    }

    /// Adds a typed handler, e.g. `|amount: i32| amount * 2`.
    pub fn subscribe<M, F: IntoMethod<M>>(&self, handler: F) -> HandlerId {
        self.subscribe_erased(handler.into_call())
    }

    /// Adds a handler that already works on `Value`s.
    pub fn subscribe_raw<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.subscribe_erased(erase_static(handler))
    }

    fn subscribe_erased(&self, call: MethodFn) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, call));
        id
    }

    /// Removes a handler. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Calls every handler in subscription order and returns the last result.
    ///
    /// Handlers are snapshotted first, so a handler may (un)subscribe while running.
    /// The first failing handler stops the walk.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, CallError> {
        let snapshot: Vec<MethodFn> = self.handlers.read().iter().map(|(_, call)| MethodFn::clone(call)).collect();
        trace!(handlers = snapshot.len(), "Invoking multicast");

        let mut last = Value::Unit;
        for call in snapshot {
            last = call(None, args)?;
        }
        Ok(last)
    }
}

impl Default for Multicast {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Multicast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multicast").field("handlers", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn empty_multicast_returns_unit() {
        let event = Multicast::new();
        assert_eq!(event.invoke(&[]).unwrap(), Value::Unit);
    }

    #[test]
    fn last_handler_result_wins() {
        let event = Multicast::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        event.subscribe(move |x: i32| {
            counter.fetch_add(1, Ordering::SeqCst);
            x + 1
        });
        event.subscribe(|x: i32| x * 10);

        assert_eq!(event.invoke(&[Value::I32(4)]).unwrap(), Value::I32(40));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribed_handlers_are_skipped() {
        let event = Multicast::new();
        let first = event.subscribe(|| 1_u8);
        event.subscribe(|| 2_u8);

        assert!(event.unsubscribe(first));
        assert!(!event.unsubscribe(first));
        assert_eq!(event.len(), 1);
        assert_eq!(event.invoke(&[]).unwrap(), Value::U8(2));
    }
}
