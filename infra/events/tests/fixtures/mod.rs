use std::sync::Arc;
use parking_lot::Mutex;
use tweaker_events::{HandlerError, ResultProvider, SubscriptionId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestResult(pub usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtherResult(pub &'static str);

/// Subscribes a recorder that appends every delivered value to a shared log.
pub fn record<T: Clone + Send + Sync + 'static>(
    provider: &ResultProvider<T>,
) -> (SubscriptionId, Arc<Mutex<Vec<T>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let id = provider.subscribe(move |value: &T| {
        sink.lock().push(value.clone());
        Ok::<(), HandlerError>(())
    });
    (id, log)
}
