use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Anything that can be attached to a type or member as a declarative marker.
///
/// Blanket-implemented for every `'static + Debug + Send + Sync` type.
pub trait Marker: Any + fmt::Debug + Send + Sync {}
impl<T: Any + fmt::Debug + Send + Sync> Marker for T {}

/// A type-erased, shareable marker instance.
///
/// Dispatch happens on [`AnyMarker::marker_type`], the `TypeId` of the concrete marker.
#[derive(Clone)]
pub struct AnyMarker {
    id: TypeId,
    name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
    fmt: fn(&(dyn Any + Send + Sync), &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl AnyMarker {
    pub fn new<M: Marker>(marker: M) -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
            inner: Arc::new(marker),
            fmt: debug_marker::<M>,
        }
    }

    #[must_use]
    pub const fn marker_type(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name of the concrete marker.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is<M: Marker>(&self) -> bool {
        self.id == TypeId::of::<M>()
    }

    #[must_use]
    pub fn downcast_ref<M: Marker>(&self) -> Option<&M> {
        self.inner.downcast_ref::<M>()
    }

    /// Recovers a shared handle to the concrete marker.
    #[must_use]
    pub fn downcast_arc<M: Marker>(&self) -> Option<Arc<M>> {
        Arc::clone(&self.inner).downcast::<M>().ok()
    }
}

impl fmt::Debug for AnyMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.fmt)(&*self.inner, f)
    }
}

fn debug_marker<M: Marker>(marker: &(dyn Any + Send + Sync), f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match marker.downcast_ref::<M>() {
        Some(marker) => fmt::Debug::fmt(marker, f),
        None => f.write_str("<marker>"),
    }
}

/// Returns every marker of type `M` in `markers`, in declaration order.
pub fn markers_of<M: Marker>(markers: &[AnyMarker]) -> impl Iterator<Item = &M> {
    markers.iter().filter_map(AnyMarker::downcast_ref::<M>)
}

/// Returns the first marker of type `M` in `markers`.
pub fn marker_of<M: Marker>(markers: &[AnyMarker]) -> Option<&M> {
    markers_of::<M>(markers).next()
}
