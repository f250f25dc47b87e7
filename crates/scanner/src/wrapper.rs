//! Type-erased, idempotent adapters around registered processors.

use crate::error::ScanError;
use crate::processor::{AttributeProcessor, KindTag, MemberProcessor, ScanContext, ScanProcessor, TypeProcessor};
use fxhash::FxHashSet;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;
use tweaker_events::{ResultProvider, SubscriptionId};
use tweaker_reflect::{Marker, MemberInfo, TypeInfo, markers_of};

/// Handle identifying one processor registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorId(pub(crate) u64);

/// Identity of one processed match.
///
/// Marker dispatch keys on the marker type, type-only processors on the type and
/// member-only processors on the member. The bound instance is part of every key so
/// separate instances of a type are processed separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProcessKey {
    marker: Option<TypeId>,
    declaring: TypeId,
    member: Option<Cow<'static, str>>,
    instance: Option<u64>,
}

impl ProcessKey {
    fn new(marker: Option<TypeId>, declaring: TypeId, member: Option<&str>, scan: &ScanContext<'_>) -> Self {
        Self {
            marker,
            declaring,
            member: member.map(|name| Cow::Owned(name.to_owned())),
            instance: scan.instance().map(tweaker_reflect::BoundInstance::id),
        }
    }
}

/// Per-processor record of already processed matches.
#[derive(Debug, Default)]
struct Processed(Mutex<FxHashSet<ProcessKey>>);

impl Processed {
    /// Marks `key` and reports whether it was new. Marks are never rolled back.
    fn first_visit(&self, key: ProcessKey) -> bool {
        self.0.lock().insert(key)
    }

    fn len(&self) -> usize {
        self.0.lock().len()
    }
}

/// The dispatch table entry the scanner stores for every registration.
pub(crate) trait Dispatch: Send + Sync {
    fn id(&self) -> ProcessorId;

    fn name(&self) -> &'static str;

    /// Dispatches a type. Returns how many processor calls were made.
    fn dispatch_type(&self, ty: &TypeInfo, scan: &ScanContext<'_>) -> Result<usize, ScanError>;

    /// Dispatches a member. Returns how many processor calls were made.
    fn dispatch_member(&self, member: &Arc<MemberInfo>, scan: &ScanContext<'_>) -> Result<usize, ScanError>;

    fn processed(&self) -> usize;

    /// Address of the wrapped processor, for removal by identity.
    fn target(&self) -> usize;
}

/// Forwards a processor's results into the scanner's provider for as long as any
/// registration of that processor is alive.
pub(crate) struct Forwarding<P: ScanProcessor> {
    processor: Arc<P>,
    subscription: SubscriptionId,
}

impl<P: ScanProcessor> Forwarding<P> {
    pub(crate) fn new(processor: Arc<P>, target: Arc<ResultProvider<P::Output>>) -> Self {
        let subscription = processor.results().subscribe(move |result| target.publish(result).map(|_| ()));
        Self { processor, subscription }
    }
}

impl<P: ScanProcessor> Drop for Forwarding<P> {
    fn drop(&mut self) {
        self.processor.results().unsubscribe(self.subscription);
        trace!(processor = std::any::type_name::<P>(), "Result forwarding detached");
    }
}

/// Address of a processor, stable for as long as the `Arc` lives.
pub(crate) fn address<P>(processor: &Arc<P>) -> usize {
    Arc::as_ptr(processor).cast::<()>() as usize
}

fn failure<E: std::error::Error + Send + Sync + 'static>(processor: &'static str, what: &str, err: E) -> ScanError {
    ScanError::processor(err, format!("{processor} on {what}"))
}

pub(crate) struct AttributeDispatch<M, P: ScanProcessor> {
    id: ProcessorId,
    link: Arc<Forwarding<P>>,
    processed: Processed,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Marker, P: AttributeProcessor<M>> AttributeDispatch<M, P> {
    pub(crate) fn new(id: ProcessorId, link: Arc<Forwarding<P>>) -> Self {
        Self { id, link, processed: Processed::default(), _marker: PhantomData }
    }
}

impl<M: Marker, P: AttributeProcessor<M>> Dispatch for AttributeDispatch<M, P> {
    fn id(&self) -> ProcessorId {
        self.id
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<P>()
    }

    fn dispatch_type(&self, ty: &TypeInfo, scan: &ScanContext<'_>) -> Result<usize, ScanError> {
        let mut calls = 0;
        for marker in markers_of::<M>(ty.markers()) {
            let key = ProcessKey::new(Some(TypeId::of::<M>()), ty.type_id(), None, scan);
            if !self.processed.first_visit(key) {
                continue;
            }
            trace!(processor = self.name(), ty = ty.name(), marker = ?marker, "Dispatching type marker");
            calls += 1;
            self.link
                .processor
                .process_type_marker(marker, ty, scan)
                .map_err(|err| failure(self.name(), ty.name(), err))?;
        }
        Ok(calls)
    }

    fn dispatch_member(&self, member: &Arc<MemberInfo>, scan: &ScanContext<'_>) -> Result<usize, ScanError> {
        let mut calls = 0;
        for marker in markers_of::<M>(member.markers()) {
            let key = ProcessKey::new(
                Some(TypeId::of::<M>()),
                member.declaring_type().type_id(),
                Some(member.name()),
                scan,
            );
            if !self.processed.first_visit(key) {
                continue;
            }
            trace!(processor = self.name(), member = %member.qualified_name(), marker = ?marker, "Dispatching member marker");
            calls += 1;
            self.link
                .processor
                .process_member_marker(marker, member, scan)
                .map_err(|err| failure(self.name(), &member.qualified_name(), err))?;
        }
        Ok(calls)
    }

    fn processed(&self) -> usize {
        self.processed.len()
    }

    fn target(&self) -> usize {
        address(&self.link.processor)
    }
}

pub(crate) struct TypeDispatch<I: ?Sized, P: ScanProcessor> {
    id: ProcessorId,
    link: Arc<Forwarding<P>>,
    processed: Processed,
    _input: PhantomData<fn() -> Box<I>>,
}

impl<I: ?Sized + Any, P: TypeProcessor<I>> TypeDispatch<I, P> {
    pub(crate) fn new(id: ProcessorId, link: Arc<Forwarding<P>>) -> Self {
        Self { id, link, processed: Processed::default(), _input: PhantomData }
    }
}

impl<I: ?Sized + Any, P: TypeProcessor<I>> Dispatch for TypeDispatch<I, P> {
    fn id(&self) -> ProcessorId {
        self.id
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<P>()
    }

    fn dispatch_type(&self, ty: &TypeInfo, scan: &ScanContext<'_>) -> Result<usize, ScanError> {
        if !ty.is_or_derives(TypeId::of::<I>()) {
            return Ok(0);
        }
        if !self.processed.first_visit(ProcessKey::new(None, ty.type_id(), None, scan)) {
            return Ok(0);
        }
        trace!(processor = self.name(), ty = ty.name(), "Dispatching type");
        self.link.processor.process_type(ty, scan).map_err(|err| failure(self.name(), ty.name(), err))?;
        Ok(1)
    }

    fn dispatch_member(&self, _member: &Arc<MemberInfo>, _scan: &ScanContext<'_>) -> Result<usize, ScanError> {
        Ok(0)
    }

    fn processed(&self) -> usize {
        self.processed.len()
    }

    fn target(&self) -> usize {
        address(&self.link.processor)
    }
}

pub(crate) struct MemberDispatch<K, P: ScanProcessor> {
    id: ProcessorId,
    link: Arc<Forwarding<P>>,
    processed: Processed,
    _kind: PhantomData<fn() -> K>,
}

impl<K: KindTag, P: MemberProcessor<K>> MemberDispatch<K, P> {
    pub(crate) fn new(id: ProcessorId, link: Arc<Forwarding<P>>) -> Self {
        Self { id, link, processed: Processed::default(), _kind: PhantomData }
    }
}

impl<K: KindTag, P: MemberProcessor<K>> Dispatch for MemberDispatch<K, P> {
    fn id(&self) -> ProcessorId {
        self.id
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<P>()
    }

    fn dispatch_type(&self, _ty: &TypeInfo, _scan: &ScanContext<'_>) -> Result<usize, ScanError> {
        Ok(0)
    }

    fn dispatch_member(&self, member: &Arc<MemberInfo>, scan: &ScanContext<'_>) -> Result<usize, ScanError> {
        if member.kind() != K::KIND {
            return Ok(0);
        }
        let key = ProcessKey::new(None, member.declaring_type().type_id(), Some(member.name()), scan);
        if !self.processed.first_visit(key) {
            return Ok(0);
        }
        trace!(processor = self.name(), member = %member.qualified_name(), "Dispatching member");
        self.link
            .processor
            .process_member(member, scan)
            .map_err(|err| failure(self.name(), &member.qualified_name(), err))?;
        Ok(1)
    }

    fn processed(&self) -> usize {
        self.processed.len()
    }

    fn target(&self) -> usize {
        address(&self.link.processor)
    }
}
