use crate::error::ScanError;
use crate::options::ScanOptions;
use crate::processor::{AttributeProcessor, KindTag, MemberProcessor, ScanContext, ScanProcessor, TypeProcessor};
use crate::wrapper::{AttributeDispatch, Dispatch, Forwarding, MemberDispatch, ProcessorId, TypeDispatch, address};
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};
use tweaker_events::{ResultHub, ResultProvider, ScanResult};
use tweaker_reflect::{BoundInstance, Marker, MemberInfo, Module, Scannable, TypeInfo, linked_modules};

/// Counters describing one scan call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Modules that passed the module filter.
    pub modules: usize,
    /// Types that passed the type filters.
    pub types: usize,
    /// Members that passed the member filters.
    pub members: usize,
    /// Processor calls made. Matches skipped as already processed are not counted.
    pub dispatched: usize,
    /// Dispatches that failed and were skipped because failures are isolated.
    pub failures: usize,
}

type DispatchTable = Vec<Arc<dyn Dispatch>>;

/// The metadata walker.
///
/// Walks modules, types and members, and hands every match to the registered
/// processors. Each registration remembers what it already processed, so scanning the
/// same metadata again makes no further calls to it. Processor results are forwarded
/// into a [`ResultHub`] where consumers subscribe by result type.
pub struct Scanner {
    table: RwLock<DispatchTable>,
    links: Mutex<FxHashMap<usize, Weak<dyn Any + Send + Sync>>>,
    hub: ResultHub,
    instances: Mutex<Vec<BoundInstance>>,
    next_id: AtomicU64,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::with_hub(ResultHub::new())
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("processors", &self.processor_count())
            .field("results", &self.hub)
            .field("instances", &self.instances.lock().len())
            .finish()
    }
}

impl Scanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scanner that forwards results into an existing hub.
    #[must_use]
    pub fn with_hub(hub: ResultHub) -> Self {
        Self {
            table: RwLock::new(Vec::new()),
            links: Mutex::new(FxHashMap::default()),
            hub,
            instances: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers `processor` for markers of type `M`.
    pub fn add_attribute_processor<M, P>(&self, processor: Arc<P>) -> Result<ProcessorId, ScanError>
    where
        M: Marker,
        P: AttributeProcessor<M>,
    {
        let link = self.link(processor)?;
        let id = self.next_processor_id();
        Ok(self.install(Arc::new(AttributeDispatch::<M, P>::new(id, link))))
    }

    /// Registers `processor` for every type that is or derives from `I`.
    pub fn add_type_processor<I, P>(&self, processor: Arc<P>) -> Result<ProcessorId, ScanError>
    where
        I: ?Sized + Any,
        P: TypeProcessor<I>,
    {
        let link = self.link(processor)?;
        let id = self.next_processor_id();
        Ok(self.install(Arc::new(TypeDispatch::<I, P>::new(id, link))))
    }

    /// Registers `processor` for every member of kind `K`.
    pub fn add_member_processor<K, P>(&self, processor: Arc<P>) -> Result<ProcessorId, ScanError>
    where
        K: KindTag,
        P: MemberProcessor<K>,
    {
        let link = self.link(processor)?;
        let id = self.next_processor_id();
        Ok(self.install(Arc::new(MemberDispatch::<K, P>::new(id, link))))
    }

    /// Removes one registration. Returns `false` if it was not registered.
    pub fn remove_processor(&self, id: ProcessorId) -> bool {
        let removed = {
            let mut table = self.table.write();
            table.iter().position(|entry| entry.id() == id).map(|index| table.remove(index))
        };
        let Some(entry) = removed else {
            return false;
        };
        debug!(processor = entry.name(), ?id, "Processor removed");
        true
    }

    /// Removes every registration of `processor`. Returns how many were removed.
    pub fn remove_processors_of<P: ScanProcessor>(&self, processor: &Arc<P>) -> usize {
        let target = address(processor);
        let removed: DispatchTable = {
            let mut table = self.table.write();
            let (gone, kept): (DispatchTable, DispatchTable) =
                table.drain(..).partition(|entry| entry.target() == target);
            *table = kept;
            gone
        };
        if !removed.is_empty() {
            debug!(processor = std::any::type_name::<P>(), count = removed.len(), "Processor removed");
        }
        removed.len()
    }

    #[must_use]
    pub fn processor_count(&self) -> usize {
        self.table.read().len()
    }

    /// Number of matches a registration has processed so far.
    #[must_use]
    pub fn processed_count(&self, id: ProcessorId) -> Option<usize> {
        self.table.read().iter().find(|entry| entry.id() == id).map(|entry| entry.processed())
    }

    /// The shared provider for results of type `T`, created on first use.
    pub fn result_provider<T: ScanResult>(&self) -> Result<Arc<ResultProvider<T>>, ScanError> {
        Ok(self.hub.provider::<T>()?)
    }

    /// The hub every registered processor forwards into.
    #[must_use]
    pub const fn results(&self) -> &ResultHub {
        &self.hub
    }

    /// Scans every module linked into the process.
    pub fn scan(&self, options: &ScanOptions) -> Result<ScanSummary, ScanError> {
        self.scan_modules(linked_modules(), options)
    }

    /// Scans a caller-provided set of modules.
    pub fn scan_modules(&self, modules: &[Arc<Module>], options: &ScanOptions) -> Result<ScanSummary, ScanError> {
        let table = self.snapshot();
        let scan = ScanContext::new(options, None);
        let mut summary = ScanSummary::default();

        for module in modules {
            walk_module(&table, module, &scan, &mut summary)?;
        }
        log_summary("modules", &summary);
        Ok(summary)
    }

    pub fn scan_module(&self, module: &Module, options: &ScanOptions) -> Result<ScanSummary, ScanError> {
        let table = self.snapshot();
        let scan = ScanContext::new(options, None);
        let mut summary = ScanSummary::default();

        walk_module(&table, module, &scan, &mut summary)?;
        log_summary(module.name(), &summary);
        Ok(summary)
    }

    /// Dispatches the markers of `ty` itself, then each of its members.
    pub fn scan_type(&self, ty: &TypeInfo, options: &ScanOptions) -> Result<ScanSummary, ScanError> {
        let table = self.snapshot();
        let scan = ScanContext::new(options, None);
        let mut summary = ScanSummary::default();

        walk_type(&table, ty, &scan, &mut summary)?;
        log_summary(ty.name(), &summary);
        Ok(summary)
    }

    /// Dispatches the markers of a single static member.
    pub fn scan_member(&self, member: &Arc<MemberInfo>, options: &ScanOptions) -> Result<ScanSummary, ScanError> {
        let table = self.snapshot();
        let scan = ScanContext::new(options, None);
        let mut summary = ScanSummary::default();

        walk_member(&table, member, &scan, &mut summary)?;
        Ok(summary)
    }

    /// Scans the instance members of a live object, binding every result to it.
    ///
    /// Scanning the same object again reuses its id, so nothing is processed twice.
    pub fn scan_instance<S: Scannable>(&self, instance: &Arc<S>, options: &ScanOptions) -> Result<BoundInstance, ScanError> {
        let bound = self.bind_instance(instance);
        self.scan_bound(&S::describe(), &bound, options)?;
        Ok(bound)
    }

    /// Scans the instance members of `ty` on behalf of an already bound object.
    pub fn scan_bound(&self, ty: &TypeInfo, bound: &BoundInstance, options: &ScanOptions) -> Result<ScanSummary, ScanError> {
        let table = self.snapshot();
        let scan = ScanContext::new(options, Some(bound));
        let mut summary = ScanSummary::default();

        walk_type(&table, ty, &scan, &mut summary)?;
        debug!(
            ty = ty.name(),
            instance = bound.id(),
            members = summary.members,
            dispatched = summary.dispatched,
            "Instance scanned"
        );
        Ok(summary)
    }

    /// Returns the binding of `instance`, allocating an id the first time it is seen.
    pub fn bind_instance<S: Any + Send + Sync>(&self, instance: &Arc<S>) -> BoundInstance {
        let mut instances = self.instances.lock();
        instances.retain(BoundInstance::is_alive);
        if let Some(known) = instances.iter().find(|bound| bound.refers_to(instance)) {
            return known.clone();
        }
        let bound = BoundInstance::bind(instance);
        instances.push(bound.clone());
        bound
    }

    fn next_processor_id(&self) -> ProcessorId {
        ProcessorId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the forwarding link of `processor`, shared by all its registrations.
    fn link<P: ScanProcessor>(&self, processor: Arc<P>) -> Result<Arc<Forwarding<P>>, ScanError> {
        let key = address(&processor);
        let mut links = self.links.lock();
        links.retain(|_, link| link.strong_count() > 0);

        if let Some(existing) = links.get(&key).and_then(Weak::upgrade)
            && let Ok(link) = existing.downcast::<Forwarding<P>>()
        {
            return Ok(link);
        }

        let link = Arc::new(Forwarding::new(processor, self.hub.provider::<P::Output>()?));
        let erased: Arc<dyn Any + Send + Sync> = Arc::clone(&link) as Arc<dyn Any + Send + Sync>;
        links.insert(key, Arc::downgrade(&erased));
        Ok(link)
    }

    fn install(&self, entry: Arc<dyn Dispatch>) -> ProcessorId {
        let id = entry.id();
        debug!(processor = entry.name(), ?id, "Processor added");
        self.table.write().push(entry);
        id
    }

    fn snapshot(&self) -> DispatchTable {
        self.table.read().clone()
    }
}

fn walk_module(
    table: &[Arc<dyn Dispatch>],
    module: &Module,
    scan: &ScanContext<'_>,
    summary: &mut ScanSummary,
) -> Result<(), ScanError> {
    if !scan.options().matches_module(module.name()) {
        return Ok(());
    }
    summary.modules += 1;
    for ty in module.types() {
        walk_type(table, ty, scan, summary)?;
    }
    Ok(())
}

fn walk_type(
    table: &[Arc<dyn Dispatch>],
    ty: &TypeInfo,
    scan: &ScanContext<'_>,
    summary: &mut ScanSummary,
) -> Result<(), ScanError> {
    if !scan.options().matches_type(ty) {
        return Ok(());
    }
    summary.types += 1;
    for entry in table {
        settle(entry.dispatch_type(ty, scan), scan, summary)?;
    }
    for member in ty.members() {
        walk_member(table, member, scan, summary)?;
    }
    Ok(())
}

fn walk_member(
    table: &[Arc<dyn Dispatch>],
    member: &Arc<MemberInfo>,
    scan: &ScanContext<'_>,
    summary: &mut ScanSummary,
) -> Result<(), ScanError> {
    if !scan.includes(member) {
        return Ok(());
    }
    summary.members += 1;
    for entry in table {
        settle(entry.dispatch_member(member, scan), scan, summary)?;
    }
    Ok(())
}

fn settle(outcome: Result<usize, ScanError>, scan: &ScanContext<'_>, summary: &mut ScanSummary) -> Result<(), ScanError> {
    match outcome {
        Ok(calls) => {
            summary.dispatched += calls;
            Ok(())
        },
        Err(err) if scan.options().isolates_failures() => {
            warn!(error = %err, "Dispatch failed, continuing scan");
            summary.failures += 1;
            Ok(())
        },
        Err(err) => Err(err),
    }
}

fn log_summary(scope: &str, summary: &ScanSummary) {
    debug!(
        scope,
        modules = summary.modules,
        types = summary.types,
        members = summary.members,
        dispatched = summary.dispatched,
        failures = summary.failures,
        "Scan finished"
    );
}
