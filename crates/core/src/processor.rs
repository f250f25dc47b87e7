//! The two production processors.
//!
//! Both handle their marker on members and on types. A type marker expands to every
//! eligible member of the type that takes part in the scan and has no marker of its
//! own, named `<type marker>.<member>`.

use crate::error::TweakerError;
use crate::factory::{InvokableFactory, TweakableFactory};
use crate::holder::link_holder;
use crate::invokable::Invokable;
use crate::markers::{InvokableMarker, TweakableMarker};
use crate::object::TweakerObject;
use crate::tweakable::Tweakable;
use std::sync::Arc;
use tracing::{trace, warn};
use tweaker_events::ResultProvider;
use tweaker_reflect::{AnyMarker, Marker, MemberInfo, MemberKind, TypeInfo};
use tweaker_scanner::{AttributeProcessor, ScanContext, ScanProcessor};

/// Turns [`InvokableMarker`]s on methods and events into [`Invokable`]s.
#[derive(Debug, Default)]
pub struct InvokableProcessor {
    results: ResultProvider<Arc<Invokable>>,
}

impl ScanProcessor for InvokableProcessor {
    type Output = Arc<Invokable>;
    type Error = TweakerError;

    fn results(&self) -> &ResultProvider<Arc<Invokable>> {
        &self.results
    }
}

impl AttributeProcessor<InvokableMarker> for InvokableProcessor {
    fn process_type_marker(
        &self,
        marker: &InvokableMarker,
        ty: &TypeInfo,
        scan: &ScanContext<'_>,
    ) -> Result<(), TweakerError> {
        let members = expansion::<InvokableMarker>(ty, scan, &[MemberKind::Method, MemberKind::Event]);
        expand_each(members, scan, |member| self.process_member_marker(&marker.for_member(member.name()), member, scan))
    }

    fn process_member_marker(
        &self,
        marker: &InvokableMarker,
        member: &Arc<MemberInfo>,
        scan: &ScanContext<'_>,
    ) -> Result<(), TweakerError> {
        let invokable = Arc::new(InvokableFactory::from_member(marker, member, scan.instance())?);
        publish(&self.results, member, invokable)
    }
}

/// Turns [`TweakableMarker`]s on fields and properties into [`Tweakable`]s.
#[derive(Debug, Default)]
pub struct TweakableProcessor {
    results: ResultProvider<Arc<Tweakable>>,
}

impl ScanProcessor for TweakableProcessor {
    type Output = Arc<Tweakable>;
    type Error = TweakerError;

    fn results(&self) -> &ResultProvider<Arc<Tweakable>> {
        &self.results
    }
}

impl AttributeProcessor<TweakableMarker> for TweakableProcessor {
    fn process_type_marker(
        &self,
        marker: &TweakableMarker,
        ty: &TypeInfo,
        scan: &ScanContext<'_>,
    ) -> Result<(), TweakerError> {
        let members = expansion::<TweakableMarker>(ty, scan, &[MemberKind::Field, MemberKind::Property]);
        expand_each(members, scan, |member| self.process_member_marker(&marker.for_member(member.name()), member, scan))
    }

    fn process_member_marker(
        &self,
        marker: &TweakableMarker,
        member: &Arc<MemberInfo>,
        scan: &ScanContext<'_>,
    ) -> Result<(), TweakerError> {
        let tweakable = Arc::new(TweakableFactory::from_member(marker, member, scan.instance(), None)?);
        link_holder(member, &tweakable)?;
        publish(&self.results, member, tweakable)
    }
}

/// Members of `ty` a type-level `M` expands to.
fn expansion<'a, M: Marker>(
    ty: &'a TypeInfo,
    scan: &'a ScanContext<'_>,
    kinds: &'a [MemberKind],
) -> impl Iterator<Item = &'a Arc<MemberInfo>> {
    ty.members().iter().filter(move |member| {
        kinds.contains(&member.kind())
            && scan.includes(member)
            && !member.markers().iter().any(AnyMarker::is::<M>)
    })
}

/// Runs `process` over an expansion. With isolated failures every member is
/// attempted and the first error is returned afterwards.
fn expand_each<'a>(
    members: impl Iterator<Item = &'a Arc<MemberInfo>>,
    scan: &ScanContext<'_>,
    mut process: impl FnMut(&Arc<MemberInfo>) -> Result<(), TweakerError>,
) -> Result<(), TweakerError> {
    let mut first_error = None;
    for member in members {
        match process(member) {
            Ok(()) => {},
            Err(err) if scan.options().isolates_failures() => {
                warn!(member = %member.qualified_name(), error = %err, "Type marker expansion failed for member");
                first_error.get_or_insert(err);
            },
            Err(err) => return Err(err),
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn publish<O: TweakerObject>(
    results: &ResultProvider<Arc<O>>,
    member: &MemberInfo,
    object: Arc<O>,
) -> Result<(), TweakerError> {
    trace!(result = object.name(), member = %member.qualified_name(), "Publishing");
    results.publish(&object).map_err(|err| TweakerError::processor(member.qualified_name(), err))?;
    Ok(())
}
