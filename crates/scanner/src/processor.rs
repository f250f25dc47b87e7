//! Processor capabilities the scanner dispatches to.
//!
//! A processor implements [`ScanProcessor`] once and then any number of the capability
//! traits. Each capability is registered separately with the
//! [`Scanner`](crate::Scanner), which wraps it in an idempotent, type-erased adapter.

use crate::options::ScanOptions;
use std::any::Any;
use std::sync::Arc;
use tweaker_events::{ResultProvider, ScanResult};
use tweaker_reflect::{BoundInstance, Marker, MemberInfo, MemberKind, TypeInfo};

/// Shared part of every processor: what it produces and how it fails.
pub trait ScanProcessor: Send + Sync + 'static {
    type Output: ScanResult;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Channel the processor publishes its results on. The scanner forwards it into
    /// its own per-type provider while the processor is registered.
    fn results(&self) -> &ResultProvider<Self::Output>;
}

/// Handles markers of type `M`, found either on a type or on a member.
pub trait AttributeProcessor<M: Marker>: ScanProcessor {
    fn process_type_marker(&self, marker: &M, ty: &TypeInfo, scan: &ScanContext<'_>) -> Result<(), Self::Error>;

    fn process_member_marker(
        &self,
        marker: &M,
        member: &Arc<MemberInfo>,
        scan: &ScanContext<'_>,
    ) -> Result<(), Self::Error>;
}

/// Handles every type that is `I` or declares `I` as a base. No marker is required.
pub trait TypeProcessor<I: ?Sized + Any>: ScanProcessor {
    fn process_type(&self, ty: &TypeInfo, scan: &ScanContext<'_>) -> Result<(), Self::Error>;
}

/// Handles every member of the kind named by `K`. No marker is required.
pub trait MemberProcessor<K: KindTag>: ScanProcessor {
    fn process_member(&self, member: &Arc<MemberInfo>, scan: &ScanContext<'_>) -> Result<(), Self::Error>;
}

/// Static tag naming a [`MemberKind`] at the type level.
pub trait KindTag: Send + Sync + 'static {
    const KIND: MemberKind;
}

/// Tags for [`MemberProcessor`].
pub mod kinds {
    use super::KindTag;
    use tweaker_reflect::MemberKind;

    #[derive(Debug, Clone, Copy)]
    pub struct Methods;
    #[derive(Debug, Clone, Copy)]
    pub struct Fields;
    #[derive(Debug, Clone, Copy)]
    pub struct Properties;
    #[derive(Debug, Clone, Copy)]
    pub struct Events;

    impl KindTag for Methods {
        const KIND: MemberKind = MemberKind::Method;
    }
    impl KindTag for Fields {
        const KIND: MemberKind = MemberKind::Field;
    }
    impl KindTag for Properties {
        const KIND: MemberKind = MemberKind::Property;
    }
    impl KindTag for Events {
        const KIND: MemberKind = MemberKind::Event;
    }
}

/// What a processor knows about the scan that reached it.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext<'a> {
    options: &'a ScanOptions,
    instance: Option<&'a BoundInstance>,
}

impl<'a> ScanContext<'a> {
    #[must_use]
    pub const fn new(options: &'a ScanOptions, instance: Option<&'a BoundInstance>) -> Self {
        Self { options, instance }
    }

    #[must_use]
    pub const fn options(&self) -> &'a ScanOptions {
        self.options
    }

    /// The instance being scanned, `None` for static module scans.
    #[must_use]
    pub const fn instance(&self) -> Option<&'a BoundInstance> {
        self.instance
    }

    /// Whether `member` takes part in this scan: static scans see static members,
    /// instance scans see instance members, and the member filters must match.
    #[must_use]
    pub fn includes(&self, member: &MemberInfo) -> bool {
        member.is_static() == self.instance.is_none() && self.options.matches_member(member)
    }
}
