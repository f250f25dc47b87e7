#![allow(dead_code)]

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tweaker_events::{HandlerError, ResultProvider};
use tweaker_reflect::{Member, MemberInfo, Module, Scannable, TypeInfo};
use tweaker_scanner::{
    AttributeProcessor, MemberProcessor, ScanContext, ScanProcessor, TypeProcessor, kinds,
};

/// Marker used by every fixture type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag(pub &'static str);

/// Marker nobody processes.
#[derive(Debug)]
pub struct Ignored;

pub trait Widget {}

/// What the recording processor saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub name: String,
    pub instance: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
#[error("cannot process {0}")]
pub struct Broken(pub String);

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Broken(#[from] Broken),
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Publishes one [`Seen`] per processed marker and fails on members named `broken`.
///
/// Type markers expand to every member without its own [`Tag`], named
/// `<type tag>.<member>`.
#[derive(Debug, Default)]
pub struct Recorder {
    results: ResultProvider<Seen>,
    pub calls: Mutex<Vec<String>>,
}

impl Recorder {
    fn emit(&self, name: String, scan: &ScanContext<'_>) -> Result<(), FixtureError> {
        self.calls.lock().push(name.clone());
        self.results.publish(&Seen { name, instance: scan.instance().map(|bound| bound.id()) })?;
        Ok(())
    }
}

impl ScanProcessor for Recorder {
    type Output = Seen;
    type Error = FixtureError;

    fn results(&self) -> &ResultProvider<Seen> {
        &self.results
    }
}

impl AttributeProcessor<Tag> for Recorder {
    fn process_type_marker(&self, marker: &Tag, ty: &TypeInfo, scan: &ScanContext<'_>) -> Result<(), FixtureError> {
        for member in ty.members() {
            let explicit = member.markers().iter().any(|m| m.is::<Tag>());
            if !explicit && scan.includes(member) {
                self.emit(format!("{}.{}", marker.0, member.name()), scan)?;
            }
        }
        Ok(())
    }

    fn process_member_marker(
        &self,
        marker: &Tag,
        member: &Arc<MemberInfo>,
        scan: &ScanContext<'_>,
    ) -> Result<(), FixtureError> {
        if member.name() == "broken" {
            self.calls.lock().push(marker.0.to_owned());
            return Err(Broken(member.qualified_name()).into());
        }
        self.emit(marker.0.to_owned(), scan)
    }
}

impl TypeProcessor<dyn Widget> for Recorder {
    fn process_type(&self, ty: &TypeInfo, scan: &ScanContext<'_>) -> Result<(), FixtureError> {
        self.emit(format!("widget:{}", ty.name()), scan)
    }
}

impl MemberProcessor<kinds::Methods> for Recorder {
    fn process_member(&self, member: &Arc<MemberInfo>, scan: &ScanContext<'_>) -> Result<(), FixtureError> {
        self.emit(format!("method:{}", member.qualified_name()), scan)
    }
}

/// Collects everything forwarded into a scanner's `Seen` provider.
pub fn collect(provider: &ResultProvider<Seen>) -> Arc<Mutex<Vec<Seen>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    provider.subscribe(move |result| {
        sink.lock().push(result.clone());
        Ok(())
    });
    seen
}

pub fn names(seen: &Mutex<Vec<Seen>>) -> Vec<String> {
    let mut names: Vec<String> = seen.lock().iter().map(|s| s.name.clone()).collect();
    names.sort();
    names
}

#[derive(Debug, Default)]
pub struct Panel {
    pub width: RwLock<u32>,
}

impl Widget for Panel {}

impl Scannable for Panel {
    fn describe() -> TypeInfo {
        TypeInfo::builder::<Self>("Panel")
            .base::<dyn Widget>()
            .member(Member::static_method("refresh", || {}).marker(Tag("panel.refresh")))
            .member(Member::static_method("reset", || {}).non_public().marker(Tag("panel.reset")))
            .member(Member::field("width", |p: &Self| &p.width).marker(Tag("panel.width")))
            .member(Member::method("secret", |_: &Self| 1_u8).non_public().marker(Tag("panel.secret")))
            .member(Member::method("resize", |p: &Self, w: u32| *p.width.write() = w).marker(Ignored))
            .build()
    }
}

#[derive(Debug, Default)]
pub struct Toolbar {
    pub height: RwLock<u32>,
}

impl Scannable for Toolbar {
    fn describe() -> TypeInfo {
        TypeInfo::builder::<Self>("Toolbar")
            .marker(Tag("Toolbar"))
            .member(Member::field("height", |t: &Self| &t.height))
            .member(Member::static_method("pin", || true).marker(Tag("toolbar.pin-explicit")))
            .member(Member::static_method("hide", || {}))
            .build()
    }
}

pub struct Faulty;

impl Scannable for Faulty {
    fn describe() -> TypeInfo {
        TypeInfo::builder::<Self>("Faulty")
            .member(Member::static_method("broken", || {}).marker(Tag("faulty.broken")))
            .member(Member::static_method("fine", || {}).marker(Tag("faulty.fine")))
            .build()
    }
}

pub fn ui_module() -> Module {
    Module::new("ui").with_type(Panel::describe()).with_type(Toolbar::describe())
}

pub fn faulty_module() -> Module {
    Module::new("faulty").with_type(Faulty::describe())
}
