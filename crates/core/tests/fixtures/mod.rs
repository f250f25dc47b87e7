#![allow(dead_code)]

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tweaker_core::{InvokableMarker, NamedToggleValue, Range, StepSize, Tweak, TweakableMarker};
use tweaker_reflect::{Binding, Member, MemberInfo, Module, Multicast, Scannable, TypeInfo};

pub static SCENARIO_EVENT: Multicast = Multicast::new();

pub static LEVEL: RwLock<i32> = RwLock::new(1);
pub static TITLE: RwLock<String> = RwLock::new(String::new());

#[derive(Debug, thiserror::Error)]
#[error("the player refused")]
pub struct Refused;

/// Holds one static method and one static event.
pub struct Scenario;

pub fn scenario_module() -> Module {
    Module::new("scenario").with_type(
        TypeInfo::builder::<Scenario>("Scenario")
            .member(Member::static_method("run", || {}).marker(InvokableMarker::new("TestMethodStaticVoidVoid")))
            .member(
                Member::static_event("changed", &SCENARIO_EVENT).marker(InvokableMarker::new("TestEventStaticVoidVoid")),
            )
            .build(),
    )
}

/// Type-level invokable marker with one member overriding it.
pub struct Console;

pub fn console_module() -> Module {
    Module::new("console").with_type(
        TypeInfo::builder::<Console>("Console")
            .marker(InvokableMarker::new("console"))
            .member(Member::static_method("clear", || {}))
            .member(
                Member::static_method("add", |a: i32, b: i32| a + b)
                    .parameter_names(["a", "b"])
                    .arg_description(0, "left operand")
                    .return_description("the sum"),
            )
            .member(
                Member::static_method("print", |_: String| {})
                    .marker(InvokableMarker::new("console.print-explicit").with_description("Prints one line")),
            )
            .member(Member::static_method("debug", || {}).non_public())
            .member(Member::method("history", |_: &Console| 0_i32))
            .member(Member::static_field("level", &LEVEL))
            .build(),
    )
}

/// Type-level marker over a storage-less event and a healthy method.
pub struct Group;

pub fn group_module() -> Module {
    Module::new("group").with_type(
        TypeInfo::builder::<Group>("Group")
            .marker(InvokableMarker::new("group"))
            .member(Member::event_without_storage("a_broken", Binding::Static))
            .member(Member::static_method("b_fine", || 7_i32))
            .build(),
    )
}

/// Members every factory must refuse.
pub struct Broken;

pub fn broken_type() -> TypeInfo {
    TypeInfo::builder::<Broken>("Broken")
        .member(Member::event_without_storage("detached", Binding::Static))
        .member(Member::static_field("level", &LEVEL))
        .member(Member::static_field("title", &TITLE))
        .member(Member::method("instance_only", |_: &Broken| {}))
        .build()
}

pub fn broken(name: &str) -> Arc<MemberInfo> {
    Arc::clone(broken_type().member(name).unwrap())
}

#[derive(Debug)]
pub struct Player {
    pub health: RwLock<i32>,
    pub quality: RwLock<i32>,
    pub speed: Tweak<f32>,
    pub hit: Multicast,
}

impl Player {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { health: RwLock::new(50), quality: RwLock::new(0), speed: Tweak::new(1.0), hit: Multicast::new() })
    }
}

impl Scannable for Player {
    fn describe() -> TypeInfo {
        TypeInfo::builder::<Self>("Player")
            .member(
                Member::field("health", |p: &Self| &p.health)
                    .marker(TweakableMarker::new("player.health").with_description("Hit points"))
                    .marker(Range::new(0, 100))
                    .marker(StepSize::new(10)),
            )
            .member(
                Member::field("quality", |p: &Self| &p.quality)
                    .marker(TweakableMarker::new("player.quality"))
                    .marker(NamedToggleValue::new("hundred", 100, 2))
                    .marker(NamedToggleValue::new("zero", 0, 0))
                    .marker(NamedToggleValue::new("eleven", 11, 1)),
            )
            .member(
                Tweak::member("speed", |p: &Self| &p.speed)
                    .marker(TweakableMarker::new("player.speed"))
                    .marker(Range::new(0.0_f32, 2.0_f32)),
            )
            .member(
                Member::method("heal", |p: &Self, amount: i32| {
                    let mut health = p.health.write();
                    *health += amount;
                    *health
                })
                .marker(InvokableMarker::new("player.heal")),
            )
            .member(
                Member::method("refuse", |_: &Self| -> Result<i32, Refused> { Err(Refused) })
                    .marker(InvokableMarker::new("player.refuse")),
            )
            .member(Member::event("hit", |p: &Self| &p.hit).marker(InvokableMarker::new("player.hit")))
            .build()
    }
}

/// Name of an instance-bound object.
pub fn bound(name: &str, id: u64) -> String {
    format!("{name}#{id}")
}

pub fn counter() -> Arc<Mutex<usize>> {
    Arc::new(Mutex::new(0))
}
