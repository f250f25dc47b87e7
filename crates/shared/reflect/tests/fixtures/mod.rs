use parking_lot::RwLock;
use std::cmp::Ordering;
use tweaker_reflect::{Member, Multicast, Scannable, TweakValue, TypeInfo, Value, ValueKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Label(pub &'static str);

tweaker_reflect::custom_value!(Label);

/// Distance in whole metres, ordered and steppable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Metres(pub u32);

impl TweakValue for Metres {
    const ORDERED: bool = true;
    const STEPPABLE: bool = true;

    fn kind() -> ValueKind {
        ValueKind::custom::<Self>()
    }

    fn into_value(self) -> Value {
        Value::custom(self)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        value.take_custom::<Self>()
    }

    fn ordinal_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn step_add(&self, step: &Self) -> Option<Self> {
        Some(Self(self.0.saturating_add(step.0)))
    }

    fn step_sub(&self, step: &Self) -> Option<Self> {
        Some(Self(self.0.saturating_sub(step.0)))
    }
}

#[derive(Debug)]
pub struct Group;

#[derive(Debug)]
pub struct Gauge {
    pub level: RwLock<i32>,
    pub label: RwLock<String>,
    pub fired: Multicast,
}

impl Gauge {
    pub fn new(level: i32) -> Self {
        Self { level: RwLock::new(level), label: RwLock::new(String::from("gauge")), fired: Multicast::new() }
    }
}

pub static GLOBAL_LEVEL: RwLock<i64> = RwLock::new(3);
pub static GLOBAL_TICK: Multicast = Multicast::new();

impl Scannable for Gauge {
    fn describe() -> TypeInfo {
        TypeInfo::builder::<Self>("Gauge")
            .base::<Group>()
            .marker("gauge-marker")
            .member(Member::field("level", |p: &Gauge| &p.level))
            .member(Member::field("label", |p: &Gauge| &p.label).non_public())
            .member(
                Member::method("scale", |p: &Gauge, factor: i32| *p.level.read() * factor)
                    .parameter_names(["factor"])
                    .arg_description(0, "multiplier")
                    .return_description("scaled level"),
            )
            .member(Member::static_method("answer", || 42_u8))
            .member(Member::static_field("global_level", &GLOBAL_LEVEL))
            .member(Member::readonly_property("doubled", |p: &Gauge| *p.level.read() * 2))
            .member(Member::event("fired", |p: &Gauge| &p.fired).parameter("amount", ValueKind::I32).returns(ValueKind::I32))
            .member(Member::static_event("tick", &GLOBAL_TICK))
            .build()
    }
}
