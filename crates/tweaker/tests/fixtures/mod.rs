#![allow(dead_code)]

use parking_lot::RwLock;
use std::sync::Arc;
use tweaker::{
    InvokableMarker, Member, Multicast, NamedToggleValue, Range, Scannable, StepSize, ToggleValue, TweakableMarker,
    TypeInfo,
};

pub static RESTOCKED: Multicast = Multicast::new();

/// A shop with static inventory controls and per-instance prices.
#[derive(Debug)]
pub struct Shop {
    pub price: RwLock<u32>,
    pub discount: RwLock<i32>,
    pub open: RwLock<bool>,
}

impl Shop {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { price: RwLock::new(10), discount: RwLock::new(0), open: RwLock::new(true) })
    }
}

impl Scannable for Shop {
    fn describe() -> TypeInfo {
        TypeInfo::builder::<Self>("Shop")
            .marker(InvokableMarker::new("shop"))
            .member(Member::static_method("restock", |count: u32| count))
            .member(Member::static_event("restocked", &RESTOCKED))
            .member(Member::method("close", |shop: &Self| *shop.open.write() = false))
            .member(
                Member::field("price", |shop: &Self| &shop.price)
                    .marker(TweakableMarker::new("shop.price"))
                    .marker(Range::new(1_u32, 99_u32))
                    .marker(StepSize::new(5_u32)),
            )
            .member(
                Member::field("discount", |shop: &Self| &shop.discount)
                    .marker(TweakableMarker::new("shop.discount"))
                    .marker(ToggleValue::new(0, 0))
                    .marker(ToggleValue::new(10, 1))
                    .marker(NamedToggleValue::new("half", 50, 2)),
            )
            .build()
    }
}

tweaker::tweaker_module!("linked-shop" => [Shop]);
