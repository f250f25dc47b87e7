//! # Tweaker
//!
//! Declare methods, events and values of your program as remotely invokable or
//! tweakable, then discover and register them with one scan.
//!
//! * Metadata: [`TypeInfo`] and [`Member`] builders carry markers such as
//!   [`InvokableMarker`], [`TweakableMarker`], [`Range`], [`StepSize`] and
//!   [`NamedToggleValue`]. [`tweaker_module!`] links a module into the process.
//! * Discovery: a [`Tweaker`] owns a [`Scanner`] and feeds the
//!   [`InvokableManager`] and [`TweakableManager`] it scans for.
//! * Ambient: [`config::load_config`] reads a [`config::TweakerConfig`] and
//!   [`logging::init`] installs a `tracing` subscriber.
//!
//! ## Example
//!
//! ```rust
//! use parking_lot::RwLock;
//! use std::sync::Arc;
//! use tweaker::{Member, Range, ScanOptions, Scannable, Tweaker, TweakerOptions, TweakableMarker, TypeInfo, Value};
//!
//! struct Camera {
//!     fov: RwLock<f32>,
//! }
//!
//! impl Scannable for Camera {
//!     fn describe() -> TypeInfo {
//!         TypeInfo::builder::<Self>("Camera")
//!             .member(
//!                 Member::field("fov", |camera: &Self| &camera.fov)
//!                     .marker(TweakableMarker::new("camera.fov"))
//!                     .marker(Range::new(30.0_f32, 120.0_f32)),
//!             )
//!             .build()
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tweaker = Tweaker::new(TweakerOptions::ALL)?;
//! let camera = Arc::new(Camera { fov: RwLock::new(60.0) });
//!
//! let guard = tweaker.auto_scan(&camera, &ScanOptions::default())?;
//! let name = &guard.tweakable_names()[0];
//! tweaker.set_value(name, Value::F32(500.0))?;
//! assert_eq!(tweaker.get_value(name)?, Value::F32(120.0));
//!
//! drop(guard);
//! assert!(tweaker.tweakables().get_tweakables(None).is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
mod context;
pub mod logging;

pub use context::{Tweaker, TweakerOptions};

pub use tweaker_core::{
    AutoScan, Invokable, InvokableFactory, InvokableManager, InvokableMarker, InvokableProcessor, MANUAL_MODULE,
    Managed, Manager, NamedToggleValue, ObjectInfo, Range, Registry, SearchOptions, StepSize, ToggleValue, Tweak,
    Tweakable, TweakableFactory, TweakableManager, TweakableMarker, TweakableProcessor, TweakerError,
    TweakerErrorExt, TweakerObject, UNKNOWN_TOGGLE_NAME,
};
pub use tweaker_events::{HandlerError, ResultHub, ResultProvider, SubscriptionId};
pub use tweaker_reflect::{
    AnyMarker, Binding, BoundInstance, CallError, Marker, Member, MemberInfo, MemberKind, Module, Multicast, Scannable,
    TweakValue, TypeInfo, Value, ValueKind, custom_value, tweaker_module,
};
pub use tweaker_scanner::{BindingFilter, ScanError, ScanOptions, ScanSummary, Scanner, Scope};
