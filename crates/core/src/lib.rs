//! # Tweaker core
//!
//! Domain objects built from scanned metadata, and the registries that hold them.
//!
//! ## Overview
//!
//! * [`Invokable`]: a callable method or event, invoked with [`Value`](tweaker_reflect::Value) arguments.
//! * [`Tweakable`]: a readable and writable value, optionally limited by a [`Range`],
//!   stepped by a [`StepSize`] or cycled through [`NamedToggleValue`]s.
//!
//! Objects are produced by the [`InvokableProcessor`] and [`TweakableProcessor`] when a
//! [`Scanner`](tweaker_scanner::Scanner) finds an [`InvokableMarker`] or [`TweakableMarker`],
//! or built by hand through the factories. A [`Manager`] stores one kind of object in a
//! [`Registry`], keyed by name. Objects bound to an instance are named `name#id` and
//! go stale, then get pruned, once the instance is dropped.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tweaker_core::{InvokableManager, InvokableMarker};
//! use tweaker_reflect::{Member, Module, Multicast, TypeInfo};
//! use tweaker_scanner::{ScanOptions, Scanner};
//!
//! static CHANGED: Multicast = Multicast::new();
//!
//! struct Tests;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let module = Module::new("tests").with_type(
//!     TypeInfo::builder::<Tests>("Tests")
//!         .member(Member::static_method("run", || {}).marker(InvokableMarker::new("TestMethodStaticVoidVoid")))
//!         .member(Member::static_event("changed", &CHANGED).marker(InvokableMarker::new("TestEventStaticVoidVoid")))
//!         .build(),
//! );
//!
//! let scanner = Arc::new(Scanner::new());
//! let invokables = InvokableManager::new().attach(&scanner)?;
//! scanner.scan_module(&module, &ScanOptions::default())?;
//!
//! assert_eq!(invokables.get_invokables(None).len(), 2);
//! assert!(invokables.get_invokable("TestMethodStaticVoidVoid").is_some());
//! # Ok(())
//! # }
//! ```

mod auto;
mod error;
mod factory;
mod holder;
mod invokable;
mod manager;
mod markers;
mod object;
mod processor;
mod registry;
mod search;
mod tweakable;

pub use auto::AutoScan;
pub use error::{TweakerError, TweakerErrorExt};
pub use factory::{InvokableFactory, MANUAL_MODULE, TweakableFactory};
pub use holder::{HolderLink, Tweak};
pub use invokable::Invokable;
pub use manager::{InvokableManager, Managed, Manager, TweakableManager};
pub use markers::{InvokableMarker, NamedToggleValue, Range, StepSize, ToggleValue, TweakableMarker};
pub use object::{ObjectInfo, TweakerObject};
pub use processor::{InvokableProcessor, TweakableProcessor};
pub use registry::Registry;
pub use search::SearchOptions;
pub use tweakable::{Tweakable, UNKNOWN_TOGGLE_NAME};
