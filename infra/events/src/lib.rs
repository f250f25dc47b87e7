//! # Result Events
//!
//! Synchronous, type-safe result fan-out used by the scanner and the managers that
//! consume scan output.
//!
//! ## Overview
//!
//! A [`ResultProvider<T>`] is a list of subscribers for one result type. Publishing calls
//! each subscriber in-line, in subscription order, on the publishing thread. A
//! [`ResultHub`] owns one provider per result type, keyed by [`std::any::TypeId`], so
//! independent components can meet on a shared type without knowing about each other.
//!
//! ## Features
//!
//! * **Type-Safe**: results are identified by their Rust type.
//! * **Synchronous**: a publish returns only after every subscriber ran.
//! * **Re-entrant**: subscribers may subscribe or unsubscribe while being called.
//! * **Fast**: `FxHashMap` + `parking_lot::RwLock`.
//!
//! # Example
//!
//! ```rust
//! use tweaker_events::{HandlerError, ResultHub};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! #[derive(Debug)]
//! struct Found(u32);
//!
//! # fn main() -> Result<(), HandlerError> {
//! let hub = ResultHub::new();
//! let seen = Arc::new(AtomicU32::new(0));
//!
//! let sink = Arc::clone(&seen);
//! hub.provider::<Found>()?.subscribe(move |found| {
//!     sink.store(found.0, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! assert_eq!(hub.publish(&Found(42))?, 1);
//! assert_eq!(seen.load(Ordering::SeqCst), 42);
//! # Ok(())
//! # }
//! ```

mod error;
mod hub;
mod provider;

pub use error::{BoxError, HandlerError, HandlerErrorExt};
pub use hub::{ResultHub, ScanResult};
pub use provider::{Handler, ResultProvider, SubscriptionId};
