//! # Scanner
//!
//! Walks [`tweaker_reflect`] metadata and dispatches matches to pluggable processors.
//!
//! ## Overview
//!
//! A [`Scanner`] holds a dispatch table of processor registrations. Three capabilities
//! exist:
//!
//! * [`AttributeProcessor<M>`]: called for every marker of type `M` on a type or member.
//! * [`TypeProcessor<I>`]: called for every type that is, or declares as base, `I`.
//! * [`MemberProcessor<K>`]: called for every member of a given kind.
//!
//! Each registration is wrapped in an adapter that records what it already processed,
//! so repeated scans never dispatch the same match to the same registration twice.
//! Processors publish on their own [`ResultProvider`](tweaker_events::ResultProvider);
//! the scanner forwards those results into a shared [`ResultHub`](tweaker_events::ResultHub)
//! where consumers subscribe by result type.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tweaker_events::{HandlerError, ResultProvider};
//! use tweaker_reflect::{Member, MemberInfo, Module, TypeInfo};
//! use tweaker_scanner::{AttributeProcessor, ScanContext, ScanOptions, ScanProcessor, Scanner};
//!
//! #[derive(Debug)]
//! struct Exposed;
//!
//! #[derive(Default)]
//! struct Names(ResultProvider<String>);
//!
//! impl ScanProcessor for Names {
//!     type Output = String;
//!     type Error = HandlerError;
//!
//!     fn results(&self) -> &ResultProvider<String> {
//!         &self.0
//!     }
//! }
//!
//! impl AttributeProcessor<Exposed> for Names {
//!     fn process_type_marker(&self, _: &Exposed, _: &TypeInfo, _: &ScanContext<'_>) -> Result<(), HandlerError> {
//!         Ok(())
//!     }
//!
//!     fn process_member_marker(&self, _: &Exposed, member: &Arc<MemberInfo>, _: &ScanContext<'_>) -> Result<(), HandlerError> {
//!         self.0.publish(&member.qualified_name()).map(|_| ())
//!     }
//! }
//!
//! struct Door;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let module = Module::new("demo").with_type(
//!     TypeInfo::builder::<Door>("Door")
//!         .member(Member::<Door>::static_method("open", || {}).marker(Exposed))
//!         .build(),
//! );
//!
//! let scanner = Scanner::new();
//! scanner.add_attribute_processor::<Exposed, _>(Arc::new(Names::default()))?;
//!
//! let found = Arc::new(parking_lot::Mutex::new(Vec::new()));
//! let sink = Arc::clone(&found);
//! scanner.result_provider::<String>()?.subscribe(move |name| {
//!     sink.lock().push(name.clone());
//!     Ok(())
//! });
//!
//! scanner.scan_module(&module, &ScanOptions::default())?;
//! scanner.scan_module(&module, &ScanOptions::default())?;
//! assert_eq!(*found.lock(), vec!["Door.open".to_owned()]);
//! # Ok(())
//! # }
//! ```

mod error;
mod options;
mod processor;
mod scanner;
mod wrapper;

pub use error::{BoxError, ScanError, ScanErrorExt};
pub use options::{BindingFilter, ScanOptions, Scope};
pub use processor::{AttributeProcessor, KindTag, MemberProcessor, ScanContext, ScanProcessor, TypeProcessor, kinds};
pub use scanner::{ScanSummary, Scanner};
pub use wrapper::ProcessorId;
