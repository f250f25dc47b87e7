//! # Metadata
//!
//! Explicit program metadata for the Tweaker scanner.
//!
//! Rust has no runtime reflection, so everything the scanner walks is declared as
//! data: a [`Module`] holds [`TypeInfo`]s, a type holds markers and [`MemberInfo`]s,
//! and every member carries an erased accessor that speaks [`Value`].
//!
//! ## Pieces
//!
//! * [`Value`] / [`ValueKind`] / [`TweakValue`]: the closed value model.
//! * [`AnyMarker`]: type-erased declarative markers keyed by `TypeId`.
//! * [`Member`] / [`TypeInfo::builder`]: fluent metadata declaration.
//! * [`BoundInstance`]: weak, id-tagged reference to a live object.
//! * [`Multicast`]: the backing list of an event.
//! * [`tweaker_module!`]: link-time module registration via `inventory`.

mod error;
mod instance;
mod marker;
mod member;
mod method;
mod module;
mod multicast;
mod scannable;
mod types;
mod value;

pub use error::{BoxError, CallError, CallErrorExt};
pub use instance::{BoundInstance, Instance, receiver};
pub use marker::{AnyMarker, Marker, marker_of, markers_of};
pub use member::{
    Accessor, Binding, EventAccessor, FieldAccessor, GetFn, Getter, Member, MemberInfo, MemberKind,
    MethodAccessor, Parameter, PropertyAccessor, SetFn, Setter, StorageFn, Visibility, get_fn, set_fn,
};
pub use method::{IntoInstanceMethod, IntoMethod, IntoReturn, MethodFn, erase_static};
pub use module::{Module, ModuleReg, linked_modules};
pub use multicast::{HandlerId, Multicast};
pub use scannable::Scannable;
pub use types::{TypeBuilder, TypeInfo, TypeKey};
pub use value::{CustomKind, CustomValue, TweakValue, Value, ValueKind};

#[doc(hidden)]
pub use inventory;
