#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the Tweaker crates.
//!
//! Only one macro lives here today: [`macro@tweaker_error`], which every crate in the
//! workspace uses to declare its error enum. Keeping it in one place means every error
//! exposes the same `.context(...)` ergonomics and the same stable `kind()` tags that
//! remote clients match on.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring a crate's error enum.
///
/// # Injected Behaviors
///
/// * **Derives**: adds `Debug` and `thiserror::Error` unless already derived.
/// * **Context**: generates a companion `<Name>Ext` trait whose `.context(...)` attaches a
///   human readable note to any `Result<T, Name>` (and to results of wrapped source errors).
/// * **Conversions**: `From<Source>` for variants that hold only `source` and `context`,
///   so `?` works on upstream errors.
/// * **Internal fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
/// * **Kinds**: `kind()` returns the `snake_case` variant name as a `&'static str`.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants with a `source` (or `#[source]`/`#[from]`) field must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[tweaker_derive::tweaker_error]
/// pub enum RegistryError {
///     #[error("Name '{name}' is already in use{}", format_context(.context))]
///     NameTaken { name: String, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// let err: RegistryError = "unexpected state".into();
/// assert_eq!(err.kind(), "internal");
/// ```
#[proc_macro_attribute]
pub fn tweaker_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
