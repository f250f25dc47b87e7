//! The closed value model every accessor speaks.
//!
//! Values cross the erased member boundary as [`Value`]. The set of variants is fixed;
//! anything that is not a primitive travels as [`Value::Custom`], a shared boxed payload
//! that remembers its concrete type.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Unit,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    Custom(CustomKind),
}

/// Identity and capabilities of a user-defined value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomKind {
    id: TypeId,
    name: &'static str,
    ordered: bool,
    steppable: bool,
}

impl CustomKind {
    #[must_use]
    pub fn of<T: TweakValue>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            ordered: T::ORDERED,
            steppable: T::STEPPABLE,
        }
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl ValueKind {
    /// Tag for a custom type. Use this from a hand-written [`TweakValue::kind`].
    #[must_use]
    pub fn custom<T: TweakValue>() -> Self {
        Self::Custom(CustomKind::of::<T>())
    }

    /// Whether values of this kind have an ordinal comparison, required by range clamping.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        match self {
            Self::Unit => false,
            Self::Custom(custom) => custom.ordered,
            _ => true,
        }
    }

    /// Whether values of this kind support step addition and subtraction.
    #[must_use]
    pub const fn is_steppable(&self) -> bool {
        match self {
            Self::I8
            | Self::I16
            | Self::I32
            | Self::I64
            | Self::U8
            | Self::U16
            | Self::U32
            | Self::U64
            | Self::F32
            | Self::F64 => true,
            Self::Custom(custom) => custom.steppable,
            _ => false,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unit => "()",
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "String",
            Self::Custom(custom) => custom.name,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed value crossing the erased accessor boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Custom(CustomValue),
}

macro_rules! ordinal_arms {
    ($pair:expr, [$($variant:ident),*]) => {
        match $pair {
            $((Self::$variant(a), Self::$variant(b)) => a.ordinal_cmp(b),)*
            (Self::Custom(a), Self::Custom(b)) => a.ordinal_cmp(b),
            _ => None,
        }
    };
}

macro_rules! step_arms {
    ($pair:expr, $op:ident, [$($variant:ident),*]) => {
        match $pair {
            $((Self::$variant(a), Self::$variant(b)) => a.$op(b).map(Self::$variant),)*
            (Self::Custom(a), Self::Custom(b)) => a.$op(b).map(Self::Custom),
            _ => None,
        }
    };
}

impl Value {
    /// Boxes a custom value.
    #[must_use]
    pub fn custom<T: TweakValue>(value: T) -> Self {
        Self::Custom(CustomValue(Arc::new(value)))
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Unit => ValueKind::Unit,
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Char(_) => ValueKind::Char,
            Self::String(_) => ValueKind::String,
            Self::Custom(custom) => ValueKind::Custom(custom.kind()),
        }
    }

    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Converts into a concrete type, handing the value back on a kind mismatch.
    pub fn into_typed<T: TweakValue>(self) -> Result<T, Self> {
        T::from_value(self)
    }

    /// Unboxes a custom payload of type `T`.
    pub fn take_custom<T: TweakValue>(self) -> Result<T, Self> {
        match self {
            Self::Custom(custom) => match custom.downcast_ref::<T>() {
                Some(value) => Ok(value.clone()),
                None => Err(Self::Custom(custom)),
            },
            other => Err(other),
        }
    }

    /// Ordinal comparison between two values of the same kind.
    ///
    /// Returns `None` for different kinds, unordered kinds and incomparable floats.
    #[must_use]
    pub fn ordinal_cmp(&self, other: &Self) -> Option<Ordering> {
        ordinal_arms!(
            (self, other),
            [Bool, I8, I16, I32, I64, U8, U16, U32, U64, F32, F64, Char, String]
        )
    }

    /// `self + step`, saturating at the integer bounds.
    #[must_use]
    pub fn step_add(&self, step: &Self) -> Option<Self> {
        step_arms!((self, step), step_add, [I8, I16, I32, I64, U8, U16, U32, U64, F32, F64])
    }

    /// `self - step`, saturating at the integer bounds.
    #[must_use]
    pub fn step_sub(&self, step: &Self) -> Option<Self> {
        step_arms!((self, step), step_sub, [I8, I16, I32, I64, U8, U16, U32, U64, F32, F64])
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Custom(v) => write!(f, "{v:?}"),
        }
    }
}

/// Conversion between a concrete Rust type and [`Value`].
///
/// Implemented for the primitives and `String`. User types implement it by hand, or
/// through [`custom_value!`](crate::custom_value) when they need no ordering or
/// stepping.
pub trait TweakValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Whether [`TweakValue::ordinal_cmp`] is meaningful.
    const ORDERED: bool = false;
    /// Whether [`TweakValue::step_add`] and [`TweakValue::step_sub`] are meaningful.
    const STEPPABLE: bool = false;

    fn kind() -> ValueKind;

    fn into_value(self) -> Value;

    /// Exact conversion. The value is handed back unchanged when its kind differs.
    fn from_value(value: Value) -> Result<Self, Value>;

    fn ordinal_cmp(&self, _other: &Self) -> Option<Ordering> {
        None
    }

    fn step_add(&self, _step: &Self) -> Option<Self> {
        None
    }

    fn step_sub(&self, _step: &Self) -> Option<Self> {
        None
    }
}

macro_rules! integer_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl TweakValue for $ty {
            const ORDERED: bool = true;
            const STEPPABLE: bool = true;

            fn kind() -> ValueKind { ValueKind::$variant }
            fn into_value(self) -> Value { Value::$variant(self) }
            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
            fn ordinal_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
            fn step_add(&self, step: &Self) -> Option<Self> { Some(self.saturating_add(*step)) }
            fn step_sub(&self, step: &Self) -> Option<Self> { Some(self.saturating_sub(*step)) }
        }
    )*};
}

macro_rules! float_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl TweakValue for $ty {
            const ORDERED: bool = true;
            const STEPPABLE: bool = true;

            fn kind() -> ValueKind { ValueKind::$variant }
            fn into_value(self) -> Value { Value::$variant(self) }
            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
            fn ordinal_cmp(&self, other: &Self) -> Option<Ordering> { self.partial_cmp(other) }
            fn step_add(&self, step: &Self) -> Option<Self> { Some(self + step) }
            fn step_sub(&self, step: &Self) -> Option<Self> { Some(self - step) }
        }
    )*};
}

macro_rules! ordered_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl TweakValue for $ty {
            const ORDERED: bool = true;

            fn kind() -> ValueKind { ValueKind::$variant }
            fn into_value(self) -> Value { Value::$variant(self) }
            fn from_value(value: Value) -> Result<Self, Value> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
            fn ordinal_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
        }
    )*};
}

integer_value!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, u8 => U8, u16 => U16, u32 => U32, u64 => U64);
float_value!(f32 => F32, f64 => F64);
ordered_value!(bool => Bool, char => Char, String => String);

impl TweakValue for () {
    fn kind() -> ValueKind {
        ValueKind::Unit
    }

    fn into_value(self) -> Value {
        Value::Unit
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Unit => Ok(()),
            other => Err(other),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

macro_rules! value_from {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self { value.into_value() }
        }
    )*};
}

value_from!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, char, String, ());

/// Object-safe view of a boxed custom payload.
trait CustomData: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn custom_kind(&self) -> CustomKind;
    fn eq_dyn(&self, other: &dyn CustomData) -> bool;
    fn cmp_dyn(&self, other: &dyn CustomData) -> Option<Ordering>;
    fn step_dyn(&self, step: &dyn CustomData, up: bool) -> Option<CustomValue>;
}

impl<T: TweakValue> CustomData for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn custom_kind(&self) -> CustomKind {
        CustomKind::of::<T>()
    }

    fn eq_dyn(&self, other: &dyn CustomData) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn cmp_dyn(&self, other: &dyn CustomData) -> Option<Ordering> {
        self.ordinal_cmp(other.as_any().downcast_ref::<T>()?)
    }

    fn step_dyn(&self, step: &dyn CustomData, up: bool) -> Option<CustomValue> {
        let step = step.as_any().downcast_ref::<T>()?;
        let next = if up { self.step_add(step) } else { self.step_sub(step) }?;
        Some(CustomValue(Arc::new(next)))
    }
}

/// A shared, type-remembering payload for values outside the primitive set.
#[derive(Clone)]
pub struct CustomValue(Arc<dyn CustomData>);

impl CustomValue {
    #[must_use]
    pub fn kind(&self) -> CustomKind {
        self.0.custom_kind()
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    fn ordinal_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.cmp_dyn(&*other.0)
    }

    fn step_add(&self, step: &Self) -> Option<Self> {
        self.0.step_dyn(&*step.0, true)
    }

    fn step_sub(&self, step: &Self) -> Option<Self> {
        self.0.step_dyn(&*step.0, false)
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(&*other.0)
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Implements [`TweakValue`] for a type that travels as an opaque [`Value::Custom`].
///
/// The generated impl has no ordering and no stepping. Implement the trait by hand to
/// provide them.
///
/// ```rust
/// #[derive(Debug, Clone, PartialEq)]
/// enum Quality { Low, High }
///
/// tweaker_reflect::custom_value!(Quality);
///
/// use tweaker_reflect::{TweakValue, Value};
/// let value = Quality::High.into_value();
/// assert_eq!(Quality::from_value(value).ok(), Some(Quality::High));
/// ```
#[macro_export]
macro_rules! custom_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::TweakValue for $ty {
            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::custom::<Self>()
            }
            fn into_value(self) -> $crate::Value {
                $crate::Value::custom(self)
            }
            fn from_value(value: $crate::Value) -> ::core::result::Result<Self, $crate::Value> {
                value.take_custom::<Self>()
            }
        }
    )+};
}
