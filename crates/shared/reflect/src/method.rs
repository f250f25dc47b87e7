//! Adapters turning ordinary Rust closures into erased, `Value`-level calls.

use crate::error::{BoxError, CallError};
use crate::instance::{Instance, receiver};
use crate::value::{TweakValue, Value, ValueKind};
use std::any::Any;
use std::sync::Arc;

/// An erased call: optional receiver plus positional arguments.
pub type MethodFn = Arc<dyn Fn(Option<&Instance>, &[Value]) -> Result<Value, CallError> + Send + Sync>;

/// Converts a call result into a [`Value`].
///
/// Implemented for every [`TweakValue`] (including `()` for void calls) and for
/// `Result<T, E>`, where an `Err` becomes [`CallError::Target`].
pub trait IntoReturn {
    fn return_kind() -> ValueKind;
    fn into_return(self) -> Result<Value, CallError>;
}

impl<T: TweakValue> IntoReturn for T {
    fn return_kind() -> ValueKind {
        T::kind()
    }

    fn into_return(self) -> Result<Value, CallError> {
        Ok(self.into_value())
    }
}

impl<T: TweakValue, E: Into<BoxError>> IntoReturn for Result<T, E> {
    fn return_kind() -> ValueKind {
        T::kind()
    }

    fn into_return(self) -> Result<Value, CallError> {
        self.map(TweakValue::into_value).map_err(CallError::target)
    }
}

/// A static function or closure usable as a method or event handler.
///
/// `Marker` only disambiguates the arity impls and is inferred.
pub trait IntoMethod<Marker>: Send + Sync + 'static {
    fn parameter_kinds() -> Vec<ValueKind>;
    fn return_kind() -> ValueKind;
    fn into_call(self) -> MethodFn;
}

/// A closure taking `&S` first, usable as an instance method of `S`.
pub trait IntoInstanceMethod<S, Marker>: Send + Sync + 'static {
    fn parameter_kinds() -> Vec<ValueKind>;
    fn return_kind() -> ValueKind;
    fn into_call(self) -> MethodFn;
}

pub(crate) fn check_arity(args: &[Value], expected: usize) -> Result<(), CallError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CallError::ArgumentCount { expected, actual: args.len(), context: None })
    }
}

/// Converts argument `index`, reporting its kind on mismatch.
pub(crate) fn take_arg<T: TweakValue>(args: &[Value], index: usize) -> Result<T, CallError> {
    let value = args.get(index).cloned().ok_or(CallError::ArgumentCount {
        expected: index + 1,
        actual: args.len(),
        context: None,
    })?;
    T::from_value(value).map_err(|rejected| CallError::argument_type(index, T::kind(), rejected.kind()))
}

macro_rules! count {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count!($($tail)*) };
}

macro_rules! impl_into_method {
    ($($arg:ident => $index:tt),*) => {
        impl<F, R, $($arg),*> IntoMethod<fn($($arg),*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoReturn,
            $($arg: TweakValue,)*
        {
            fn parameter_kinds() -> Vec<ValueKind> {
                vec![$($arg::kind()),*]
            }

            fn return_kind() -> ValueKind {
                R::return_kind()
            }

            #[allow(non_snake_case, unused_variables)]
            fn into_call(self) -> MethodFn {
                Arc::new(move |_target: Option<&Instance>, args: &[Value]| {
                    check_arity(args, count!($($arg)*))?;
                    $(let $arg = take_arg::<$arg>(args, $index)?;)*
                    (self)($($arg),*).into_return()
                })
            }
        }

        impl<S, F, R, $($arg),*> IntoInstanceMethod<S, fn(&S $(, $arg)*) -> R> for F
        where
            S: Any + Send + Sync,
            F: Fn(&S $(, $arg)*) -> R + Send + Sync + 'static,
            R: IntoReturn,
            $($arg: TweakValue,)*
        {
            fn parameter_kinds() -> Vec<ValueKind> {
                vec![$($arg::kind()),*]
            }

            fn return_kind() -> ValueKind {
                R::return_kind()
            }

            #[allow(non_snake_case, unused_variables)]
            fn into_call(self) -> MethodFn {
                Arc::new(move |target: Option<&Instance>, args: &[Value]| {
                    let this = receiver::<S>(target)?;
                    check_arity(args, count!($($arg)*))?;
                    $(let $arg = take_arg::<$arg>(args, $index)?;)*
                    (self)(this $(, $arg)*).into_return()
                })
            }
        }
    };
}

impl_into_method!();
impl_into_method!(A0 => 0);
impl_into_method!(A0 => 0, A1 => 1);
impl_into_method!(A0 => 0, A1 => 1, A2 => 2);
impl_into_method!(A0 => 0, A1 => 1, A2 => 2, A3 => 3);

/// Wraps an already erased handler as a [`MethodFn`] that ignores the receiver.
pub fn erase_static<F>(handler: F) -> MethodFn
where
    F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
{
    Arc::new(move |_target: Option<&Instance>, args: &[Value]| handler(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call<M, F: IntoMethod<M>>(f: F, args: &[Value]) -> Result<Value, CallError> {
        (f.into_call())(None, args)
    }

    #[test]
    fn static_closures_convert_arguments_positionally() {
        let sum = call(|a: i32, b: i32| a - b, &[Value::I32(10), Value::I32(3)]).unwrap();
        assert_eq!(sum, Value::I32(7));
    }

    #[test]
    fn void_returns_unit() {
        assert_eq!(call(|| {}, &[]).unwrap(), Value::Unit);
    }

    #[test]
    fn argument_errors_are_reported() {
        let err = call(|a: i32| a, &[]).unwrap_err();
        assert!(matches!(err, CallError::ArgumentCount { expected: 1, actual: 0, .. }));

        let err = call(|a: i32| a, &[Value::from("x")]).unwrap_err();
        assert!(matches!(err, CallError::ArgumentType { index: 0, expected: ValueKind::I32, .. }));
    }

    #[test]
    fn fallible_returns_wrap_the_error() {
        let err = call(|| Err::<i32, _>("boom"), &[]).unwrap_err();
        assert_eq!(err.kind(), "target");
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn kinds_are_reported_without_calling() {
        fn kinds<M, F: IntoMethod<M>>(_: &F) -> (Vec<ValueKind>, ValueKind) {
            (F::parameter_kinds(), F::return_kind())
        }

        let f = |_: u8, _: String| 1.5_f64;
        assert_eq!(kinds(&f), (vec![ValueKind::U8, ValueKind::String], ValueKind::F64));
    }
}
