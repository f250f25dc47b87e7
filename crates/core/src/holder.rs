use crate::error::TweakerError;
use crate::object::TweakerObject;
use crate::tweakable::Tweakable;
use parking_lot::RwLock;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Weak};
use tweaker_reflect::{
    Binding, CallError, Getter, Instance, Member, MemberInfo, Setter, TweakValue, Value, get_fn, marker_of, receiver, set_fn,
};

type AttachFn = Arc<dyn Fn(Option<&Instance>, &Arc<Tweakable>) -> Result<(), CallError> + Send + Sync>;

/// Marker placed by [`Tweak::member`] so the processor can hand the holder its tweakable.
#[derive(Clone)]
pub struct HolderLink(AttachFn);

impl HolderLink {
    fn new<F>(attach: F) -> Self
    where
        F: Fn(Option<&Instance>, &Arc<Tweakable>) -> Result<(), CallError> + Send + Sync + 'static,
    {
        Self(Arc::new(attach))
    }
}

impl fmt::Debug for HolderLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HolderLink")
    }
}

/// Connects a freshly built tweakable to the [`Tweak`] holder its member points at, if any.
pub(crate) fn link_holder(member: &MemberInfo, tweakable: &Arc<Tweakable>) -> Result<(), TweakerError> {
    let Some(link) = marker_of::<HolderLink>(member.markers()) else {
        return Ok(());
    };
    let target = match tweakable.instance() {
        Some(bound) => Some(bound.upgrade().ok_or_else(|| TweakerError::ObjectInvalid {
            name: tweakable.name().to_owned(),
            context: Some(Cow::Borrowed("linking holder")),
        })?),
        None => None,
    };
    (link.0)(target.as_deref(), tweakable).map_err(|err| TweakerError::processor(member.qualified_name(), err))
}

/// A value holder whose writes honour the constraints declared on its member.
///
/// Until a scan links it to its [`Tweakable`], or after that tweakable is dropped,
/// [`Tweak::set`] writes the raw value.
///
/// ```rust
/// use std::sync::Arc;
/// use tweaker_core::{Range, Tweak, TweakableMarker, TweakableProcessor};
/// use tweaker_reflect::{Scannable, TypeInfo};
/// use tweaker_scanner::{ScanOptions, Scanner};
///
/// #[derive(Debug)]
/// struct Audio {
///     volume: Tweak<i32>,
/// }
///
/// impl Scannable for Audio {
///     fn describe() -> TypeInfo {
///         TypeInfo::builder::<Self>("Audio")
///             .member(
///                 Tweak::member("volume", |audio: &Self| &audio.volume)
///                     .marker(TweakableMarker::new("audio.volume"))
///                     .marker(Range::new(0, 10)),
///             )
///             .build()
///     }
/// }
///
/// let scanner = Scanner::new();
/// scanner.add_attribute_processor::<TweakableMarker, _>(Arc::new(TweakableProcessor::default())).unwrap();
/// let keep = scanner.result_provider::<Arc<tweaker_core::Tweakable>>().unwrap();
/// let held = Arc::new(parking_lot::Mutex::new(Vec::new()));
/// let sink = Arc::clone(&held);
/// keep.subscribe(move |t| {
///     sink.lock().push(Arc::clone(t));
///     Ok(())
/// });
///
/// let audio = Arc::new(Audio { volume: Tweak::new(3) });
/// audio.volume.set(50).unwrap();
/// assert_eq!(audio.volume.get(), 50);
///
/// scanner.scan_instance(&audio, &ScanOptions::default()).unwrap();
/// audio.volume.set(50).unwrap();
/// assert_eq!(audio.volume.get(), 10);
/// ```
pub struct Tweak<T> {
    value: RwLock<T>,
    link: RwLock<Option<Weak<Tweakable>>>,
}

impl<T: TweakValue> Tweak<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self { value: RwLock::new(value), link: RwLock::new(None) }
    }

    /// The raw stored value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Writes through the linked tweakable, or directly when unlinked.
    pub fn set(&self, value: T) -> Result<(), TweakerError> {
        match self.tweakable() {
            Some(tweakable) => tweakable.set(value),
            None => {
                *self.value.write() = value;
                Ok(())
            },
        }
    }

    /// The linked tweakable while it is alive.
    #[must_use]
    pub fn tweakable(&self) -> Option<Arc<Tweakable>> {
        self.link.read().as_ref().and_then(Weak::upgrade)
    }

    /// Declares an instance holder of `S`, reached through `project`.
    ///
    /// Constraint markers go on the returned member.
    pub fn member<S: Any + Send + Sync>(name: impl Into<Cow<'static, str>>, project: fn(&S) -> &Self) -> Member<S> {
        let getter = Getter {
            kind: T::kind(),
            get: get_fn(move |target| Ok(project(receiver::<S>(target)?).get().into_value())),
        };
        let setter = Setter {
            kind: T::kind(),
            set: set_fn(move |target, value| project(receiver::<S>(target)?).store(value)),
        };
        let link = HolderLink::new(move |target, tweakable| {
            project(receiver::<S>(target)?).attach(tweakable);
            Ok(())
        });
        Member::raw_property(name, Binding::Instance, T::kind(), Some(getter), Some(setter)).marker(link)
    }

    /// Declares a static holder as a member of `S`.
    pub fn static_member<S: Any + Send + Sync>(name: impl Into<Cow<'static, str>>, holder: &'static Self) -> Member<S> {
        let getter = Getter { kind: T::kind(), get: get_fn(move |_| Ok(holder.get().into_value())) };
        let setter = Setter {
            kind: T::kind(),
            set: set_fn(move |_, value| holder.store(value)),
        };
        let link = HolderLink::new(move |_, tweakable| {
            holder.attach(tweakable);
            Ok(())
        });
        Member::raw_property(name, Binding::Static, T::kind(), Some(getter), Some(setter)).marker(link)
    }

    /// Raw write, bypassing the tweakable.
    fn store(&self, value: Value) -> Result<(), CallError> {
        let value = T::from_value(value).map_err(|rejected| CallError::ArgumentType {
            index: 0,
            expected: T::kind(),
            actual: rejected.kind(),
            context: None,
        })?;
        *self.value.write() = value;
        Ok(())
    }

    fn attach(&self, tweakable: &Arc<Tweakable>) {
        *self.link.write() = Some(Arc::downgrade(tweakable));
    }
}

impl<T: TweakValue + Default> Default for Tweak<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Tweak<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tweak")
            .field("value", &*self.value.read())
            .field("linked", &self.link.read().as_ref().is_some_and(|link| link.strong_count() > 0))
            .finish()
    }
}
