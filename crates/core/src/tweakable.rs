use crate::error::TweakerError;
use crate::markers::{NamedToggleValue, Range};
use crate::object::{ObjectInfo, TweakerObject};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;
use tweaker_reflect::{CallError, GetFn, SetFn, TweakValue, Value, ValueKind};

/// Name reported by [`Tweakable::value_name`] before any toggle navigation.
pub const UNKNOWN_TOGGLE_NAME: &str = "Unknown";

/// A gettable and settable value, optionally clamped, stepped or toggled.
///
/// Every write goes through [`Tweakable::set_value`]: the incoming value must have the
/// tweakable's exact kind and is clamped into the range, if any, before the
/// underlying setter runs.
pub struct Tweakable {
    info: ObjectInfo,
    kind: ValueKind,
    get: GetFn,
    set: SetFn,
    range: Option<Range>,
    step: Option<Value>,
    toggle: Option<Toggle>,
}

/// Ordered toggle entries and the navigation cursor.
struct Toggle {
    entries: Vec<NamedToggleValue>,
    /// `None` until the first successful navigation call. Held across the write.
    index: Mutex<Option<usize>>,
}

impl Toggle {
    /// The entry one step forward or back from `current`, wrapping at both ends.
    const fn neighbour(&self, current: Option<usize>, forward: bool) -> usize {
        let len = self.entries.len();
        match (current, forward) {
            (Some(i), true) if i + 1 < len => i + 1,
            (_, true) => 0,
            (Some(i), false) if i > 0 => i - 1,
            (_, false) => len - 1,
        }
    }
}

impl Tweakable {
    pub(crate) const fn new(info: ObjectInfo, kind: ValueKind, get: GetFn, set: SetFn) -> Self {
        Self { info, kind, get, set, range: None, step: None, toggle: None }
    }

    pub(crate) fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub(crate) fn with_step(mut self, step: Value) -> Self {
        self.step = Some(step);
        self
    }

    /// Entries must be non-empty and already sorted.
    pub(crate) fn with_toggle(mut self, entries: Vec<NamedToggleValue>) -> Self {
        self.toggle = Some(Toggle { entries, index: Mutex::new(None) });
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.info.description()
    }

    #[must_use]
    pub const fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }

    #[must_use]
    pub const fn step_size(&self) -> Option<&Value> {
        self.step.as_ref()
    }

    /// Toggle entries in cycle order, empty when the tweakable has none.
    #[must_use]
    pub fn toggle_values(&self) -> &[NamedToggleValue] {
        match &self.toggle {
            Some(toggle) => &toggle.entries,
            None => &[],
        }
    }

    pub fn get_value(&self) -> Result<Value, TweakerError> {
        let target = self.info.target()?;
        (self.get)(target.as_deref()).map_err(|err| match err {
            CallError::DeadInstance { .. } => TweakerError::invalid(self.name()),
            err => TweakerError::get(self.name(), err.to_string()),
        })
    }

    /// Typed read.
    pub fn get<T: TweakValue>(&self) -> Result<T, TweakerError> {
        T::from_value(self.get_value()?).map_err(|value| {
            TweakerError::get(self.name(), format!("expected a {} value, got {}", T::kind(), value.kind()))
        })
    }

    pub fn set_value(&self, value: Value) -> Result<(), TweakerError> {
        self.write(value).map(drop)
    }

    /// Typed write.
    pub fn set<T: TweakValue>(&self, value: T) -> Result<(), TweakerError> {
        self.set_value(value.into_value())
    }

    /// Adds the step size to the current value and writes it back. Returns the stored value.
    pub fn step_next(&self) -> Result<Value, TweakerError> {
        self.step_by(true)
    }

    /// Subtracts the step size from the current value and writes it back. Returns the stored value.
    pub fn step_previous(&self) -> Result<Value, TweakerError> {
        self.step_by(false)
    }

    /// Advances to the next toggle entry, wrapping to the first after the last.
    pub fn next_value(&self) -> Result<Value, TweakerError> {
        self.turn(true)
    }

    /// Goes back to the previous toggle entry, wrapping to the last before the first.
    pub fn previous_value(&self) -> Result<Value, TweakerError> {
        self.turn(false)
    }

    /// Selects the toggle entry called `name` and writes its value.
    pub fn set_value_by_name(&self, name: &str) -> Result<(), TweakerError> {
        let toggle = self.toggle()?;
        let Some(index) = toggle.entries.iter().position(|entry| entry.name == name) else {
            return Err(TweakerError::set(self.name(), name, format!("Invalid toggle value name: '{name}'")));
        };
        let mut cursor = toggle.index.lock();
        self.set_value(toggle.entries[index].value.clone())?;
        *cursor = Some(index);
        Ok(())
    }

    /// Position of the first toggle entry equal to `value`.
    #[must_use]
    pub fn index_of_value(&self, value: &Value) -> Option<usize> {
        self.toggle_values().iter().position(|entry| entry.value == *value)
    }

    #[must_use]
    pub fn name_by_index(&self, index: usize) -> Option<&str> {
        self.toggle_values().get(index).map(|entry| entry.name.as_ref())
    }

    #[must_use]
    pub fn name_by_value(&self, value: &Value) -> Option<&str> {
        self.index_of_value(value).and_then(|index| self.name_by_index(index))
    }

    /// Toggle cursor, `None` before any navigation.
    ///
    /// Writes that bypass the toggle API do not move the cursor.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.toggle.as_ref().and_then(|toggle| *toggle.index.lock())
    }

    /// Name of the entry under the cursor, or [`UNKNOWN_TOGGLE_NAME`].
    #[must_use]
    pub fn value_name(&self) -> &str {
        self.current_index().and_then(|index| self.name_by_index(index)).unwrap_or(UNKNOWN_TOGGLE_NAME)
    }

    /// Checks, clamps and stores `value`, returning what was stored.
    fn write(&self, value: Value) -> Result<Value, TweakerError> {
        let target = self.info.target()?;
        if value.kind() != self.kind {
            let message = format!("expected a {} value, got {}", self.kind, value.kind());
            return Err(TweakerError::set(self.name(), &value, message));
        }

        let value = self.clamp(value);
        trace!(tweakable = self.name(), %value, "Setting value");
        match (self.set)(target.as_deref(), value.clone()) {
            Ok(()) => Ok(value),
            Err(CallError::DeadInstance { .. }) => Err(TweakerError::invalid(self.name())),
            Err(err) => Err(TweakerError::set(self.name(), &value, err.to_string())),
        }
    }

    /// Incomparable values (NaN) land on the lower bound.
    fn clamp(&self, value: Value) -> Value {
        let Some(range) = &self.range else {
            return value;
        };
        match (value.ordinal_cmp(&range.min), value.ordinal_cmp(&range.max)) {
            (Some(Ordering::Less) | None, _) => range.min.clone(),
            (_, Some(Ordering::Greater)) => range.max.clone(),
            _ => value,
        }
    }

    fn step_by(&self, up: bool) -> Result<Value, TweakerError> {
        let Some(step) = &self.step else {
            return Err(TweakerError::set(self.name(), "step", "no step size declared"));
        };
        let current = self.get_value()?;
        let next = if up { current.step_add(step) } else { current.step_sub(step) };
        let next = next.ok_or_else(|| TweakerError::set(self.name(), &current, "value cannot be stepped"))?;
        self.write(next)
    }

    fn turn(&self, forward: bool) -> Result<Value, TweakerError> {
        let toggle = self.toggle()?;
        let mut cursor = toggle.index.lock();
        let next = toggle.neighbour(*cursor, forward);
        let value = toggle.entries[next].value.clone();
        self.set_value(value.clone())?;
        *cursor = Some(next);
        Ok(value)
    }

    fn toggle(&self) -> Result<&Toggle, TweakerError> {
        self.toggle
            .as_ref()
            .ok_or_else(|| TweakerError::set(self.name(), "toggle", "no toggle values declared"))
    }
}

impl TweakerObject for Tweakable {
    fn info(&self) -> &ObjectInfo {
        &self.info
    }
}

impl fmt::Debug for Tweakable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tweakable")
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("range", &self.range)
            .field("step", &self.step)
            .field("toggle", &self.toggle_values().len())
            .field("instance", &self.instance())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;
    use proptest::prelude::*;
    use std::sync::Arc;
    use tweaker_reflect::{get_fn, set_fn};

    fn slot(initial: i32) -> (Arc<RwLock<i32>>, Tweakable) {
        let slot = Arc::new(RwLock::new(initial));
        let read = Arc::clone(&slot);
        let write = Arc::clone(&slot);
        let tweakable = Tweakable::new(
            ObjectInfo::new("test.value", true, "tests", None),
            ValueKind::I32,
            get_fn(move |_| Ok(Value::I32(*read.read()))),
            set_fn(move |_, value| {
                if let Value::I32(v) = value {
                    *write.write() = v;
                }
                Ok(())
            }),
        );
        (slot, tweakable)
    }

    fn toggled() -> (Arc<RwLock<i32>>, Tweakable) {
        let (slot, tweakable) = slot(0);
        let tweakable = tweakable.with_toggle(vec![
            NamedToggleValue::new("zero", 0, 0),
            NamedToggleValue::new("eleven", 11, 1),
            NamedToggleValue::new("hundred", 100, 2),
        ]);
        (slot, tweakable)
    }

    #[test]
    fn range_clamps_both_ends() {
        let (_, tweakable) = slot(0);
        let tweakable = tweakable.with_range(Range::new(0, 100));

        tweakable.set(150).unwrap();
        assert_eq!(tweakable.get::<i32>().unwrap(), 100);
        tweakable.set(-5).unwrap();
        assert_eq!(tweakable.get::<i32>().unwrap(), 0);
        tweakable.set(50).unwrap();
        assert_eq!(tweakable.get::<i32>().unwrap(), 50);
        tweakable.set(100).unwrap();
        assert_eq!(tweakable.get::<i32>().unwrap(), 100);
    }

    #[test]
    fn wrong_kind_is_rejected_before_the_setter() {
        let (slot, tweakable) = slot(7);
        let err = tweakable.set_value(Value::String("7".into())).unwrap_err();
        assert_eq!(err.kind(), "tweakable_set");
        assert_eq!(*slot.read(), 7);

        let err = tweakable.get::<u8>().unwrap_err();
        assert_eq!(err.kind(), "tweakable_get");
    }

    #[test]
    fn steps_go_through_the_clamp() {
        let (_, tweakable) = slot(90);
        let tweakable = tweakable.with_range(Range::new(0, 100)).with_step(Value::I32(25));

        assert_eq!(tweakable.step_next().unwrap(), Value::I32(100));
        assert_eq!(tweakable.step_previous().unwrap(), Value::I32(75));
        assert_eq!(tweakable.get::<i32>().unwrap(), 75);
    }

    #[test]
    fn stepping_without_step_size_fails() {
        let (_, tweakable) = slot(1);
        assert_eq!(tweakable.step_next().unwrap_err().kind(), "tweakable_set");
    }

    #[test]
    fn toggle_cycles_and_wraps() {
        let (_, tweakable) = toggled();
        assert_eq!(tweakable.current_index(), None);
        assert_eq!(tweakable.value_name(), UNKNOWN_TOGGLE_NAME);

        let seen: Vec<Value> = (0..4).map(|_| tweakable.next_value().unwrap()).collect();
        assert_eq!(seen, vec![Value::I32(0), Value::I32(11), Value::I32(100), Value::I32(0)]);
        assert_eq!(tweakable.current_index(), Some(0));

        assert_eq!(tweakable.previous_value().unwrap(), Value::I32(100));
        assert_eq!(tweakable.current_index(), Some(2));
        assert_eq!(tweakable.value_name(), "hundred");
    }

    #[test]
    fn first_previous_lands_on_the_last_entry() {
        let (slot, tweakable) = toggled();
        assert_eq!(tweakable.previous_value().unwrap(), Value::I32(100));
        assert_eq!(*slot.read(), 100);
    }

    #[test]
    fn toggle_names_round_trip() {
        let (_, tweakable) = toggled();
        for name in ["zero", "eleven", "hundred"] {
            tweakable.set_value_by_name(name).unwrap();
            assert_eq!(tweakable.name_by_value(&tweakable.get_value().unwrap()), Some(name));
            assert_eq!(tweakable.value_name(), name);
        }

        let err = tweakable.set_value_by_name("not-a-real-name").unwrap_err();
        assert_eq!(err.kind(), "tweakable_set");
        assert!(err.to_string().contains("Invalid toggle value name: 'not-a-real-name'"), "{err}");

        assert_eq!(tweakable.index_of_value(&Value::I32(11)), Some(1));
        assert_eq!(tweakable.index_of_value(&Value::I32(12)), None);
        assert_eq!(tweakable.name_by_index(3), None);
    }

    #[test]
    fn direct_writes_leave_the_toggle_cursor_behind() {
        let (_, tweakable) = toggled();
        tweakable.set_value_by_name("eleven").unwrap();
        tweakable.set(100).unwrap();

        assert_eq!(tweakable.get::<i32>().unwrap(), 100);
        assert_eq!(tweakable.value_name(), "eleven");
        assert_eq!(tweakable.current_index(), Some(1));
    }

    #[test]
    fn toggle_calls_without_entries_fail() {
        let (_, tweakable) = slot(0);
        assert_eq!(tweakable.next_value().unwrap_err().kind(), "tweakable_set");
        assert_eq!(tweakable.value_name(), UNKNOWN_TOGGLE_NAME);
        assert!(tweakable.toggle_values().is_empty());
    }

    proptest! {
        #[test]
        fn clamped_writes_stay_in_range(min in -1000_i32..1000, span in 0_i32..1000, value in any::<i32>()) {
            let max = min + span;
            let (_, tweakable) = slot(min);
            let tweakable = tweakable.with_range(Range::new(min, max));

            tweakable.set(value).unwrap();
            let stored = tweakable.get::<i32>().unwrap();
            prop_assert!((min..=max).contains(&stored));
            if (min..=max).contains(&value) {
                prop_assert_eq!(stored, value);
            }
        }

        #[test]
        fn toggle_wraps_modulo_entry_count(len in 1_usize..8, turns in 1_usize..32) {
            let (_, tweakable) = slot(0);
            let entries = (0..len)
                .map(|i| NamedToggleValue::new(format!("v{i}"), i32::try_from(i).unwrap_or_default(), 0))
                .collect();
            let tweakable = tweakable.with_toggle(entries);

            for _ in 0..turns {
                tweakable.next_value().unwrap();
            }
            prop_assert_eq!(tweakable.current_index(), Some((turns - 1) % len));

            for _ in 0..turns {
                tweakable.previous_value().unwrap();
            }
            prop_assert_eq!(tweakable.current_index(), Some((len - 1) % len));
        }
    }
}
