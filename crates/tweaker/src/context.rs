use crate::config::TweakerConfig;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use tweaker_core::{AutoScan, InvokableManager, TweakableManager, TweakerError};
use tweaker_reflect::{Module, Scannable, Value};
use tweaker_scanner::{ScanOptions, ScanSummary, Scanner};

bitflags! {
    /// Which managers a [`Tweaker`] feeds from its scanner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TweakerOptions: u8 {
        const SCAN_FOR_INVOKABLES = 1 << 0;
        const SCAN_FOR_TWEAKABLES = 1 << 1;
        const ALL = Self::SCAN_FOR_INVOKABLES.bits() | Self::SCAN_FOR_TWEAKABLES.bits();
    }
}

impl Default for TweakerOptions {
    fn default() -> Self {
        Self::ALL
    }
}

/// One scanner and the two managers fed by it.
///
/// Nothing here is global: every `Tweaker` is independent unless scanners are shared
/// through [`Tweaker::with_scanner`].
///
/// ```rust
/// use std::sync::Arc;
/// use tweaker::{InvokableMarker, Member, Module, ScanOptions, Tweaker, TweakerOptions, TypeInfo, Value};
///
/// struct Cheats;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let module = Arc::new(Module::new("cheats").with_type(
///     TypeInfo::builder::<Cheats>("Cheats")
///         .member(Member::static_method("gold", |amount: u32| amount * 2).marker(InvokableMarker::new("cheats.gold")))
///         .build(),
/// ));
///
/// let tweaker = Tweaker::new(TweakerOptions::SCAN_FOR_INVOKABLES)?;
/// tweaker.scan_modules(&[module], &ScanOptions::default())?;
/// assert_eq!(tweaker.invoke("cheats.gold", &[Value::U32(21)])?, Value::U32(42));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Tweaker {
    scanner: Arc<Scanner>,
    options: TweakerOptions,
    invokables: Arc<InvokableManager>,
    tweakables: Arc<TweakableManager>,
}

impl Tweaker {
    /// Creates a tweaker with its own scanner.
    pub fn new(options: TweakerOptions) -> Result<Self, TweakerError> {
        Self::with_scanner(Arc::new(Scanner::new()), options)
    }

    /// Creates a tweaker on a scanner shared with other consumers.
    pub fn with_scanner(scanner: Arc<Scanner>, options: TweakerOptions) -> Result<Self, TweakerError> {
        let mut invokables = InvokableManager::new();
        if options.contains(TweakerOptions::SCAN_FOR_INVOKABLES) {
            invokables = invokables.attach(&scanner)?;
        }
        let mut tweakables = TweakableManager::new();
        if options.contains(TweakerOptions::SCAN_FOR_TWEAKABLES) {
            tweakables = tweakables.attach(&scanner)?;
        }

        debug!(?options, "Tweaker created");
        Ok(Self { scanner, options, invokables: Arc::new(invokables), tweakables: Arc::new(tweakables) })
    }

    /// Creates a tweaker with the managers enabled in `config`.
    pub fn from_config(config: &TweakerConfig) -> Result<Self, TweakerError> {
        Self::new(config.options())
    }

    #[must_use]
    pub const fn scanner(&self) -> &Arc<Scanner> {
        &self.scanner
    }

    #[must_use]
    pub const fn options(&self) -> TweakerOptions {
        self.options
    }

    #[must_use]
    pub const fn invokables(&self) -> &Arc<InvokableManager> {
        &self.invokables
    }

    #[must_use]
    pub const fn tweakables(&self) -> &Arc<TweakableManager> {
        &self.tweakables
    }

    /// Scans every linked module.
    pub fn scan(&self, options: &ScanOptions) -> Result<ScanSummary, TweakerError> {
        Ok(self.scanner.scan(options)?)
    }

    pub fn scan_modules(&self, modules: &[Arc<Module>], options: &ScanOptions) -> Result<ScanSummary, TweakerError> {
        Ok(self.scanner.scan_modules(modules, options)?)
    }

    /// Scans `instance` and keeps its objects registered until the guard drops.
    pub fn auto_scan<S: Scannable>(&self, instance: &Arc<S>, options: &ScanOptions) -> Result<AutoScan<S>, TweakerError> {
        let invokables = self.options.contains(TweakerOptions::SCAN_FOR_INVOKABLES).then(|| Arc::clone(&self.invokables));
        let tweakables = self.options.contains(TweakerOptions::SCAN_FOR_TWEAKABLES).then(|| Arc::clone(&self.tweakables));
        AutoScan::scan(&self.scanner, instance, invokables, tweakables, options)
    }

    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, TweakerError> {
        self.invokables.invoke(name, args)
    }

    pub fn get_value(&self, name: &str) -> Result<Value, TweakerError> {
        self.tweakables.get_value(name)
    }

    pub fn set_value(&self, name: &str, value: Value) -> Result<(), TweakerError> {
        self.tweakables.set_value(name, value)
    }
}
