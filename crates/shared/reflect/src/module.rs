use crate::types::TypeInfo;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// A named group of scannable types, the unit the scanner enumerates.
#[derive(Debug, Clone)]
pub struct Module {
    name: Arc<str>,
    types: Vec<Arc<TypeInfo>>,
}

impl Module {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into(), types: Vec::new() }
    }

    /// Adds a type, re-homing it and its members into this module.
    #[must_use]
    pub fn with_type(mut self, mut info: TypeInfo) -> Self {
        info.assign_module(&self.name);
        self.types.push(Arc::new(info));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn types(&self) -> &[Arc<TypeInfo>] {
        &self.types
    }

    #[must_use]
    pub fn find_type(&self, name: &str) -> Option<&Arc<TypeInfo>> {
        self.types.iter().find(|ty| ty.name() == name || ty.full_name() == name)
    }
}

/// Link-time registration of a module constructor.
///
/// Submitted by [`tweaker_module!`](crate::tweaker_module); collected with `inventory`.
pub struct ModuleReg {
    name: &'static str,
    build: fn() -> Module,
}

impl ModuleReg {
    #[doc(hidden)]
    pub const fn new(name: &'static str, build: fn() -> Module) -> Self {
        Self { name, build }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ModuleReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleReg").field("name", &self.name).finish_non_exhaustive()
    }
}

inventory::collect!(ModuleReg);

static LINKED_MODULES: LazyLock<Vec<Arc<Module>>> = LazyLock::new(|| {
    let mut modules: Vec<_> = inventory::iter::<ModuleReg>().map(|reg| Arc::new((reg.build)())).collect();
    modules.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(count = modules.len(), "Linked modules collected");
    modules
});

/// Every module linked into the process, sorted by name.
///
/// Built once on first use.
pub fn linked_modules() -> &'static [Arc<Module>] {
    &LINKED_MODULES
}

/// Links a module of scannable types into the process.
///
/// ```rust,ignore
/// tweaker_reflect::tweaker_module!("game" => [Player, World]);
/// ```
///
/// Every listed type must implement [`Scannable`](crate::Scannable).
#[macro_export]
macro_rules! tweaker_module {
    ($name:expr => [$($ty:ty),* $(,)?]) => {
        $crate::inventory::submit! {
            $crate::ModuleReg::new($name, || {
                $crate::Module::new($name)$(.with_type(<$ty as $crate::Scannable>::describe()))*
            })
        }
    };
}
