use crate::error::TweakerError;
use std::borrow::Cow;
use std::sync::Arc;
use tweaker_reflect::{BoundInstance, Instance};

/// Common surface of every registrable domain object.
pub trait TweakerObject: Send + Sync + 'static {
    fn info(&self) -> &ObjectInfo;

    /// Unique registration key, `name#id` when bound to an instance.
    fn name(&self) -> &str {
        self.info().name()
    }

    fn is_public(&self) -> bool {
        self.info().is_public()
    }

    fn module(&self) -> &str {
        self.info().module()
    }

    fn instance(&self) -> Option<&BoundInstance> {
        self.info().instance()
    }

    /// `false` once the bound instance has been dropped. Static objects are always valid.
    fn is_valid(&self) -> bool {
        self.info().instance().is_none_or(BoundInstance::is_alive)
    }
}

/// Data shared by invokables and tweakables.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    name: String,
    public: bool,
    module: Arc<str>,
    description: Option<Cow<'static, str>>,
    instance: Option<BoundInstance>,
}

impl ObjectInfo {
    /// Builds the info, suffixing `base` with `#id` when an instance is bound.
    #[must_use]
    pub fn new(base: &str, public: bool, module: &str, instance: Option<BoundInstance>) -> Self {
        let name = match &instance {
            Some(bound) => format!("{base}#{}", bound.id()),
            None => base.to_owned(),
        };
        Self { name, public, module: Arc::from(module), description: None, instance }
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<Cow<'static, str>>) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn instance(&self) -> Option<&BoundInstance> {
        self.instance.as_ref()
    }

    /// Upgrades the bound instance for the duration of one call.
    ///
    /// `Ok(None)` for static objects, [`TweakerError::ObjectInvalid`] when the instance is gone.
    pub(crate) fn target(&self) -> Result<Option<Arc<Instance>>, TweakerError> {
        match &self.instance {
            None => Ok(None),
            Some(bound) => bound.upgrade().map(Some).ok_or_else(|| TweakerError::invalid(&self.name)),
        }
    }
}
