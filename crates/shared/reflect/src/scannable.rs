use crate::types::TypeInfo;
use std::any::Any;

/// A type that can describe its own metadata.
///
/// Required for scanning live instances, where the metadata comes from the runtime
/// type of the instance rather than from a module walk.
pub trait Scannable: Any + Send + Sync {
    fn describe() -> TypeInfo;
}
