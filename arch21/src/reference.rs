//!
//! # Component References
//!

// Local imports
use crate::{ComponentKey, ModuleId};

///
/// # Component Reference
///
/// A named instance, or array of identical instances, of another [crate::Component].
/// Definitions are shared: the reference stores only the key of the definition,
/// plus the [ModuleId] of the [crate::Module] which that key indexes.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub(crate) alias: String,
    pub(crate) component: ComponentKey,
    pub(crate) n_instances: usize,
    pub(crate) module: ModuleId,
}
impl ComponentRef {
    /// Instance name, unique among its owner's ports and references
    pub fn alias(&self) -> &str {
        &self.alias
    }
    /// Key of the referenced definition
    pub fn component(&self) -> ComponentKey {
        self.component
    }
    /// Id of the module holding the definition
    pub fn module(&self) -> ModuleId {
        self.module
    }
    /// Number of instances. Greater than one for arrays.
    pub fn n_instances(&self) -> usize {
        self.n_instances
    }
    /// Whether this reference is an array
    pub fn is_array(&self) -> bool {
        self.n_instances > 1
    }
}
