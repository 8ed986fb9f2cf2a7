//! Evaluation Context

use weyr_core::Value;
use crate::PluginRegistry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Largest matrix dimension accepted by default. Exact rank and
/// characteristic polynomial work grows quickly with n.
pub const DEFAULT_EXACT_LIMIT: usize = 12;

/// Evaluation context passed to plugins
pub struct EvalContext {
    pub exact_limit: usize,
    pub variables: BTreeMap<String, Value>,
    pub registry: Arc<PluginRegistry>,
}

impl EvalContext {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            exact_limit: DEFAULT_EXACT_LIMIT,
            variables: BTreeMap::new(),
            registry,
        }
    }

    pub fn with_exact_limit(mut self, limit: usize) -> Self {
        self.exact_limit = limit;
        self
    }

    pub fn get_var(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Call another registered function with this context
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        self.registry.call_function(name, args, self)
    }
}
