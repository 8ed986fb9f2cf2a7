//! Weyr Plugin System
//!
//! Functions are pure computations registered by name. Each library crate
//! (matrix, jordan) contributes a `load_*_library` that adds its functions
//! to a `PluginRegistry`.

mod traits;
mod registry;
mod context;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::PluginRegistry;
pub use context::{EvalContext, DEFAULT_EXACT_LIMIT};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{FunctionPlugin, FunctionMeta, ArgMeta, PluginRegistry, EvalContext};
    pub use weyr_core::prelude::*;
}
