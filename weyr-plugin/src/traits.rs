//! Function plugin trait and its static metadata

use serde::Serialize;
use weyr_core::{Value, WeyrError};
use crate::EvalContext;

/// One positional argument. A `typ` ending in "..." marks a variadic tail.
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }

    pub fn is_variadic(&self) -> bool {
        self.typ.ends_with("...")
    }
}

/// Static description used by `help`, `list_functions` and arity checks
#[derive(Debug, Clone, Serialize)]
pub struct FunctionMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    /// Slash-separated, e.g. "matrix/ops" or "jordan/build"
    pub category: &'static str,
    pub related: &'static [&'static str],
}

impl FunctionMeta {
    /// (minimum, maximum) argument count; no maximum for variadic functions
    pub fn arity(&self) -> (usize, Option<usize>) {
        let min = self.args.iter().filter(|a| !a.optional).count();
        if self.args.iter().any(ArgMeta::is_variadic) {
            (min, None)
        } else {
            (min, Some(self.args.len()))
        }
    }

    pub fn check_arity(&self, got: usize) -> Result<(), WeyrError> {
        let (min, max) = self.arity();
        if got < min || max.is_some_and(|m| got > m) {
            let expected = match max {
                Some(m) if m == min => format!("{}", min),
                Some(m) => format!("{} to {}", min, m),
                None => format!("at least {}", min),
            };
            return Err(WeyrError::arg_count(self.name, min, got)
                .with_note(format!("{} takes {} argument(s)", self.usage, expected)));
        }
        Ok(())
    }
}

/// Pure function over runtime values. Errors are returned as `Value::Error`.
pub trait FunctionPlugin: Send + Sync {
    fn meta(&self) -> FunctionMeta;
    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value;
}
