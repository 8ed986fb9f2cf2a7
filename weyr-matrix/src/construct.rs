//! Matrix construction functions

use weyr_plugin::prelude::*;
use crate::types::Matrix;
use crate::helpers::*;

// ============ matrix ============

pub struct MatrixFn;

static MATRIX_ARGS: [ArgMeta; 1] = [ArgMeta {
    name: "data",
    typ: "List",
    description: "Nested list of numbers [[row1], [row2], ...]; entries may be \"p/q\" text",
    optional: false,
    default: None,
}];

static MATRIX_EXAMPLES: [&str; 2] = [
    "matrix([[1,2,3],[4,5,6]]) → 2×3 matrix",
    "matrix([[\"1/2\", 0], [0, 1]]) → exact 2×2 matrix",
];

static MATRIX_RELATED: [&str; 2] = ["identity", "zeros"];

impl FunctionPlugin for MatrixFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "matrix",
            description: "Create an exact matrix from a nested list",
            usage: "matrix(data)",
            args: &MATRIX_ARGS,
            returns: "Matrix",
            examples: &MATRIX_EXAMPLES,
            category: "matrix/construct",
            related: &MATRIX_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(WeyrError::arg_count("matrix", 1, args.len()));
        }

        match extract_matrix(&args[0], "matrix", "data") {
            Ok(m) => m.into(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ identity ============

pub struct IdentityFn;

static IDENTITY_ARGS: [ArgMeta; 1] = [ArgMeta::required("n", "Number", "Size of identity matrix")];
static IDENTITY_EXAMPLES: [&str; 1] = ["identity(3) → 3×3 identity matrix"];
static IDENTITY_RELATED: [&str; 2] = ["zeros", "matrix"];

impl FunctionPlugin for IdentityFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "identity",
            description: "Create an n×n identity matrix",
            usage: "identity(n)",
            args: &IDENTITY_ARGS,
            returns: "Matrix",
            examples: &IDENTITY_EXAMPLES,
            category: "matrix/construct",
            related: &IDENTITY_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(WeyrError::arg_count("identity", 1, args.len()));
        }

        let n = match extract_usize(&args[0], "identity", "n") {
            Ok(0) => return Value::Error(WeyrError::domain_error("identity: n must be positive")),
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };
        match check_size(n, ctx) {
            Ok(()) => Matrix::identity(n).into(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ zeros ============

pub struct ZerosFn;

static ZEROS_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("rows", "Number", "Number of rows"),
    ArgMeta::optional("cols", "Number", "Number of columns", "rows"),
];
static ZEROS_EXAMPLES: [&str; 2] = ["zeros(2, 3) → 2×3 zero matrix", "zeros(2) → 2×2 zero matrix"];
static ZEROS_RELATED: [&str; 1] = ["identity"];

impl FunctionPlugin for ZerosFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "zeros",
            description: "Create a matrix of zeros",
            usage: "zeros(rows, [cols])",
            args: &ZEROS_ARGS,
            returns: "Matrix",
            examples: &ZEROS_EXAMPLES,
            category: "matrix/construct",
            related: &ZEROS_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.is_empty() || args.len() > 2 {
            return Value::Error(WeyrError::arg_count("zeros", 2, args.len()));
        }

        let rows = match extract_usize(&args[0], "zeros", "rows") {
            Ok(r) => r,
            Err(e) => return Value::Error(e),
        };
        let cols = match args.get(1) {
            Some(v) => match extract_usize(v, "zeros", "cols") {
                Ok(c) => c,
                Err(e) => return Value::Error(e),
            },
            None => rows,
        };
        if let Err(e) = check_size(rows.max(cols), ctx) {
            return Value::Error(e);
        }

        Matrix::zeros(rows, cols).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weyr_core::codes;

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(PluginRegistry::new()))
    }

    #[test]
    fn test_matrix_fn_accepts_fractions() {
        let data = Value::List(vec![
            Value::List(vec![Value::Text("1/2".to_string()), Value::from(0i64)]),
            Value::List(vec![Value::from(0i64), Value::from(1i64)]),
        ]);
        let result = MatrixFn.call(&[data], &ctx());
        let m = extract_matrix(&result, "test", "m").unwrap();
        assert_eq!(m.get(0, 0), Some(&Rational::from_ratio(1, 2).unwrap()));
    }

    #[test]
    fn test_identity_fn() {
        let result = IdentityFn.call(&[Value::from(3i64)], &ctx());
        assert_eq!(extract_matrix(&result, "test", "m").unwrap(), Matrix::identity(3));
        assert!(IdentityFn.call(&[Value::from(0i64)], &ctx()).is_error());
    }

    #[test]
    fn test_zeros_fn_default_square() {
        let result = ZerosFn.call(&[Value::from(2i64)], &ctx());
        let m = extract_matrix(&result, "test", "m").unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert!(m.is_zero());
    }

    #[test]
    fn test_sizes_above_exact_limit_rejected() {
        let ctx = ctx().with_exact_limit(12);
        let big = IdentityFn.call(&[Value::from(40i64)], &ctx);
        assert!(big.as_error().unwrap().is(codes::DIMENSION_LIMIT));

        let wide = ZerosFn.call(&[Value::from(2i64), Value::from(1_000_000i64)], &ctx);
        assert!(wide.as_error().unwrap().is(codes::DIMENSION_LIMIT));

        assert!(!IdentityFn.call(&[Value::from(12i64)], &ctx).is_error());
    }
}
