//! Registry functions exposing the Jordan pipeline

use std::collections::BTreeMap;

use weyr_matrix::{check_limit, check_size, check_square, extract_matrix, extract_number, extract_text, extract_usize, Matrix};
use weyr_plugin::prelude::*;

use crate::assemble::{jordan_structure, EigenBlocks, JordanOptions};
use crate::blocks::{derive_block_counts, BlockSizeCounts};
use crate::builder::{jordan_block, many_summand, BlockOrder};
use crate::rank::stabilize_ranks;
use crate::weyr::{ExtendedDifferences, WeyrCharacteristic};

/// Variable consulted when no explicit order argument is given
pub const BLOCK_ORDER_VAR: &str = "block_order";

/// Explicit argument first, then the context variable, then the default
fn resolve_order(arg: Option<&Value>, ctx: &EvalContext, func: &str) -> Result<BlockOrder, WeyrError> {
    let text = match extract_text(arg, func, "order")? {
        Some(t) => Some(t),
        None => ctx.get_var(BLOCK_ORDER_VAR).and_then(|v| v.as_text()),
    };
    match text {
        None => Ok(BlockOrder::default()),
        Some(t) => BlockOrder::from_str(t).ok_or_else(|| {
            WeyrError::domain_error(format!("{}: unknown block order '{}'", func, t))
                .with_suggestion("Use 'descending' or 'ascending'")
        }),
    }
}

fn counts_to_value(counts: &BlockSizeCounts) -> Value {
    Value::List(
        counts
            .iter()
            .map(|(size, count)| {
                let mut obj = BTreeMap::new();
                obj.insert("size".to_string(), Value::from(size));
                obj.insert("count".to_string(), Value::from(count));
                Value::Object(obj)
            })
            .collect(),
    )
}

fn eigen_blocks_to_value(e: &EigenBlocks) -> Value {
    let mut obj = BTreeMap::new();
    obj.insert("eigenvalue".to_string(), Value::Number(e.eigenvalue.clone()));
    obj.insert("multiplicity".to_string(), Value::from(e.multiplicity));
    obj.insert("ranks".to_string(), Value::from(e.ranks.as_slice().to_vec()));
    obj.insert("weyr".to_string(), Value::from(e.weyr.as_slice().to_vec()));
    obj.insert("blocks".to_string(), counts_to_value(&e.counts));
    Value::Object(obj)
}

fn options_from(ctx: &EvalContext, order: BlockOrder) -> JordanOptions {
    JordanOptions::default()
        .with_block_order(order)
        .with_max_dimension(ctx.exact_limit)
}

// ============ jordan_form ============

pub struct JordanFormFn;

static JORDAN_FORM_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Square matrix with rational eigenvalues"),
    ArgMeta::optional("order", "Text", "Block order within an eigenvalue", "descending"),
];
static JORDAN_FORM_EXAMPLES: [&str; 2] = [
    "jordan_form([[1, 1], [-1, 3]]) → [[2, 1], [0, 2]]",
    "jordan_form([[0,0,0],[0,0,1],[0,0,0]], \"ascending\") → [[0,0,0],[0,0,1],[0,0,0]]",
];
static JORDAN_FORM_RELATED: [&str; 3] = ["jordan_structure", "weyr", "eigenvalues"];

impl FunctionPlugin for JordanFormFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "jordan_form",
            description: "Jordan canonical form computed from the Weyr characteristic",
            usage: "jordan_form(matrix, [order])",
            args: &JORDAN_FORM_ARGS,
            returns: "Matrix",
            examples: &JORDAN_FORM_EXAMPLES,
            category: "jordan",
            related: &JORDAN_FORM_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.is_empty() || args.len() > 2 {
            return Value::Error(WeyrError::arg_count("jordan_form", 1, args.len()));
        }

        let result = extract_matrix(&args[0], "jordan_form", "matrix").and_then(|a| {
            let order = resolve_order(args.get(1), ctx, "jordan_form")?;
            jordan_structure(&a, &options_from(ctx, order))?.to_matrix(order)
        });

        match result {
            Ok(j) => j.into(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ jordan_structure ============

pub struct JordanStructureFn;

static JORDAN_STRUCTURE_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "Square matrix")];
static JORDAN_STRUCTURE_EXAMPLES: [&str; 1] = [
    "jordan_structure([[2, 1], [0, 2]]) → [{eigenvalue: 2, multiplicity: 2, ranks: [2, 1, 0, 0], weyr: [1, 1], blocks: [{size: 2, count: 1}]}]",
];
static JORDAN_STRUCTURE_RELATED: [&str; 2] = ["jordan_form", "weyr"];

impl FunctionPlugin for JordanStructureFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "jordan_structure",
            description: "Per-eigenvalue rank sequence, Weyr characteristic and block counts",
            usage: "jordan_structure(matrix)",
            args: &JORDAN_STRUCTURE_ARGS,
            returns: "List",
            examples: &JORDAN_STRUCTURE_EXAMPLES,
            category: "jordan",
            related: &JORDAN_STRUCTURE_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(WeyrError::arg_count("jordan_structure", 1, args.len()));
        }

        let result = extract_matrix(&args[0], "jordan_structure", "matrix")
            .and_then(|a| jordan_structure(&a, &options_from(ctx, BlockOrder::default())));

        match result {
            Ok(s) => Value::List(s.eigenvalues.iter().map(eigen_blocks_to_value).collect()),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ weyr ============

pub struct WeyrFn;

static WEYR_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Square matrix"),
    ArgMeta::required("eigenvalue", "Number", "Eigenvalue of the matrix"),
];
static WEYR_EXAMPLES: [&str; 1] = [
    "weyr([[2, 1], [0, 2]], 2) → {ranks: [2, 1, 0, 0], weyr: [1, 1], extended: [1, 1, 0, 0], blocks: [{size: 2, count: 1}]}",
];
static WEYR_RELATED: [&str; 2] = ["jordan_structure", "rank"];

impl FunctionPlugin for WeyrFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "weyr",
            description: "Rank sequence, Weyr characteristic and block counts for one eigenvalue",
            usage: "weyr(matrix, eigenvalue)",
            args: &WEYR_ARGS,
            returns: "Object",
            examples: &WEYR_EXAMPLES,
            category: "jordan",
            related: &WEYR_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 2 {
            return Value::Error(WeyrError::arg_count("weyr", 2, args.len()));
        }

        let result = (|| {
            let a = extract_matrix(&args[0], "weyr", "matrix")?;
            let lambda = extract_number(&args[1], "weyr", "eigenvalue")?;
            check_square(&a, "weyr")?;
            check_limit(&a, ctx)?;

            let ranks = stabilize_ranks(&a, &lambda)?;
            let counts = derive_block_counts(&ranks)?;
            let blocks = EigenBlocks {
                eigenvalue: lambda,
                multiplicity: ranks.algebraic_multiplicity(),
                weyr: WeyrCharacteristic::from_ranks(&ranks),
                ranks,
                counts,
            };
            Ok::<_, WeyrError>(blocks)
        })();

        match result {
            Ok(blocks) => {
                let mut value = eigen_blocks_to_value(&blocks);
                if let Value::Object(obj) = &mut value {
                    let ext = ExtendedDifferences::from_ranks(&blocks.ranks);
                    obj.insert("extended".to_string(), Value::from(ext.as_slice().to_vec()));
                }
                value
            }
            Err(e) => Value::Error(e),
        }
    }
}

// ============ jordan_block ============

pub struct JordanBlockFn;

static JORDAN_BLOCK_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("eigenvalue", "Number", "Diagonal value"),
    ArgMeta::required("size", "Number", "Block size (positive)"),
];
static JORDAN_BLOCK_EXAMPLES: [&str; 2] = [
    "jordan_block(3, 2) → [[3, 1], [0, 3]]",
    "jordan_block(\"1/2\", 1) → [[1/2]]",
];
static JORDAN_BLOCK_RELATED: [&str; 2] = ["direct_sum", "jordan_form"];

impl FunctionPlugin for JordanBlockFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "jordan_block",
            description: "Jordan block λI + S with ones on the superdiagonal",
            usage: "jordan_block(eigenvalue, size)",
            args: &JORDAN_BLOCK_ARGS,
            returns: "Matrix",
            examples: &JORDAN_BLOCK_EXAMPLES,
            category: "jordan/build",
            related: &JORDAN_BLOCK_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 2 {
            return Value::Error(WeyrError::arg_count("jordan_block", 2, args.len()));
        }

        let result = extract_number(&args[0], "jordan_block", "eigenvalue").and_then(|lambda| {
            let size = extract_usize(&args[1], "jordan_block", "size")?;
            check_size(size, ctx)?;
            jordan_block(&lambda, size)
        });

        match result {
            Ok(j) => j.into(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ direct_sum ============

pub struct DirectSumFn;

static DIRECT_SUM_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrices", "Matrix...", "One or more matrices")];
static DIRECT_SUM_EXAMPLES: [&str; 1] = ["direct_sum([[1]], [[2, 3]]) → [[1, 0, 0], [0, 2, 3]]"];
static DIRECT_SUM_RELATED: [&str; 1] = ["jordan_block"];

impl FunctionPlugin for DirectSumFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "direct_sum",
            description: "Block-diagonal direct sum of matrices",
            usage: "direct_sum(m1, m2, ...)",
            args: &DIRECT_SUM_ARGS,
            returns: "Matrix",
            examples: &DIRECT_SUM_EXAMPLES,
            category: "jordan/build",
            related: &DIRECT_SUM_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        // A single list argument is treated as the list of summands
        let items: &[Value] = match args {
            [Value::List(items)] if items.iter().all(|v| v.as_object().is_some()) => items.as_slice(),
            _ => args,
        };
        if items.is_empty() {
            return Value::Error(WeyrError::arg_count("direct_sum", 1, 0));
        }

        let result = items
            .iter()
            .enumerate()
            .map(|(i, v)| extract_matrix(v, "direct_sum", &format!("m{}", i + 1)))
            .collect::<Result<Vec<Matrix>, _>>()
            .and_then(|ms| {
                let rows: usize = ms.iter().map(Matrix::rows).sum();
                let cols: usize = ms.iter().map(Matrix::cols).sum();
                check_size(rows.max(cols), ctx)?;
                many_summand(&ms)
            });

        match result {
            Ok(m) => m.into(),
            Err(e) => Value::Error(e),
        }
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

    fn m(rows: &[&[i64]]) -> Value {
        Matrix::from_i64_rows(rows).unwrap().to_value()
    }

    fn as_matrix(v: &Value) -> Matrix {
        extract_matrix(v, "test", "m").unwrap()
    }

    #[test]
    fn test_jordan_form_fn() {
        let result = JordanFormFn.call(&[m(&[&[1, 1], &[-1, 3]])], &ctx());
        assert_eq!(as_matrix(&result), Matrix::from_i64_rows(&[&[2, 1], &[0, 2]]).unwrap());
    }

    #[test]
    fn test_jordan_form_order_argument_and_variable() {
        let a = m(&[&[0, 0, 0], &[0, 0, 1], &[0, 0, 0]]);
        let asc = JordanFormFn.call(&[a.clone(), Value::from("ascending")], &ctx());
        assert_eq!(as_matrix(&asc), as_matrix(&a));

        let mut c = ctx();
        c.set_var(BLOCK_ORDER_VAR, Value::from("ascending"));
        assert_eq!(as_matrix(&JordanFormFn.call(&[a.clone()], &c)), as_matrix(&a));

        // Explicit argument wins over the variable
        let desc = JordanFormFn.call(&[a.clone(), Value::from("descending")], &c);
        assert_ne!(as_matrix(&desc), as_matrix(&a));

        let bad = JordanFormFn.call(&[a, Value::from("sideways")], &ctx());
        assert!(bad.as_error().is_some_and(|e| e.is(codes::DOMAIN_ERROR)));
    }

    #[test]
    fn test_jordan_form_fn_respects_limit() {
        let c = ctx().with_exact_limit(2);
        let result = JordanFormFn.call(&[Matrix::identity(3).to_value()], &c);
        assert!(result.as_error().is_some_and(|e| e.is(codes::DIMENSION_LIMIT)));
    }

    #[test]
    fn test_weyr_fn() {
        let result = WeyrFn.call(&[m(&[&[2, 1], &[0, 2]]), Value::from(2i64)], &ctx());
        assert_eq!(result.get("ranks"), Value::from(vec![2usize, 1, 0, 0]));
        assert_eq!(result.get("weyr"), Value::from(vec![1usize, 1]));
        assert_eq!(result.get("extended"), Value::from(vec![1usize, 1, 0, 0]));
        let blocks = result.get("blocks");
        let first = &blocks.as_list().unwrap()[0];
        assert_eq!(first.get("size"), Value::from(2usize));
        assert_eq!(first.get("count"), Value::from(1usize));
    }

    #[test]
    fn test_weyr_fn_not_eigenvalue() {
        let result = WeyrFn.call(&[m(&[&[2, 1], &[0, 2]]), Value::from(3i64)], &ctx());
        assert!(result.as_error().is_some_and(|e| e.is(codes::NOT_EIGENVALUE)));
    }

    #[test]
    fn test_jordan_structure_fn() {
        let result = JordanStructureFn.call(&[m(&[&[1, 1, 0], &[0, 1, 0], &[0, 0, 3]])], &ctx());
        let list = result.as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].get("eigenvalue"), Value::from(1i64));
        assert_eq!(list[1].get("multiplicity"), Value::from(1usize));
    }

    #[test]
    fn test_jordan_block_fn() {
        let result = JordanBlockFn.call(&[Value::from("1/2"), Value::from(2i64)], &ctx());
        let j = as_matrix(&result);
        assert_eq!(j.get(0, 0), Some(&Rational::from_ratio(1, 2).unwrap()));
        assert_eq!(j.get(0, 1), Some(&Rational::one()));

        assert!(JordanBlockFn.call(&[Value::from(1i64), Value::from(0i64)], &ctx()).is_error());
    }

    #[test]
    fn test_jordan_block_fn_respects_limit() {
        let ctx = ctx().with_exact_limit(12);
        let result = JordanBlockFn.call(&[Value::from(1i64), Value::from(40i64)], &ctx);
        assert!(result.as_error().unwrap().is(codes::DIMENSION_LIMIT));

        let result = JordanBlockFn.call(&[Value::from(0i64), Value::from(1_000_000i64)], &ctx);
        assert!(result.as_error().unwrap().is(codes::DIMENSION_LIMIT));

        let ones: Vec<Value> = (0..13).map(|_| m(&[&[1]])).collect();
        let result = DirectSumFn.call(&ones, &ctx);
        assert!(result.as_error().unwrap().is(codes::DIMENSION_LIMIT));
    }

    #[test]
    fn test_direct_sum_fn() {
        let result = DirectSumFn.call(&[m(&[&[1]]), m(&[&[2, 3]])], &ctx());
        assert_eq!(as_matrix(&result), Matrix::from_i64_rows(&[&[1, 0, 0], &[0, 2, 3]]).unwrap());

        let listed = DirectSumFn.call(&[Value::List(vec![m(&[&[1]]), m(&[&[2]])])], &ctx());
        assert_eq!(as_matrix(&listed), Matrix::from_i64_rows(&[&[1, 0], &[0, 2]]).unwrap());

        assert!(DirectSumFn.call(&[], &ctx()).is_error());
    }
}
