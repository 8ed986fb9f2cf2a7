//! Matrix properties: rank and trace

use weyr_plugin::prelude::*;
use crate::types::Matrix;
use crate::helpers::*;

impl Matrix {
    /// Exact rank by Gaussian elimination over the rationals
    pub fn rank(&self) -> usize {
        let mut m = self.data.clone();
        let mut rank = 0;

        for col in 0..self.cols {
            if rank == self.rows {
                break;
            }

            let Some(pivot_row) = (rank..self.rows).find(|&r| !m[r][col].is_zero()) else {
                continue;
            };
            m.swap(rank, pivot_row);

            let Some(inv) = m[rank][col].recip() else {
                continue;
            };

            for r in (rank + 1)..self.rows {
                if m[r][col].is_zero() {
                    continue;
                }
                let factor = m[r][col].mul(&inv);
                for c in col..self.cols {
                    let delta = factor.mul(&m[rank][c]);
                    m[r][c] = m[r][c].sub(&delta);
                }
            }
            rank += 1;
        }

        rank
    }

    /// Sum of diagonal entries
    pub fn trace(&self) -> Result<Rational, WeyrError> {
        check_square(self, "trace")?;
        Ok((0..self.rows).fold(Rational::zero(), |acc, i| acc.add(&self.data[i][i])))
    }
}

// ============================================================================
// RANK - Exact matrix rank
// ============================================================================

pub struct RankFn;

static RANK_ARGS: [ArgMeta; 1] = [ArgMeta {
    name: "matrix",
    typ: "Matrix",
    description: "Matrix to analyze",
    optional: false,
    default: None,
}];
static RANK_EXAMPLES: [&str; 2] = [
    "rank(identity(3)) → 3",
    "rank([[1, 2, 3], [2, 4, 6]]) → 1",
];
static RANK_RELATED: [&str; 2] = ["mat_power", "eigenvalues"];

impl FunctionPlugin for RankFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "rank",
            description: "Compute the exact rank of a matrix",
            usage: "rank(matrix)",
            args: &RANK_ARGS,
            returns: "Number",
            examples: &RANK_EXAMPLES,
            category: "matrix",
            related: &RANK_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(WeyrError::arg_count("rank", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], "rank", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };
        if let Err(e) = check_limit(&matrix, ctx) {
            return Value::Error(e);
        }

        Value::from(matrix.rank())
    }
}

// ============================================================================
// TRACE - Sum of diagonal elements
// ============================================================================

pub struct TraceFn;

static TRACE_ARGS: [ArgMeta; 1] = [ArgMeta {
    name: "matrix",
    typ: "Matrix",
    description: "Square matrix",
    optional: false,
    default: None,
}];
static TRACE_EXAMPLES: [&str; 1] = ["trace([[1, 2], [3, 4]]) → 5"];
static TRACE_RELATED: [&str; 1] = ["charpoly"];

impl FunctionPlugin for TraceFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "trace",
            description: "Compute the trace (sum of diagonal elements)",
            usage: "trace(matrix)",
            args: &TRACE_ARGS,
            returns: "Number",
            examples: &TRACE_EXAMPLES,
            category: "matrix",
            related: &TRACE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(WeyrError::arg_count("trace", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], "trace", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };

        match matrix.trace() {
            Ok(t) => Value::Number(t),
            Err(e) => Value::Error(e),
        }
    }
}
