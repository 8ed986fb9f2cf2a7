//! Matrix arithmetic, powers, joins and splits

use weyr_plugin::prelude::*;
use crate::types::Matrix;
use crate::helpers::*;

impl Matrix {
    pub fn add(&self, other: &Matrix) -> Result<Matrix, WeyrError> {
        check_same_dims(self, other, "add")?;
        Ok(Matrix::from_fn(self.rows, self.cols, |i, j| self.data[i][j].add(&other.data[i][j])))
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix, WeyrError> {
        check_same_dims(self, other, "sub")?;
        Ok(Matrix::from_fn(self.rows, self.cols, |i, j| self.data[i][j].sub(&other.data[i][j])))
    }

    /// Multiply every entry by a scalar
    pub fn scale(&self, factor: &Rational) -> Matrix {
        Matrix::from_fn(self.rows, self.cols, |i, j| self.data[i][j].mul(factor))
    }

    /// A - λI
    pub fn shift(&self, lambda: &Rational) -> Result<Matrix, WeyrError> {
        check_square(self, "shift")?;
        self.sub(&Matrix::identity(self.rows).scale(lambda))
    }

    pub fn matmul(&self, other: &Matrix) -> Result<Matrix, WeyrError> {
        check_matmul_dims(self, other, "matmul")?;
        Ok(Matrix::from_fn(self.rows, other.cols, |i, j| {
            (0..self.cols).fold(Rational::zero(), |acc, k| {
                if self.data[i][k].is_zero() {
                    acc
                } else {
                    acc.add(&self.data[i][k].mul(&other.data[k][j]))
                }
            })
        }))
    }

    /// Integer power by repeated squaring; p = 0 yields the identity
    pub fn pow(&self, p: u32) -> Result<Matrix, WeyrError> {
        check_square(self, "mat_power")?;

        let mut result = Matrix::identity(self.rows);
        let mut base = self.clone();
        let mut exp = p;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.matmul(&base)?;
            }
            exp >>= 1;
            if exp > 0 {
                base = base.matmul(&base)?;
            }
        }
        Ok(result)
    }

    /// Horizontal concatenation [self | other]
    pub fn row_join(&self, other: &Matrix) -> Result<Matrix, WeyrError> {
        if self.rows != other.rows {
            return Err(WeyrError::domain_error(format!(
                "row_join: row counts differ: {} vs {}", self.rows, other.rows
            )));
        }
        let data = self.data.iter().zip(&other.data)
            .map(|(a, b)| a.iter().chain(b).cloned().collect())
            .collect();
        Ok(Matrix { data, rows: self.rows, cols: self.cols + other.cols })
    }

    /// Vertical concatenation [self ; other]
    pub fn col_join(&self, other: &Matrix) -> Result<Matrix, WeyrError> {
        if self.cols != other.cols {
            return Err(WeyrError::domain_error(format!(
                "col_join: column counts differ: {} vs {}", self.cols, other.cols
            )));
        }
        let data = self.data.iter().chain(&other.data).cloned().collect();
        Ok(Matrix { data, rows: self.rows + other.rows, cols: self.cols })
    }

    /// Split into rows [0, at) and [at, rows)
    pub fn split_rows(&self, at: usize) -> Result<(Matrix, Matrix), WeyrError> {
        if at > self.rows {
            return Err(WeyrError::domain_error(format!(
                "split_rows: index {} out of range for {} rows", at, self.rows
            )));
        }
        let top = Matrix { data: self.data[..at].to_vec(), rows: at, cols: self.cols };
        let bottom = Matrix { data: self.data[at..].to_vec(), rows: self.rows - at, cols: self.cols };
        Ok((top, bottom))
    }

    /// Split into columns [0, at) and [at, cols)
    pub fn split_cols(&self, at: usize) -> Result<(Matrix, Matrix), WeyrError> {
        if at > self.cols {
            return Err(WeyrError::domain_error(format!(
                "split_cols: index {} out of range for {} columns", at, self.cols
            )));
        }
        let left = Matrix::from_fn(self.rows, at, |i, j| self.data[i][j].clone());
        let right = Matrix::from_fn(self.rows, self.cols - at, |i, j| self.data[i][at + j].clone());
        Ok((left, right))
    }
}

// ============ matmul ============

pub struct MatmulFn;

static MATMUL_ARGS: [ArgMeta; 2] = [
    ArgMeta { name: "a", typ: "Matrix", description: "Left matrix (m×n)", optional: false, default: None },
    ArgMeta { name: "b", typ: "Matrix", description: "Right matrix (n×p)", optional: false, default: None },
];
static MATMUL_EXAMPLES: [&str; 1] = ["matmul([[1,2],[3,4]], [[0,1],[1,0]]) → [[2,1],[4,3]]"];
static MATMUL_RELATED: [&str; 1] = ["mat_power"];

impl FunctionPlugin for MatmulFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "matmul", description: "Exact matrix product", usage: "matmul(a, b)",
            args: &MATMUL_ARGS, returns: "Matrix", examples: &MATMUL_EXAMPLES,
            category: "matrix/ops", related: &MATMUL_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() != 2 { return Value::Error(WeyrError::arg_count("matmul", 2, args.len())); }

        let a = match extract_matrix(&args[0], "matmul", "a") { Ok(m) => m, Err(e) => return Value::Error(e) };
        let b = match extract_matrix(&args[1], "matmul", "b") { Ok(m) => m, Err(e) => return Value::Error(e) };

        match a.matmul(&b) {
            Ok(m) => m.into(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ mat_power ============

pub struct MatPowerFn;

static MAT_POWER_ARGS: [ArgMeta; 2] = [
    ArgMeta { name: "matrix", typ: "Matrix", description: "Square matrix", optional: false, default: None },
    ArgMeta { name: "n", typ: "Number", description: "Power (non-negative integer)", optional: false, default: None },
];
static MAT_POWER_EXAMPLES: [&str; 2] = ["mat_power([[0,1],[0,0]], 2) → [[0,0],[0,0]]", "mat_power(m, 0) → identity"];
static MAT_POWER_RELATED: [&str; 2] = ["matmul", "rank"];

impl FunctionPlugin for MatPowerFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "mat_power", description: "Matrix power (repeated squaring)", usage: "mat_power(matrix, n)",
            args: &MAT_POWER_ARGS, returns: "Matrix", examples: &MAT_POWER_EXAMPLES,
            category: "matrix/ops", related: &MAT_POWER_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 2 { return Value::Error(WeyrError::arg_count("mat_power", 2, args.len())); }

        let m = match extract_matrix(&args[0], "mat_power", "matrix") { Ok(m) => m, Err(e) => return Value::Error(e) };
        let n = match extract_usize(&args[1], "mat_power", "n") { Ok(n) => n, Err(e) => return Value::Error(e) };
        if let Err(e) = check_limit(&m, ctx) { return Value::Error(e); }

        let n = match check_exponent(n, "mat_power") {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };

        match m.pow(n) {
            Ok(result) => result.into(),
            Err(e) => Value::Error(e),
        }
    }
}
