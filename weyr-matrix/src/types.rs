//! Core matrix type

use std::collections::BTreeMap;
use std::fmt;
use weyr_core::{Rational, Value, WeyrError};

/// Dense matrix over exact rationals
///
/// Dimensions are stored separately from the row data so that degenerate
/// shapes such as 0×3 (needed by direct sums with an empty operand) are
/// representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    pub(crate) data: Vec<Vec<Rational>>,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl Matrix {
    /// Create a matrix from nested rows, rejecting ragged input
    pub fn from_nested_list(data: Vec<Vec<Rational>>) -> Result<Self, WeyrError> {
        if data.is_empty() {
            return Err(WeyrError::domain_error("matrix: empty data"));
        }

        let rows = data.len();
        let cols = data[0].len();

        for (i, row) in data.iter().enumerate() {
            if row.len() != cols {
                return Err(WeyrError::domain_error(format!(
                    "matrix: row {} has {} columns, expected {}",
                    i, row.len(), cols
                )));
            }
        }

        Ok(Matrix { data, rows, cols })
    }

    /// Convenience constructor from integer rows
    pub fn from_i64_rows(rows: &[&[i64]]) -> Result<Self, WeyrError> {
        Self::from_nested_list(
            rows.iter()
                .map(|row| row.iter().map(|&x| Rational::from_i64(x)).collect())
                .collect(),
        )
    }

    /// Build a rows×cols matrix entry by entry
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Rational,
    {
        let data = (0..rows)
            .map(|i| (0..cols).map(|j| f(i, j)).collect())
            .collect();
        Matrix { data, rows, cols }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| Rational::zero())
    }

    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { Rational::one() } else { Rational::zero() })
    }

    /// Diagonal matrix with the given entries
    pub fn diagonal(entries: &[Rational]) -> Self {
        let n = entries.len();
        Self::from_fn(n, n, |i, j| if i == j { entries[i].clone() } else { Rational::zero() })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Get element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Option<&Rational> {
        self.data.get(row).and_then(|r| r.get(col))
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|row| row.iter().all(Rational::is_zero))
    }

    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", val)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// Convert Matrix to Value
impl From<Matrix> for Value {
    fn from(m: Matrix) -> Value {
        let mut obj = BTreeMap::new();
        obj.insert("type".to_string(), Value::Text("Matrix".to_string()));
        obj.insert("rows".to_string(), Value::from(m.rows));
        obj.insert("cols".to_string(), Value::from(m.cols));

        let data: Vec<Value> = m.data.into_iter()
            .map(|row| Value::List(row.into_iter().map(Value::Number).collect()))
            .collect();
        obj.insert("data".to_string(), Value::List(data));

        Value::Object(obj)
    }
}
