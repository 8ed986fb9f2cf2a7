//! Helper functions for matrix plugins

use weyr_core::{Rational, Value, WeyrError};
use weyr_plugin::EvalContext;
use crate::types::Matrix;

/// Extract a rational from a Value (numbers or text like "1/2")
pub fn extract_number(value: &Value, func: &str, arg: &str) -> Result<Rational, WeyrError> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        Value::Text(s) => Rational::from_str(s)
            .map_err(|e| WeyrError::from(e).with_note(format!("{}: argument '{}'", func, arg))),
        Value::Error(e) => Err(e.clone()),
        _ => Err(WeyrError::arg_type(func, arg, "Number", value.type_name())),
    }
}

/// Extract a usize from a Value
pub fn extract_usize(value: &Value, func: &str, arg: &str) -> Result<usize, WeyrError> {
    let n = extract_number(value, func, arg)?;
    let i = n.to_i64()
        .ok_or_else(|| WeyrError::domain_error(format!("{}: {} must be an integer", func, arg)))?;
    if i < 0 {
        return Err(WeyrError::domain_error(format!("{}: {} must be non-negative", func, arg)));
    }
    Ok(i as usize)
}

/// Extract an optional text argument
pub fn extract_text<'a>(value: Option<&'a Value>, func: &str, arg: &str) -> Result<Option<&'a str>, WeyrError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Text(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(WeyrError::arg_type(func, arg, "Text", other.type_name())),
    }
}

/// Extract a matrix from a Value (either a Matrix object or nested list)
pub fn extract_matrix(value: &Value, func: &str, arg: &str) -> Result<Matrix, WeyrError> {
    match value {
        Value::Object(obj) => {
            if let (Some(Value::Text(t)), Some(Value::List(data))) = (obj.get("type"), obj.get("data")) {
                if t == "Matrix" {
                    return extract_matrix_from_nested_list(data, func, arg);
                }
            }
            Err(WeyrError::arg_type(func, arg, "Matrix", "Object"))
        }
        Value::List(rows) => extract_matrix_from_nested_list(rows, func, arg),
        Value::Error(e) => Err(e.clone()),
        _ => Err(WeyrError::arg_type(func, arg, "Matrix", value.type_name())),
    }
}

fn extract_matrix_from_nested_list(rows: &[Value], func: &str, arg: &str) -> Result<Matrix, WeyrError> {
    if rows.is_empty() {
        return Err(WeyrError::domain_error(format!("{}: {} cannot be empty", func, arg)));
    }

    let mut data = Vec::with_capacity(rows.len());
    for (i, row_val) in rows.iter().enumerate() {
        match row_val {
            Value::List(cols) => {
                let mut row = Vec::with_capacity(cols.len());
                for (j, col_val) in cols.iter().enumerate() {
                    let entry = extract_number(col_val, func, &format!("{}[{}][{}]", arg, i, j))?;
                    row.push(entry);
                }
                data.push(row);
            }
            _ => return Err(WeyrError::domain_error(format!(
                "{}: {} row {} must be a list", func, arg, i
            ))),
        }
    }

    Matrix::from_nested_list(data)
}

/// Check that a matrix is square
pub fn check_square(m: &Matrix, func: &str) -> Result<(), WeyrError> {
    if !m.is_square() {
        return Err(WeyrError::not_square(func, m.rows(), m.cols()));
    }
    Ok(())
}

/// Check that two matrices have the same dimensions
pub fn check_same_dims(a: &Matrix, b: &Matrix, func: &str) -> Result<(), WeyrError> {
    if a.rows() != b.rows() || a.cols() != b.cols() {
        return Err(WeyrError::domain_error(format!(
            "{}: matrices must have same dimensions: {}×{} vs {}×{}",
            func, a.rows(), a.cols(), b.rows(), b.cols()
        )));
    }
    Ok(())
}

/// Check that two matrices have compatible dimensions for multiplication
pub fn check_matmul_dims(a: &Matrix, b: &Matrix, func: &str) -> Result<(), WeyrError> {
    if a.cols() != b.rows() {
        return Err(WeyrError::domain_error(format!(
            "{}: incompatible dimensions {}×{} and {}×{}",
            func, a.rows(), a.cols(), b.rows(), b.cols()
        )));
    }
    Ok(())
}

/// Largest exponent accepted by `mat_power`
pub const MAX_EXPONENT: usize = 4096;

/// Reject matrices larger than the context's exact arithmetic limit
pub fn check_limit(m: &Matrix, ctx: &EvalContext) -> Result<(), WeyrError> {
    check_size(m.rows().max(m.cols()), ctx)
}

/// Same limit for a requested dimension, before anything is allocated
pub fn check_size(n: usize, ctx: &EvalContext) -> Result<(), WeyrError> {
    if n > ctx.exact_limit {
        return Err(WeyrError::dimension_limit(n, ctx.exact_limit));
    }
    Ok(())
}

pub fn check_exponent(n: usize, func: &str) -> Result<u32, WeyrError> {
    if n > MAX_EXPONENT {
        return Err(WeyrError::domain_error(format!(
            "{}: exponent {} exceeds {}", func, n, MAX_EXPONENT
        )).with_suggestion("Ranks of powers stabilize by the matrix dimension; smaller exponents suffice"));
    }
    u32::try_from(n).map_err(|_| WeyrError::domain_error(format!("{}: exponent is too large", func)))
}
