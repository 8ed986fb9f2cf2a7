//! Jordan block construction and block-diagonal assembly

use serde::{Deserialize, Serialize};
use weyr_core::{Rational, WeyrError};
use weyr_matrix::Matrix;

/// Order of blocks within one eigenvalue's segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockOrder {
    /// Largest block first
    #[default]
    Descending,
    /// Smallest block first
    Ascending,
}

impl BlockOrder {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "descending" | "desc" => Some(Self::Descending),
            "ascending" | "asc" => Some(Self::Ascending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Descending => "descending",
            Self::Ascending => "ascending",
        }
    }
}

/// n×n matrix with ones on the superdiagonal, assembled column by column
fn superdiagonal(n: usize) -> Result<Matrix, WeyrError> {
    let column = |one_at: Option<usize>| {
        Matrix::from_fn(n, 1, |i, _| {
            if Some(i) == one_at { Rational::one() } else { Rational::zero() }
        })
    };
    (1..n).try_fold(column(None), |acc, j| acc.row_join(&column(Some(j - 1))))
}

/// J_n(λ) = λI + S where S carries ones on the superdiagonal
pub fn jordan_block(eigenvalue: &Rational, size: usize) -> Result<Matrix, WeyrError> {
    if size == 0 {
        return Err(WeyrError::domain_error("jordan_block: size must be positive"));
    }
    Matrix::identity(size).scale(eigenvalue).add(&superdiagonal(size)?)
}

/// Block-diagonal [[A, 0], [0, B]]. Either side may be 0×0.
pub fn direct_sum(a: &Matrix, b: &Matrix) -> Result<Matrix, WeyrError> {
    let upper = a.row_join(&Matrix::zeros(a.rows(), b.cols()))?;
    let lower = Matrix::zeros(b.rows(), a.cols()).row_join(b)?;
    upper.col_join(&lower)
}

/// Left fold of `direct_sum` over a non-empty list
pub fn many_summand(blocks: &[Matrix]) -> Result<Matrix, WeyrError> {
    let (first, rest) = blocks
        .split_first()
        .ok_or_else(|| WeyrError::domain_error("many_summand: at least one matrix is required"))?;
    rest.iter().try_fold(first.clone(), |acc, m| direct_sum(&acc, m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from_i64(n)
    }

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_i64_rows(rows).unwrap()
    }

    #[test]
    fn test_block_of_size_one() {
        assert_eq!(jordan_block(&r(7), 1).unwrap(), m(&[&[7]]));
    }

    #[test]
    fn test_block_of_size_three() {
        let j = jordan_block(&r(-2), 3).unwrap();
        assert_eq!(j, m(&[&[-2, 1, 0], &[0, -2, 1], &[0, 0, -2]]));
    }

    #[test]
    fn test_block_with_fraction() {
        let half = Rational::from_ratio(1, 2).unwrap();
        let j = jordan_block(&half, 2).unwrap();
        assert_eq!(j.get(0, 0), Some(&half));
        assert_eq!(j.get(0, 1), Some(&r(1)));
        assert_eq!(j.get(1, 0), Some(&r(0)));
    }

    #[test]
    fn test_block_size_zero_rejected() {
        assert!(jordan_block(&r(1), 0).is_err());
    }

    #[test]
    fn test_direct_sum_shape_and_placement() {
        let a = m(&[&[1, 2, 3]]);
        let b = m(&[&[4], &[5]]);
        let s = direct_sum(&a, &b).unwrap();
        assert_eq!((s.rows(), s.cols()), (3, 4));
        assert_eq!(s, m(&[&[1, 2, 3, 0], &[0, 0, 0, 4], &[0, 0, 0, 5]]));
    }

    #[test]
    fn test_direct_sum_with_empty() {
        let a = m(&[&[1, 2], &[3, 4]]);
        assert_eq!(direct_sum(&a, &Matrix::zeros(0, 0)).unwrap(), a);
        assert_eq!(direct_sum(&Matrix::zeros(0, 0), &a).unwrap(), a);
    }

    #[test]
    fn test_many_summand() {
        let a = m(&[&[1, 1], &[0, 1]]);
        assert_eq!(many_summand(std::slice::from_ref(&a)).unwrap(), a);

        let blocks = [jordan_block(&r(1), 2).unwrap(), jordan_block(&r(3), 1).unwrap()];
        let s = many_summand(&blocks).unwrap();
        assert_eq!(s, m(&[&[1, 1, 0], &[0, 1, 0], &[0, 0, 3]]));

        assert!(many_summand(&[]).is_err());
    }

    #[test]
    fn test_block_order_parse() {
        assert_eq!(BlockOrder::from_str("Ascending"), Some(BlockOrder::Ascending));
        assert_eq!(BlockOrder::from_str("desc"), Some(BlockOrder::Descending));
        assert_eq!(BlockOrder::from_str("sideways"), None);
        assert_eq!(BlockOrder::default(), BlockOrder::Descending);
    }
}
