//! Full Jordan form assembly across the spectrum

use weyr_core::{Rational, WeyrError};
use weyr_matrix::{check_square, Eigenvalue, Matrix};

use crate::blocks::{derive_block_counts, BlockSizeCounts};
use crate::builder::{jordan_block, many_summand, BlockOrder};
use crate::rank::{stabilize_ranks, RankSequence};
use crate::weyr::WeyrCharacteristic;

/// Options for `jordan_form_with`
#[derive(Debug, Clone, Default)]
pub struct JordanOptions {
    pub block_order: BlockOrder,
    /// Reject inputs larger than this many rows
    pub max_dimension: Option<usize>,
}

impl JordanOptions {
    pub fn with_block_order(mut self, order: BlockOrder) -> Self {
        self.block_order = order;
        self
    }

    pub fn with_max_dimension(mut self, limit: usize) -> Self {
        self.max_dimension = Some(limit);
        self
    }
}

/// Everything derived for one distinct eigenvalue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EigenBlocks {
    pub eigenvalue: Rational,
    pub multiplicity: usize,
    pub ranks: RankSequence,
    pub weyr: WeyrCharacteristic,
    pub counts: BlockSizeCounts,
}

impl EigenBlocks {
    /// Run the rank, Weyr and block count stages for one eigenvalue
    pub fn analyze(a: &Matrix, eigenvalue: &Eigenvalue) -> Result<Self, WeyrError> {
        let ranks = stabilize_ranks(a, &eigenvalue.value)?;
        let weyr = WeyrCharacteristic::from_ranks(&ranks);
        let counts = derive_block_counts(&ranks)?;

        tracing::debug!(
            eigenvalue = %eigenvalue.value,
            multiplicity = eigenvalue.multiplicity,
            ranks = ?ranks.as_slice(),
            weyr = ?weyr.as_slice(),
            "eigenvalue pass"
        );

        if counts.total_size() != eigenvalue.multiplicity {
            tracing::warn!(
                eigenvalue = %eigenvalue.value,
                blocks = counts.total_size(),
                multiplicity = eigenvalue.multiplicity,
                "block sizes do not match characteristic polynomial"
            );
            return Err(WeyrError::invariant(format!(
                "eigenvalue {}: blocks cover {} dimensions, algebraic multiplicity is {}",
                eigenvalue.value, counts.total_size(), eigenvalue.multiplicity
            )));
        }

        Ok(Self {
            eigenvalue: eigenvalue.value.clone(),
            multiplicity: eigenvalue.multiplicity,
            ranks,
            weyr,
            counts,
        })
    }

    /// Jordan blocks for this eigenvalue, joined block-diagonally
    pub fn to_matrix(&self, order: BlockOrder) -> Result<Matrix, WeyrError> {
        let blocks = self
            .counts
            .sizes(order)
            .into_iter()
            .map(|size| jordan_block(&self.eigenvalue, size))
            .collect::<Result<Vec<_>, _>>()?;
        many_summand(&blocks)
    }
}

/// Per-eigenvalue block structure of a square matrix, eigenvalues ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JordanStructure {
    pub dimension: usize,
    pub eigenvalues: Vec<EigenBlocks>,
}

impl JordanStructure {
    /// (eigenvalue, block size) for every block in canonical order
    pub fn blocks(&self, order: BlockOrder) -> Vec<(Rational, usize)> {
        self.eigenvalues
            .iter()
            .flat_map(|e| {
                e.counts
                    .sizes(order)
                    .into_iter()
                    .map(move |size| (e.eigenvalue.clone(), size))
            })
            .collect()
    }

    pub fn to_matrix(&self, order: BlockOrder) -> Result<Matrix, WeyrError> {
        let segments = self
            .eigenvalues
            .iter()
            .map(|e| e.to_matrix(order))
            .collect::<Result<Vec<_>, _>>()?;
        let j = many_summand(&segments)?;

        if j.rows() != self.dimension || j.cols() != self.dimension {
            tracing::warn!(rows = j.rows(), cols = j.cols(), n = self.dimension, "assembled form has wrong shape");
            return Err(WeyrError::invariant(format!(
                "assembled Jordan form is {}×{}, expected {}×{}",
                j.rows(), j.cols(), self.dimension, self.dimension
            )));
        }
        Ok(j)
    }
}

/// Analyze every distinct eigenvalue of `a`
pub fn jordan_structure(a: &Matrix, options: &JordanOptions) -> Result<JordanStructure, WeyrError> {
    check_square(a, "jordan_form")?;
    let n = a.rows();
    if n == 0 {
        return Err(WeyrError::domain_error("jordan_form: matrix must be at least 1×1"));
    }
    if let Some(limit) = options.max_dimension {
        if n > limit {
            return Err(WeyrError::dimension_limit(n, limit));
        }
    }

    let spectrum = a.eigenvalues()?;
    tracing::debug!(n, distinct = spectrum.len(), "computing Jordan structure");

    let eigenvalues = spectrum
        .iter()
        .map(|e| EigenBlocks::analyze(a, e))
        .collect::<Result<Vec<_>, _>>()?;

    let covered: usize = eigenvalues.iter().map(|e| e.multiplicity).sum();
    if covered != n {
        return Err(WeyrError::invariant(format!(
            "multiplicities sum to {}, dimension is {}", covered, n
        )));
    }

    Ok(JordanStructure { dimension: n, eigenvalues })
}

/// Jordan canonical form with default options
pub fn jordan_form(a: &Matrix) -> Result<Matrix, WeyrError> {
    jordan_form_with(a, &JordanOptions::default())
}

pub fn jordan_form_with(a: &Matrix, options: &JordanOptions) -> Result<Matrix, WeyrError> {
    jordan_structure(a, options)?.to_matrix(options.block_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::direct_sum;
    use weyr_core::codes;

    fn r(n: i64) -> Rational {
        Rational::from_i64(n)
    }

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_i64_rows(rows).unwrap()
    }

    #[test]
    fn test_already_jordan_block() {
        let a = m(&[&[2, 1], &[0, 2]]);
        assert_eq!(jordan_form(&a).unwrap(), a);
    }

    #[test]
    fn test_scalar_matrix() {
        let a = Matrix::diagonal(&[r(5), r(5), r(5)]);
        assert_eq!(jordan_form(&a).unwrap(), a);
    }

    #[test]
    fn test_direct_sum_input() {
        let a = direct_sum(&jordan_block(&r(1), 2).unwrap(), &jordan_block(&r(3), 1).unwrap()).unwrap();
        let j = jordan_form(&a).unwrap();
        assert_eq!(j, m(&[&[1, 1, 0], &[0, 1, 0], &[0, 0, 3]]));
    }

    #[test]
    fn test_non_triangular_input() {
        // Similar to J_2(2) via P = [[1, 1], [0, 1]]
        let a = m(&[&[1, 1], &[-1, 3]]);
        assert_eq!(jordan_form(&a).unwrap(), m(&[&[2, 1], &[0, 2]]));
    }

    #[test]
    fn test_diagonalizable_distinct_eigenvalues() {
        let a = m(&[&[4, 1], &[2, 3]]);
        // Eigenvalues 2 and 5
        assert_eq!(jordan_form(&a).unwrap(), m(&[&[2, 0], &[0, 5]]));
    }

    #[test]
    fn test_large_eigenvalues() {
        let big = r(100_000);
        let scalar = Matrix::diagonal(&[big.clone(), big.clone(), big.clone(), big.clone(), big.clone()]);
        assert_eq!(jordan_form(&scalar).unwrap(), scalar);

        // J_2(100003) ⊕ J_1(99991) ⊕ J_2(100003), with coprime prime eigenvalues
        let p = r(100_003);
        let q = r(99_991);
        let a = many_summand(&[
            jordan_block(&p, 2).unwrap(),
            jordan_block(&q, 1).unwrap(),
            jordan_block(&p, 2).unwrap(),
        ]).unwrap();
        let expected = many_summand(&[
            jordan_block(&q, 1).unwrap(),
            jordan_block(&p, 2).unwrap(),
            jordan_block(&p, 2).unwrap(),
        ]).unwrap();
        assert_eq!(jordan_form(&a).unwrap(), expected);
    }

    #[test]
    fn test_idempotent() {
        let a = m(&[&[3, 1, 0, 0], &[0, 3, 0, 0], &[0, 0, 3, 1], &[0, 0, 0, 3]]);
        let j = jordan_form(&a).unwrap();
        assert_eq!(jordan_form(&j).unwrap(), j);

        let b = m(&[&[1, 1], &[-1, 3]]);
        let jb = jordan_form(&b).unwrap();
        assert_eq!(jordan_form(&jb).unwrap(), jb);
    }

    #[test]
    fn test_block_order_within_eigenvalue() {
        // J_1(0) ⊕ J_2(0) rearranged
        let a = m(&[&[0, 0, 0], &[0, 0, 1], &[0, 0, 0]]);
        assert_eq!(jordan_form(&a).unwrap(), m(&[&[0, 1, 0], &[0, 0, 0], &[0, 0, 0]]));

        let asc = JordanOptions::default().with_block_order(BlockOrder::Ascending);
        assert_eq!(jordan_form_with(&a, &asc).unwrap(), a);
    }

    #[test]
    fn test_segments_follow_ascending_eigenvalues() {
        let a = m(&[&[3, 0, 0], &[0, -1, 1], &[0, 0, -1]]);
        let j = jordan_form(&a).unwrap();
        let (top, bottom) = j.split_rows(2).unwrap();
        let (first, _) = top.split_cols(2).unwrap();
        assert_eq!(first, jordan_block(&r(-1), 2).unwrap());
        let (_, last) = bottom.split_cols(2).unwrap();
        assert_eq!(last, m(&[&[3]]));
    }

    #[test]
    fn test_structure_reports_each_eigenvalue() {
        let a = m(&[&[1, 1, 0], &[0, 1, 0], &[0, 0, 3]]);
        let s = jordan_structure(&a, &JordanOptions::default()).unwrap();
        assert_eq!(s.dimension, 3);
        assert_eq!(s.eigenvalues.len(), 2);
        assert_eq!(s.eigenvalues[0].ranks.as_slice(), &[3, 2, 1, 1]);
        assert_eq!(s.eigenvalues[0].weyr.as_slice(), &[1, 1]);
        assert_eq!(s.eigenvalues[1].multiplicity, 1);
        assert_eq!(s.blocks(BlockOrder::Descending), vec![(r(1), 2), (r(3), 1)]);
    }

    #[test]
    fn test_nilpotent() {
        let a = m(&[&[0, 1, 0], &[0, 0, 1], &[0, 0, 0]]);
        assert_eq!(jordan_form(&a).unwrap(), a);
    }

    #[test]
    fn test_rejects_non_square() {
        let err = jordan_form(&Matrix::zeros(2, 3)).unwrap_err();
        assert!(err.is(codes::NOT_SQUARE));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(jordan_form(&Matrix::zeros(0, 0)).is_err());
    }

    #[test]
    fn test_irrational_spectrum() {
        // x² - 2
        let a = m(&[&[0, 2], &[1, 0]]);
        let err = jordan_form(&a).unwrap_err();
        assert!(err.is(codes::IRRATIONAL_SPECTRUM));
    }

    #[test]
    fn test_dimension_limit() {
        let opts = JordanOptions::default().with_max_dimension(2);
        let err = jordan_form_with(&Matrix::identity(3), &opts).unwrap_err();
        assert!(err.is(codes::DIMENSION_LIMIT));
    }

    #[test]
    fn test_eigen_blocks_rejects_non_eigenvalue() {
        let a = m(&[&[2, 1], &[0, 2]]);
        let bogus = Eigenvalue { value: r(4), multiplicity: 2 };
        let err = EigenBlocks::analyze(&a, &bogus).unwrap_err();
        assert!(err.is(codes::NOT_EIGENVALUE));
    }

    #[test]
    fn test_eigen_blocks_rejects_wrong_multiplicity() {
        let a = m(&[&[2, 1], &[0, 2]]);
        let wrong = Eigenvalue { value: r(2), multiplicity: 1 };
        let err = EigenBlocks::analyze(&a, &wrong).unwrap_err();
        assert!(err.is(codes::INVARIANT));
    }
}
