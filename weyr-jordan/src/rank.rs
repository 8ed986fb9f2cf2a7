//! Rank stabilization for powers of (A - λI)

use serde::Serialize;
use weyr_core::{Rational, WeyrError};
use weyr_matrix::{check_square, Matrix};

/// Ranks of (A - λI)^p for p = 0, 1, 2, … up to and including the first
/// repeated value.
///
/// Always starts at n (the zeroth power is the identity), never increases,
/// and ends with two equal entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankSequence {
    ranks: Vec<usize>,
}

impl RankSequence {
    /// Validate a hand-built sequence
    pub fn from_ranks(ranks: Vec<usize>) -> Result<Self, WeyrError> {
        if ranks.len() < 2 {
            return Err(WeyrError::domain_error("rank sequence needs at least two entries"));
        }
        if ranks.windows(2).any(|w| w[1] > w[0]) {
            return Err(WeyrError::domain_error(format!("rank sequence {:?} increases", ranks)));
        }
        let n = ranks.len();
        if ranks[n - 1] != ranks[n - 2] {
            return Err(WeyrError::domain_error(format!("rank sequence {:?} has not stabilized", ranks)));
        }
        if ranks[..n - 1].windows(2).any(|w| w[0] == w[1]) {
            return Err(WeyrError::domain_error(format!("rank sequence {:?} continues past stabilization", ranks)));
        }
        Ok(Self { ranks })
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// r[0], the matrix dimension
    pub fn dimension(&self) -> usize {
        self.ranks[0]
    }

    /// Rank at which the powers stop shrinking
    pub fn stable_rank(&self) -> usize {
        self.ranks[self.ranks.len() - 1]
    }

    /// n minus the stable rank: the dimension of the generalized eigenspace
    pub fn algebraic_multiplicity(&self) -> usize {
        self.dimension() - self.stable_rank()
    }

    /// Smallest p with rank((A - λI)^p) stable, i.e. the largest block size
    pub fn index(&self) -> usize {
        self.ranks.len() - 2
    }
}

/// Compute rank((A - λI)^p) for p = 0, 1, … until two consecutive ranks match.
///
/// Fails with `NOT_EIGENVALUE` when A - λI already has full rank.
pub fn stabilize_ranks(a: &Matrix, eigenvalue: &Rational) -> Result<RankSequence, WeyrError> {
    check_square(a, "stabilize_ranks")?;
    let n = a.rows();
    let shifted = a.shift(eigenvalue)?;

    let mut ranks = vec![n];
    let mut power = Matrix::identity(n);
    loop {
        power = power.matmul(&shifted)?;
        let rank = power.rank();
        let previous = ranks[ranks.len() - 1];
        tracing::trace!(p = ranks.len(), rank, "rank of shifted power");

        if rank > previous {
            return Err(WeyrError::invariant(format!(
                "rank grew from {} to {} at power {}", previous, rank, ranks.len()
            )));
        }
        ranks.push(rank);
        if rank == previous {
            break;
        }
    }

    if ranks[1] == n {
        return Err(WeyrError::not_eigenvalue(eigenvalue));
    }

    Ok(RankSequence { ranks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use weyr_core::codes;

    fn r(n: i64) -> Rational {
        Rational::from_i64(n)
    }

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_i64_rows(rows).unwrap()
    }

    #[test]
    fn test_single_jordan_block() {
        let a = m(&[&[2, 1], &[0, 2]]);
        let ranks = stabilize_ranks(&a, &r(2)).unwrap();
        assert_eq!(ranks.as_slice(), &[2, 1, 0, 0]);
        assert_eq!(ranks.algebraic_multiplicity(), 2);
        assert_eq!(ranks.index(), 2);
    }

    #[test]
    fn test_diagonal_matrix() {
        let a = Matrix::diagonal(&[r(5), r(5), r(5)]);
        let ranks = stabilize_ranks(&a, &r(5)).unwrap();
        assert_eq!(ranks.as_slice(), &[3, 0, 0]);
    }

    #[test]
    fn test_mixed_spectrum() {
        // J_2(1) ⊕ J_1(3)
        let a = m(&[&[1, 1, 0], &[0, 1, 0], &[0, 0, 3]]);
        assert_eq!(stabilize_ranks(&a, &r(1)).unwrap().as_slice(), &[3, 2, 1, 1]);
        assert_eq!(stabilize_ranks(&a, &r(3)).unwrap().as_slice(), &[3, 2, 2]);
    }

    #[test]
    fn test_sequence_is_non_increasing_and_starts_at_n() {
        let a = m(&[&[3, 1, 0, 0], &[0, 3, 1, 0], &[0, 0, 3, 0], &[0, 0, 0, 3]]);
        let ranks = stabilize_ranks(&a, &r(3)).unwrap();
        assert_eq!(ranks.dimension(), 4);
        assert!(ranks.as_slice().windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(ranks.as_slice(), &[4, 2, 1, 0, 0]);
    }

    #[test]
    fn test_not_an_eigenvalue() {
        let a = m(&[&[2, 1], &[0, 2]]);
        let err = stabilize_ranks(&a, &r(7)).unwrap_err();
        assert!(err.is(codes::NOT_EIGENVALUE));
    }

    #[test]
    fn test_non_square_rejected() {
        let err = stabilize_ranks(&Matrix::zeros(2, 3), &r(0)).unwrap_err();
        assert!(err.is(codes::NOT_SQUARE));
    }

    #[test]
    fn test_from_ranks_validation() {
        assert!(RankSequence::from_ranks(vec![3, 1, 0, 0]).is_ok());
        assert!(RankSequence::from_ranks(vec![3]).is_err());
        assert!(RankSequence::from_ranks(vec![3, 1, 2, 2]).is_err());
        assert!(RankSequence::from_ranks(vec![3, 1, 0]).is_err());
        assert!(RankSequence::from_ranks(vec![3, 1, 1, 1]).is_err());
    }
}
