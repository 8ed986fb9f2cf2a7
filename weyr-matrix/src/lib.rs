//! Weyr Matrix - Exact rational linear algebra
//!
//! Provides the matrix primitives the Jordan pipeline relies on:
//! - Construction (matrix, identity, zeros, diagonal)
//! - Arithmetic (add, sub, scale, shift, matmul, mat_power)
//! - Properties (rank, trace)
//! - Block plumbing (row_join, col_join, split_rows, split_cols)
//! - Spectrum (charpoly, eigenvalues with multiplicity)
//!
//! All arithmetic is exact; there is no floating point fallback.

mod types;
mod helpers;
mod construct;
mod ops;
mod props;
mod eigen;

pub use types::Matrix;
pub use eigen::{Eigenvalue, Polynomial};
pub use helpers::{
    extract_matrix, extract_number, extract_usize, extract_text,
    check_square, check_limit, check_size, check_exponent, MAX_EXPONENT,
};

use weyr_plugin::PluginRegistry;

/// Load matrix functions into registry
pub fn load_matrix_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Construction
        .with_function(construct::MatrixFn)
        .with_function(construct::IdentityFn)
        .with_function(construct::ZerosFn)

        // Operations
        .with_function(ops::MatmulFn)
        .with_function(ops::MatPowerFn)

        // Properties
        .with_function(props::RankFn)
        .with_function(props::TraceFn)

        // Spectrum
        .with_function(eigen::CharPolyFn)
        .with_function(eigen::EigenvaluesFn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_matrix_library() {
        let registry = load_matrix_library(PluginRegistry::new());

        assert!(registry.get_function("matrix").is_some());
        assert!(registry.get_function("identity").is_some());
        assert!(registry.get_function("rank").is_some());
        assert!(registry.get_function("mat_power").is_some());
        assert!(registry.get_function("eigenvalues").is_some());
        assert_eq!(registry.function_count(), 9);
    }
}
