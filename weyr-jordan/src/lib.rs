//! Weyr Jordan - Jordan canonical form via the Weyr characteristic
//!
//! For each distinct eigenvalue λ of a square rational matrix A:
//! 1. ranks of (A - λI)^p until they stabilize
//! 2. first differences give the Weyr characteristic
//! 3. differences of the zero-extended Weyr sequence give block counts
//! 4. blocks λI + S are joined block-diagonally
//!
//! Segments are ordered by ascending eigenvalue; blocks within a segment
//! are largest first unless `BlockOrder::Ascending` is requested.

mod rank;
mod weyr;
mod blocks;
mod builder;
mod assemble;
mod functions;

pub use rank::{stabilize_ranks, RankSequence};
pub use weyr::{extended_differences, weyr, ExtendedDifferences, WeyrCharacteristic};
pub use blocks::{block_counts, block_counts_from_ranks, derive_block_counts, BlockSizeCounts};
pub use builder::{direct_sum, jordan_block, many_summand, BlockOrder};
pub use assemble::{jordan_form, jordan_form_with, jordan_structure, EigenBlocks, JordanOptions, JordanStructure};
pub use functions::BLOCK_ORDER_VAR;

use weyr_matrix::load_matrix_library;
use weyr_plugin::PluginRegistry;

/// Load Jordan functions into registry
pub fn load_jordan_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        .with_function(functions::JordanFormFn)
        .with_function(functions::JordanStructureFn)
        .with_function(functions::WeyrFn)
        .with_function(functions::JordanBlockFn)
        .with_function(functions::DirectSumFn)
}

/// Registry with the matrix and Jordan libraries loaded
pub fn standard_registry() -> PluginRegistry {
    load_jordan_library(load_matrix_library(PluginRegistry::new()))
}
