//! Jordan block counts from the extended differences

use std::collections::BTreeMap;

use serde::Serialize;
use weyr_core::WeyrError;

use crate::builder::BlockOrder;
use crate::rank::RankSequence;
use crate::weyr::{ExtendedDifferences, WeyrCharacteristic};

/// Number of Jordan blocks of each size for one eigenvalue.
/// Only sizes with a positive count are stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct BlockSizeCounts {
    counts: BTreeMap<usize, usize>,
}

impl BlockSizeCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` more blocks of `size`. Zero counts are ignored.
    pub fn insert(&mut self, size: usize, count: usize) {
        if count > 0 && size > 0 {
            *self.counts.entry(size).or_insert(0) += count;
        }
    }

    pub fn get(&self, size: usize) -> usize {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    /// (size, count) pairs in ascending size
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&s, &c)| (s, c))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Σ size · count
    pub fn total_size(&self) -> usize {
        self.iter().map(|(s, c)| s * c).sum()
    }

    pub fn block_count(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn largest(&self) -> Option<usize> {
        self.counts.keys().next_back().copied()
    }

    /// Every block size repeated by its count, in the requested order
    pub fn sizes(&self, order: BlockOrder) -> Vec<usize> {
        let ascending = self.iter().flat_map(|(s, c)| std::iter::repeat(s).take(c));
        match order {
            BlockOrder::Ascending => ascending.collect(),
            BlockOrder::Descending => {
                let mut sizes: Vec<usize> = ascending.collect();
                sizes.reverse();
                sizes
            }
        }
    }
}

/// Block counts b_i = ext[i-1] - ext[i] for i = 1 .. len-1.
///
/// A negative difference means the input did not come from a valid rank
/// sequence; that is reported as an `INVARIANT` error.
pub fn block_counts(ext: &ExtendedDifferences) -> Result<BlockSizeCounts, WeyrError> {
    let values = ext.as_slice();
    let mut counts = BlockSizeCounts::new();

    for i in 1..values.len() {
        let (prev, cur) = (values[i - 1], values[i]);
        if cur > prev {
            tracing::warn!(size = i, prev, cur, "negative block count");
            return Err(WeyrError::invariant(format!(
                "negative count for block size {}: {} - {}", i, prev, cur
            )));
        }
        counts.insert(i, prev - cur);
    }

    Ok(counts)
}

/// Block counts by second differences of the ranks:
/// b_k = r[k-1] - 2 r[k] + r[k+1], with r held at its last value past the end.
pub fn block_counts_from_ranks(ranks: &RankSequence) -> Result<BlockSizeCounts, WeyrError> {
    let r = ranks.as_slice();
    let at = |k: usize| r[k.min(r.len() - 1)];
    let mut counts = BlockSizeCounts::new();

    for k in 1..r.len() {
        let (outer, inner) = (at(k - 1) + at(k + 1), 2 * at(k));
        if inner > outer {
            tracing::warn!(size = k, "negative second difference");
            return Err(WeyrError::invariant(format!(
                "negative second difference of ranks {:?} at {}", r, k
            )));
        }
        counts.insert(k, outer - inner);
    }

    Ok(counts)
}

/// Block counts for one eigenvalue, cross-checked three ways: extended
/// differences, rank second differences, and the Weyr conjugate partition.
/// Their total size must equal the algebraic multiplicity.
pub fn derive_block_counts(ranks: &RankSequence) -> Result<BlockSizeCounts, WeyrError> {
    let counts = block_counts(&ExtendedDifferences::from_ranks(ranks))?;

    let check = block_counts_from_ranks(ranks)?;
    if check != counts {
        tracing::warn!(?counts, ?check, "block count methods disagree");
        return Err(WeyrError::invariant(format!(
            "block counts from differences {:?} and second differences {:?} disagree",
            counts, check
        )));
    }

    let mut conjugate = BlockSizeCounts::new();
    for size in WeyrCharacteristic::from_ranks(ranks).conjugate() {
        conjugate.insert(size, 1);
    }
    if conjugate != counts {
        return Err(WeyrError::invariant("block counts are not conjugate to the Weyr characteristic"));
    }

    let multiplicity = ranks.algebraic_multiplicity();
    if counts.total_size() != multiplicity {
        return Err(WeyrError::invariant(format!(
            "blocks cover {} dimensions, multiplicity is {}", counts.total_size(), multiplicity
        )));
    }

    Ok(counts)
}
