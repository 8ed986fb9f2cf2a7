//! Weyr characteristic and its extended difference sequence

use serde::Serialize;
use crate::rank::RankSequence;

/// First differences w_p = r[p-1] - r[p] of a rank sequence, with trailing
/// zeros removed.
///
/// This is a partition of the algebraic multiplicity and is conjugate to the
/// partition of Jordan block sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeyrCharacteristic {
    parts: Vec<usize>,
}

impl WeyrCharacteristic {
    pub fn from_ranks(ranks: &RankSequence) -> Self {
        let mut parts = first_differences(ranks.as_slice());
        while parts.last() == Some(&0) {
            parts.pop();
        }
        Self { parts }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Sum of the parts, equal to the algebraic multiplicity
    pub fn total(&self) -> usize {
        self.parts.iter().sum()
    }

    /// Block sizes read off the conjugate partition, largest first
    pub fn conjugate(&self) -> Vec<usize> {
        let first = self.parts.first().copied().unwrap_or(0);
        (1..=first)
            .map(|k| self.parts.iter().filter(|&&w| w >= k).count())
            .collect()
    }
}

/// Every first difference of the rank sequence followed by a single 0.
///
/// Same length as the rank sequence. The trailing sentinel lets block counts be
/// read as plain first differences of this sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtendedDifferences {
    values: Vec<usize>,
}

impl ExtendedDifferences {
    pub fn from_ranks(ranks: &RankSequence) -> Self {
        let mut values = first_differences(ranks.as_slice());
        values.push(0);
        Self { values }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn first_differences(ranks: &[usize]) -> Vec<usize> {
    ranks.windows(2).map(|w| w[0].saturating_sub(w[1])).collect()
}

/// Weyr characteristic of a rank sequence
pub fn weyr(ranks: &RankSequence) -> WeyrCharacteristic {
    WeyrCharacteristic::from_ranks(ranks)
}

/// Differences with the zero sentinel appended
pub fn extended_differences(ranks: &RankSequence) -> ExtendedDifferences {
    ExtendedDifferences::from_ranks(ranks)
}
