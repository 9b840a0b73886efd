//! This module contains the VSEncoding partition engine: a bounded-window
//! shortest-path dynamic program that splits a sequence of per-element bit
//! widths ("weights") into blocks whose lengths come from a small catalog,
//! minimizing the total encoded size.
//!
//! For a block covering `w[j..i)` the cost is
//!
//! ```text
//! fixed_cost + block_cost(j, i)
//! block_cost = (i - j) * max(w[j..i))                       (unaligned)
//!            = round_up_to_32((i - j) * max(w[j..i)))       (word aligned)
//! ```
//!
//! and `cost[i] = min_j cost[j] + fixed_cost + block_cost(j, i)` over every `j`
//! for which `i - j` is a catalog length. When a zero-run catalog is supplied,
//! blocks whose weights are all zero draw their length from that catalog
//! instead, which lets long zero runs collapse into a handful of large blocks.
//!
//! Complexity is `O(n * (|catalog.max| + |zero_catalog|))` time and `O(n)` space.

use std::ops::Range;

use crate::error::{CodecError, Result};
use crate::utils::scratch_vec;

/// How a block's payload is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCost {
    /// Exactly `len * width` bits.
    Unaligned,
    /// `len * width` rounded up to whole 32-bit words.
    WordAligned,
}

impl BlockCost {
    #[inline]
    pub fn bits(self, len: usize, width: u32) -> u64 {
        let raw = len as u64 * u64::from(width);
        match self {
            BlockCost::Unaligned => raw,
            BlockCost::WordAligned => raw.div_ceil(32) * 32,
        }
    }
}

/// Inputs to the partition engine besides the weights themselves.
#[derive(Debug, Clone, Copy)]
pub struct PartitionParams<'a> {
    /// Per-block header cost, in bits.
    pub fixed_cost: u64,
    /// Allowed block lengths, strictly ascending.
    pub catalog: &'a [usize],
    /// Allowed lengths for all-zero blocks, strictly ascending. When present,
    /// all-zero blocks may only use these lengths.
    pub zero_catalog: Option<&'a [usize]>,
    pub cost: BlockCost,
}

/// An optimal partition: ascending boundaries `0 = p0 < p1 < ... < pk = len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    boundaries: Vec<usize>,
    cost: u64,
}

impl Partition {
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Total cost in bits, headers included.
    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn num_blocks(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    pub fn blocks(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.boundaries.windows(2).map(|w| w[0]..w[1])
    }
}

fn check_catalog(name: &str, catalog: &[usize]) -> Result<()> {
    if catalog.first() != Some(&1) {
        return Err(CodecError::InvalidConfig(format!(
            "{} must start with length 1",
            name
        )));
    }
    if catalog.windows(2).any(|w| w[0] >= w[1]) {
        return Err(CodecError::InvalidConfig(format!(
            "{} must be strictly ascending",
            name
        )));
    }
    Ok(())
}

/// Computes the minimum-cost partition of `weights`.
///
/// # Errors
/// * `CodecError::InvalidConfig` if a catalog is empty, unsorted, or lacks length 1.
/// * `CodecError::Allocation` if the DP tables cannot be allocated.
pub fn compute(weights: &[u32], params: &PartitionParams) -> Result<Partition> {
    check_catalog("catalog", params.catalog)?;
    if let Some(zc) = params.zero_catalog {
        check_catalog("zero catalog", zc)?;
    }
    let n = weights.len();
    let max_len = *params.catalog.last().unwrap_or(&1);
    let mut member: Vec<bool> = scratch_vec(max_len + 1)?;
    for &len in params.catalog {
        member[len] = true;
    }

    let mut cost: Vec<u64> = scratch_vec(n + 1)?;
    let mut pred: Vec<usize> = scratch_vec(n + 1)?;
    let mut zero_run = 0usize;

    for i in 1..=n {
        zero_run = if weights[i - 1] == 0 { zero_run + 1 } else { 0 };
        let mut best = u64::MAX;
        let mut best_j = i - 1;

        let mut run_max = 0u32;
        for len in 1..=max_len.min(i) {
            let j = i - len;
            run_max = run_max.max(weights[j]);
            if !member[len] || (run_max == 0 && params.zero_catalog.is_some()) {
                continue;
            }
            let c = cost[j] + params.fixed_cost + params.cost.bits(len, run_max);
            if c < best {
                best = c;
                best_j = j;
            }
        }

        if let Some(zc) = params.zero_catalog {
            for &len in zc.iter().take_while(|&&len| len <= zero_run) {
                let j = i - len;
                let c = cost[j] + params.fixed_cost;
                if c < best {
                    best = c;
                    best_j = j;
                }
            }
        }

        cost[i] = best;
        pred[i] = best_j;
    }

    let mut boundaries = Vec::new();
    boundaries.try_reserve(n / max_len.max(1) + 2)?;
    let mut i = n;
    boundaries.push(n);
    while i > 0 {
        i = pred[i];
        boundaries.push(i);
    }
    boundaries.reverse();

    log::trace!(
        "partition: n={} blocks={} cost={} bits",
        n,
        boundaries.len().saturating_sub(1),
        cost[n]
    );
    Ok(Partition {
        boundaries,
        cost: cost[n],
    })
}

/// Cost of an explicit partition under `params`, or `None` if some block length
/// is not allowed.
pub fn evaluate(weights: &[u32], boundaries: &[usize], params: &PartitionParams) -> Option<u64> {
    let mut total = 0u64;
    for w in boundaries.windows(2) {
        let (j, i) = (w[0], w[1]);
        let len = i - j;
        let width = weights[j..i].iter().copied().max().unwrap_or(0);
        let allowed = match params.zero_catalog {
            Some(zc) if width == 0 => zc.contains(&len),
            _ => params.catalog.contains(&len),
        };
        if !allowed {
            return None;
        }
        total += params.fixed_cost + params.cost.bits(len, width);
    }
    Some(total)
}
