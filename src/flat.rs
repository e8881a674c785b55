//! Flattened fixed-depth sampler.
//!
//! A fixed-depth tree over a dyadic distribution needs no node objects: level
//! `j` holds exactly the outcomes whose scaled weight has bit `K - j` set. This
//! module stores that as one breadth per level plus a single leaf array, which
//! is the layout to reach for when sampling speed matters more than inspecting
//! the tree.
//!
//! Leaf value `0` marks the rejection mass; outcome `i` is stored as `i + 1`.

use rand::prelude::*;

use crate::bits::{BitSource, RngBits};
use crate::error::{Error, Result};
use crate::fixed::{minimal_depth, MAX_DEPTH};
use crate::tree::{Level, Node, SamplingTree};
use crate::weights::WeightVector;

const REJECT_LEAF: u32 = 0;

/// Array form of an FLDR/ALDR tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatSampler {
    depth: u32,
    breadths: Vec<u32>,
    leaves: Vec<u32>,
}

impl FlatSampler {
    /// Build at depth `K = kmul * k`, where `k` is the minimal depth for `weights`.
    ///
    /// `kmul = 1` gives FLDR, `kmul = 2` the ALDR depth.
    ///
    /// # Errors
    ///
    /// - [`Error::Invalid`] if `kmul == 0`.
    /// - [`Error::DepthTooLarge`] if `K` exceeds [`MAX_DEPTH`].
    /// - [`Error::Overflow`] if there are more outcomes than `u32` leaves can name.
    pub fn new(weights: &WeightVector, kmul: u32) -> Result<Self> {
        if kmul == 0 {
            return Err(Error::Invalid("FlatSampler: kmul must be positive"));
        }
        if u32::try_from(weights.len()).map_or(true, |n| n == u32::MAX) {
            return Err(Error::Overflow);
        }
        let total = weights.total();
        let depth = minimal_depth(total).saturating_mul(kmul);
        if depth > MAX_DEPTH {
            return Err(Error::DepthTooLarge {
                depth,
                maximum: MAX_DEPTH,
            });
        }

        let span = 1u128 << depth;
        let multiplier = span / total;
        let reject = span % total;
        let scaled: Vec<u128> = weights
            .as_slice()
            .iter()
            .map(|&w| multiplier * u128::from(w))
            .collect();

        let leaf_count = reject.count_ones() as usize
            + scaled.iter().map(|s| s.count_ones() as usize).sum::<usize>();
        let mut breadths = vec![0u32; depth as usize + 1];
        let mut leaves = Vec::with_capacity(leaf_count);

        for (j, breadth) in breadths.iter_mut().enumerate() {
            let bit = 1u128 << (depth as usize - j);
            if reject & bit != 0 {
                leaves.push(REJECT_LEAF);
                *breadth += 1;
            }
            for (i, s) in scaled.iter().enumerate() {
                if s & bit != 0 {
                    // Checked above: the outcome count plus one fits in u32.
                    leaves.push(i as u32 + 1);
                    *breadth += 1;
                }
            }
        }

        log::debug!(
            "flat sampler: K={depth} multiplier={multiplier} reject weight={reject} leaves={}",
            leaves.len()
        );
        Ok(Self {
            depth,
            breadths,
            leaves,
        })
    }

    pub fn fldr(weights: &WeightVector) -> Result<Self> {
        Self::new(weights, 1)
    }

    pub fn aldr(weights: &WeightVector) -> Result<Self> {
        Self::new(weights, 2)
    }

    /// The depth `K`; no sample reads more than `K` bits before a restart.
    pub fn depth_bound(&self) -> u32 {
        self.depth
    }

    pub fn breadths(&self) -> &[u32] {
        &self.breadths
    }

    pub fn leaves(&self) -> &[u32] {
        &self.leaves
    }

    /// Bytes held by the breadth and leaf arrays.
    pub fn bytes(&self) -> usize {
        (self.breadths.len() + self.leaves.len()) * std::mem::size_of::<u32>()
    }

    /// Draw one outcome index, restarting from the root on the rejection leaf.
    pub fn sample_with_bits<B: BitSource + ?Sized>(&self, bits: &mut B) -> usize {
        loop {
            let mut depth = 0usize;
            let mut location = 0usize;
            let mut slot = 0usize;
            loop {
                let breadth = self.breadths[depth] as usize;
                if slot < breadth {
                    match self.leaves[location + slot] {
                        REJECT_LEAF => break,
                        leaf => return leaf as usize - 1,
                    }
                }
                location += breadth;
                slot = ((slot - breadth) << 1) | usize::from(bits.next_bit());
                depth += 1;
            }
        }
    }

    pub fn sample_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut bits = RngBits::new(rng);
        self.sample_with_bits(&mut bits)
    }

    /// Draw one outcome index using the thread-local RNG.
    pub fn sample(&self) -> usize {
        let mut rng = rand::rng();
        self.sample_with_rng(&mut rng)
    }

    /// The equivalent [`SamplingTree`], without trailing empty levels.
    pub fn to_tree(&self) -> SamplingTree<usize> {
        let mut levels: Vec<Level<usize>> = Vec::with_capacity(self.breadths.len());
        let mut location = 0usize;
        for &breadth in &self.breadths {
            let end = location + breadth as usize;
            levels.push(
                self.leaves[location..end]
                    .iter()
                    .map(|&leaf| match leaf {
                        REJECT_LEAF => Node::Reject(0),
                        leaf => Node::Accept(leaf as usize - 1),
                    })
                    .collect(),
            );
            location = end;
        }
        while levels.len() > 1 && levels.last().is_some_and(Vec::is_empty) {
            levels.pop();
        }
        SamplingTree::from_levels_unchecked(levels)
    }
}
