//! Fixed-depth sampling trees: FLDR and ALDR.
//!
//! Scale the weights into a dyadic distribution over `2^K` by adding a
//! synthetic rejection outcome carrying the leftover mass:
//!
//! ```text
//! c = floor(2^K / M),  r = 2^K mod M,  A' = [c*A_0, ..., c*A_{n-1}, r]
//! ```
//!
//! The Knuth–Yao tree of `A'` is finite with depth at most `K` (its total is a
//! power of two), and turning the synthetic outcome's accept nodes into
//! back-edges to the root yields a rejection sampler for `A`.
//!
//! - FLDR (Fast Loaded Dice Roller): the minimal `K` with `2^K >= M`.
//! - ALDR (Amplified Loaded Dice Roller): any larger `K`. Larger depths shrink
//!   the rejection mass and bring the expected cost toward the Knuth–Yao optimum.
//!
//! ## References
//!
//! - Saad, Freer, Rinard, Mansinghka (2020): *The Fast Loaded Dice Roller*.
//! - Draper & Saad (2025): *Efficient Rejection Sampling in the Entropy-Optimal Range*.

use crate::error::{Error, Result};
use crate::ky::{KnuthYao, DEFAULT_MAX_LEVELS};
use crate::tree::{Node, SamplingTree};
use crate::weights::WeightVector;

/// Deepest supported fixed depth; `2^K` must fit in a `u64`.
pub const MAX_DEPTH: u32 = 63;

/// Smallest `K` with `2^K >= total`.
pub fn minimal_depth(total: u128) -> u32 {
    if total <= 1 {
        return 0;
    }
    u128::BITS - (total - 1).leading_zeros()
}

/// Builder for FLDR (default) and ALDR trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDepth {
    depth: Option<u32>,
    max_levels: usize,
}

impl Default for FixedDepth {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedDepth {
    /// FLDR: depth is the minimal one for the weights being built.
    pub fn new() -> Self {
        Self {
            depth: None,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    /// ALDR at depth `depth` (must be at least the minimal depth when building).
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    pub fn depth(&self) -> Option<u32> {
        self.depth
    }

    /// Build the tree; accept labels are indices into `weights`.
    ///
    /// # Panics
    ///
    /// Panics if a level of the intermediate tree holds the synthetic rejection
    /// outcome more than once. That would mean the dyadic scaling is broken; it is
    /// not reachable from any input.
    pub fn build(&self, weights: &WeightVector) -> Result<SamplingTree<usize>> {
        let total = weights.total();
        let minimum = minimal_depth(total);
        let depth = self.depth.unwrap_or(minimum);
        if depth > MAX_DEPTH {
            return Err(Error::DepthTooLarge {
                depth,
                maximum: MAX_DEPTH,
            });
        }
        if depth < minimum {
            return Err(Error::DepthTooShallow { depth, minimum });
        }

        let span = 1u128 << depth;
        let multiplier = span / total;
        let reject_weight = span % total;
        log::debug!(
            "fixed-depth tree: K={depth} multiplier={multiplier} reject weight={reject_weight}"
        );

        let mut augmented = weights
            .as_slice()
            .iter()
            .map(|&w| u64::try_from(u128::from(w) * multiplier).map_err(|_| Error::Overflow))
            .collect::<Result<Vec<u64>>>()?;
        augmented.push(u64::try_from(reject_weight).map_err(|_| Error::Overflow)?);

        let synthetic = weights.len();
        let mut levels = KnuthYao::new()
            .with_max_levels(self.max_levels)
            .build_levels(&augmented)?;
        for (depth, level) in levels.iter_mut().enumerate() {
            let synthetic_accepts = level
                .iter()
                .filter(|node| matches!(node, Node::Accept(i) if *i == synthetic))
                .count();
            assert!(
                synthetic_accepts <= 1,
                "fixed-depth rewrite: {synthetic_accepts} rejection accepts at level {depth}"
            );
            if synthetic_accepts == 1 {
                level.retain(|node| !matches!(node, Node::Accept(i) if *i == synthetic));
                level.insert(0, Node::Reject(0));
            }
        }

        Ok(SamplingTree::from_levels_unchecked(levels))
    }

    /// Build with labels produced by `label(index)`.
    pub fn build_labeled<L, F>(&self, weights: &WeightVector, label: F) -> Result<SamplingTree<L>>
    where
        F: FnMut(usize) -> L,
    {
        Ok(self.build(weights)?.map_labels(label))
    }
}

/// FLDR tree (minimal depth).
pub fn fldr(weights: &WeightVector) -> Result<SamplingTree<usize>> {
    FixedDepth::new().build(weights)
}

/// ALDR tree at depth `depth`.
pub fn aldr(weights: &WeightVector, depth: u32) -> Result<SamplingTree<usize>> {
    FixedDepth::new().with_depth(depth).build(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ky::knuth_yao;

    fn weights(w: &[u64]) -> WeightVector {
        WeightVector::new(w.to_vec()).expect("valid weights")
    }

    fn accept(i: usize) -> Node<usize> {
        Node::Accept(i)
    }

    #[test]
    fn minimal_depth_is_ceil_log2() {
        assert_eq!(minimal_depth(1), 0);
        assert_eq!(minimal_depth(2), 1);
        assert_eq!(minimal_depth(3), 2);
        assert_eq!(minimal_depth(4), 2);
        assert_eq!(minimal_depth(5), 3);
        assert_eq!(minimal_depth(1 << 40), 40);
        assert_eq!(minimal_depth((1 << 40) + 1), 41);
    }

    #[test]
    fn fldr_uniform_three_rejects_to_root() {
        let tree = fldr(&weights(&[1, 1, 1])).expect("tree");
        assert_eq!(
            tree.levels(),
            &[
                vec![],
                vec![],
                vec![Node::Reject(0), accept(0), accept(1), accept(2)]
            ]
        );
    }

    #[test]
    fn fldr_matches_knuth_yao_when_the_cycle_is_at_the_root() {
        let w = weights(&[1, 2]);
        assert_eq!(fldr(&w).expect("fldr"), knuth_yao(&w).expect("ky"));
    }

    #[test]
    fn power_of_two_total_has_no_rejects() {
        let tree = fldr(&weights(&[1, 3, 4])).expect("tree");
        assert!(tree.reject_targets().is_empty());
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn single_outcome_is_a_leaf_at_the_root() {
        let tree = fldr(&weights(&[9])).expect("tree");
        assert!(tree.levels().iter().flatten().all(|n| !matches!(n, Node::Accept(i) if *i != 0)));
        assert_eq!(tree.reject_targets(), vec![0]);

        let tree = fldr(&weights(&[1])).expect("tree");
        assert_eq!(tree.levels(), &[vec![accept(0)]]);
    }

    #[test]
    fn rejects_bad_depths() {
        let w = weights(&[1, 2, 3]);
        assert_eq!(
            aldr(&w, 2).expect_err("too shallow"),
            Error::DepthTooShallow {
                depth: 2,
                minimum: 3
            }
        );
        assert_eq!(
            aldr(&w, 64).expect_err("too deep"),
            Error::DepthTooLarge {
                depth: 64,
                maximum: 63
            }
        );
    }

    #[test]
    fn aldr_only_ever_rejects_to_the_root() {
        let w = weights(&[3, 5, 7]);
        for k in 4..=12 {
            let tree = aldr(&w, k).expect("tree");
            assert!(tree.len() as u32 <= k + 1);
            for target in tree.reject_targets() {
                assert_eq!(target, 0);
            }
            for level in tree.levels() {
                assert!(level.iter().skip(1).all(|n| !n.is_reject()));
            }
        }
    }

    #[test]
    fn built_trees_pass_validation() {
        let cases: [&[u64]; 4] = [&[1, 2], &[3, 5, 7], &[1, 2, 3, 4], &[0, 6, 1]];
        for w in cases {
            let w = weights(w);
            let k = minimal_depth(w.total());
            for depth in k..k + 6 {
                let tree = aldr(&w, depth).expect("tree");
                SamplingTree::from_levels(tree.into_levels()).expect("valid");
            }
        }
    }

    #[test]
    fn builder_records_the_requested_depth() {
        assert_eq!(FixedDepth::new().depth(), None);
        assert_eq!(FixedDepth::default(), FixedDepth::new());
        let builder = FixedDepth::new().with_depth(5);
        assert_eq!(builder.depth(), Some(5));
        let w = weights(&[1, 2]);
        assert_eq!(builder.build(&w).expect("tree"), aldr(&w, 5).expect("tree"));
    }

    #[test]
    fn labeled_build() {
        let tree = FixedDepth::new()
            .build_labeled(&weights(&[1, 1, 1]), |i| (b'a' + i as u8) as char)
            .expect("tree");
        assert_eq!(tree.levels()[2][1], Node::Accept('a'));
    }
}
