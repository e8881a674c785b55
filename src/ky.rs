//! Knuth–Yao entropy-optimal sampling trees.
//!
//! The Knuth–Yao tree for `p_i = A_i / M` places outcome `i` at depth `d`
//! whenever bit `d` of the binary expansion of `p_i` is set. For rational
//! weights these expansions are eventually periodic, so the tree is infinite
//! but periodic. We build it level by level while tracking the residual
//! state `(live slots, reduced residual weights)`; the first time a state
//! repeats, the remaining live slots become back-edges to the level where that
//! state was first seen, and the tree is complete.
//!
//! ## References
//!
//! - Knuth & Yao (1976): *The complexity of nonuniform random number generation*.
//! - Saad, Freer, Rinard, Mansinghka (2020): *The Fast Loaded Dice Roller*.
//! - Draper & Saad (2025): *Efficient Rejection Sampling in the Entropy-Optimal Range*.
//!
//! Notes:
//! - Residual arithmetic is `u128` with checked multiplication.
//! - Construction is bounded by [`KnuthYao::with_max_levels`]; for rational input a
//!   cycle always exists, so hitting the bound means the period is longer than allowed.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::tree::{Level, Node, SamplingTree};
use crate::weights::{gcd, WeightVector};

/// Default bound on the number of levels built before giving up on finding a cycle.
pub const DEFAULT_MAX_LEVELS: usize = 1 << 20;

/// Construction state used to detect the period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct State {
    live: u128,
    residual: Vec<u128>,
}

/// Builder for Knuth–Yao trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnuthYao {
    max_levels: usize,
}

impl Default for KnuthYao {
    fn default() -> Self {
        Self::new()
    }
}

impl KnuthYao {
    pub fn new() -> Self {
        Self {
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    /// Bound the number of levels explored before reporting [`Error::LevelLimit`].
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Build the tree; accept labels are indices into `weights`.
    pub fn build(&self, weights: &WeightVector) -> Result<SamplingTree<usize>> {
        let levels = self.build_levels(weights.as_slice())?;
        Ok(SamplingTree::from_levels_unchecked(levels))
    }

    /// Build the tree with labels produced by `label(index)`.
    pub fn build_labeled<L, F>(&self, weights: &WeightVector, label: F) -> Result<SamplingTree<L>>
    where
        F: FnMut(usize) -> L,
    {
        Ok(self.build(weights)?.map_labels(label))
    }

    /// Core construction over raw weights (at least one positive entry).
    pub(crate) fn build_levels(&self, weights: &[u64]) -> Result<Vec<Level<usize>>> {
        let g = weights.iter().fold(0u64, |g, &w| gcd(g, w));
        if g == 0 {
            return Err(Error::AllZeroWeights);
        }
        let mut residual: Vec<u128> = weights.iter().map(|&w| u128::from(w / g)).collect();
        let mut total: u128 = residual.iter().sum();
        let mut live: u128 = 1;
        let mut levels: Vec<Level<usize>> = Vec::new();
        let mut seen: HashMap<State, usize> = HashMap::new();

        for depth in 0..self.max_levels {
            // An outcome whose residual share covers a whole live slot takes it.
            let bound = total.div_ceil(live);
            let mut level: Level<usize> = residual
                .iter()
                .enumerate()
                .filter(|&(_, &a)| a >= bound)
                .map(|(i, _)| Node::Accept(i))
                .collect();

            if !level.is_empty() {
                for a in residual.iter_mut() {
                    let scaled = a.checked_mul(live).ok_or(Error::Overflow)?;
                    *a = if *a >= bound { scaled - total } else { scaled };
                }
                live -= level.len() as u128;
                total = total.checked_mul(live).ok_or(Error::Overflow)?;
            }

            if total == 0 {
                levels.push(level);
                log::debug!("knuth-yao tree is finite with {} levels", levels.len());
                return Ok(levels);
            }

            let g = residual.iter().fold(total, |g, &a| gcd(g, a));
            if g > 1 {
                total /= g;
                residual.iter_mut().for_each(|a| *a /= g);
            }
            log::trace!("level {depth}: live={live} total={total} residual={residual:?}");

            let state = State {
                live,
                residual: residual.clone(),
            };
            if let Some(&target) = seen.get(&state) {
                let open = usize::try_from(live).map_err(|_| Error::Overflow)?;
                log::debug!(
                    "knuth-yao cycle closed at level {depth}: {open} back-edges to level {target}"
                );
                let mut closing = Vec::with_capacity(open + level.len());
                closing.extend(std::iter::repeat_with(|| Node::Reject(target)).take(open));
                closing.append(&mut level);
                levels.push(closing);
                return Ok(levels);
            }
            seen.insert(state, depth);
            levels.push(level);
            live = live.checked_mul(2).ok_or(Error::Overflow)?;
        }

        Err(Error::LevelLimit {
            limit: self.max_levels,
        })
    }
}

/// Knuth–Yao tree with default settings.
pub fn knuth_yao(weights: &WeightVector) -> Result<SamplingTree<usize>> {
    KnuthYao::new().build(weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(w: &[u64]) -> WeightVector {
        WeightVector::new(w.to_vec()).expect("valid weights")
    }

    fn accept(i: usize) -> Node<usize> {
        Node::Accept(i)
    }

    #[test]
    fn fair_coin() {
        let tree = knuth_yao(&weights(&[1, 1])).expect("tree");
        assert_eq!(tree.levels(), &[vec![], vec![accept(0), accept(1)]]);
    }

    #[test]
    fn one_third_two_thirds_closes_a_cycle_to_the_root() {
        let tree = knuth_yao(&weights(&[1, 2])).expect("tree");
        assert_eq!(
            tree.levels(),
            &[vec![], vec![accept(1)], vec![Node::Reject(0), accept(0)]]
        );
    }

    #[test]
    fn uniform_power_of_two_is_finite() {
        let tree = knuth_yao(&weights(&[1, 1, 1, 1])).expect("tree");
        assert_eq!(
            tree.levels(),
            &[
                vec![],
                vec![],
                vec![accept(0), accept(1), accept(2), accept(3)]
            ]
        );
        assert!(tree.reject_targets().is_empty());
    }

    #[test]
    fn cycle_can_target_an_inner_level() {
        let tree = knuth_yao(&weights(&[1, 2, 3, 4])).expect("tree");
        assert_eq!(
            tree.levels(),
            &[
                vec![],
                vec![],
                vec![accept(2), accept(3)],
                vec![accept(1), accept(3)],
                vec![accept(0), accept(1)],
                vec![Node::Reject(1), Node::Reject(1), accept(0), accept(2)],
            ]
        );
    }

    #[test]
    fn input_is_reduced_by_its_gcd() {
        let small = knuth_yao(&weights(&[1, 2])).expect("tree");
        let scaled = knuth_yao(&weights(&[6, 12])).expect("tree");
        assert_eq!(small, scaled);
    }

    #[test]
    fn zero_weights_never_appear() {
        let tree = knuth_yao(&weights(&[0, 1, 0, 1])).expect("tree");
        assert_eq!(tree.levels(), &[vec![], vec![accept(1), accept(3)]]);
    }

    #[test]
    fn degenerate_distribution_needs_no_bits() {
        let tree = knuth_yao(&weights(&[0, 5])).expect("tree");
        assert_eq!(tree.levels(), &[vec![accept(1)]]);
    }

    #[test]
    fn level_limit_is_reported() {
        // 1/7 has period 3, so three levels are not enough to see a repeat.
        let err = KnuthYao::new()
            .with_max_levels(3)
            .build(&weights(&[1; 7]))
            .expect_err("limit too small");
        assert_eq!(err, Error::LevelLimit { limit: 3 });
        assert_eq!(KnuthYao::new().max_levels(), DEFAULT_MAX_LEVELS);
        assert_eq!(KnuthYao::default().with_max_levels(3).max_levels(), 3);
        assert!(KnuthYao::new().with_max_levels(4).build(&weights(&[1; 7])).is_ok());
    }

    #[test]
    fn labeled_build_carries_payloads() {
        let tree = KnuthYao::new()
            .build_labeled(&weights(&[1, 1]), |i| ["heads", "tails"][i])
            .expect("tree");
        assert_eq!(tree.levels()[1], vec![Node::Accept("heads"), Node::Accept("tails")]);
    }
}
