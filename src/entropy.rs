//! Expected bit cost and toll of sampling trees.
//!
//! Every terminal node at depth `i` (accept, back-edge, or subtree entry) is
//! reached with probability `2^-i` after exactly `i` bits. One pass over the
//! levels gives the expected cost of a single run through the stored tree.
//! A back-edge re-enters the tree at the state recorded at its target level,
//! so the looping part behaves like a geometric number of repeated runs and
//! its cost has a closed form.
//!
//! The *toll* is the expected cost minus the Shannon entropy of the target
//! distribution: 0 for an entropy-optimal dyadic tree, and always in `[0, 2)`
//! for Knuth–Yao trees.

use crate::error::{Error, Result};
use crate::tree::{Node, SamplingTree};
use crate::weights::WeightVector;

/// Expected number of bits one sample from `tree` consumes.
///
/// Subtrees contribute their own expected cost, weighted by the probability of
/// reaching them.
///
/// # Errors
///
/// [`Error::MultipleRejectTargets`] if back-edges in one tree point at more than
/// one level; the closed form only covers a single re-entry point.
pub fn expected_bits<L>(tree: &SamplingTree<L>) -> Result<f64> {
    let levels = tree.levels();

    let mut prefix = Vec::with_capacity(levels.len() + 1);
    prefix.push(0.0f64);
    let mut live = Vec::with_capacity(levels.len());
    let mut current = 1usize;
    let mut reject_target: Option<usize> = None;
    let mut reject_probability = 0.0f64;

    for (i, level) in levels.iter().enumerate() {
        let scale = 0.5f64.powi(exponent(i));
        let mut cost = (i * level.len()) as f64;
        for node in level {
            match node {
                Node::Subtree(child) => cost += expected_bits(child)?,
                Node::Reject(target) => {
                    match reject_target {
                        None => reject_target = Some(*target),
                        Some(first) if first != *target => {
                            return Err(Error::MultipleRejectTargets {
                                first,
                                second: *target,
                            });
                        }
                        Some(_) => {}
                    }
                    reject_probability += scale;
                }
                Node::Accept(_) => {}
            }
        }
        let last = prefix[i];
        prefix.push(last + cost * scale);
        current -= level.len();
        live.push(current);
        current *= 2;
    }

    let one_run = prefix[levels.len()];
    let Some(target) = reject_target else {
        return Ok(one_run);
    };

    // Probability of reaching the live slots that survive the target level.
    let entrance = live[target] as f64 * 0.5f64.powi(exponent(target));
    let loop_one_run = (one_run - prefix[target + 1] - entrance * target as f64) / entrance;
    let loop_reject_probability = reject_probability / entrance;
    let loop_cost = loop_one_run / (1.0 - loop_reject_probability);
    Ok(one_run + reject_probability * loop_cost)
}

fn exponent(i: usize) -> i32 {
    i32::try_from(i).unwrap_or(i32::MAX)
}

/// Shannon entropy of the distribution in bits; zero weights contribute nothing.
pub fn shannon_entropy(weights: &WeightVector) -> f64 {
    let total = weights.total() as f64;
    weights
        .as_slice()
        .iter()
        .filter(|&&w| w > 0)
        .map(|&w| {
            let w = w as f64;
            w * (total / w).log2()
        })
        .sum::<f64>()
        / total
}

/// Expected cost of `tree` in excess of the entropy of `weights`.
pub fn toll<L>(tree: &SamplingTree<L>, weights: &WeightVector) -> Result<f64> {
    Ok(expected_bits(tree)? - shannon_entropy(weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{aldr, fldr};
    use crate::ky::knuth_yao;

    fn weights(w: &[u64]) -> WeightVector {
        WeightVector::new(w.to_vec()).expect("valid weights")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fair_coin_costs_one_bit() {
        let w = weights(&[1, 1]);
        let tree = knuth_yao(&w).expect("tree");
        assert!(close(expected_bits(&tree).expect("cost"), 1.0));
        assert!(close(toll(&tree, &w).expect("toll"), 0.0));
    }

    #[test]
    fn uniform_four_has_zero_toll() {
        let w = weights(&[1, 1, 1, 1]);
        let tree = knuth_yao(&w).expect("tree");
        assert_eq!(expected_bits(&tree).expect("cost"), 2.0);
        assert_eq!(shannon_entropy(&w), 2.0);
        assert_eq!(toll(&tree, &w).expect("toll"), 0.0);
    }

    #[test]
    fn cyclic_trees_use_the_closed_form() {
        assert!(close(expected_bits(&knuth_yao(&weights(&[1, 2])).expect("tree")).expect("cost"), 2.0));
        assert!(close(
            expected_bits(&knuth_yao(&weights(&[1, 1, 1])).expect("tree")).expect("cost"),
            8.0 / 3.0
        ));
        assert!(close(
            expected_bits(&knuth_yao(&weights(&[3, 5, 7])).expect("tree")).expect("cost"),
            44.0 / 15.0
        ));
        assert!(close(
            expected_bits(&knuth_yao(&weights(&[2, 3, 5, 7, 11])).expect("tree")).expect("cost"),
            3.0
        ));
    }

    #[test]
    fn inner_cycle_target() {
        // Back-edges to level 1 rather than the root.
        let tree = knuth_yao(&weights(&[1, 2, 3, 4])).expect("tree");
        assert_eq!(tree.reject_targets(), vec![1]);
        assert!(close(expected_bits(&tree).expect("cost"), 3.0));
    }

    #[test]
    fn fldr_costs_more_than_knuth_yao() {
        let w = weights(&[1, 2, 3, 4]);
        let fldr_cost = expected_bits(&fldr(&w).expect("tree")).expect("cost");
        assert!(close(fldr_cost, 4.2));
        let w = weights(&[2, 3, 5, 7, 11]);
        let fldr_cost = expected_bits(&fldr(&w).expect("tree")).expect("cost");
        assert!(close(fldr_cost, 26.0 / 7.0));
    }

    #[test]
    fn one_third_toll() {
        let w = weights(&[1, 2]);
        let t = toll(&fldr(&w).expect("tree"), &w).expect("toll");
        assert!(close(t, 1.081_704_165_945_510_4), "toll={t}");
    }

    #[test]
    fn uniform_five_aldr_tolls() {
        let w = weights(&[1; 5]);
        let t3 = toll(&aldr(&w, 3).expect("tree"), &w).expect("toll");
        let t4 = toll(&aldr(&w, 4).expect("tree"), &w).expect("toll");
        assert!(close(t3, 2.078_071_905_112_638), "t3={t3}");
        assert!(close(t4, 1.278_071_905_112_638), "t4={t4}");
        let ky = toll(&knuth_yao(&w).expect("tree"), &w).expect("toll");
        assert!(close(t4, ky));
    }

    #[test]
    fn subtree_cost_is_weighted_by_reach() {
        // Half the time stop after one bit, otherwise enter a fair coin: 1 + 0.5 * 1.
        let child = knuth_yao(&weights(&[1, 1])).expect("child");
        let tree = SamplingTree::from_levels(vec![
            vec![],
            vec![Node::Accept(5), Node::Subtree(child)],
        ])
        .expect("valid");
        assert!(close(expected_bits(&tree).expect("cost"), 1.5));
    }

    #[test]
    fn multiple_reject_targets_are_refused() {
        let tree = SamplingTree::from_levels(vec![
            vec![],
            vec![],
            vec![Node::Reject(0), Node::Reject(1), Node::Accept(0), Node::Accept(1)],
        ])
        .expect("structurally valid");
        assert_eq!(
            expected_bits(&tree).expect_err("two targets"),
            Error::MultipleRejectTargets {
                first: 0,
                second: 1
            }
        );
        let w = weights(&[1, 1]);
        assert!(toll(&tree, &w).is_err());
    }

    #[test]
    fn entropy_ignores_zero_weights() {
        assert!(close(shannon_entropy(&weights(&[0, 1, 0, 1])), 1.0));
        assert_eq!(shannon_entropy(&weights(&[0, 7])), 0.0);
    }
}
