//! Drawing outcomes from sampling trees.
//!
//! Traversal keeps `(depth, breadth)`, where `breadth` indexes the live slots at
//! `depth` only. A slot inside the level's resolved prefix holds a node; a slot
//! past it splits, and one fresh bit picks which half to continue in.
//!
//! Notes:
//! - Trees are never mutated, so any number of samplers may share one tree as long
//!   as each has its own [`BitSource`].
//! - Functions that call `rand::rng()` internally are convenience wrappers; use the
//!   `*_with_bits` / `*_with_rng` variants where determinism matters.

use std::collections::HashMap;
use std::hash::Hash;

use rand::prelude::*;

use crate::bits::{BitSource, RngBits};
use crate::tree::{Node, SamplingTree};

/// Draw one label, consuming bits from `bits`.
///
/// Subtree nodes are followed iteratively, so no stack grows with nesting.
pub fn sample_with_bits<'t, L, B>(tree: &'t SamplingTree<L>, bits: &mut B) -> &'t L
where
    B: BitSource + ?Sized,
{
    let mut tree = tree;
    let mut depth = 0usize;
    let mut breadth = 0usize;
    loop {
        let level = &tree.levels()[depth];
        match level.get(breadth) {
            Some(Node::Accept(label)) => return label,
            Some(Node::Reject(target)) => {
                depth = target + 1;
                breadth = 2 * breadth + usize::from(bits.next_bit());
            }
            Some(Node::Subtree(child)) => {
                tree = child;
                depth = 0;
                breadth = 0;
            }
            None => {
                breadth = 2 * (breadth - level.len()) + usize::from(bits.next_bit());
                depth += 1;
            }
        }
    }
}

/// Draw one label using a caller-supplied RNG.
///
/// Bits left over in the buffered word are discarded; hold an [`RngBits`] and
/// call [`sample_with_bits`] to reuse them across samples.
pub fn sample_with_rng<'t, L, R: Rng + ?Sized>(tree: &'t SamplingTree<L>, rng: &mut R) -> &'t L {
    let mut bits = RngBits::new(rng);
    sample_with_bits(tree, &mut bits)
}

/// Draw one label using the thread-local RNG.
pub fn sample<L>(tree: &SamplingTree<L>) -> &L {
    let mut rng = rand::rng();
    sample_with_rng(tree, &mut rng)
}

/// Draw `n` independent labels and count how often each occurs.
///
/// Meant for empirical cross-checks of a tree against its weights.
pub fn multisample_with_bits<L, B>(tree: &SamplingTree<L>, n: usize, bits: &mut B) -> HashMap<L, usize>
where
    L: Clone + Eq + Hash,
    B: BitSource + ?Sized,
{
    let mut counts = HashMap::new();
    for _ in 0..n {
        *counts.entry(sample_with_bits(tree, bits).clone()).or_insert(0) += 1;
    }
    counts
}

/// [`multisample_with_bits`] with a caller-supplied RNG.
pub fn multisample_with_rng<L, R>(tree: &SamplingTree<L>, n: usize, rng: &mut R) -> HashMap<L, usize>
where
    L: Clone + Eq + Hash,
    R: Rng + ?Sized,
{
    let mut bits = RngBits::new(rng);
    multisample_with_bits(tree, n, &mut bits)
}

/// [`multisample_with_bits`] with the thread-local RNG.
pub fn multisample<L: Clone + Eq + Hash>(tree: &SamplingTree<L>, n: usize) -> HashMap<L, usize> {
    let mut rng = rand::rng();
    multisample_with_rng(tree, n, &mut rng)
}
