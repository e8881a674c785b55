//! Sampling trees.
//!
//! A sampling tree is stored level by level. Level `i` lists, left to right,
//! the nodes that terminate among the *live* slots at depth `i`; the slots past
//! the listed prefix stay live and each splits into two slots at depth `i + 1`.
//! With `L_0 = 1` the live counts follow `L_{i+1} = 2 (L_i - |level_i|)`.
//!
//! Back-edges ([`Node::Reject`]) are plain level indices into the same tree, so
//! a periodic infinite tree is stored finitely without any pointer cycle.
//! A reject at position `p` of its level, targeting level `t`, continues at the
//! live slots `2p` and `2p + 1` of level `t + 1`.

use crate::error::{Result, TreeDefect};

/// One node of a sampling tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<L> {
    /// Terminal: the sample is `label`.
    Accept(L),
    /// Back-edge to the state recorded at the given level.
    Reject(usize),
    /// Delegate to an independently sampled nested tree.
    Subtree(SamplingTree<L>),
}

impl<L> Node<L> {
    pub fn is_reject(&self) -> bool {
        matches!(self, Self::Reject(_))
    }

    pub fn reject_target(&self) -> Option<usize> {
        match self {
            Self::Reject(target) => Some(*target),
            _ => None,
        }
    }
}

/// Resolved nodes at one depth, in live-slot order.
pub type Level<L> = Vec<Node<L>>;

/// A finite encoding of a (possibly infinite, periodic) binary sampling tree.
///
/// Values of this type are always structurally valid: builders produce valid
/// trees and [`SamplingTree::from_levels`] checks hand-assembled ones, so
/// sampling a `SamplingTree` never runs off the tree and terminates with
/// probability one.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingTree<L = usize> {
    levels: Vec<Level<L>>,
}

impl<L> SamplingTree<L> {
    /// Assemble a tree from raw levels, checking that it can be sampled.
    ///
    /// See [`TreeDefect`] for the conditions rejected.
    pub fn from_levels(levels: Vec<Level<L>>) -> Result<Self> {
        validate(&levels)?;
        Ok(Self { levels })
    }

    /// Builders call this for trees that are valid by construction.
    pub(crate) fn from_levels_unchecked(levels: Vec<Level<L>>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[Level<L>] {
        &self.levels
    }

    pub fn level(&self, depth: usize) -> Option<&Level<L>> {
        self.levels.get(depth)
    }

    /// Number of stored levels (one more than the deepest stored index).
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; a valid tree has at least one level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn into_levels(self) -> Vec<Level<L>> {
        self.levels
    }

    /// Live slot count at each stored level (before that level's nodes resolve).
    pub fn live_counts(&self) -> Vec<usize> {
        let mut live = Vec::with_capacity(self.levels.len());
        let mut current = 1usize;
        for level in &self.levels {
            live.push(current);
            current = 2 * (current - level.len());
        }
        live
    }

    /// Distinct back-edge targets, in first-seen order (this tree only, not subtrees).
    pub fn reject_targets(&self) -> Vec<usize> {
        let mut targets = Vec::new();
        for target in self.levels.iter().flatten().filter_map(Node::reject_target) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        targets
    }

    /// Relabel every accept node, recursing into subtrees. Structure is unchanged.
    pub fn map_labels<M, F>(self, mut f: F) -> SamplingTree<M>
    where
        F: FnMut(L) -> M,
    {
        self.map_labels_inner(&mut f)
    }

    fn map_labels_inner<M, F>(self, f: &mut F) -> SamplingTree<M>
    where
        F: FnMut(L) -> M,
    {
        let levels = self
            .levels
            .into_iter()
            .map(|level| {
                level
                    .into_iter()
                    .map(|node| match node {
                        Node::Accept(label) => Node::Accept(f(label)),
                        Node::Reject(target) => Node::Reject(target),
                        Node::Subtree(child) => Node::Subtree(child.map_labels_inner(f)),
                    })
                    .collect()
            })
            .collect();
        SamplingTree { levels }
    }
}

fn validate<L>(levels: &[Level<L>]) -> core::result::Result<(), TreeDefect> {
    if levels.is_empty() {
        return Err(TreeDefect::NoLevels);
    }

    // Every live slot at level i needs at least one node at a level >= i, which
    // also keeps the live counts from overflowing.
    let mut below = vec![0usize; levels.len() + 1];
    for (i, level) in levels.iter().enumerate().rev() {
        below[i] = below[i + 1] + level.len();
    }

    let mut live = Vec::with_capacity(levels.len());
    let mut current = 1usize;
    for (i, level) in levels.iter().enumerate() {
        if current == 0 {
            return Err(TreeDefect::Unreachable { level: i });
        }
        if level.len() > current {
            return Err(TreeDefect::Overfull {
                level: i,
                nodes: level.len(),
                live: current,
            });
        }
        if current > below[i] {
            return Err(TreeDefect::Unresolved {
                level: i,
                open: current - below[i],
            });
        }
        live.push(current);
        current = 2 * (current - level.len());
    }

    for (i, level) in levels.iter().enumerate() {
        for (position, node) in level.iter().enumerate() {
            let Node::Reject(target) = *node else {
                continue;
            };
            if target >= i {
                return Err(TreeDefect::ForwardBackEdge { level: i, target });
            }
            if 2 * position + 1 >= live[target + 1] {
                return Err(TreeDefect::BackEdgeOutOfRange {
                    level: i,
                    position,
                    landing: target + 1,
                });
            }
        }
    }

    check_exits(levels, &live)
}

/// Every live slot must be able to reach an accept or a subtree.
///
/// Monotone fixpoint over all slots: a slot can exit if it holds an accept or
/// subtree, or if one of the two slots it continues to can.
fn check_exits<L>(levels: &[Level<L>], live: &[usize]) -> core::result::Result<(), TreeDefect> {
    let mut exits: Vec<Vec<bool>> = live.iter().map(|&n| vec![false; n]).collect();
    loop {
        let mut changed = false;
        for i in (0..levels.len()).rev() {
            let level = &levels[i];
            for slot in 0..live[i] {
                if exits[i][slot] {
                    continue;
                }
                let can_exit = match level.get(slot) {
                    Some(Node::Accept(_) | Node::Subtree(_)) => true,
                    Some(Node::Reject(target)) => {
                        let next = &exits[target + 1];
                        next[2 * slot] || next[2 * slot + 1]
                    }
                    None => {
                        let child = 2 * (slot - level.len());
                        exits[i + 1][child] || exits[i + 1][child + 1]
                    }
                };
                if can_exit {
                    exits[i][slot] = true;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    for (level, row) in exits.iter().enumerate() {
        if let Some(position) = row.iter().position(|&exit| !exit) {
            return Err(TreeDefect::NoExit { level, position });
        }
    }
    Ok(())
}
