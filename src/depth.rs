//! Effective depth of a sampling tree.

use crate::tree::{Node, SamplingTree};

/// Deepest level a traversal can read, counting nested subtrees.
///
/// A final level made only of back-edges carries no information: the same
/// tree folds those rejects into its predecessor, so it does not count.
pub fn depth<L>(tree: &SamplingTree<L>) -> usize {
    let levels = tree.levels();
    let trailing_rejects = levels
        .last()
        .is_some_and(|last| !last.is_empty() && last.iter().all(Node::is_reject));
    let mut deepest = levels
        .len()
        .saturating_sub(1)
        .saturating_sub(usize::from(trailing_rejects));

    for (i, level) in levels.iter().enumerate() {
        for node in level {
            if let Node::Subtree(child) = node {
                deepest = deepest.max(i + depth(child));
            }
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{aldr, fldr, minimal_depth};
    use crate::ky::knuth_yao;
    use crate::weights::WeightVector;

    fn weights(w: &[u64]) -> WeightVector {
        WeightVector::new(w.to_vec()).expect("valid weights")
    }

    #[test]
    fn fair_coin_has_depth_one() {
        assert_eq!(depth(&knuth_yao(&weights(&[1, 1])).expect("tree")), 1);
    }

    #[test]
    fn depths_of_known_trees() {
        assert_eq!(depth(&knuth_yao(&weights(&[1, 2])).expect("tree")), 2);
        assert_eq!(depth(&knuth_yao(&weights(&[1, 1, 1, 1])).expect("tree")), 2);
        assert_eq!(depth(&fldr(&weights(&[1, 1, 1, 1])).expect("tree")), 2);
        assert_eq!(depth(&knuth_yao(&weights(&[1, 2, 3, 4])).expect("tree")), 5);
        assert_eq!(depth(&fldr(&weights(&[1, 2, 3, 4])).expect("tree")), 4);
        assert_eq!(depth(&knuth_yao(&weights(&[7])).expect("tree")), 0);
    }

    #[test]
    fn trailing_reject_level_is_folded() {
        let tree = SamplingTree::from_levels(vec![
            vec![],
            vec![],
            vec![Node::Accept(0), Node::Accept(1), Node::Accept(2)],
            vec![Node::Reject(1), Node::Reject(1)],
        ])
        .expect("valid");
        assert_eq!(depth(&tree), 2);
    }

    #[test]
    fn subtrees_extend_depth() {
        let child = knuth_yao(&weights(&[1, 2, 3, 4])).expect("child");
        let tree = SamplingTree::from_levels(vec![
            vec![],
            vec![Node::Accept(9), Node::Subtree(child)],
        ])
        .expect("valid");
        assert_eq!(depth(&tree), 1 + 5);
    }

    #[test]
    fn fixed_depth_never_exceeds_requested_depth() {
        let cases: [&[u64]; 4] = [&[1, 2, 3], &[5, 9, 1, 1], &[13, 2], &[1; 11]];
        for w in cases {
            let w = weights(w);
            let k = minimal_depth(w.total());
            for target in k..k + 8 {
                let tree = aldr(&w, target).expect("tree");
                assert!(depth(&tree) <= target as usize);
            }
        }
    }
}
