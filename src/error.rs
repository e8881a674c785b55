//! Errors for tree construction and analysis.

use thiserror::Error;

/// Errors returned by builders, the validation pass, and the analyzers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("weight vector is empty")]
    EmptyWeights,

    #[error("weight vector has no positive entry")]
    AllZeroWeights,

    #[error("weight at index {index} is negative (got {value})")]
    NegativeWeight { index: usize, value: i64 },

    #[error("integer overflow while scaling weights")]
    Overflow,

    #[error("depth {depth} is below the minimal fixed depth {minimum}")]
    DepthTooShallow { depth: u32, minimum: u32 },

    #[error("depth {depth} exceeds the supported maximum {maximum}")]
    DepthTooLarge { depth: u32, maximum: u32 },

    #[error("no repeating state found within {limit} levels")]
    LevelLimit { limit: usize },

    #[error("back-edges target more than one level ({first} and {second})")]
    MultipleRejectTargets { first: usize, second: usize },

    #[error("invalid argument: {0}")]
    Invalid(&'static str),

    #[error("invalid tree: {0}")]
    InvalidTree(TreeDefect),
}

/// Structural defects found by [`SamplingTree::from_levels`](crate::SamplingTree::from_levels).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeDefect {
    #[error("tree has no levels")]
    NoLevels,

    #[error("level {level} has no live slot")]
    Unreachable { level: usize },

    #[error("level {level} holds {nodes} nodes but only {live} slots are live")]
    Overfull {
        level: usize,
        nodes: usize,
        live: usize,
    },

    #[error("{open} live slots at level {level} are never resolved")]
    Unresolved { level: usize, open: usize },

    #[error("back-edge at level {level} targets level {target}, which is not above it")]
    ForwardBackEdge { level: usize, target: usize },

    #[error("back-edge at level {level}, position {position} lands outside level {landing}")]
    BackEdgeOutOfRange {
        level: usize,
        position: usize,
        landing: usize,
    },

    #[error("slot {position} at level {level} can never reach an outcome")]
    NoExit { level: usize, position: usize },
}

impl From<TreeDefect> for Error {
    fn from(defect: TreeDefect) -> Self {
        Self::InvalidTree(defect)
    }
}

pub type Result<T> = core::result::Result<T, Error>;
