//! Toll as a function of tree depth.
//!
//! Between the FLDR depth and the Knuth–Yao depth, ALDR trees trade memory for
//! entropy: each extra level shrinks the rejection mass. [`toll_curve`] walks
//! that range and records the toll at every depth, stopping early once the
//! curve has settled near the Knuth–Yao optimum (the Knuth–Yao depth can be
//! close to the total weight, so walking all of it is rarely useful).

use crate::depth::depth;
use crate::entropy::{shannon_entropy, toll};
use crate::error::Result;
use crate::fixed::{minimal_depth, FixedDepth, MAX_DEPTH};
use crate::ky::{KnuthYao, DEFAULT_MAX_LEVELS};
use crate::weights::WeightVector;

/// When to stop walking depths.
///
/// The walk stops after depth `K` when either
/// - `toll < settle_toll`, `toll - ky_toll < settle_epsilon` and
///   `K - min_depth > settle_extra_depth`, or
/// - `K - min_depth > max_extra_depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveOptions {
    pub max_extra_depth: u32,
    pub settle_extra_depth: u32,
    pub settle_epsilon: f64,
    pub settle_toll: f64,
    pub max_levels: usize,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CurveOptions {
    pub fn new() -> Self {
        Self {
            max_extra_depth: 100,
            settle_extra_depth: 10,
            settle_epsilon: 0.001,
            settle_toll: 2.0,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    /// Hard cap on how far past the minimal depth to go.
    pub fn with_max_extra_depth(mut self, depth: u32) -> Self {
        self.max_extra_depth = depth;
        self
    }

    /// Stop once the toll is below `toll`, within `epsilon` of the optimum, and
    /// at least `extra_depth + 1` levels past the minimal depth.
    pub fn with_settle(mut self, toll: f64, epsilon: f64, extra_depth: u32) -> Self {
        self.settle_toll = toll;
        self.settle_epsilon = epsilon;
        self.settle_extra_depth = extra_depth;
        self
    }

    /// Level limit passed to the Knuth–Yao builder.
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    fn stop(&self, toll: f64, ky_toll: f64, extra: u32) -> bool {
        (toll < self.settle_toll
            && toll - ky_toll < self.settle_epsilon
            && extra > self.settle_extra_depth)
            || extra > self.max_extra_depth
    }
}

/// Tolls of one weight vector across depths.
#[derive(Debug, Clone, PartialEq)]
pub struct TollCurve {
    /// Minimal fixed depth, `ceil(log2 M)`.
    pub min_depth: u32,
    pub fldr_toll: f64,
    /// Depth of the Knuth–Yao tree.
    pub ky_depth: u32,
    pub ky_toll: f64,
    /// `(K, toll(ALDR(A, K)))` for `K` from `min_depth` upward.
    ///
    /// Never empty: the minimal depth is always walked, even when a common
    /// factor in the weights makes the Knuth–Yao tree shallower than it
    /// (`[2, 2]` has `min_depth = 2` but `ky_depth = 1`).
    pub points: Vec<(u32, f64)>,
}

impl TollCurve {
    /// First depth whose toll is below `threshold`, trying FLDR, then the
    /// walked depths, then Knuth–Yao.
    pub fn first_depth_below(&self, threshold: f64) -> Option<u32> {
        std::iter::once((self.min_depth, self.fldr_toll))
            .chain(self.points.iter().copied())
            .chain(std::iter::once((self.ky_depth, self.ky_toll)))
            .find(|&(_, toll)| toll < threshold)
            .map(|(depth, _)| depth)
    }
}

/// Compute the toll curve for `weights`.
///
/// # Errors
///
/// Propagates builder errors, e.g. [`crate::Error::LevelLimit`] when the
/// Knuth–Yao tree needs more than `options.max_levels` levels.
pub fn toll_curve(weights: &WeightVector, options: &CurveOptions) -> Result<TollCurve> {
    let entropy = shannon_entropy(weights);
    let fixed = FixedDepth::new().with_max_levels(options.max_levels);

    let min_depth = minimal_depth(weights.total());
    let fldr_toll = toll(&fixed.build(weights)?, weights)?;
    let ky_tree = KnuthYao::new()
        .with_max_levels(options.max_levels)
        .build(weights)?;
    let ky_depth = u32::try_from(depth(&ky_tree)).unwrap_or(u32::MAX);
    let ky_toll = toll(&ky_tree, weights)?;

    let mut points = Vec::new();
    for k in min_depth..=ky_depth.max(min_depth).min(MAX_DEPTH) {
        let tree = fixed.with_depth(k).build(weights)?;
        let t = toll(&tree, weights)?;
        points.push((k, t));
        if options.stop(t, ky_toll, k - min_depth) {
            log::debug!("toll curve settled at K={k} (toll={t:.6}, ky_toll={ky_toll:.6})");
            break;
        }
    }
    log::trace!(
        "toll curve: H={entropy:.6} min_depth={min_depth} ky_depth={ky_depth} points={}",
        points.len()
    );

    Ok(TollCurve {
        min_depth,
        fldr_toll,
        ky_depth,
        ky_toll,
        points,
    })
}
