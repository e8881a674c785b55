//! `aldr`: entropy-efficient sampling from discrete distributions.
//!
//! Given integer weights `A = [A_0, ..., A_{n-1}]`, draw index `i` with
//! probability `A_i / Σ A` using fair coin flips, and measure how many flips
//! that costs compared to the Shannon entropy of the distribution.
//!
//! Exposed modules:
//! - `weights`: validated weight vectors.
//! - `bits`: bit sources (buffered RNG adapter, scripted fixture).
//! - `tree`: level-by-level sampling trees with back-edges, plus validation.
//! - `ky`: Knuth–Yao (entropy-optimal) tree construction.
//! - `fixed`: FLDR / ALDR fixed-depth trees.
//! - `sample`: tree traversal and batch sampling.
//! - `depth` / `entropy`: effective depth, expected bit cost, toll.
//! - `flat`: array-backed FLDR / ALDR sampler.
//! - `analytic`: closed-form tolls without building trees.
//! - `curve`: toll as a function of depth.
//!
//! ```
//! use aldr::{aldr, expected_bits, knuth_yao, toll, WeightVector};
//!
//! let w = WeightVector::new(vec![1, 2]).unwrap();
//! let ky = knuth_yao(&w).unwrap();
//! assert!((expected_bits(&ky).unwrap() - 2.0).abs() < 1e-12);
//! assert!(toll(&aldr(&w, 4).unwrap(), &w).unwrap() < 2.0);
//! ```
//!
//! ## References
//!
//! - Knuth & Yao (1976): *The complexity of nonuniform random number generation*.
//! - Saad, Freer, Rinard, Mansinghka (2020): *The Fast Loaded Dice Roller*.
//! - Draper & Saad (2025): *Efficient Rejection Sampling in the Entropy-Optimal Range*.

#![forbid(unsafe_code)]

pub mod analytic;
pub mod bits;
pub mod curve;
pub mod depth;
pub mod entropy;
pub mod error;
pub mod fixed;
pub mod flat;
pub mod ky;
pub mod sample;
pub mod tree;
pub mod weights;

pub use analytic::{binary_expansion_length, fldr_toll, uniform_aldr_tolls};
pub use bits::{BitSource, RngBits, ScriptedBits};
pub use curve::{toll_curve, CurveOptions, TollCurve};
pub use depth::depth;
pub use entropy::{expected_bits, shannon_entropy, toll};
pub use error::{Error, Result, TreeDefect};
pub use fixed::{aldr, fldr, minimal_depth, FixedDepth, MAX_DEPTH};
pub use flat::FlatSampler;
pub use ky::{knuth_yao, KnuthYao, DEFAULT_MAX_LEVELS};
pub use sample::{
    multisample, multisample_with_bits, multisample_with_rng, sample, sample_with_bits,
    sample_with_rng,
};
pub use tree::{Level, Node, SamplingTree};
pub use weights::WeightVector;
