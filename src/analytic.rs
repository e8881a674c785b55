//! Closed-form toll formulas that avoid building trees.
//!
//! A dyadic probability `a / 2^k` placed in a Knuth–Yao tree costs
//! `nu(a, k) = Σ_{bits i of a} (k - i) / 2^(k - i)` bits of expected depth.
//! Relative to its self-information that is [`trel`]; summing over outcomes
//! and adding the restart overhead gives the FLDR toll directly.
//!
//! ## References
//!
//! - Knuth & Yao (1976): *The complexity of nonuniform random number generation*.
//! - Saad, Freer, Rinard, Mansinghka (2020): *The Fast Loaded Dice Roller*.

use crate::error::{Error, Result};
use crate::fixed::{minimal_depth, MAX_DEPTH};
use crate::weights::WeightVector;

/// Expected-depth contribution of the dyadic number `n / 2^k`.
pub fn nu(n: u128, k: u32) -> f64 {
    (0..u128::BITS - n.leading_zeros())
        .filter(|&i| n & (1u128 << i) != 0)
        .map(|i| {
            let shift = i64::from(k) - i64::from(i);
            shift as f64 * 2f64.powi(-(shift as i32))
        })
        .sum()
}

/// `-p log2 p`, with `h1(0) = 0`.
pub fn h1(p: f64) -> f64 {
    if p == 0.0 {
        0.0
    } else {
        -p * p.log2()
    }
}

/// Relative toll of one outcome with dyadic probability `a / 2^k`.
pub fn trel(a: u128, k: u32) -> f64 {
    if a == 0 {
        return 0.0;
    }
    let x = a as f64 * 2f64.powi(-(k as i32));
    (nu(a, k) - h1(x)) / x
}

/// Toll of the FLDR tree for `weights`, without building it.
///
/// # Errors
///
/// [`Error::DepthTooLarge`] if the minimal depth exceeds [`MAX_DEPTH`].
pub fn fldr_toll(weights: &WeightVector) -> Result<f64> {
    let total = weights.total();
    let k = minimal_depth(total);
    if k > MAX_DEPTH {
        return Err(Error::DepthTooLarge {
            depth: k,
            maximum: MAX_DEPTH,
        });
    }
    let span = 1u128 << k;
    let reject_bound = span as f64 / total as f64;
    let reject = reject_bound.log2() + reject_bound * nu(span - total, k);

    let weighted: f64 = weights
        .as_slice()
        .iter()
        .map(|&a| a as f64 * (trel(u128::from(a), k) + reject))
        .sum();
    Ok(weighted / total as f64)
}

/// Length of the binary expansion of `1/m`: the non-repeating prefix plus the
/// period.
///
/// # Panics
///
/// Panics if `m == 0`.
pub fn binary_expansion_length(m: u64) -> u32 {
    assert!(m > 0, "binary_expansion_length: m must be positive");
    let prefix = m.trailing_zeros();
    let odd = u128::from(m >> prefix);
    if odd == 1 {
        return prefix;
    }
    let mut period = 1;
    let mut v = 2u128 % odd;
    while v != 1 {
        v = (v << 1) % odd;
        period += 1;
    }
    prefix + period
}

/// ALDR tolls `(K, toll)` of the uniform distribution over `m` outcomes, for
/// every depth from the minimal one up to the Knuth–Yao depth.
///
/// Each step derives the next depth's multiplier and remainder from the
/// previous ones, so the cost is linear in the number of depths. That number is
/// the multiplicative order of 2 modulo `m`, which can be close to `m`.
///
/// # Errors
///
/// [`Error::Invalid`] unless `m` is odd and at least 3.
pub fn uniform_aldr_tolls(m: u64) -> Result<Vec<(u32, f64)>> {
    if m < 3 || m % 2 == 0 {
        return Err(Error::Invalid(
            "uniform_aldr_tolls: m must be odd and at least 3",
        ));
    }
    let first = minimal_depth(u128::from(m));
    let last = binary_expansion_length(m);
    let entropy = (m as f64).log2();

    // rem < m < 2^64, so doubling it stays within u128.
    let m_wide = u128::from(m);
    let span = 1u128 << first;
    let multiplier = span / m_wide;
    let mut rem = span % m_wide;
    let mut nu_multiplier = nu(multiplier, first);

    let mut tolls = Vec::new();
    for k in first..=last {
        let one_round = nu(rem, k) + m as f64 * nu_multiplier;
        // 2^k / (multiplier * m) = 1 / (1 - rem / 2^k)
        let accept = 1.0 - rem as f64 * 2f64.powi(-(k as i32));
        tolls.push((k, one_round / accept - entropy));

        rem <<= 1;
        if rem >= m_wide {
            rem -= m_wide;
            nu_multiplier += f64::from(k + 1) * 2f64.powi(-((k + 1) as i32));
        }
    }
    Ok(tolls)
}
