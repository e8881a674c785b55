//! Integer weight vectors.
//!
//! A weight vector `A` encodes the distribution `p_i = A_i / M` with `M = Σ A_i`.
//! Only rational distributions are representable, which is what makes the
//! Knuth–Yao state space finite.

use crate::error::{Error, Result};

/// A validated, immutable vector of non-negative integer weights.
///
/// Non-empty with at least one strictly positive entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeightVector {
    weights: Vec<u64>,
}

impl WeightVector {
    /// Validate `weights`.
    pub fn new(weights: impl Into<Vec<u64>>) -> Result<Self> {
        let weights = weights.into();
        if weights.is_empty() {
            return Err(Error::EmptyWeights);
        }
        if weights.iter().all(|&w| w == 0) {
            return Err(Error::AllZeroWeights);
        }
        Ok(Self { weights })
    }

    /// Validate signed weights, rejecting negative entries.
    pub fn from_signed(weights: &[i64]) -> Result<Self> {
        let unsigned = weights
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                u64::try_from(value).map_err(|_| Error::NegativeWeight { index, value })
            })
            .collect::<Result<Vec<u64>>>()?;
        Self::new(unsigned)
    }

    /// The uniform distribution over `n` outcomes.
    pub fn uniform(n: usize) -> Result<Self> {
        Self::new(vec![1u64; n])
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.weights
    }

    /// Number of outcomes, zero-weight entries included.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false for a validated vector; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// `M = Σ A_i`, widened so it never overflows.
    pub fn total(&self) -> u128 {
        self.weights.iter().map(|&w| u128::from(w)).sum()
    }

    /// Probability of outcome `i`, or 0 if out of range.
    pub fn probability(&self, i: usize) -> f64 {
        self.weights
            .get(i)
            .map_or(0.0, |&w| w as f64 / self.total() as f64)
    }

    /// Gcd of all entries (positive for a validated vector).
    pub fn gcd(&self) -> u64 {
        self.weights.iter().fold(0, |g, &w| gcd(g, w))
    }
}

impl TryFrom<Vec<u64>> for WeightVector {
    type Error = Error;

    fn try_from(weights: Vec<u64>) -> Result<Self> {
        Self::new(weights)
    }
}

impl TryFrom<&[u64]> for WeightVector {
    type Error = Error;

    fn try_from(weights: &[u64]) -> Result<Self> {
        Self::new(weights.to_vec())
    }
}

impl TryFrom<&[i64]> for WeightVector {
    type Error = Error;

    fn try_from(weights: &[i64]) -> Result<Self> {
        Self::from_signed(weights)
    }
}

pub(crate) fn gcd<T>(mut a: T, mut b: T) -> T
where
    T: Copy + PartialEq + Default + core::ops::Rem<Output = T>,
{
    let zero = T::default();
    while b != zero {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_all_zero() {
        assert_eq!(WeightVector::new(Vec::<u64>::new()), Err(Error::EmptyWeights));
        assert_eq!(WeightVector::new(vec![0, 0]), Err(Error::AllZeroWeights));
    }

    #[test]
    fn rejects_negative_entries() {
        let err = WeightVector::from_signed(&[3, -1, 2]).expect_err("negative rejected");
        assert_eq!(err, Error::NegativeWeight { index: 1, value: -1 });
    }

    #[test]
    fn signed_and_unsigned_agree() {
        let a = WeightVector::from_signed(&[0, 4, 6]).expect("valid");
        let b = WeightVector::new(vec![0, 4, 6]).expect("valid");
        assert_eq!(a, b);
        assert_eq!(a.total(), 10);
        assert_eq!(a.gcd(), 2);
        assert!((a.probability(1) - 0.4).abs() < 1e-12);
        assert_eq!(a.probability(7), 0.0);
    }

    #[test]
    fn total_does_not_overflow() {
        let w = WeightVector::new(vec![u64::MAX, u64::MAX]).expect("valid");
        assert_eq!(w.total(), 2 * u128::from(u64::MAX));
    }
}
