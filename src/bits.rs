//! Sources of unbiased random bits.
//!
//! Every sampler in this crate consumes randomness one bit at a time, so the
//! cost of a sample is measured in bits, not in RNG calls. [`RngBits`] adapts
//! any [`RngCore`] by buffering one `u64` word and handing out its bits
//! most-significant first, which keeps the per-bit overhead low and makes the
//! exact bit consumption observable.
//!
//! Notes:
//! - [`ScriptedBits`] replays a fixed script and exists for deterministic tests.
//! - Sources are `&mut`-borrowed by the samplers; concurrent sampling against one
//!   tree needs one independent source per thread.

use rand::RngCore;

const WORD_BITS: u32 = u64::BITS;

/// Capability producing independent, unbiased bits.
pub trait BitSource {
    /// The next bit.
    fn next_bit(&mut self) -> bool;
}

impl<B: BitSource + ?Sized> BitSource for &mut B {
    #[inline]
    fn next_bit(&mut self) -> bool {
        (**self).next_bit()
    }
}

/// Buffered bit source over an RNG.
#[derive(Debug, Clone)]
pub struct RngBits<R> {
    rng: R,
    word: u64,
    remaining: u32,
    rng_calls: u64,
}

impl<R: RngCore> RngBits<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            word: 0,
            remaining: 0,
            rng_calls: 0,
        }
    }

    /// Number of `u64` words drawn from the underlying RNG.
    pub fn rng_calls(&self) -> u64 {
        self.rng_calls
    }

    /// Bits handed out so far.
    pub fn bits_consumed(&self) -> u64 {
        self.rng_calls * u64::from(WORD_BITS) - u64::from(self.remaining)
    }

    /// Drop buffered bits and zero the counters.
    pub fn reset(&mut self) {
        self.word = 0;
        self.remaining = 0;
        self.rng_calls = 0;
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: RngCore> BitSource for RngBits<R> {
    #[inline]
    fn next_bit(&mut self) -> bool {
        if self.remaining == 0 {
            self.word = self.rng.next_u64();
            self.remaining = WORD_BITS;
            self.rng_calls += 1;
        }
        self.remaining -= 1;
        (self.word >> self.remaining) & 1 == 1
    }
}

/// Deterministic bit source replaying a script cyclically.
#[derive(Debug, Clone)]
pub struct ScriptedBits {
    script: Vec<bool>,
    cursor: usize,
    consumed: u64,
}

impl ScriptedBits {
    /// # Panics
    ///
    /// Panics if `script` is empty.
    pub fn new(script: impl Into<Vec<bool>>) -> Self {
        let script = script.into();
        assert!(!script.is_empty(), "ScriptedBits: script must be non-empty");
        Self {
            script,
            cursor: 0,
            consumed: 0,
        }
    }

    /// Parse a script of `'0'`/`'1'` characters; anything else is skipped.
    ///
    /// # Panics
    ///
    /// Panics if no `'0'` or `'1'` is present.
    pub fn from_str_bits(bits: &str) -> Self {
        Self::new(
            bits.chars()
                .filter_map(|c| match c {
                    '0' => Some(false),
                    '1' => Some(true),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl BitSource for ScriptedBits {
    fn next_bit(&mut self) -> bool {
        let bit = self.script[self.cursor];
        self.cursor = (self.cursor + 1) % self.script.len();
        self.consumed += 1;
        bit
    }
}
