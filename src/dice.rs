//! Randomness source for the simulator.
//!
//! Every random decision goes through [`Dice`] so a run can be driven by a
//! seeded RNG, OS entropy, or a fixed script in tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

pub trait Dice {
    /// Returns true with the given probability (0.0 never, 1.0 always).
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform integer in `low..=high`.
    fn range(&mut self, low: u32, high: u32) -> u32;

    /// Uniformly picks one element of a non-empty slice.
    fn pick<'a, T>(&mut self, options: &'a [T]) -> &'a T {
        let last = options.len().saturating_sub(1) as u32;
        &options[self.range(0, last) as usize]
    }

    /// Lowercase hex string of `len` characters.
    fn hex_suffix(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| HEX_DIGITS[self.range(0, 15) as usize] as char)
            .collect()
    }
}

/// [`Dice`] backed by any `rand` RNG.
#[derive(Debug, Clone)]
pub struct RngDice<R> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngDice<ChaCha8Rng> {
    /// Reproducible dice for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Non-reproducible dice seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> Dice for RngDice<R> {
    fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() < probability
    }

    fn range(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Dice that always lands the same way.
///
/// `gates_pass` decides every [`Dice::chance`] call, `range_high` picks the
/// upper (or lower) bound of every [`Dice::range`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDice {
    pub gates_pass: bool,
    pub range_high: bool,
}

impl FixedDice {
    /// Every gate passes and every range yields its maximum.
    pub fn lucky() -> Self {
        Self {
            gates_pass: true,
            range_high: true,
        }
    }

    /// No gate passes and every range yields its minimum.
    pub fn unlucky() -> Self {
        Self {
            gates_pass: false,
            range_high: false,
        }
    }
}

impl Dice for FixedDice {
    fn chance(&mut self, probability: f64) -> bool {
        // A zero probability stays impossible even for lucky dice.
        self.gates_pass && probability > 0.0
    }

    fn range(&mut self, low: u32, high: u32) -> u32 {
        if self.range_high {
            high.max(low)
        } else {
            low
        }
    }
}
