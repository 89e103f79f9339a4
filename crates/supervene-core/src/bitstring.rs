//! Correlated bit-string process
//!
//! Each observation is six bits. Bits 0..4 carry a parity coupling between
//! consecutive steps and bit 5 (the "extra" bit) carries a persistence
//! coupling. The parity of the five-bit group is the macroscopic feature
//! the experiments try to recover.

use ndarray::{Array2, ArrayView1};
use rand::Rng;

use crate::error::{check_probability, CoreError, CoreResult};
use crate::types::{bits_to_f32, BIT_STRING_WIDTH, PARITY_BITS};

/// Generator for the correlated six-bit chain.
///
/// * `gamma_parity` - probability that the parity of bits 0..4 changes from
///   one step to the next (otherwise it is kept)
/// * `gamma_extra` - probability that bit 5 repeats its previous value
///   (otherwise it flips)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitStringGenerator {
    gamma_parity: f64,
    gamma_extra: f64,
}

impl BitStringGenerator {
    /// Create a generator with the given couplings.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ProbabilityOutOfRange`] if either coupling is not
    /// a finite value in `[0, 1]`.
    pub fn new(gamma_parity: f64, gamma_extra: f64) -> CoreResult<Self> {
        Ok(Self {
            gamma_parity: check_probability("gamma_parity", gamma_parity)?,
            gamma_extra: check_probability("gamma_extra", gamma_extra)?,
        })
    }

    /// Parity coupling strength
    #[must_use]
    pub fn gamma_parity(&self) -> f64 {
        self.gamma_parity
    }

    /// Extra-bit coupling strength
    #[must_use]
    pub fn gamma_extra(&self) -> f64 {
        self.gamma_extra
    }

    /// Generate `length` observations as a `[length, 6]` array of bits.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidParameter`] if `length` is zero.
    pub fn generate<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> CoreResult<Array2<u8>> {
        if length == 0 {
            return Err(CoreError::InvalidParameter {
                parameter: "length",
                reason: "bit string needs at least one step".into(),
            });
        }

        let mut bits = Array2::<u8>::zeros((length, BIT_STRING_WIDTH));
        for bit in bits.row_mut(0).iter_mut() {
            *bit = rng.gen_range(0..=1);
        }

        for t in 1..length {
            let prev_parity = group_parity(bits.row(t - 1));
            let prev_extra = bits[[t - 1, PARITY_BITS]];

            // The coin for the coupling is drawn before the fresh bits
            let required = if rng.gen_bool(self.gamma_parity) {
                prev_parity ^ 1
            } else {
                prev_parity
            };

            let mut row = bits.row_mut(t);
            for bit in row.iter_mut().take(PARITY_BITS) {
                *bit = rng.gen_range(0..=1);
            }

            // Flipping any single bit toggles parity, so one repair suffices
            if group_parity(row.view()) != required {
                row[rng.gen_range(0..PARITY_BITS)] ^= 1;
            }

            row[PARITY_BITS] = if rng.gen_bool(self.gamma_extra) {
                prev_extra
            } else {
                prev_extra ^ 1
            };
        }

        Ok(bits)
    }

    /// Generate `length` observations cast to `f32`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::generate`].
    pub fn generate_f32<R: Rng + ?Sized>(
        &self,
        length: usize,
        rng: &mut R,
    ) -> CoreResult<Array2<f32>> {
        self.generate(length, rng).map(|bits| bits_to_f32(&bits))
    }
}

/// Parity (0 or 1) of the first five bits of an observation.
#[must_use]
pub fn group_parity(observation: ArrayView1<'_, u8>) -> u8 {
    observation.iter().take(PARITY_BITS).fold(0, |acc, &bit| acc ^ (bit & 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(gamma_parity: f64, gamma_extra: f64, length: usize, seed: u64) -> Array2<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        BitStringGenerator::new(gamma_parity, gamma_extra)
            .unwrap()
            .generate(length, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_shape_and_bit_domain() {
        for length in [2, 3, 17, 500] {
            let bits = run(0.7, 0.3, length, length as u64);
            assert_eq!(bits.dim(), (length, BIT_STRING_WIDTH));
            assert!(bits.iter().all(|&b| b <= 1));
        }
    }

    #[test]
    fn test_full_parity_coupling_always_flips() {
        for seed in 0..20 {
            let bits = run(1.0, 0.5, 200, seed);
            for t in 1..bits.nrows() {
                assert_ne!(group_parity(bits.row(t)), group_parity(bits.row(t - 1)));
            }
        }
    }

    #[test]
    fn test_zero_parity_coupling_always_keeps() {
        for seed in 0..20 {
            let bits = run(0.0, 0.5, 200, seed);
            for t in 1..bits.nrows() {
                assert_eq!(group_parity(bits.row(t)), group_parity(bits.row(t - 1)));
            }
        }
    }

    #[test]
    fn test_extra_bit_constant_with_full_coupling() {
        let bits = run(0.5, 1.0, 300, 3);
        let first = bits[[0, PARITY_BITS]];
        assert!(bits.column(PARITY_BITS).iter().all(|&b| b == first));
    }

    #[test]
    fn test_extra_bit_alternates_with_zero_coupling() {
        let bits = run(0.5, 0.0, 300, 4);
        for t in 1..bits.nrows() {
            assert_ne!(bits[[t, PARITY_BITS]], bits[[t - 1, PARITY_BITS]]);
        }
    }

    #[test]
    fn test_partial_coupling_rate() {
        let bits = run(0.8, 0.5, 20_000, 11);
        let flips = (1..bits.nrows())
            .filter(|&t| group_parity(bits.row(t)) != group_parity(bits.row(t - 1)))
            .count();
        let rate = flips as f64 / (bits.nrows() - 1) as f64;
        assert!((rate - 0.8).abs() < 0.02, "flip rate {rate}");
    }

    #[test]
    fn test_same_seed_reproduces() {
        assert_eq!(run(0.9, 0.9, 100, 42), run(0.9, 0.9, 100, 42));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            BitStringGenerator::new(1.2, 0.5),
            Err(CoreError::ProbabilityOutOfRange { parameter: "gamma_parity", .. })
        ));
        assert!(matches!(
            BitStringGenerator::new(0.5, -0.1),
            Err(CoreError::ProbabilityOutOfRange { parameter: "gamma_extra", .. })
        ));

        let generator = BitStringGenerator::new(0.5, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generator.generate(0, &mut rng).is_err());
        assert_eq!(generator.generate(1, &mut rng).unwrap().nrows(), 1);
    }
}
