//! Bit-string chain adapter

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use supervene_core::{prepare_pairs, BitStringGenerator, Tensor};
use tracing::debug;

use super::{log_built, Dataset};
use crate::error::DatasetResult;

/// Samples of the correlated six-bit chain.
#[derive(Clone, Debug)]
pub struct BitStringDataset {
    generator: BitStringGenerator,
    tensor: Tensor,
}

impl BitStringDataset {
    /// Paired chain of `length` observations, `[length - 1, 2, 6]`.
    ///
    /// `seed = None` draws the chain from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns an error for probabilities outside `[0, 1]` or a chain too
    /// short to pair.
    pub fn new(
        gamma_parity: f64,
        gamma_extra: f64,
        length: usize,
        seed: Option<u64>,
    ) -> DatasetResult<Self> {
        let generator = BitStringGenerator::new(gamma_parity, gamma_extra)?;
        Self::generate(generator, length, true, &mut seeded(seed))
    }

    /// Unpaired chain, `[length, 6]`.
    ///
    /// # Errors
    ///
    /// Returns an error for probabilities outside `[0, 1]` or `length == 0`.
    pub fn unpaired(
        gamma_parity: f64,
        gamma_extra: f64,
        length: usize,
        seed: Option<u64>,
    ) -> DatasetResult<Self> {
        let generator = BitStringGenerator::new(gamma_parity, gamma_extra)?;
        Self::generate(generator, length, false, &mut seeded(seed))
    }

    /// Generate with a caller-owned RNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the chain cannot be generated or paired.
    pub fn generate<R: Rng + ?Sized>(
        generator: BitStringGenerator,
        length: usize,
        prepare: bool,
        rng: &mut R,
    ) -> DatasetResult<Self> {
        let bits = generator.generate_f32(length, rng)?.into_dyn();
        let tensor = if prepare { prepare_pairs(&bits)? } else { bits };
        debug!(
            gamma_parity = generator.gamma_parity(),
            gamma_extra = generator.gamma_extra(),
            length,
            "Bit string generated"
        );
        log_built("bit_string", "generated", &tensor);
        Ok(Self { generator, tensor })
    }

    /// The generator parameters
    #[must_use]
    pub fn generator(&self) -> BitStringGenerator {
        self.generator
    }
}

impl Dataset for BitStringDataset {
    fn name(&self) -> &'static str {
        "bit_string"
    }

    fn tensor(&self) -> &Tensor {
        &self.tensor
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}
