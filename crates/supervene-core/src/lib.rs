//! Supervene Core - sequence generators and signal utilities
//!
//! This crate provides the foundational pieces for the supervenient-feature
//! experiments: synthetic processes, the batch-pairing transform every
//! dataset goes through, and the signal math used to clean raw recordings.
//!
//! # Modules
//!
//! - [`bitstring`]: Correlated six-bit chain with parity and extra-bit couplings
//! - [`life`]: Toroidal Game-of-Life simulator with a whole-grid step
//! - [`pairing`]: `(t, t+1)` pair construction over sequences
//! - [`filters`]: Butterworth design and zero-phase filtering
//! - [`math`]: Standardization, decimation and summary statistics
//! - [`error`]: Error types for generators and transforms
//! - [`types`]: Shared tensor aliases
//!
//! # Example
//!
//! ```rust
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use supervene_core::bitstring::BitStringGenerator;
//! use supervene_core::pairing::prepare_pairs;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let generator = BitStringGenerator::new(0.99, 0.99).unwrap();
//! let bits = generator.generate(100, &mut rng).unwrap();
//!
//! let pairs = prepare_pairs(&bits.into_dyn()).unwrap();
//! assert_eq!(pairs.shape(), &[99, 2, 6]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod bitstring;
pub mod error;
pub mod filters;
pub mod life;
pub mod math;
pub mod pairing;
pub mod types;

// Re-export commonly used types at crate root
pub use bitstring::BitStringGenerator;
pub use error::{CoreError, CoreResult};
pub use filters::{Biquad, BiquadCoeffs, ButterworthHighpass};
pub use life::GameOfLife;
pub use math::{decimate, standardize_columns, Ddof};
pub use pairing::{concat_sequences, prepare_pairs, prepare_pairs_shuffled};
pub use types::{Grid, Tensor};
