//! Supervene Native - Raw recordings and dataset adapters
//!
//! This crate turns raw files and generators into ready-to-train tensors:
//! - MAT Level 5 decoding (and encoding, for test fixtures)
//! - ECoG, fMRI and MEG preprocessing
//! - Dataset adapters with `(t, t+1)` pairing
//! - Data-directory and TOML experiment configuration
//!
//! # Modules
//!
//! - [`mat`]: MAT-file reader and writer
//! - [`processing`]: Per-source preprocessing pipelines
//! - [`datasets`]: The [`Dataset`] trait and its adapters
//! - [`config`]: [`DataDir`] and [`DatasetConfig`]
//! - [`error`]: Error types for decoding and dataset construction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod datasets;
pub mod error;
pub mod mat;
pub mod processing;

#[cfg(test)]
mod fixtures;

// Re-export key types
pub use config::{DataDir, DatasetConfig, ExperimentConfig};
pub use datasets::{
    BitStringDataset, Dataset, EcogDataset, FmriConcatDataset, FmriRegionDataset,
    GameOfLifeDataset, GameOfLifeOptions, MegDataset,
};
pub use error::{DatasetError, DatasetResult, MatError, MatResult};
pub use mat::{MatFile, MatWriter};
