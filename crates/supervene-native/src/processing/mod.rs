//! Recording preprocessing pipelines
//!
//! This module turns raw recordings into `[T, C]` matrices:
//! - [`ecog`]: High-pass, decimation and z-scoring of 64 ECoG channels
//! - [`fmri`]: Subject or region selection over BOLD timeseries
//! - [`meg`]: Reshaping and z-scoring of ragged MEG channels
//!
//! Each loader checks that its raw file exists before reading and fails
//! with [`DatasetError::MissingSource`] otherwise.

pub mod ecog;
pub mod fmri;
pub mod meg;

use std::path::Path;

use crate::error::{DatasetError, DatasetResult};
use crate::mat::MatFile;

/// Fail with a missing-source error unless `path` exists.
///
/// # Errors
///
/// Returns [`DatasetError::MissingSource`] naming `path`.
pub fn require_source(dataset: &'static str, path: &Path) -> DatasetResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DatasetError::MissingSource { dataset, path: path.to_path_buf() })
    }
}

/// Check `path` exists, then decode it.
///
/// # Errors
///
/// Returns [`DatasetError::MissingSource`] or [`DatasetError::Mat`].
pub fn open_source(dataset: &'static str, path: &Path) -> DatasetResult<MatFile> {
    require_source(dataset, path)?;
    MatFile::open(path).map_err(|source| DatasetError::Mat { path: path.to_path_buf(), source })
}
