//! ECoG adapter

use std::path::Path;

use supervene_core::Tensor;

use super::{log_built, matrix_tensor, Dataset};
use crate::error::DatasetResult;
use crate::processing::ecog::EcogPreprocessing;

/// Cleaned ECoG recording, `[T' - 1, 2, C]` or `[T', C]`.
#[derive(Clone, Debug)]
pub struct EcogDataset {
    tensor: Tensor,
}

impl EcogDataset {
    /// Load the channel files under `dir` with the standard cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DatasetError::MissingSource`] for an absent channel
    /// file, or any decoding, filtering or pairing error.
    pub fn new(dir: &Path, prepare: bool) -> DatasetResult<Self> {
        Self::with_preprocessing(dir, &EcogPreprocessing::default(), prepare)
    }

    /// Load with custom cleanup parameters.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_preprocessing(
        dir: &Path,
        preprocessing: &EcogPreprocessing,
        prepare: bool,
    ) -> DatasetResult<Self> {
        let matrix = preprocessing.load(dir)?;
        let tensor = matrix_tensor(&matrix, prepare)?;
        log_built("ecog", &dir.display().to_string(), &tensor);
        Ok(Self { tensor })
    }
}

impl Dataset for EcogDataset {
    fn name(&self) -> &'static str {
        "ecog"
    }

    fn tensor(&self) -> &Tensor {
        &self.tensor
    }
}
