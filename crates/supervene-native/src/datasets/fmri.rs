//! fMRI adapters
//!
//! [`FmriConcatDataset`] selects subjects, [`FmriRegionDataset`] selects
//! regions; see [`crate::processing::fmri`] for why both exist.

use std::path::Path;

use supervene_core::Tensor;

use super::{log_built, matrix_tensor, Dataset};
use crate::error::DatasetResult;
use crate::processing::fmri::{self, FmriSelection};

/// Default-mode-network subjects concatenated along time.
///
/// `[24L - 1, 2, C]` when paired, `[24L, C]` otherwise, for subjects of
/// length `L` with `C` regions.
#[derive(Clone, Debug)]
pub struct FmriConcatDataset {
    tensor: Tensor,
}

impl FmriConcatDataset {
    /// Paired default-mode-network subjects.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DatasetError::MissingSource`] if `path` is absent,
    /// or any decoding or selection error.
    pub fn new(path: &Path) -> DatasetResult<Self> {
        Self::with_selection(path, &FmriSelection::default_mode_subjects(), true)
    }

    /// Unpaired default-mode-network subjects.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn unpaired(path: &Path) -> DatasetResult<Self> {
        Self::with_selection(path, &FmriSelection::default_mode_subjects(), false)
    }

    /// Any selection, paired or not.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_selection(
        path: &Path,
        selection: &FmriSelection,
        prepare: bool,
    ) -> DatasetResult<Self> {
        let matrix = fmri::load(path, selection)?;
        let tensor = matrix_tensor(&matrix, prepare)?;
        log_built("fmri_concat", &path.display().to_string(), &tensor);
        Ok(Self { tensor })
    }
}

impl Dataset for FmriConcatDataset {
    fn name(&self) -> &'static str {
        "fmri_concat"
    }

    fn tensor(&self) -> &Tensor {
        &self.tensor
    }
}

/// The HCP subjects concatenated, default-mode-network regions kept, unpaired.
#[derive(Clone, Debug)]
pub struct FmriRegionDataset {
    tensor: Tensor,
}

impl FmriRegionDataset {
    /// `[100·L, 24]` for subjects of length `L`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DatasetError::MissingSource`] if `path` is absent,
    /// or any decoding or selection error.
    pub fn new(path: &Path) -> DatasetResult<Self> {
        Self::with_regions(path, fmri::default_mode_indices())
    }

    /// Keep a custom region list.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_regions(path: &Path, regions: Vec<usize>) -> DatasetResult<Self> {
        let matrix = fmri::load(path, &FmriSelection::Regions(regions))?;
        let tensor = matrix_tensor(&matrix, false)?;
        log_built("fmri_region", &path.display().to_string(), &tensor);
        Ok(Self { tensor })
    }
}

impl Dataset for FmriRegionDataset {
    fn name(&self) -> &'static str {
        "fmri_region"
    }

    fn tensor(&self) -> &Tensor {
        &self.tensor
    }
}
