//! fMRI BOLD timeseries assembly
//!
//! The HCP file stores one `[regions, time]` matrix per subject in the cell
//! array `BOLD_timeseries_HCP` (Schaefer-100 parcellation). Two selections
//! over the same default-mode-network index list exist:
//!
//! - [`FmriSelection::Subjects`] treats the indices as subjects and
//!   concatenates those subjects along time, keeping every region. This is
//!   what the first experiments ran on.
//! - [`FmriSelection::Regions`] concatenates the first [`HCP_SUBJECTS`]
//!   subjects and keeps only the indexed regions (columns). This was
//!   introduced later as the intended default-mode-network selection. Extra
//!   cells past the first hundred are ignored; fewer is an error.
//!
//! Which one is "correct" was never settled, so both stay available.

use std::ops::Range;
use std::path::Path;

use ndarray::{concatenate, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::open_source;
use crate::error::{DatasetError, DatasetResult, MatError};
use crate::mat::{CellArray, MatValue};

/// File name of the BOLD recording
pub const FMRI_FILE: &str = "Schaefer100_BOLD_HCP.mat";

/// Cell-array variable inside [`FMRI_FILE`]
pub const FMRI_VARIABLE: &str = "BOLD_timeseries_HCP";

/// Number of subjects in the HCP release; region selection spans these
pub const HCP_SUBJECTS: usize = 100;

/// Index ranges of the default-mode-network selection
pub const DEFAULT_MODE_RANGES: [Range<usize>; 2] = [37..50, 89..100];

/// The 24 default-mode-network indices
#[must_use]
pub fn default_mode_indices() -> Vec<usize> {
    DEFAULT_MODE_RANGES.iter().flat_map(Clone::clone).collect()
}

/// How the index list is applied to the subject cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "indices", rename_all = "snake_case")]
pub enum FmriSelection {
    /// Keep the listed subjects, all regions
    Subjects(Vec<usize>),
    /// Keep all subjects, only the listed regions
    Regions(Vec<usize>),
}

impl FmriSelection {
    /// Default-mode-network indices applied to subjects
    #[must_use]
    pub fn default_mode_subjects() -> Self {
        Self::Subjects(default_mode_indices())
    }

    /// Default-mode-network indices applied to regions
    #[must_use]
    pub fn default_mode_regions() -> Self {
        Self::Regions(default_mode_indices())
    }

    /// Assemble a `[T, C]` matrix from the subject cells.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Shape`] when an index is out of range, a cell
    /// is not a matrix, subjects disagree on their region count, or a region
    /// selection finds fewer than [`HCP_SUBJECTS`] subjects.
    pub fn apply(&self, subjects: &CellArray) -> DatasetResult<Array2<f64>> {
        match self {
            Self::Subjects(indices) => concat_subjects(subjects, indices),
            Self::Regions(indices) => {
                if subjects.len() < HCP_SUBJECTS {
                    return Err(shape_error(format!(
                        "region selection needs {HCP_SUBJECTS} subjects, found {}",
                        subjects.len()
                    )));
                }
                let all: Vec<usize> = (0..HCP_SUBJECTS).collect();
                let full = concat_subjects(subjects, &all)?;
                let regions = full.ncols();
                if let Some(&bad) = indices.iter().find(|&&r| r >= regions) {
                    return Err(shape_error(format!(
                        "region {bad} out of range for {regions} regions"
                    )));
                }
                Ok(full.select(Axis(1), indices))
            }
        }
    }
}

/// Load the BOLD file and apply `selection`.
///
/// # Errors
///
/// Returns [`DatasetError::MissingSource`] if the file is absent, plus any
/// decoding or selection error.
pub fn load(path: &Path, selection: &FmriSelection) -> DatasetResult<Array2<f64>> {
    let file = open_source("FMRI", path)?;
    let subjects = file
        .cell(FMRI_VARIABLE)
        .map_err(|source| DatasetError::Mat { path: path.to_path_buf(), source })?;

    info!(path = %path.display(), subjects = subjects.len(), ?selection, "Loading FMRI recording");
    let matrix = selection.apply(subjects)?;
    debug!(steps = matrix.nrows(), channels = matrix.ncols(), "FMRI matrix assembled");
    Ok(matrix)
}

/// One subject's `[regions, time]` matrix.
fn subject_matrix(subjects: &CellArray, index: usize) -> DatasetResult<Array2<f64>> {
    let value = subjects.linear(index).ok_or_else(|| {
        shape_error(format!("subject {index} out of range for {} subjects", subjects.len()))
    })?;
    match value {
        MatValue::Numeric(array) => array
            .to_array2()
            .map_err(|e: MatError| shape_error(format!("subject {index}: {e}"))),
        other => Err(shape_error(format!("subject {index} is a {}, not a matrix", other.kind()))),
    }
}

/// Concatenate subjects along time and transpose to `[T, regions]`.
fn concat_subjects(subjects: &CellArray, indices: &[usize]) -> DatasetResult<Array2<f64>> {
    if indices.is_empty() {
        return Err(shape_error("empty subject selection".into()));
    }

    let matrices = indices
        .iter()
        .map(|&i| subject_matrix(subjects, i))
        .collect::<DatasetResult<Vec<_>>>()?;

    let regions = matrices[0].nrows();
    if let Some((pos, m)) = matrices.iter().enumerate().find(|(_, m)| m.nrows() != regions) {
        return Err(shape_error(format!(
            "subject {} has {} regions, subject {} has {regions}",
            indices[pos],
            m.nrows(),
            indices[0]
        )));
    }

    let views: Vec<ArrayView2<'_, f64>> = matrices.iter().map(Array2::view).collect();
    let joined = concatenate(Axis(1), &views).map_err(|e| shape_error(e.to_string()))?;
    Ok(joined.reversed_axes().as_standard_layout().into_owned())
}

fn shape_error(reason: String) -> DatasetError {
    DatasetError::Shape { what: FMRI_VARIABLE.into(), reason }
}
