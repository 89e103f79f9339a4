//! MEG channel assembly
//!
//! `MEGdataset` holds a `1 × C` cell array `timeseries`, one cell per
//! channel. Cells are flattened row-major and concatenated, the result is
//! laid out as `[C, T]`, transposed to `[T, C]` and z-scored per channel
//! with the unbiased standard deviation.

use std::path::Path;

use ndarray::Array2;
use supervene_core::{standardize_columns, Ddof};
use tracing::{info, warn};

use super::open_source;
use crate::error::{DatasetError, DatasetResult};
use crate::mat::{CellArray, MatValue};

/// File name of the MEG recording (no extension)
pub const MEG_FILE: &str = "MEGdataset";

/// Cell-array variable inside [`MEG_FILE`]
pub const MEG_VARIABLE: &str = "timeseries";

/// Build the standardized `[T, C]` matrix from the channel cells.
///
/// Channels are the cells of the first row. Cells may be ragged; only the
/// total sample count has to split evenly across channels.
///
/// # Errors
///
/// Returns [`DatasetError::Shape`] for a non-2-D cell array, non-numeric
/// cells, or a total sample count not divisible by the channel count.
pub fn assemble(cells: &CellArray) -> DatasetResult<Array2<f64>> {
    let [_, channels] = cells.dims() else {
        return Err(shape_error(format!("expected a 2-D cell array, found {:?}", cells.dims())));
    };
    let channels = *channels;
    if channels == 0 || cells.is_empty() {
        return Err(shape_error("no channels".into()));
    }

    let mut samples = Vec::new();
    for c in 0..channels {
        match cells.get(&[0, c]) {
            Some(MatValue::Numeric(array)) => samples.extend(
                array.flatten_row_major().map_err(|e| shape_error(format!("channel {c}: {e}")))?,
            ),
            Some(other) => {
                return Err(shape_error(format!("channel {c} is a {}, not numeric", other.kind())))
            }
            None => return Err(shape_error(format!("channel {c} missing"))),
        }
    }

    if samples.len() % channels != 0 {
        return Err(shape_error(format!(
            "{} samples do not split evenly across {channels} channels",
            samples.len()
        )));
    }
    let steps = samples.len() / channels;

    let by_channel = Array2::from_shape_vec((channels, steps), samples)
        .map_err(|e| shape_error(e.to_string()))?;
    let mut matrix = by_channel.reversed_axes().as_standard_layout().into_owned();

    let degenerate = standardize_columns(&mut matrix, Ddof::Sample);
    if !degenerate.is_empty() {
        warn!(?degenerate, "MEG channels with zero variance; centred only");
    }
    Ok(matrix)
}

/// Load the MEG file and assemble it.
///
/// # Errors
///
/// Returns [`DatasetError::MissingSource`] if the file is absent, plus any
/// decoding or layout error.
pub fn load(path: &Path) -> DatasetResult<Array2<f64>> {
    let file = open_source("MEG", path)?;
    let cells = file
        .cell(MEG_VARIABLE)
        .map_err(|source| DatasetError::Mat { path: path.to_path_buf(), source })?;

    let matrix = assemble(cells)?;
    info!(
        path = %path.display(),
        steps = matrix.nrows(),
        channels = matrix.ncols(),
        "Loaded MEG recording"
    );
    Ok(matrix)
}

fn shape_error(reason: String) -> DatasetError {
    DatasetError::Shape { what: MEG_VARIABLE.into(), reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::mat::NumericArray;
    use approx::assert_abs_diff_eq;
    use supervene_core::math::mean_std;

    #[test]
    fn test_channels_become_standardized_columns() {
        let channels = fixtures::meg_channels(4, 50);
        let matrix = assemble(&fixtures::meg_cells(&channels)).unwrap();

        assert_eq!(matrix.dim(), (50, 4));
        for c in 0..4 {
            let (mean, std) = mean_std(matrix.column(c), Ddof::Sample);
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(std, 1.0, epsilon = 1e-10);
        }

        // Standardization is affine per channel, so ordering is kept
        let raw = &channels[2];
        assert_eq!(raw[0] < raw[1], matrix[[0, 2]] < matrix[[1, 2]]);
    }

    #[test]
    fn test_ragged_cells_are_redistributed() {
        // 3 + 5 samples over 2 channels: channel 0 gets the first four
        let cells = CellArray::row(vec![
            MatValue::Numeric(NumericArray::row_vector(vec![1.0, 2.0, 3.0])),
            MatValue::Numeric(NumericArray::row_vector(vec![4.0, 5.0, 6.0, 7.0, 8.0])),
        ]);
        let matrix = assemble(&cells).unwrap();
        assert_eq!(matrix.dim(), (4, 2));

        let expected = mean_std(ndarray::array![1.0, 2.0, 3.0, 4.0].view(), Ddof::Sample);
        assert_abs_diff_eq!(matrix[[0, 0]], (1.0 - expected.0) / expected.1, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix[[0, 1]], (5.0 - 6.5) / expected.1, epsilon = 1e-12);
    }

    #[test]
    fn test_uneven_total_is_rejected() {
        let cells = CellArray::row(vec![
            MatValue::Numeric(NumericArray::row_vector(vec![1.0, 2.0, 3.0])),
            MatValue::Numeric(NumericArray::row_vector(vec![4.0, 5.0])),
        ]);
        assert!(matches!(assemble(&cells), Err(DatasetError::Shape { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join(MEG_FILE)),
            Err(DatasetError::MissingSource { dataset: "MEG", .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MEG_FILE);
        fixtures::write_meg(&path, &fixtures::meg_channels(3, 40));
        assert_eq!(load(&path).unwrap().dim(), (40, 3));
    }
}
