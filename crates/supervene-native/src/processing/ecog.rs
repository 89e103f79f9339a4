//! ECoG channel preprocessing
//!
//! Each of the 64 channels lives in its own file `ECoG_ch{i}.mat` holding a
//! single vector `ECoGData_ch{i}` sampled at 1 kHz. Slow drift is removed
//! with a zero-phase 5th-order Butterworth high-pass at 1 Hz, the result is
//! decimated by three and z-scored per channel.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use supervene_core::math::{is_degenerate, mean_std, standardize};
use supervene_core::{decimate, ButterworthHighpass, Ddof};
use tracing::{debug, info, warn};

use super::open_source;
use crate::error::{DatasetError, DatasetResult};
use crate::mat::NumericArray;

/// Number of recorded channels
pub const ECOG_CHANNELS: usize = 64;

/// File name of a 1-based channel
#[must_use]
pub fn channel_file(channel: usize) -> String {
    format!("ECoG_ch{channel}.mat")
}

/// Variable name inside a 1-based channel file
#[must_use]
pub fn channel_variable(channel: usize) -> String {
    format!("ECoGData_ch{channel}")
}

/// Path of a 1-based channel file under `dir`
#[must_use]
pub fn channel_path(dir: &Path, channel: usize) -> PathBuf {
    dir.join(channel_file(channel))
}

/// ECoG cleanup parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcogPreprocessing {
    /// Number of channel files to read (`ECoG_ch1` .. `ECoG_ch{n}`)
    pub channels: usize,
    /// Sampling rate of the raw recording in Hz
    pub sample_rate_hz: f64,
    /// High-pass cutoff in Hz
    pub highpass_hz: f64,
    /// Butterworth order
    pub filter_order: usize,
    /// Keep every n-th sample after filtering
    pub decimation: usize,
}

impl Default for EcogPreprocessing {
    fn default() -> Self {
        Self {
            channels: ECOG_CHANNELS,
            sample_rate_hz: 1000.0,
            highpass_hz: 1.0,
            filter_order: 5,
            decimation: 3,
        }
    }
}

impl EcogPreprocessing {
    /// Design the drift-removal filter.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Core`] for an invalid order or cutoff.
    pub fn filter(&self) -> DatasetResult<ButterworthHighpass> {
        Ok(ButterworthHighpass::new(self.filter_order, self.highpass_hz, self.sample_rate_hz)?)
    }

    /// Filter, decimate and z-score one raw channel.
    ///
    /// Returns the cleaned signal and whether it had enough spread to be
    /// scaled to unit variance. A flat raw channel has nothing above the
    /// cutoff and comes back as zeros.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Core`] if the signal is too short to filter.
    pub fn clean_channel(
        &self,
        filter: &ButterworthHighpass,
        raw: ArrayView1<'_, f64>,
    ) -> DatasetResult<(Array1<f64>, bool)> {
        let filtered = filter.filtfilt(raw)?;
        let (_, raw_std) = mean_std(raw, Ddof::Population);
        if is_degenerate(raw, raw_std) {
            let kept = decimate(filtered.view(), self.decimation)?.len();
            return Ok((Array1::zeros(kept), false));
        }
        let mut decimated = decimate(filtered.view(), self.decimation)?;
        let scaled = standardize(decimated.view_mut(), Ddof::Population);
        Ok((decimated, scaled))
    }

    /// Read and clean every channel under `dir` into a `[T, C]` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::MissingSource`] for the first absent channel
    /// file, [`DatasetError::Mat`] for unreadable ones, and
    /// [`DatasetError::Shape`] if channels differ in length.
    pub fn load(&self, dir: &Path) -> DatasetResult<Array2<f64>> {
        if self.channels == 0 {
            return Err(DatasetError::Config { reason: "ECoG needs at least one channel".into() });
        }
        let filter = self.filter()?;
        info!(dir = %dir.display(), channels = self.channels, "Loading ECoG recording");

        let mut cleaned: Vec<Array1<f64>> = Vec::with_capacity(self.channels);
        for channel in 1..=self.channels {
            let path = channel_path(dir, channel);
            let file = open_source("ECoG", &path)?;
            let raw = file
                .numeric(&channel_variable(channel))
                .and_then(NumericArray::squeeze)
                .map_err(|source| DatasetError::Mat { path: path.clone(), source })?;

            let (signal, scaled) = self.clean_channel(&filter, raw.view())?;
            if !scaled {
                warn!(channel, "ECoG channel is flat; left unscaled");
            }
            debug!(channel, raw = raw.len(), kept = signal.len(), "ECoG channel cleaned");

            if let Some(first) = cleaned.first() {
                if first.len() != signal.len() {
                    return Err(DatasetError::Shape {
                        what: path.display().to_string(),
                        reason: format!(
                            "channel {channel} has {} samples after decimation, channel 1 has {}",
                            signal.len(),
                            first.len()
                        ),
                    });
                }
            }
            cleaned.push(signal);
        }

        let steps = cleaned[0].len();
        Ok(Array2::from_shape_fn((steps, cleaned.len()), |(t, c)| cleaned[c][t]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use approx::assert_abs_diff_eq;

    fn small() -> EcogPreprocessing {
        EcogPreprocessing { channels: 4, ..EcogPreprocessing::default() }
    }

    #[test]
    fn test_clean_channel_length_and_scale() {
        let prep = EcogPreprocessing::default();
        let filter = prep.filter().unwrap();
        let raw = fixtures::ecog_signal(1, 900);
        let (signal, scaled) = prep.clean_channel(&filter, raw.view()).unwrap();

        assert!(scaled);
        assert_eq!(signal.len(), 300);
        let (mean, std) = mean_std(signal.view(), Ddof::Population);
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_decimation_rounds_up() {
        let prep = EcogPreprocessing::default();
        let filter = prep.filter().unwrap();
        let (signal, _) =
            prep.clean_channel(&filter, fixtures::ecog_signal(2, 301).view()).unwrap();
        assert_eq!(signal.len(), 101);
    }

    #[test]
    fn test_load_stacks_channels_as_columns() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_ecog(dir.path(), 4, 300);

        let matrix = small().load(dir.path()).unwrap();
        assert_eq!(matrix.dim(), (100, 4));
        for c in 0..4 {
            let (mean, std) = mean_std(matrix.column(c), Ddof::Population);
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(std, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_constant_channel_becomes_zeros() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_ecog(dir.path(), 4, 300);
        fixtures::write_ecog_channel(dir.path(), 3, &Array1::from_elem(300, 12.5));

        let matrix = small().load(dir.path()).unwrap();
        assert!(matrix.column(2).iter().all(|v| v.abs() < 1e-9));
        assert!(matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_missing_channel_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_ecog(dir.path(), 2, 300);

        let err = small().load(dir.path()).unwrap_err();
        match err {
            DatasetError::MissingSource { dataset, path } => {
                assert_eq!(dataset, "ECoG");
                assert!(path.ends_with("ECoG_ch3.mat"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_mismatched_channel_lengths() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_ecog(dir.path(), 4, 300);
        fixtures::write_ecog_channel(dir.path(), 4, &fixtures::ecog_signal(4, 600));
        assert!(matches!(small().load(dir.path()), Err(DatasetError::Shape { .. })));
    }

    #[test]
    fn test_wrong_variable_name() {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_ecog(dir.path(), 4, 300);
        let mut writer = crate::mat::MatWriter::new();
        writer.numeric("data", NumericArray::column_vector(vec![0.0; 300]));
        writer.write_to(channel_path(dir.path(), 1)).unwrap();
        assert!(matches!(small().load(dir.path()), Err(DatasetError::Mat { .. })));
    }
}
