//! MEG adapter

use std::path::Path;

use supervene_core::Tensor;

use super::{log_built, matrix_tensor, Dataset};
use crate::error::DatasetResult;
use crate::processing::meg;

/// Standardized MEG channels, paired `[T - 1, 2, C]`.
#[derive(Clone, Debug)]
pub struct MegDataset {
    tensor: Tensor,
}

impl MegDataset {
    /// Load and pair the recording at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DatasetError::MissingSource`] if `path` is absent,
    /// or any decoding, layout or pairing error.
    pub fn new(path: &Path) -> DatasetResult<Self> {
        let matrix = meg::load(path)?;
        let tensor = matrix_tensor(&matrix, true)?;
        log_built("meg", &path.display().to_string(), &tensor);
        Ok(Self { tensor })
    }
}

impl Dataset for MegDataset {
    fn name(&self) -> &'static str {
        "meg"
    }

    fn tensor(&self) -> &Tensor {
        &self.tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatasetError;
    use crate::fixtures;
    use crate::processing::meg::MEG_FILE;

    #[test]
    fn test_paired_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meg").join(MEG_FILE);
        fixtures::write_meg(&path, &fixtures::meg_channels(5, 30));

        let ds = MegDataset::new(&path).unwrap();
        assert_eq!(ds.len(), 29);
        assert_eq!(ds.sample_shape(), &[2, 5]);
        assert!(ds.tensor().iter().all(|v| v.is_finite()));

        let summary = ds.summary();
        assert!(summary.mean.abs() < 0.2);
    }

    #[test]
    fn test_index_out_of_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MEG_FILE);
        fixtures::write_meg(&path, &fixtures::meg_channels(2, 10));
        let ds = MegDataset::new(&path).unwrap();
        assert!(matches!(ds.get(9), Err(DatasetError::IndexOutOfBounds { index: 9, len: 9 })));
    }
}
