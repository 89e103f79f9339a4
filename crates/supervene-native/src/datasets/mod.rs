//! Dataset adapters
//!
//! Every adapter materializes one `f32` tensor at construction and then only
//! hands out borrowed views of it. The leading axis is the sample index; for
//! paired adapters each sample is a `[2, ...]` slice holding the observations
//! at `t` and `t + 1`.
//!
//! - [`bitstring`]: Correlated bit-string chain
//! - [`ecog`]: 64-channel ECoG recording
//! - [`fmri`]: HCP BOLD timeseries, subject or region selection
//! - [`meg`]: MEG channel recording
//! - [`life`]: Game-of-Life simulations

pub mod bitstring;
pub mod ecog;
pub mod fmri;
pub mod life;
pub mod meg;

pub use bitstring::BitStringDataset;
pub use ecog::EcogDataset;
pub use fmri::{FmriConcatDataset, FmriRegionDataset};
pub use life::{GameOfLifeDataset, GameOfLifeOptions};
pub use meg::MegDataset;

use ndarray::{Array2, ArrayViewD, Axis};
use supervene_core::math::TensorSummary;
use supervene_core::{prepare_pairs, Tensor};
use tracing::info;

use crate::error::{DatasetError, DatasetResult};

/// Random-access view over a materialized tensor.
pub trait Dataset {
    /// Short human-readable adapter name
    fn name(&self) -> &'static str;

    /// The whole backing tensor
    fn tensor(&self) -> &Tensor;

    /// Number of samples
    fn len(&self) -> usize {
        let tensor = self.tensor();
        if tensor.ndim() == 0 {
            0
        } else {
            tensor.len_of(Axis(0))
        }
    }

    /// Whether there are no samples
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow sample `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::IndexOutOfBounds`] if `index >= len()`.
    fn get(&self, index: usize) -> DatasetResult<ArrayViewD<'_, f32>> {
        let len = self.len();
        if index >= len {
            return Err(DatasetError::IndexOutOfBounds { index, len });
        }
        Ok(self.tensor().index_axis(Axis(0), index))
    }

    /// Shape of a single sample
    fn sample_shape(&self) -> &[usize] {
        self.tensor().shape().get(1..).unwrap_or(&[])
    }

    /// Mean and spread over the whole tensor
    fn summary(&self) -> TensorSummary {
        TensorSummary::of(self.tensor())
    }
}

/// Cast a `[T, C]` matrix to the sample tensor, pairing it if asked.
pub(crate) fn matrix_tensor(matrix: &Array2<f64>, prepare: bool) -> DatasetResult<Tensor> {
    #[allow(clippy::cast_possible_truncation)]
    let tensor = matrix.mapv(|v| v as f32).into_dyn();
    if prepare {
        Ok(prepare_pairs(&tensor)?)
    } else {
        Ok(tensor)
    }
}

pub(crate) fn log_built(name: &str, source: &str, tensor: &Tensor) {
    info!(dataset = name, source, shape = ?tensor.shape(), "Dataset ready");
}
