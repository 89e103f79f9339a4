//! Game-of-Life adapter
//!
//! Runs `num_simulations` independent simulations seeded `0..n`, optionally
//! z-scores every grid on its own, pairs each run separately and joins the
//! runs along the sample axis. Pairs never straddle two runs.

use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};
use supervene_core::math::TensorSummary;
use supervene_core::{
    concat_sequences, prepare_pairs, standardize_columns, Ddof, GameOfLife, Tensor,
};
use tracing::{debug, info, warn};

use super::{log_built, Dataset};
use crate::error::{DatasetError, DatasetResult};

/// Simulation and shaping options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOfLifeOptions {
    /// Pair consecutive snapshots
    pub prepare: bool,
    /// Z-score each grid over its cells
    pub normalize: bool,
    /// Number of runs, seeded `0..num_simulations`
    pub num_simulations: usize,
    /// Snapshots per run
    pub time_steps: usize,
    /// Grid side length
    pub grid_size: usize,
}

impl Default for GameOfLifeOptions {
    fn default() -> Self {
        Self {
            prepare: true,
            normalize: true,
            num_simulations: 5000,
            time_steps: 100,
            grid_size: 15,
        }
    }
}

/// Snapshots of many Game-of-Life runs.
///
/// `[n(T - 1), 2, M, M]` when paired, `[nT, M, M]` otherwise.
#[derive(Clone, Debug)]
pub struct GameOfLifeDataset {
    options: GameOfLifeOptions,
    tensor: Tensor,
}

impl GameOfLifeDataset {
    /// Simulate and shape every run.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Config`] for zero simulations and
    /// [`DatasetError::Core`] for a zero-sized grid, zero steps, or a single
    /// step with pairing on.
    pub fn new(options: GameOfLifeOptions) -> DatasetResult<Self> {
        if options.num_simulations == 0 {
            return Err(DatasetError::Config {
                reason: "num_simulations must be at least 1".into(),
            });
        }
        let simulator = GameOfLife::new(options.grid_size, options.time_steps)?;
        info!(
            runs = options.num_simulations,
            steps = options.time_steps,
            grid = options.grid_size,
            "Simulating Game of Life"
        );

        let mut flat_grids = 0usize;
        let mut runs = Vec::with_capacity(options.num_simulations);
        for seed in 0..options.num_simulations as u64 {
            let history = simulator.simulate(seed).mapv(f64::from);
            let history = if options.normalize {
                let (history, flat) = normalize_grids(history)?;
                flat_grids += flat;
                history
            } else {
                history
            };

            #[allow(clippy::cast_possible_truncation)]
            let run = history.mapv(|v| v as f32).into_dyn();
            runs.push(if options.prepare { prepare_pairs(&run)? } else { run });
        }
        if flat_grids > 0 {
            warn!(flat_grids, "Uniform grids could only be centred");
        }

        let tensor = concat_sequences(&runs)?;
        let first = TensorSummary::of(&tensor.index_axis(Axis(0), 0));
        debug!(mean = first.mean, std = first.std, "First sample statistics");
        log_built("game_of_life", "simulated", &tensor);
        Ok(Self { options, tensor })
    }

    /// The options this dataset was built with
    #[must_use]
    pub fn options(&self) -> &GameOfLifeOptions {
        &self.options
    }
}

impl Dataset for GameOfLifeDataset {
    fn name(&self) -> &'static str {
        "game_of_life"
    }

    fn tensor(&self) -> &Tensor {
        &self.tensor
    }
}

/// Z-score each `[M, M]` grid of a `[T, M, M]` run with the unbiased std.
///
/// Returns the run and how many grids were uniform.
fn normalize_grids(history: Array3<f64>) -> DatasetResult<(Array3<f64>, usize)> {
    let (steps, rows, cols) = history.dim();
    let mut by_grid = history
        .into_shape((steps, rows * cols))
        .map_err(|e| DatasetError::Shape { what: "game_of_life".into(), reason: e.to_string() })?;

    // Columns of the transposed view are the grids
    let flat = standardize_columns(&mut by_grid.view_mut().reversed_axes(), Ddof::Sample);

    let history = by_grid
        .into_shape((steps, rows, cols))
        .map_err(|e| DatasetError::Shape { what: "game_of_life".into(), reason: e.to_string() })?;
    Ok((history, flat.len()))
}
