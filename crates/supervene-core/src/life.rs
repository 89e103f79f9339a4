//! Game-of-Life simulator on a torus
//!
//! Standard B3/S23 rule: a dead cell with exactly three live neighbours is
//! born, a live cell with two or three live neighbours survives, every other
//! cell is dead on the next step. Neighbour lookups wrap around both edges.
//!
//! The step never iterates cells one by one: the neighbour count is the sum
//! of the eight toroidally shifted copies of the grid, and the rule is then
//! applied element-wise over the whole grid.

use ndarray::{concatenate, s, Array3, ArrayView2, Axis, Zip};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CoreError, CoreResult};
use crate::types::Grid;

/// Simulation parameters for one or more Game-of-Life runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOfLife {
    grid_size: usize,
    time_steps: usize,
}

impl GameOfLife {
    /// Create a simulator for `grid_size × grid_size` grids producing
    /// `time_steps` snapshots per run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidParameter`] if either value is zero.
    pub fn new(grid_size: usize, time_steps: usize) -> CoreResult<Self> {
        if grid_size == 0 {
            return Err(CoreError::InvalidParameter {
                parameter: "grid_size",
                reason: "grid must have at least one cell".into(),
            });
        }
        if time_steps == 0 {
            return Err(CoreError::InvalidParameter {
                parameter: "time_steps",
                reason: "simulation must record at least one snapshot".into(),
            });
        }
        Ok(Self { grid_size, time_steps })
    }

    /// Side length of the grid
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of recorded snapshots per run
    #[must_use]
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Run one simulation.
    ///
    /// Snapshot 0 is the random initial grid drawn from `seed`; the same
    /// seed always reproduces the same `[T, M, M]` output.
    #[must_use]
    pub fn simulate(&self, seed: u64) -> Array3<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        let initial = random_grid(self.grid_size, &mut rng);
        self.simulate_from(initial)
    }

    /// Run one simulation from a given initial grid.
    ///
    /// # Panics
    ///
    /// Panics if `initial` is not `grid_size × grid_size`.
    #[must_use]
    pub fn simulate_from(&self, initial: Grid) -> Array3<u8> {
        assert_eq!(
            initial.dim(),
            (self.grid_size, self.grid_size),
            "initial grid does not match simulator size"
        );

        let mut history = Array3::<u8>::zeros((self.time_steps, self.grid_size, self.grid_size));
        let mut grid = initial;
        history.slice_mut(s![0, .., ..]).assign(&grid);

        for t in 1..self.time_steps {
            grid = step(grid.view());
            history.slice_mut(s![t, .., ..]).assign(&grid);
        }

        history
    }
}

/// Draw a grid with each cell live with probability one half.
pub fn random_grid<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Grid {
    Grid::from_shape_simple_fn((size, size), || rng.gen_range(0..=1))
}

/// Apply one synchronous B3/S23 update with toroidal boundaries.
#[must_use]
pub fn step(grid: ArrayView2<'_, u8>) -> Grid {
    let counts = neighbour_counts(grid);
    let mut next = Grid::zeros(grid.raw_dim());
    Zip::from(&mut next)
        .and(grid)
        .and(&counts)
        .for_each(|cell, &alive, &count| {
            *cell = u8::from(count == 3 || (alive == 1 && count == 2));
        });
    next
}

/// Number of live neighbours of every cell, computed by shift-and-sum.
#[must_use]
pub fn neighbour_counts(grid: ArrayView2<'_, u8>) -> Grid {
    let up = roll(grid, Axis(0), 1);
    let down = roll(grid, Axis(0), -1);

    let mut counts = Grid::zeros(grid.raw_dim());
    for rows in [up.view(), grid.reborrow(), down.view()] {
        counts += &roll(rows, Axis(1), 1);
        counts += &roll(rows, Axis(1), -1);
    }
    counts += &up;
    counts += &down;
    counts
}

/// Cyclically shift `grid` by `shift` positions along `axis`.
///
/// A positive shift moves content towards higher indices, so the output at
/// `i` holds the input at `i - shift` (mod n).
fn roll(grid: ArrayView2<'_, u8>, axis: Axis, shift: isize) -> Grid {
    let n = grid.len_of(axis);
    if n == 0 {
        return grid.to_owned();
    }
    let n_signed = isize::try_from(n).unwrap_or(isize::MAX);
    let split = usize::try_from((n_signed - shift.rem_euclid(n_signed)) % n_signed).unwrap_or(0);
    if split == 0 {
        return grid.to_owned();
    }
    let head = grid.slice_axis(axis, (split..).into());
    let tail = grid.slice_axis(axis, (..split).into());
    // Both halves share every other axis, so concatenation cannot fail
    concatenate(axis, &[head, tail]).unwrap_or_else(|_| grid.to_owned())
}
