//! Batch pairing transform
//!
//! Every model in the experiments consumes `(x_t, x_{t+1})` pairs. A
//! sequence of shape `[T, ...]` becomes a tensor of shape `[T-1, 2, ...]`
//! whose entry `i` holds observations `i` and `i + 1`.

use ndarray::{
    concatenate, stack, Array, ArrayBase, ArrayD, ArrayView, Axis, Data, Dimension, Slice,
};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{CoreError, CoreResult};

/// Minimum number of time steps needed to form a pair.
pub const MIN_PAIR_STEPS: usize = 2;

/// Build the `[T-1, 2, ...]` tensor of consecutive pairs.
///
/// # Errors
///
/// Returns [`CoreError::SequenceTooShort`] if the sequence has fewer than
/// two time steps (or is zero-dimensional).
pub fn prepare_pairs<A, S, D>(sequence: &ArrayBase<S, D>) -> CoreResult<Array<A, D::Larger>>
where
    A: Clone,
    S: Data<Elem = A>,
    D: Dimension,
{
    let steps = if sequence.ndim() == 0 { 0 } else { sequence.len_of(Axis(0)) };
    if steps < MIN_PAIR_STEPS {
        return Err(CoreError::SequenceTooShort { got: steps, need: MIN_PAIR_STEPS });
    }

    let current = sequence.slice_axis(Axis(0), Slice::from(..steps - 1));
    let next = sequence.slice_axis(Axis(0), Slice::from(1..));

    stack_pair(current, next)
}

/// Stack two equally shaped halves along a new axis 1.
fn stack_pair<A, D>(
    current: ArrayView<'_, A, D>,
    next: ArrayView<'_, A, D>,
) -> CoreResult<Array<A, D::Larger>>
where
    A: Clone,
    D: Dimension,
{
    stack(Axis(1), &[current.view(), next.view()]).map_err(|_| CoreError::ShapeMismatch {
        expected: current.shape().to_vec(),
        actual: next.shape().to_vec(),
    })
}

/// Build consecutive pairs and shuffle their order.
///
/// The `(t, t+1)` coupling inside each pair is kept; only the order of
/// pairs along the leading axis changes.
///
/// # Errors
///
/// Same as [`prepare_pairs`].
pub fn prepare_pairs_shuffled<A, S, D, R>(
    sequence: &ArrayBase<S, D>,
    rng: &mut R,
) -> CoreResult<Array<A, D::Larger>>
where
    A: Clone,
    S: Data<Elem = A>,
    D: Dimension,
    R: Rng + ?Sized,
{
    let pairs = prepare_pairs(sequence)?;
    let mut order: Vec<usize> = (0..pairs.len_of(Axis(0))).collect();
    order.shuffle(rng);
    Ok(pairs.select(Axis(0), &order))
}

/// Concatenate tensors along the sample axis.
///
/// Used to aggregate several runs, channels or subjects into one dataset.
///
/// # Errors
///
/// Returns [`CoreError::InvalidParameter`] for an empty input and
/// [`CoreError::ShapeMismatch`] if the trailing shapes differ.
pub fn concat_sequences<A: Clone>(parts: &[ArrayD<A>]) -> CoreResult<ArrayD<A>> {
    let first = parts.first().ok_or_else(|| CoreError::InvalidParameter {
        parameter: "parts",
        reason: "nothing to concatenate".into(),
    })?;

    if let Some(bad) = parts
        .iter()
        .find(|p| p.ndim() != first.ndim() || p.ndim() == 0 || p.shape()[1..] != first.shape()[1..])
    {
        return Err(CoreError::ShapeMismatch {
            expected: first.shape().to_vec(),
            actual: bad.shape().to_vec(),
        });
    }

    let views: Vec<_> = parts.iter().map(ArrayBase::view).collect();
    concatenate(Axis(0), &views).map_err(|_| CoreError::ShapeMismatch {
        expected: first.shape().to_vec(),
        actual: Vec::new(),
    })
}
