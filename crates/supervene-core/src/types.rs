//! Shared tensor aliases
//!
//! Every dataset ends up as a dense `f32` tensor whose leading axis is the
//! sample index. Generators work on `u8` bit arrays and cast at the end.

use ndarray::{Array, Array2, ArrayD, Dimension};

/// Dense, dynamically shaped `f32` tensor handed to the training layer.
pub type Tensor = ArrayD<f32>;

/// One Game-of-Life grid; each cell is `0` (dead) or `1` (live).
pub type Grid = Array2<u8>;

/// Width of a bit-string observation (five parity bits plus the extra bit).
pub const BIT_STRING_WIDTH: usize = 6;

/// Number of bits that take part in the parity coupling.
pub const PARITY_BITS: usize = 5;

/// Cast a binary array to `f32` for numeric consumption.
#[must_use]
pub fn bits_to_f32<D: Dimension>(bits: &Array<u8, D>) -> Array<f32, D> {
    bits.mapv(f32::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_bits_to_f32_preserves_shape() {
        let bits = array![[0u8, 1], [1, 0]];
        let cast = bits_to_f32(&bits);
        assert_eq!(cast, array![[0.0f32, 1.0], [1.0, 0.0]]);
    }
}
