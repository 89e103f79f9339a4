//! Error types for Supervene Core
//!
//! Generators and transforms fail fast: nothing here is retried and a
//! failed call leaves no partial output behind.

use thiserror::Error;

/// Errors from sequence generation, pairing and signal math.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Sequence has fewer time steps than the operation requires
    #[error("Sequence too short: got {got} time steps, need at least {need}")]
    SequenceTooShort {
        /// Number of time steps received
        got: usize,
        /// Minimum number of time steps
        need: usize,
    },

    /// A probability parameter lies outside `[0, 1]` or is not finite
    #[error("Parameter {parameter} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange {
        /// Parameter name
        parameter: &'static str,
        /// Offending value
        value: f64,
    },

    /// Parameter outside its valid domain
    #[error("Invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: &'static str,
        /// Reason
        reason: String,
    },

    /// Signal shorter than the padding required by zero-phase filtering
    #[error("Signal too short for zero-phase filtering: got {got} samples, need more than {need}")]
    SignalTooShort {
        /// Number of samples received
        got: usize,
        /// Padding length that must be exceeded
        need: usize,
    },

    /// Arrays that must agree in shape do not
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        actual: Vec<usize>,
    },
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Check that `value` is a finite probability.
///
/// # Errors
///
/// Returns [`CoreError::ProbabilityOutOfRange`] when `value` is NaN,
/// infinite, or outside `[0, 1]`.
pub fn check_probability(parameter: &'static str, value: f64) -> CoreResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::ProbabilityOutOfRange { parameter, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_probability_bounds() {
        assert_eq!(check_probability("p", 0.0), Ok(0.0));
        assert_eq!(check_probability("p", 1.0), Ok(1.0));
        assert!(check_probability("p", -0.01).is_err());
        assert!(check_probability("p", 1.5).is_err());
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages_name_the_parameter() {
        let err = check_probability("gamma_parity", 2.0).unwrap_err();
        assert!(err.to_string().contains("gamma_parity"));

        let err = CoreError::SequenceTooShort { got: 1, need: 2 };
        assert_eq!(err.to_string(), "Sequence too short: got 1 time steps, need at least 2");
    }
}
