//! Failure taxonomy for calculator operations.

use thiserror::Error;

/// Marker shown on the display while the engine is latched in the error state.
pub const ERROR_MARKER: &str = "Error";

/// An arithmetic failure raised by an operator or function application.
///
/// These never escape the engine's public operations; they are latched as
/// the error state and rendered as [`ERROR_MARKER`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    /// Division with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// Argument outside the function's domain (negative root, non-positive
    /// logarithm, negative or fractional factorial, NaN result).
    #[error("invalid input")]
    InvalidInput,
    /// Result too large to represent as a finite double.
    #[error("result overflows")]
    Overflow,
}

/// Reject non-finite values so the current input always holds a real number.
pub(crate) fn ensure_finite(value: f64) -> Result<f64, CalcError> {
    if value.is_nan() {
        Err(CalcError::InvalidInput)
    } else if value.is_infinite() {
        Err(CalcError::Overflow)
    } else {
        Ok(value)
    }
}
