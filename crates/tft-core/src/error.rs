//! Unified error types for the toolkit
//!
//! [`TftError`] covers the three failure classes of the calculation engines
//! (invalid input, division by zero, arithmetic domain) plus the boundary
//! errors raised while parsing arguments or loading configuration.
//!
//! # Example
//!
//! ```
//! use tft_core::{TftError, TftResult};
//!
//! fn per_unit(value: f64, base: f64) -> TftResult<f64> {
//!     if base == 0.0 {
//!         return Err(TftError::division_by_zero("per-unit base"));
//!     }
//!     Ok(value / base)
//! }
//!
//! assert!(per_unit(1.0, 0.0).is_err());
//! ```

use thiserror::Error;

/// Unified error type for all toolkit operations.
///
/// Engine errors carry the field or computation step that failed so the
/// operator knows which entry to correct.
#[derive(Error, Debug)]
pub enum TftError {
    /// A required numeric field is missing, zero, or outside its range
    #[error("Invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A divisor resolved to zero during computation
    #[error("Division by zero while computing {step}")]
    DivisionByZero { step: &'static str },

    /// NaN, infinity or a negative square root produced during computation
    #[error("Arithmetic domain error while computing {step}: got {value}")]
    ArithmeticDomain { step: &'static str, value: f64 },

    /// Parsing errors (angles, phase orders, CLI values)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (config files, report output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TftError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        TftError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn division_by_zero(step: &'static str) -> Self {
        TftError::DivisionByZero { step }
    }

    pub fn arithmetic_domain(step: &'static str, value: f64) -> Self {
        TftError::ArithmeticDomain { step, value }
    }
}

/// Convenience type alias for Results using TftError.
pub type TftResult<T> = Result<T, TftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_field() {
        let err = TftError::invalid_input("impedance_percent", "must be in (0, 100]");
        let msg = err.to_string();
        assert!(msg.contains("impedance_percent"));
        assert!(msg.contains("(0, 100]"));
    }

    #[test]
    fn test_division_by_zero_names_step() {
        let err = TftError::division_by_zero("voltage_pu");
        assert!(err.to_string().contains("voltage_pu"));
    }

    #[test]
    fn test_domain_error_reports_value() {
        let err = TftError::arithmetic_domain("base_current_a", f64::NAN);
        assert!(err.to_string().contains("NaN"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TftError = io_err.into();
        assert!(matches!(err, TftError::Io(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> TftResult<()> {
            Err(TftError::invalid_input("test_voltage_v", "missing"))
        }

        fn outer() -> TftResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
