//! Unified error types for the siting engine
//!
//! [`SitingError`] is the error surfaced at crate boundaries. The engine itself
//! filters bad data rather than failing on it, so the only failures left are
//! rejected cost assumptions and geometry that cannot be set up.
//!
//! # Example
//!
//! ```
//! use siting_core::{LcoeParams, SitingError, SitingResult};
//!
//! fn checked(params: LcoeParams) -> SitingResult<LcoeParams> {
//!     params.validate()?;
//!     Ok(params)
//! }
//!
//! let bad = LcoeParams { target_cf: 1.5, ..LcoeParams::default() };
//! assert!(matches!(checked(bad), Err(SitingError::Validation(_))));
//! ```

use thiserror::Error;

/// Unified error type for siting operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SitingError {
    /// Parameter or data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Tessellation / projection errors
    #[error("Geometry error: {0}")]
    Geometry(String),
}

/// Convenience type alias for Results using SitingError.
pub type SitingResult<T> = Result<T, SitingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SitingError::Validation("target_cf must be within [0, 1]".into());
        assert!(err.to_string().contains("Validation error"));
        assert!(err.to_string().contains("target_cf"));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> SitingResult<()> {
            Err(SitingError::Geometry("empty viewport".into()))
        }

        fn outer() -> SitingResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(SitingError::Geometry(_))));
    }
}
