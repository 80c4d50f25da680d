//! Field-level validation errors shared by event and credential input.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why one input field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Empty or whitespace-only value.
    Blank,
    /// Value does not match the expected shape.
    InvalidFormat { expected: &'static str },
    /// Value is shorter than the allowed minimum.
    TooShort { min_chars: usize },
}

/// Rejected input, naming the first offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub failure: ValidationFailure,
}

impl ValidationError {
    pub fn new(field: &'static str, failure: ValidationFailure) -> Self {
        Self { field, failure }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.failure {
            ValidationFailure::Blank => write!(f, "{} must not be blank", self.field),
            ValidationFailure::InvalidFormat { expected } => {
                write!(f, "{} must match {expected}", self.field)
            }
            ValidationFailure::TooShort { min_chars } => write!(
                f,
                "{} must be at least {min_chars} characters",
                self.field
            ),
        }
    }
}

impl Error for ValidationError {}

/// Rejects empty and whitespace-only values.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, ValidationFailure::Blank));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_non_blank, ValidationError, ValidationFailure};

    #[test]
    fn blank_values_are_rejected_with_field_name() {
        let err = require_non_blank("title", "  \t").unwrap_err();
        assert_eq!(err, ValidationError::new("title", ValidationFailure::Blank));
        assert_eq!(err.to_string(), "title must not be blank");
    }

    #[test]
    fn display_mentions_expected_format_and_minimum() {
        let format = ValidationError::new(
            "date",
            ValidationFailure::InvalidFormat {
                expected: "YYYY-MM-DD",
            },
        );
        assert_eq!(format.to_string(), "date must match YYYY-MM-DD");

        let short = ValidationError::new("password", ValidationFailure::TooShort { min_chars: 6 });
        assert!(short.to_string().contains("at least 6"));
    }
}
