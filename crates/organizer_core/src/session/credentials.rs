//! Sign-in/sign-up input checks run before the provider is contacted.

use crate::model::validation::{require_non_blank, ValidationError, ValidationFailure};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Checks email shape and password length, email first.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    require_non_blank("email", email)?;
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(ValidationError::new(
            "email",
            ValidationFailure::InvalidFormat {
                expected: "an email address",
            },
        ));
    }
    require_non_blank("password", password)?;
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::new(
            "password",
            ValidationFailure::TooShort {
                min_chars: MIN_PASSWORD_CHARS,
            },
        ));
    }
    Ok(())
}
