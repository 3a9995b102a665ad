use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_REGISTRATION_PASSWORD_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// `local@domain.tld` with no whitespace; deliverability is the backend's problem
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn require_email(email: &str) -> Result<(), ApiError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::validation("The email address is not valid."))
    }
}

pub fn require_password_len(password: &str, min: usize) -> Result<(), ApiError> {
    if password.chars().count() < min {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters.",
            min
        )));
    }
    Ok(())
}
