//! Input rules shared by the use-case services.
//!
//! Each check returns [`Error::Validation`] with a caller-safe message.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Minimum password length, in UTF-8 bytes, accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

/// Checks that `email` is present and well formed. Surrounding whitespace is
/// ignored.
pub fn email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::validation("email is required"));
    }
    if !EMAIL.is_match(email) {
        return Err(Error::validation("invalid email format"));
    }
    Ok(())
}

/// Checks a password chosen at registration.
pub fn new_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::validation("password is required"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Checks that a text field is not blank.
pub fn required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        result.unwrap_err().message().into_owned()
    }

    #[test]
    fn email_rules() {
        assert!(email("a@b.com").is_ok());
        assert!(email("  first.last+tag@sub.example.org ").is_ok());
        assert_eq!(message(email("   ")), "email is required");
        assert_eq!(message(email("a@b")), "invalid email format");
        assert_eq!(message(email("no-at-sign.com")), "invalid email format");
    }

    #[test]
    fn password_rules() {
        assert!(new_password("pass1234").is_ok());
        assert_eq!(message(new_password("")), "password is required");
        assert_eq!(
            message(new_password("short")),
            "password must be at least 8 characters"
        );
    }

    #[test]
    fn password_length_counts_bytes() {
        // Four two-byte characters.
        assert!(new_password("éééé").is_ok());
        assert!(new_password("ééé").is_err());
    }

    #[test]
    fn required_field() {
        assert!(required("Engineer", "job_title").is_ok());
        assert_eq!(message(required(" \t", "job_title")), "job_title is required");
    }
}
