//! Password composition rules applied at signup.
//!
//! Rules are evaluated in a fixed order and the first one violated is
//! reported, so a short password always gets the length message.

use thiserror::Error;

use crate::constants::{
    MIN_PASSWORD_DIGITS, MIN_PASSWORD_LENGTH, MIN_PASSWORD_LETTERS, MIN_PASSWORD_SPECIALS,
    PASSWORD_SPECIAL_CHARS,
};

/// The first composition rule a candidate password fails
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    #[error("Minimum 8 characters required")]
    TooShort,

    #[error("At least 4 letters required")]
    TooFewLetters,

    #[error("Add at least 3 numbers")]
    TooFewDigits,

    #[error("Include at least 1 special character")]
    NoSpecialCharacter,
}

/// Check a candidate password against the composition rules
pub fn check(password: &str) -> Result<(), PasswordPolicyViolation> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyViolation::TooShort);
    }

    let letters = password.chars().filter(|c| c.is_ascii_alphabetic()).count();
    if letters < MIN_PASSWORD_LETTERS {
        return Err(PasswordPolicyViolation::TooFewLetters);
    }

    let digits = password.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < MIN_PASSWORD_DIGITS {
        return Err(PasswordPolicyViolation::TooFewDigits);
    }

    let specials = password
        .chars()
        .filter(|c| PASSWORD_SPECIAL_CHARS.contains(*c))
        .count();
    if specials < MIN_PASSWORD_SPECIALS {
        return Err(PasswordPolicyViolation::NoSpecialCharacter);
    }

    Ok(())
}
