//! Password strength policy
//!
//! A password is strong when it is at least [`MIN_PASSWORD_LEN`] characters
//! long, contains an ASCII uppercase letter and an ASCII digit, and uses only
//! characters from the policy's allowed class.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum password length, counted in characters
pub const MIN_PASSWORD_LEN: usize = 8;

static ALPHANUMERIC_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{8,}$").expect("static pattern"));

static WITH_SYMBOLS_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[A-Za-z0-9!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]{8,}$"#).expect("static pattern")
});

/// Strength policy applied to new passwords
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordPolicy {
    /// Letters and digits only
    Alphanumeric,
    /// Letters, digits and common punctuation
    #[default]
    WithSymbols,
}

impl PasswordPolicy {
    /// Check a candidate password
    ///
    /// Total: never fails, only answers.
    #[must_use]
    pub fn is_strong(&self, password: &str) -> bool {
        let class = match self {
            Self::Alphanumeric => &*ALPHANUMERIC_CLASS,
            Self::WithSymbols => &*WITH_SYMBOLS_CLASS,
        };

        class.is_match(password)
            && password.chars().any(|c| c.is_ascii_uppercase())
            && password.chars().any(|c| c.is_ascii_digit())
    }

    /// Human-readable requirement text
    #[inline]
    #[must_use]
    pub fn requirements(&self) -> &'static str {
        "Password length must be at least 8 characters containing at least 1 uppercase letter and 1 number."
    }
}

/// Check a password against the default policy
#[inline]
#[must_use]
pub fn is_strong(password: &str) -> bool {
    PasswordPolicy::default().is_strong(password)
}
