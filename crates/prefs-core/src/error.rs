//! Error types for the settings form
//!
//! Provides error handling for:
//! - Local validation failures (never reach the network)
//! - Remote rejections, transport failures and unknown failures
//! - Configuration loading

use crate::form::FormField;
use std::path::PathBuf;

/// Message shown when no response arrived from the server
pub const NO_RESPONSE_MESSAGE: &str = "No response from server";

/// Local validation failure
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Password does not satisfy the strength policy
    #[error("Password must be at least 8 characters long and contain at least 1 uppercase letter and 1 number.")]
    PasswordTooWeak,

    /// Confirmation differs from the first password
    #[error("Passwords don't match.")]
    PasswordsDontMatch,

    /// No password was entered
    #[error("Please, enter a new password.")]
    PasswordRequired,

    /// Compliance settings enabled without a company name
    #[error("Please, enter your company name.")]
    CompanyNameRequired,
}

impl ValidationError {
    /// Form field whose error slot receives this message
    #[inline]
    #[must_use]
    pub fn field(&self) -> FormField {
        match self {
            Self::PasswordTooWeak | Self::PasswordsDontMatch | Self::PasswordRequired => {
                FormField::Password
            }
            Self::CompanyNameRequired => FormField::Company,
        }
    }
}

/// Remote call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveStep {
    /// Compliance settings save (first call)
    Compliance,
    /// Password save (second call)
    Password,
}

impl SaveStep {
    /// Message used when the server rejects without saying why
    #[inline]
    #[must_use]
    pub fn default_error(&self) -> &'static str {
        match self {
            Self::Compliance => "Error saving GDPR settings",
            Self::Password => "Error saving password",
        }
    }
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliance => write!(f, "compliance settings"),
            Self::Password => write!(f, "password"),
        }
    }
}

/// Failure reported by a remote settings client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Server answered but refused the request
    #[error("rejected by server: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// Server supplied message, if any
        message: Option<String>,
    },

    /// Request was sent but nothing came back (network, timeout)
    #[error("no response from server")]
    NoResponse,

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// Rejection carrying a server message
    #[inline]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }
}

/// Why a submission did not complete
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Blocked locally before any network call
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// One of the two remote calls failed
    #[error("saving {step} failed: {source}")]
    Remote {
        /// Which call failed
        step: SaveStep,
        /// Underlying failure
        source: RemoteError,
    },
}

impl SubmitError {
    /// Normalize to the single string surfaced to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Remote { step, source } => match source {
                RemoteError::Rejected { message: Some(m) } if !m.is_empty() => m.clone(),
                RemoteError::Rejected { .. } => step.default_error().to_string(),
                RemoteError::NoResponse => NO_RESPONSE_MESSAGE.to_string(),
                RemoteError::Other(m) => m.clone(),
            },
        }
    }

    /// Check if the failure happened before any network call
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// IO failure
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but are unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}
