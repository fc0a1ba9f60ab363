//! Prefs Remote - HTTP backend for the settings endpoints
//!
//! Implements [`RemoteSettingsClient`] over `reqwest`:
//! - Non-2xx responses become [`RemoteError::Rejected`] with the body's
//!   `error` field when present
//! - Connect failures and timeouts become [`RemoteError::NoResponse`]
//! - Anything else becomes [`RemoteError::Other`] with the raw message

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod config;

pub use client::{ClientError, HttpSettingsClient};
pub use config::{RemoteConfig, DEFAULT_COMPLIANCE_PATH, DEFAULT_PASSWORD_PATH};

#[doc(no_inline)]
pub use prefs_core::{RemoteError, RemoteSettingsClient};
