//! Prefs Core - password and compliance settings form
//!
//! The logic behind a settings form that:
//! - Validates a new password against a strength policy
//! - Tracks session length and focused (engaged) time
//! - Saves compliance settings, then the password, through a remote client
//! - Surfaces one normalized message per failure and redirects on success
//!
//! # Example
//!
//! ```rust,ignore
//! use prefs_core::{SettingsConfig, SettingsSession};
//! use std::sync::Arc;
//!
//! # async fn example(client: Arc<dyn prefs_core::RemoteSettingsClient>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = SettingsConfig::new().with_redirect("/dashboard");
//! let session = SettingsSession::start(config, client)?;
//!
//! session.edit(|form| {
//!     form.set_password_first("Abcdefg1");
//!     form.set_password_second("Abcdefg1");
//! });
//!
//! let outcome = session.submit().await;
//! println!("saved: {}", outcome.is_success());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod form;
pub mod notify;
pub mod password;
pub mod remote;
pub mod tracker;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use config::{CompanyShape, SettingsConfig, DEFAULT_REDIRECT_DELAY_SECS};
pub use error::{
    ConfigError, RemoteError, SaveStep, SubmitError, ValidationError, NO_RESPONSE_MESSAGE,
};
pub use form::{CompanyDetails, FormErrors, FormField, FormFields, SettingsForm};
pub use notify::{Navigator, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use password::{is_strong, PasswordPolicy, MIN_PASSWORD_LEN};
pub use remote::{
    CompanyPayload, ComplianceRequest, PasswordRequest, RemoteSettingsClient, SaveResponse,
};
pub use tracker::{
    EngagementClock, EngagementSample, EngagementTracker, FocusEvent, FocusState, TrackerConfig,
};
pub use types::SessionId;
pub use workflow::{
    success_message, validate_fields, NoopNavigator, SettingsSession, SubmitOutcome, SubmitPhase,
    SubmitReceipt,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for hosting a settings form
    pub use crate::{
        EngagementSample, FocusEvent, Navigator, Notification, Notifier, RemoteError,
        RemoteSettingsClient, SettingsConfig, SettingsSession, SubmitOutcome, SubmitPhase,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
