//! Form session configuration
//!
//! Every field has a default so a partial (or absent) TOML table is valid.

use crate::error::ConfigError;
use crate::password::PasswordPolicy;
use crate::tracker::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default delay before navigating to the redirect target
pub const DEFAULT_REDIRECT_DELAY_SECS: u64 = 5;

/// How company details are sent to the compliance endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyShape {
    /// Company name as a plain string
    NameOnly,
    /// Name, email and location record
    #[default]
    Detailed,
}

/// Settings form configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Where to go after a successful save, navigated verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Delay before navigating, in seconds
    pub redirect_delay_secs: u64,
    /// Company name the form starts with (and resets to)
    pub initial_company_name: String,
    /// Strength policy for new passwords
    pub password_policy: PasswordPolicy,
    /// Whether the strength rule runs at all
    pub require_strong_password: bool,
    /// Wire shape of the company field
    pub company_shape: CompanyShape,
    /// Whether session metrics are sent with the compliance settings
    pub report_engagement: bool,
    /// Engagement tracker settings
    pub tracker: TrackerConfig,
}

impl SettingsConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject values the workflow cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redirect_delay_secs == 0 {
            return Err(ConfigError::Invalid(
                "redirect_delay_secs must be greater than zero".to_string(),
            ));
        }
        if self.tracker.tick_millis == 0 {
            return Err(ConfigError::Invalid(
                "tracker.tick_millis must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Redirect delay as a duration
    #[inline]
    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_secs(self.redirect_delay_secs)
    }

    /// With redirect target
    #[inline]
    #[must_use]
    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    /// With redirect delay
    #[inline]
    #[must_use]
    pub fn with_redirect_delay_secs(mut self, secs: u64) -> Self {
        self.redirect_delay_secs = secs;
        self
    }

    /// With initial company name
    #[inline]
    #[must_use]
    pub fn with_initial_company_name(mut self, name: impl Into<String>) -> Self {
        self.initial_company_name = name.into();
        self
    }

    /// With password policy
    #[inline]
    #[must_use]
    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    /// With or without the strength rule
    #[inline]
    #[must_use]
    pub fn with_strong_password_required(mut self, required: bool) -> Self {
        self.require_strong_password = required;
        self
    }

    /// With company wire shape
    #[inline]
    #[must_use]
    pub fn with_company_shape(mut self, shape: CompanyShape) -> Self {
        self.company_shape = shape;
        self
    }

    /// With or without session metrics in the payload
    #[inline]
    #[must_use]
    pub fn with_engagement_reporting(mut self, enabled: bool) -> Self {
        self.report_engagement = enabled;
        self
    }

    /// With tracker settings
    #[inline]
    #[must_use]
    pub fn with_tracker(mut self, tracker: TrackerConfig) -> Self {
        self.tracker = tracker;
        self
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            redirect: None,
            redirect_delay_secs: DEFAULT_REDIRECT_DELAY_SECS,
            initial_company_name: String::new(),
            password_policy: PasswordPolicy::default(),
            require_strong_password: true,
            company_shape: CompanyShape::default(),
            report_engagement: true,
            tracker: TrackerConfig::default(),
        }
    }
}
