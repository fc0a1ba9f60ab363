//! Endpoint configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default compliance settings endpoint
pub const DEFAULT_COMPLIANCE_PATH: &str = "/manage/settings/general/save-gdpr";

/// Default password endpoint
pub const DEFAULT_PASSWORD_PATH: &str = "/manage/settings/general/save-strong-password";

/// Where and how to reach the settings endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Scheme, host and port, without a trailing path
    pub base_url: String,
    /// Compliance settings path
    pub compliance_path: String,
    /// Password path
    pub password_path: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Configuration for a base URL with default paths
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn compliance_url(&self) -> String {
        join(&self.base_url, &self.compliance_path)
    }

    #[must_use]
    pub fn password_url(&self) -> String {
        join(&self.base_url, &self.password_path)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            compliance_path: DEFAULT_COMPLIANCE_PATH.to_string(),
            password_path: DEFAULT_PASSWORD_PATH.to_string(),
            timeout_secs: 30,
        }
    }
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
