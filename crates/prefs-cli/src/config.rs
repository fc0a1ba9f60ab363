//! Combined configuration file
//!
//! ```toml
//! [form]
//! redirect = "/dashboard"
//!
//! [remote]
//! base_url = "https://app.example.test"
//! ```

use anyhow::Context;
use prefs_core::SettingsConfig;
use prefs_remote::RemoteConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) form: SettingsConfig,
    pub(crate) remote: RemoteConfig,
}

impl AppConfig {
    /// Load from `path`, or defaults when no path is given
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("loading config {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.form.validate()?;
        Ok(config)
    }

    pub(crate) fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
