//! HTTP client for the two settings endpoints

use crate::config::RemoteConfig;
use async_trait::async_trait;
use prefs_core::{
    ComplianceRequest, PasswordRequest, RemoteError, RemoteSettingsClient, SaveResponse, SaveStep,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Errors building the client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// reqwest refused the configuration
    #[error("cannot build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Body of a non-2xx response
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// `reqwest`-backed settings client
#[derive(Debug, Clone)]
pub struct HttpSettingsClient {
    config: RemoteConfig,
    http: reqwest::Client,
}

impl HttpSettingsClient {
    /// Create a client for the configured endpoints
    ///
    /// # Errors
    /// - `ClientError::Build` if the HTTP client cannot be initialized
    pub fn new(config: RemoteConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout().min(Duration::from_secs(15)))
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, http })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    async fn post<B>(&self, url: &str, body: &B, step: SaveStep) -> Result<SaveResponse, RemoteError>
    where
        B: Serialize + ?Sized + Sync,
    {
        tracing::debug!(%url, %step, "posting settings");

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .unwrap_or_default()
                .error
                .filter(|m| !m.is_empty());
            tracing::debug!(%status, %step, ?message, "settings endpoint refused request");
            return Err(RemoteError::Rejected { message });
        }

        response.json::<SaveResponse>().await.map_err(classify)
    }
}

/// Map a transport error onto the workflow's taxonomy
fn classify(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        tracing::debug!(error = %err, "no response from settings endpoint");
        RemoteError::NoResponse
    } else {
        RemoteError::Other(err.to_string())
    }
}

#[async_trait]
impl RemoteSettingsClient for HttpSettingsClient {
    async fn save_compliance(
        &self,
        request: &ComplianceRequest,
    ) -> Result<SaveResponse, RemoteError> {
        self.post(&self.config.compliance_url(), request, SaveStep::Compliance)
            .await
    }

    async fn save_password(&self, request: &PasswordRequest) -> Result<SaveResponse, RemoteError> {
        self.post(&self.config.password_url(), request, SaveStep::Password)
            .await
    }
}
