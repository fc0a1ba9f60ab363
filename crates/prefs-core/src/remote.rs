//! Remote settings contract
//!
//! Two endpoints, called in a fixed order after local validation passes:
//! compliance settings first, password second.

use crate::config::CompanyShape;
use crate::error::{RemoteError, SaveStep};
use crate::form::{CompanyDetails, FormFields};
use crate::tracker::EngagementSample;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Company as it travels on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompanyPayload {
    /// Bare company name
    Name(String),
    /// Name, email and location record
    Detailed(CompanyDetails),
}

/// Body of the compliance settings save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRequest {
    /// Compliance opt-in flag
    pub gdpr: bool,
    /// Company identification
    pub company: CompanyPayload,
    /// Session length in ticks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_time: Option<u64>,
    /// Engagement ratio in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<u8>,
    /// Company location, mirrored at the top level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ComplianceRequest {
    /// Build the payload from form values and an optional engagement reading
    #[must_use]
    pub fn from_fields(
        fields: &FormFields,
        shape: CompanyShape,
        engagement: Option<EngagementSample>,
    ) -> Self {
        let (company, location) = match shape {
            CompanyShape::NameOnly => (CompanyPayload::Name(fields.company.name.clone()), None),
            CompanyShape::Detailed => {
                let location = Some(fields.company.location.clone()).filter(|l| !l.is_empty());
                (CompanyPayload::Detailed(fields.company.clone()), location)
            }
        };

        Self {
            gdpr: fields.gdpr_enabled,
            company,
            session_time: engagement.map(|s| s.session_time),
            engagement: engagement.map(|s| s.ratio()),
            location,
        }
    }
}

/// Body of the password save
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRequest {
    /// New password
    pub password: String,
}

impl PasswordRequest {
    #[inline]
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for PasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordRequest")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response shape shared by both endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    /// Whether the server accepted the request
    pub success: bool,
    /// Server message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    /// Accepted response
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Refused response with a message
    #[inline]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }

    /// Treat `success: false` as a rejection
    pub fn into_result(self, step: SaveStep) -> Result<(), RemoteError> {
        if self.success {
            Ok(())
        } else {
            tracing::debug!(%step, error = ?self.error, "server refused request");
            Err(RemoteError::Rejected {
                message: self.error,
            })
        }
    }
}

/// Client for the two settings endpoints
///
/// Implementations report transport problems as [`RemoteError::NoResponse`]
/// and non-success statuses as [`RemoteError::Rejected`]. A decoded body with
/// `success: false` is returned as-is; the workflow decides what it means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteSettingsClient: Send + Sync {
    /// Save the compliance opt-in and company details
    async fn save_compliance(&self, request: &ComplianceRequest)
        -> Result<SaveResponse, RemoteError>;

    /// Save the new password
    async fn save_password(&self, request: &PasswordRequest) -> Result<SaveResponse, RemoteError>;
}
