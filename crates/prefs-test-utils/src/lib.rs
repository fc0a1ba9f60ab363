//! Testing utilities for the prefs workspace
//!
//! Shared test doubles and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use prefs_core::{
    ComplianceRequest, Navigator, Notification, Notifier, PasswordRequest, RemoteError,
    RemoteSettingsClient, SaveResponse, SaveStep, SettingsConfig, SettingsSession,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Remote client answering from per-endpoint scripts
///
/// Unscripted calls succeed. A gated client parks every compliance call
/// until [`ScriptedClient::release`] hands out a permit.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    compliance: Mutex<VecDeque<Result<SaveResponse, RemoteError>>>,
    password: Mutex<VecDeque<Result<SaveResponse, RemoteError>>>,
    calls: Mutex<Vec<SaveStep>>,
    compliance_requests: Mutex<Vec<ComplianceRequest>>,
    passwords: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose compliance calls wait for [`ScriptedClient::release`]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn push_compliance(self, result: Result<SaveResponse, RemoteError>) -> Self {
        self.compliance.lock().push_back(result);
        self
    }

    pub fn push_password(self, result: Result<SaveResponse, RemoteError>) -> Self {
        self.password.lock().push_back(result);
        self
    }

    /// Let `n` parked compliance calls proceed
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Endpoints hit, in call order
    pub fn calls(&self) -> Vec<SaveStep> {
        self.calls.lock().clone()
    }

    pub fn compliance_requests(&self) -> Vec<ComplianceRequest> {
        self.compliance_requests.lock().clone()
    }

    pub fn passwords(&self) -> Vec<String> {
        self.passwords.lock().clone()
    }
}

#[async_trait]
impl RemoteSettingsClient for ScriptedClient {
    async fn save_compliance(
        &self,
        request: &ComplianceRequest,
    ) -> Result<SaveResponse, RemoteError> {
        self.calls.lock().push(SaveStep::Compliance);
        self.compliance_requests.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| RemoteError::Other("gate closed".to_string()))?
                .forget();
        }

        let scripted = self.compliance.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(SaveResponse::ok()))
    }

    async fn save_password(&self, request: &PasswordRequest) -> Result<SaveResponse, RemoteError> {
        self.calls.lock().push(SaveStep::Password);
        self.passwords.lock().push(request.password.clone());

        let scripted = self.password.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(SaveResponse::ok()))
    }
}

/// Notifier that keeps every notification
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.seen.lock().iter().map(|n| n.message.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

/// Navigator that keeps every target
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets.lock().push(target.to_string());
    }
}

/// Session wired to recording doubles
pub struct TestSession {
    pub session: SettingsSession,
    pub client: Arc<ScriptedClient>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

/// Start a session around `client`; must run inside a tokio runtime
pub fn setup_session(config: SettingsConfig, client: ScriptedClient) -> TestSession {
    let client = Arc::new(client);
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());

    let session = SettingsSession::start(config, client.clone())
        .expect("valid test config")
        .with_notifier(notifier.clone())
        .with_navigator(navigator.clone());

    TestSession {
        session,
        client,
        notifier,
        navigator,
    }
}

/// Fill both password inputs
pub fn fill_passwords(session: &SettingsSession, first: &str, second: &str) {
    session.edit(|form| {
        form.set_password_first(first);
        form.set_password_second(second);
    });
}

/// A password every policy accepts
pub const STRONG_PASSWORD: &str = "Abcdefg1";
