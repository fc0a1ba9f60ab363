//! Submission workflow for one form session
//!
//! Validates the form, then saves compliance settings and the password in
//! that order. The second call never starts before the first resolves and is
//! skipped when the first fails. A submit issued while a save is in flight is
//! dropped, not queued.

use crate::config::SettingsConfig;
use crate::error::{SaveStep, SubmitError, ValidationError};
use crate::form::{FormErrors, FormField, FormFields, SettingsForm};
use crate::notify::{Navigator, Notification, Notifier, TracingNotifier};
use crate::remote::{ComplianceRequest, PasswordRequest, RemoteSettingsClient};
use crate::tracker::{EngagementSample, EngagementTracker};
use crate::types::SessionId;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Where the workflow currently is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Saving,
    Succeeded,
    Failed,
}

impl SubmitPhase {
    /// Check if a new submit would be accepted
    #[inline]
    #[must_use]
    pub fn accepts_submit(&self) -> bool {
        !matches!(self, Self::Saving)
    }
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Engagement reading taken when the save started
    pub sample: EngagementSample,
    /// Redirect target scheduled after the configured delay
    pub redirect: Option<String>,
}

/// What a submit request led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A save was already in flight; nothing happened
    Ignored,
    /// Both calls succeeded
    Succeeded(SubmitReceipt),
    /// Validation or a remote call failed
    Failed(SubmitError),
}

impl SubmitOutcome {
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&SubmitError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Run the validation rules in order, stopping at the first failure
///
/// 1. password strength (when required)
/// 2. confirmation matches
/// 3. password present
/// 4. company name present when compliance is enabled
pub fn validate_fields(fields: &FormFields, config: &SettingsConfig) -> Result<(), ValidationError> {
    if config.require_strong_password && !config.password_policy.is_strong(&fields.password_first) {
        return Err(ValidationError::PasswordTooWeak);
    }
    if fields.password_first != fields.password_second {
        return Err(ValidationError::PasswordsDontMatch);
    }
    if fields.password_first.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if fields.gdpr_enabled && fields.company.name.is_empty() {
        return Err(ValidationError::CompanyNameRequired);
    }
    Ok(())
}

/// Success message shown with the session metrics
#[must_use]
pub fn success_message(sample: EngagementSample) -> String {
    format!(
        "Password and preferences successfully updated. User session time: {}, engagement: {}%",
        sample.session_time,
        sample.ratio()
    )
}

/// Navigator that ignores every target
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, target: &str) {
        tracing::debug!(%target, "navigation ignored");
    }
}

/// One active settings form
///
/// Owns the form state, the engagement tracker and any pending redirect.
/// Dropping the session (or calling [`SettingsSession::close`]) stops the
/// tracker and cancels the redirect.
pub struct SettingsSession {
    id: SessionId,
    config: SettingsConfig,
    form: Mutex<SettingsForm>,
    phase: Mutex<PhaseState>,
    tracker: EngagementTracker,
    client: Arc<dyn RemoteSettingsClient>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    redirect: Mutex<Option<JoinHandle<()>>>,
}

impl SettingsSession {
    /// Start a session with a fresh tracker
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// - `ConfigError::Invalid` if the configuration is unusable
    pub fn start(
        config: SettingsConfig,
        client: Arc<dyn RemoteSettingsClient>,
    ) -> Result<Self, crate::error::ConfigError> {
        config.validate()?;
        let tracker = EngagementTracker::start(config.tracker);
        Ok(Self::with_tracker(config, tracker, client))
    }

    /// Build a session around an existing tracker
    #[must_use]
    pub fn with_tracker(
        config: SettingsConfig,
        tracker: EngagementTracker,
        client: Arc<dyn RemoteSettingsClient>,
    ) -> Self {
        let id = SessionId::new();
        tracing::info!(session = %id, "settings session started");
        Self {
            id,
            form: Mutex::new(SettingsForm::new(config.initial_company_name.clone())),
            config,
            phase: Mutex::new(PhaseState::default()),
            tracker,
            client,
            notifier: Arc::new(TracingNotifier),
            navigator: Arc::new(NoopNavigator),
            redirect: Mutex::new(None),
        }
    }

    /// With notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// With navigator
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SettingsConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &EngagementTracker {
        &self.tracker
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.phase.lock().phase
    }

    #[inline]
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.phase() == SubmitPhase::Saving
    }

    /// Mutate the form through a closure
    pub fn edit<R>(&self, f: impl FnOnce(&mut SettingsForm) -> R) -> R {
        f(&mut *self.form.lock())
    }

    #[must_use]
    pub fn fields(&self) -> FormFields {
        self.form.lock().snapshot()
    }

    #[must_use]
    pub fn errors(&self) -> FormErrors {
        self.form.lock().errors().clone()
    }

    /// Restore initial field values, clear errors and return to idle
    ///
    /// Allowed at any time, including while a save is in flight. A save
    /// started before the reset still reports its outcome but no longer
    /// touches the phase or the form.
    pub fn reset(&self) {
        let mut state = self.phase.lock();
        self.form.lock().reset();
        state.generation = state.generation.wrapping_add(1);
        state.phase = SubmitPhase::Idle;
        tracing::debug!(session = %self.id, "form reset");
    }

    /// Submit the form
    pub async fn submit(&self) -> SubmitOutcome {
        let span = tracing::info_span!("submit", session = %self.id);
        self.run_submit().instrument(span).await
    }

    async fn run_submit(&self) -> SubmitOutcome {
        let (fields, generation) = match self.begin() {
            Begin::Busy => {
                tracing::warn!("submit ignored, save already in flight");
                return SubmitOutcome::Ignored;
            }
            Begin::Invalid(err) => {
                tracing::warn!(rule = ?err, "validation rejected submission");
                self.notifier.notify(Notification::error(err.to_string()));
                return SubmitOutcome::Failed(SubmitError::Validation(err));
            }
            Begin::Ready { fields, generation } => (fields, generation),
        };
        let in_flight = InFlight {
            session: self,
            generation,
            armed: true,
        };

        let sample = self.tracker.sample();
        tracing::info!(
            gdpr = fields.gdpr_enabled,
            session_time = sample.session_time,
            engagement = sample.ratio(),
            "saving settings"
        );

        match self.save(&fields, sample).await {
            Ok(()) => {
                if !in_flight.finish(SubmitPhase::Succeeded, None) {
                    tracing::debug!("form was reset while saving");
                }
                tracing::info!("settings saved");
                self.notifier.notify(Notification::success(success_message(sample)));
                let redirect = self.schedule_redirect();
                SubmitOutcome::Succeeded(SubmitReceipt { sample, redirect })
            }
            Err(err) => {
                let message = err.user_message();
                tracing::info!(error = %err, "saving settings failed");
                let field_error = match &err {
                    SubmitError::Remote { step, .. } => {
                        let field = match step {
                            SaveStep::Compliance => FormField::Company,
                            SaveStep::Password => FormField::Password,
                        };
                        Some((field, message.clone()))
                    }
                    SubmitError::Validation(_) => None,
                };
                if !in_flight.finish(SubmitPhase::Failed, field_error) {
                    tracing::debug!("form was reset while saving");
                }
                self.notifier.notify(Notification::error(message));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Guard, validate and enter `Saving` without yielding
    fn begin(&self) -> Begin {
        let mut state = self.phase.lock();
        if !state.phase.accepts_submit() {
            return Begin::Busy;
        }
        state.generation = state.generation.wrapping_add(1);
        state.phase = SubmitPhase::Validating;

        let mut form = self.form.lock();
        let fields = form.snapshot();
        let verdict = validate_fields(&fields, &self.config);
        form.apply_validation(verdict.err());

        match verdict {
            Ok(()) => {
                state.phase = SubmitPhase::Saving;
                Begin::Ready {
                    fields,
                    generation: state.generation,
                }
            }
            Err(err) => {
                state.phase = SubmitPhase::Failed;
                Begin::Invalid(err)
            }
        }
    }

    /// Record where a save ended, unless a reset or a newer submit owns the
    /// phase by now. Returns `false` when the outcome was discarded.
    fn settle(
        &self,
        generation: u64,
        phase: SubmitPhase,
        field_error: Option<(FormField, String)>,
    ) -> bool {
        let mut state = self.phase.lock();
        if state.generation != generation {
            return false;
        }
        if let Some((field, message)) = field_error {
            self.form.lock().set_error(field, message);
        }
        state.phase = phase;
        true
    }

    async fn save(&self, fields: &FormFields, sample: EngagementSample) -> Result<(), SubmitError> {
        let engagement = self.config.report_engagement.then_some(sample);
        let compliance =
            ComplianceRequest::from_fields(fields, self.config.company_shape, engagement);

        self.client
            .save_compliance(&compliance)
            .await
            .and_then(|response| response.into_result(SaveStep::Compliance))
            .map_err(|source| SubmitError::Remote {
                step: SaveStep::Compliance,
                source,
            })?;
        tracing::debug!("compliance settings saved");

        let password = PasswordRequest::new(fields.password_first.clone());
        self.client
            .save_password(&password)
            .await
            .and_then(|response| response.into_result(SaveStep::Password))
            .map_err(|source| SubmitError::Remote {
                step: SaveStep::Password,
                source,
            })?;
        tracing::debug!("password saved");

        Ok(())
    }

    fn schedule_redirect(&self) -> Option<String> {
        let target = self.config.redirect.clone().filter(|t| !t.is_empty())?;
        let delay = self.config.redirect_delay();
        let navigator = Arc::clone(&self.navigator);
        let scheduled = target.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(target = %scheduled, "redirecting");
            navigator.navigate(&scheduled);
        });

        if let Some(previous) = self.redirect.lock().replace(handle) {
            previous.abort();
        }
        tracing::debug!(%target, delay_secs = delay.as_secs(), "redirect scheduled");
        Some(target)
    }

    /// Check if a redirect is scheduled but has not fired
    #[must_use]
    pub fn redirect_pending(&self) -> bool {
        self.redirect
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the scheduled redirect, if any
    ///
    /// Returns `true` when navigation happened.
    pub async fn wait_for_redirect(&self) -> bool {
        let handle = self.redirect.lock().take();
        match handle {
            Some(handle) => handle.await.is_ok(),
            None => false,
        }
    }

    /// End the session: stop tracking and cancel any pending redirect
    pub fn close(&self) {
        self.tracker.stop();
        if let Some(handle) = self.redirect.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for SettingsSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SettingsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsSession")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct PhaseState {
    phase: SubmitPhase,
    /// Bumped by every accepted submit and every reset
    generation: u64,
}

enum Begin {
    Busy,
    Invalid(ValidationError),
    Ready { fields: FormFields, generation: u64 },
}

/// Held across the remote calls; releases `Saving` if the submit future is
/// dropped before it settles
struct InFlight<'a> {
    session: &'a SettingsSession,
    generation: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn finish(mut self, phase: SubmitPhase, field_error: Option<(FormField, String)>) -> bool {
        self.armed = false;
        self.session.settle(self.generation, phase, field_error)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && self.session.settle(self.generation, SubmitPhase::Idle, None) {
            tracing::warn!(session = %self.session.id, "submit abandoned while saving");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::remote::{MockRemoteSettingsClient, SaveResponse};
    use crate::tracker::TrackerConfig;
    use mockall::Sequence;
    use std::time::Duration;

    fn session(config: SettingsConfig, client: MockRemoteSettingsClient) -> SettingsSession {
        SettingsSession::start(config, Arc::new(client)).unwrap()
    }

    fn fill(session: &SettingsSession, first: &str, second: &str) {
        session.edit(|form| {
            form.set_password_first(first);
            form.set_password_second(second);
        });
    }

    fn untouched_client() -> MockRemoteSettingsClient {
        let mut client = MockRemoteSettingsClient::new();
        client.expect_save_compliance().never();
        client.expect_save_password().never();
        client
    }

    #[test]
    fn rule_order_is_fixed() {
        let config = SettingsConfig::default();
        let mut fields = FormFields {
            password_first: "weak".into(),
            password_second: "other".into(),
            gdpr_enabled: true,
            ..FormFields::default()
        };
        assert_eq!(validate_fields(&fields, &config), Err(ValidationError::PasswordTooWeak));

        fields.password_first = "Abcdefg1".into();
        assert_eq!(validate_fields(&fields, &config), Err(ValidationError::PasswordsDontMatch));

        fields.password_second = "Abcdefg1".into();
        assert_eq!(validate_fields(&fields, &config), Err(ValidationError::CompanyNameRequired));

        fields.company.name = "Acme".into();
        assert_eq!(validate_fields(&fields, &config), Ok(()));
    }

    #[test]
    fn empty_password_reachable_without_strength_rule() {
        let config = SettingsConfig::default().with_strong_password_required(false);
        let fields = FormFields::default();
        assert_eq!(validate_fields(&fields, &config), Err(ValidationError::PasswordRequired));

        let strict = SettingsConfig::default();
        assert_eq!(validate_fields(&fields, &strict), Err(ValidationError::PasswordTooWeak));
    }

    #[test]
    fn whitespace_company_name_counts_as_present() {
        let config = SettingsConfig::default();
        let mut fields = FormFields {
            password_first: "Abcdefg1".into(),
            password_second: "Abcdefg1".into(),
            gdpr_enabled: true,
            ..FormFields::default()
        };
        assert_eq!(validate_fields(&fields, &config), Err(ValidationError::CompanyNameRequired));

        fields.company.name = " ".into();
        assert_eq!(validate_fields(&fields, &config), Ok(()));
    }

    #[test]
    fn success_message_includes_metrics() {
        let sample = EngagementSample {
            session_time: 20,
            engagement_time: 15,
        };
        assert_eq!(
            success_message(sample),
            "Password and preferences successfully updated. User session time: 20, engagement: 75%"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn mismatched_passwords_never_reach_network() {
        let session = session(SettingsConfig::default(), untouched_client());
        fill(&session, "Abcdefg1", "Abcdefg2");

        let outcome = session.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(SubmitError::Validation(ValidationError::PasswordsDontMatch))
        );
        assert_eq!(session.phase(), SubmitPhase::Failed);
        assert_eq!(session.errors().password_error, "Passwords don't match.");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_company_name_never_reaches_network() {
        let session = session(SettingsConfig::default(), untouched_client());
        fill(&session, "Abcdefg1", "Abcdefg1");
        session.edit(SettingsForm::activate_gdpr);

        let outcome = session.submit().await;

        assert_eq!(
            outcome.error(),
            Some(&SubmitError::Validation(ValidationError::CompanyNameRequired))
        );
        assert_eq!(session.errors().company_error, "Please, enter your company name.");
        assert!(session.errors().password_error.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn successful_submit_calls_in_order() {
        let mut client = MockRemoteSettingsClient::new();
        let mut seq = Sequence::new();
        client
            .expect_save_compliance()
            .withf(|req| !req.gdpr && req.session_time == Some(3) && req.engagement == Some(100))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(SaveResponse::ok()));
        client
            .expect_save_password()
            .withf(|req| req.password == "Abcdefg1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(SaveResponse::ok()));

        let config = SettingsConfig::default().with_redirect("/dashboard");
        let session = session(config, client);
        fill(&session, "Abcdefg1", "Abcdefg1");

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let outcome = session.submit().await;

        let receipt = match outcome {
            SubmitOutcome::Succeeded(receipt) => receipt,
            other => panic!("expected success, got {other:?}"),
        };
        assert_eq!(receipt.redirect.as_deref(), Some("/dashboard"));
        assert_eq!(session.phase(), SubmitPhase::Succeeded);
        assert!(session.errors().is_empty());
        assert!(session.redirect_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn compliance_rejection_skips_password_save() {
        let mut client = MockRemoteSettingsClient::new();
        client
            .expect_save_compliance()
            .times(1)
            .returning(|_| Ok(SaveResponse::rejected("quota exceeded")));
        client.expect_save_password().never();

        let session = session(SettingsConfig::default(), client);
        fill(&session, "Abcdefg1", "Abcdefg1");

        let outcome = session.submit().await;

        assert_eq!(outcome.error().map(SubmitError::user_message).as_deref(), Some("quota exceeded"));
        assert_eq!(session.phase(), SubmitPhase::Failed);
        assert_eq!(session.errors().company_error, "quota exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn password_transport_failure_is_normalized() {
        let mut client = MockRemoteSettingsClient::new();
        client
            .expect_save_compliance()
            .returning(|_| Ok(SaveResponse::ok()));
        client
            .expect_save_password()
            .times(1)
            .returning(|_| Err(RemoteError::NoResponse));

        let session = session(SettingsConfig::default(), client);
        fill(&session, "Abcdefg1", "Abcdefg1");

        let outcome = session.submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(SubmitError::Remote {
                step: SaveStep::Password,
                source: RemoteError::NoResponse,
            })
        );
        assert_eq!(session.errors().password_error, "No response from server");
        assert!(session.phase().accepts_submit());
    }

    #[tokio::test(start_paused = true)]
    async fn engagement_omitted_when_not_reported() {
        let mut client = MockRemoteSettingsClient::new();
        client
            .expect_save_compliance()
            .withf(|req| req.session_time.is_none() && req.engagement.is_none())
            .times(1)
            .returning(|_| Ok(SaveResponse::ok()));
        client
            .expect_save_password()
            .returning(|_| Ok(SaveResponse::ok()));

        let config = SettingsConfig::default().with_engagement_reporting(false);
        let session = session(config, client);
        fill(&session, "Abcdefg1", "Abcdefg1");

        assert!(session.submit().await.is_success());
        assert!(!session.redirect_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_redirect_target_is_not_scheduled() {
        let mut client = MockRemoteSettingsClient::new();
        client
            .expect_save_compliance()
            .returning(|_| Ok(SaveResponse::ok()));
        client
            .expect_save_password()
            .returning(|_| Ok(SaveResponse::ok()));

        let config = SettingsConfig::from_toml_str("redirect = \"\"").unwrap();
        let session = session(config, client);
        fill(&session, "Abcdefg1", "Abcdefg1");

        let receipt = match session.submit().await {
            SubmitOutcome::Succeeded(receipt) => receipt,
            other => panic!("expected success, got {other:?}"),
        };
        assert_eq!(receipt.redirect, None);
        assert!(!session.redirect_pending());
        assert!(!session.wait_for_redirect().await);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_idle() {
        let config = SettingsConfig::default()
            .with_initial_company_name("Acme")
            .with_tracker(TrackerConfig {
                tick_millis: 1000,
                initially_focused: false,
            });
        let session = session(config, untouched_client());
        fill(&session, "Abcdefg1", "nope");
        session.edit(|form| form.set_company_name("Other"));

        assert!(!session.submit().await.is_success());
        session.reset();

        assert_eq!(session.phase(), SubmitPhase::Idle);
        assert!(session.errors().is_empty());
        assert_eq!(session.fields().company.name, "Acme");
        assert!(session.fields().password_first.is_empty());
    }
}
