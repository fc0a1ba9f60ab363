//! Drive one form session from the command line

use crate::config::AppConfig;
use prefs_core::{
    Navigator, Notification, Notifier, SettingsForm, SettingsSession, SubmitOutcome,
    TracingNotifier,
};
use prefs_remote::HttpSettingsClient;
use std::sync::Arc;
use std::time::Duration;

/// Prints notifications and forwards them to the log
#[derive(Debug, Default)]
struct ConsoleNotifier {
    log: TracingNotifier,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        println!("{notification}");
        self.log.notify(notification);
    }
}

#[derive(Debug, Default)]
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, target: &str) {
        println!("redirect: {target}");
    }
}

/// Inputs for one scripted session
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionPlan {
    pub(crate) password: String,
    pub(crate) confirm: String,
    pub(crate) gdpr: bool,
    pub(crate) company_name: Option<String>,
    pub(crate) company_email: Option<String>,
    pub(crate) company_location: Option<String>,
    pub(crate) dwell_secs: u64,
    pub(crate) unfocused_secs: u64,
}

impl SessionPlan {
    /// Type the planned values into the form
    fn fill(&self, form: &mut SettingsForm) {
        form.set_password_first(self.password.as_str());
        form.set_password_second(self.confirm.as_str());
        form.set_gdpr(self.gdpr);
        if let Some(name) = &self.company_name {
            form.set_company_name(name.as_str());
        }
        if let Some(email) = &self.company_email {
            form.set_company_email(email.as_str());
        }
        if let Some(location) = &self.company_location {
            form.set_company_location(location.as_str());
        }
    }
}

/// Run the session; `Ok(true)` when both saves succeeded
pub(crate) async fn run_session(config: AppConfig, plan: SessionPlan) -> anyhow::Result<bool> {
    let client = Arc::new(HttpSettingsClient::new(config.remote)?);
    let session = SettingsSession::start(config.form, client)?
        .with_notifier(Arc::new(ConsoleNotifier::default()))
        .with_navigator(Arc::new(ConsoleNavigator));

    session.edit(|form| plan.fill(form));

    if plan.dwell_secs > 0 {
        session.tracker().focus_gained();
        tokio::time::sleep(Duration::from_secs(plan.dwell_secs)).await;
    }
    if plan.unfocused_secs > 0 {
        session.tracker().focus_lost();
        tokio::time::sleep(Duration::from_secs(plan.unfocused_secs)).await;
        session.tracker().focus_gained();
    }

    let succeeded = match session.submit().await {
        SubmitOutcome::Succeeded(receipt) => {
            if receipt.redirect.is_some() {
                session.wait_for_redirect().await;
            }
            true
        }
        SubmitOutcome::Failed(err) => {
            tracing::debug!(error = %err, "session ended with failure");
            false
        }
        SubmitOutcome::Ignored => false,
    };

    session.close();
    Ok(succeeded)
}
