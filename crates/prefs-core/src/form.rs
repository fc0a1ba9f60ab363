//! Form field values and field-level error messages
//!
//! Pure state transitions, independent of rendering. Every setter touches
//! exactly one field and clears the error slot that field feeds.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Error slot a validation failure is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Password pair
    Password,
    /// Company details
    Company,
}

/// Company identification sent with the compliance settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
    /// Company name (required when compliance is enabled)
    pub name: String,
    /// Contact email
    pub email: String,
    /// Company location
    pub location: String,
}

impl CompanyDetails {
    /// Details with only a name
    #[inline]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Current values of every input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    /// New password
    pub password_first: String,
    /// Password confirmation
    pub password_second: String,
    /// Compliance opt-in
    pub gdpr_enabled: bool,
    /// Company sub-fields
    pub company: CompanyDetails,
}

/// Field-level error messages, empty when clear
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    /// Message under the password pair
    pub password_error: String,
    /// Message under the company fields
    pub company_error: String,
}

impl FormErrors {
    /// Check if any error is showing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.password_error.is_empty() && self.company_error.is_empty()
    }

    /// Clear both slots
    #[inline]
    pub fn clear(&mut self) {
        self.password_error.clear();
        self.company_error.clear();
    }

    /// Record a validation failure in its slot
    pub fn record(&mut self, error: ValidationError) {
        let message = error.to_string();
        match error.field() {
            FormField::Password => self.password_error = message,
            FormField::Company => self.company_error = message,
        }
    }
}

/// Field values plus errors for one form session
#[derive(Debug, Clone)]
pub struct SettingsForm {
    fields: FormFields,
    errors: FormErrors,
    initial_company_name: String,
}

impl SettingsForm {
    /// Create a form with the company name pre-seeded
    pub fn new(initial_company_name: impl Into<String>) -> Self {
        let initial_company_name = initial_company_name.into();
        Self {
            fields: FormFields {
                company: CompanyDetails::named(initial_company_name.clone()),
                ..FormFields::default()
            },
            errors: FormErrors::default(),
            initial_company_name,
        }
    }

    /// Current field values
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Current error messages
    #[inline]
    #[must_use]
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Owned copy of the field values
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> FormFields {
        self.fields.clone()
    }

    pub fn set_password_first(&mut self, value: impl Into<String>) {
        self.fields.password_first = value.into();
        self.errors.password_error.clear();
    }

    pub fn set_password_second(&mut self, value: impl Into<String>) {
        self.fields.password_second = value.into();
        self.errors.password_error.clear();
    }

    pub fn set_gdpr(&mut self, enabled: bool) {
        self.fields.gdpr_enabled = enabled;
        self.errors.company_error.clear();
    }

    #[inline]
    pub fn activate_gdpr(&mut self) {
        self.set_gdpr(true);
    }

    #[inline]
    pub fn disable_gdpr(&mut self) {
        self.set_gdpr(false);
    }

    pub fn set_company_name(&mut self, value: impl Into<String>) {
        self.fields.company.name = value.into();
        self.errors.company_error.clear();
    }

    pub fn set_company_email(&mut self, value: impl Into<String>) {
        self.fields.company.email = value.into();
        self.errors.company_error.clear();
    }

    pub fn set_company_location(&mut self, value: impl Into<String>) {
        self.fields.company.location = value.into();
        self.errors.company_error.clear();
    }

    /// Replace the error slots with a single failure (or none)
    pub(crate) fn apply_validation(&mut self, failure: Option<ValidationError>) {
        self.errors.clear();
        if let Some(err) = failure {
            self.errors.record(err);
        }
    }

    /// Surface an upstream message in a field slot
    pub(crate) fn set_error(&mut self, field: FormField, message: impl Into<String>) {
        let message = message.into();
        match field {
            FormField::Password => self.errors.password_error = message,
            FormField::Company => self.errors.company_error = message,
        }
    }

    /// Restore initial values and clear every error
    pub fn reset(&mut self) {
        self.fields = FormFields {
            company: CompanyDetails::named(self.initial_company_name.clone()),
            ..FormFields::default()
        };
        self.errors.clear();
    }
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::new(String::new())
    }
}
