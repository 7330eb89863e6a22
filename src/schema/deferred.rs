//! Asynchronous rule-set engine
//!
//! Checks are async and may suspend between rules. Fields are checked
//! concurrently; within a field checking stops at the first failure. The
//! report is keyed by field path string.

use super::outcome::{ErrorCode, FieldError, FieldErrors, ValidationOutcome};
use super::rules;
use super::{Engine, EngineFault};
use crate::state::{FieldName, FormValues};
use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub code: ErrorCode,
    pub message: String,
}

/// Violations per field path
pub type DeferredReport = BTreeMap<String, Vec<Violation>>;

/// Messages for the create-user rule set
#[derive(Debug, Clone)]
pub struct Messages {
    pub name_required: &'static str,
    pub email_required: &'static str,
    pub email_invalid: &'static str,
    pub email_domain: &'static str,
    pub password_required: &'static str,
    pub password_short: &'static str,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            name_required: "O nome é obrigatório",
            email_required: "O email é obrigatório",
            email_invalid: "Insira um email inválido",
            email_domain: "O email precisa ser da NGI (@ngi.com.br)",
            password_required: "A senha é obrigatória",
            password_short: "A senha precisa de no minimo 6 caracteres",
        }
    }
}

pub struct DeferredSchema {
    messages: Messages,
}

impl DeferredSchema {
    pub fn create_user() -> Self {
        Self {
            messages: Messages::default(),
        }
    }

    async fn check_name(&self, value: &str) -> Result<String, Violation> {
        tokio::task::yield_now().await;
        if !rules::is_present_trimmed(value) {
            return Err(violation(ErrorCode::Required, self.messages.name_required));
        }
        Ok(rules::title_case(value))
    }

    async fn check_email(&self, value: &str) -> Result<String, Violation> {
        tokio::task::yield_now().await;
        if !rules::is_present(value) {
            return Err(violation(ErrorCode::Required, self.messages.email_required));
        }
        if !rules::is_email(value) {
            return Err(violation(ErrorCode::InvalidEmail, self.messages.email_invalid));
        }
        tokio::task::yield_now().await;
        if !rules::has_org_domain(value) {
            return Err(violation(ErrorCode::ForeignDomain, self.messages.email_domain));
        }
        Ok(value.to_string())
    }

    async fn check_password(&self, value: &str) -> Result<String, Violation> {
        tokio::task::yield_now().await;
        if !rules::is_present(value) {
            return Err(violation(ErrorCode::Required, self.messages.password_required));
        }
        if !rules::has_min_chars(value, rules::MIN_PASSWORD_CHARS) {
            return Err(violation(ErrorCode::TooShort, self.messages.password_short));
        }
        Ok(value.to_string())
    }
}

fn violation(code: ErrorCode, message: &str) -> Violation {
    Violation {
        code,
        message: message.to_string(),
    }
}

#[async_trait]
impl Engine for DeferredSchema {
    type Report = Result<FormValues, DeferredReport>;

    fn name(&self) -> &'static str {
        "deferred"
    }

    async fn run(&self, values: &FormValues) -> Self::Report {
        let (name, email, password) = tokio::join!(
            self.check_name(&values.name),
            self.check_email(&values.email),
            self.check_password(&values.password),
        );

        let mut report = DeferredReport::new();
        let mut output = values.clone();
        for (field, result) in [
            (FieldName::Name, name),
            (FieldName::Email, email),
            (FieldName::Password, password),
        ] {
            match result {
                Ok(value) => output.set(field, value),
                Err(v) => report.entry(field.key().to_string()).or_default().push(v),
            }
        }

        if report.is_empty() {
            Ok(output)
        } else {
            Err(report)
        }
    }

    fn adapt(&self, report: Self::Report) -> Result<ValidationOutcome, EngineFault> {
        let report = match report {
            Ok(values) => return Ok(ValidationOutcome::Valid(values)),
            Err(report) => report,
        };

        let mut errors = FieldErrors::default();
        let mut unknown = Vec::new();
        for (path, violations) in report {
            let Some(field) = FieldName::from_key(&path) else {
                tracing::debug!(path = %path, "dropping violation for unknown field");
                unknown.push(path);
                continue;
            };
            if let Some(first) = violations.into_iter().next() {
                errors.insert_first(field, FieldError::new(first.code, first.message));
            }
        }

        if errors.is_empty() {
            return Err(EngineFault::UnknownPaths(unknown));
        }
        Ok(ValidationOutcome::Invalid(errors))
    }
}
