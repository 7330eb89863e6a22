//! Typed rule-chain engine
//!
//! Each field owns a chain of rules and an optional transform. Every rule in
//! a chain runs, so a field can report several issues at once; the report
//! lists them in declaration order.

use super::outcome::{ErrorCode, FieldError, FieldErrors, ValidationOutcome};
use super::rules;
use super::{Engine, EngineFault};
use crate::state::{FieldName, FormValues};
use async_trait::async_trait;

type Check = Box<dyn Fn(&str) -> bool + Send + Sync>;
type Transform = Box<dyn Fn(&str) -> String + Send + Sync>;

struct Rule {
    code: ErrorCode,
    message: &'static str,
    check: Check,
}

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub field: FieldName,
    pub code: ErrorCode,
    pub message: String,
}

/// Rules and transform for a single field
pub struct FieldChain {
    field: FieldName,
    rules: Vec<Rule>,
    transform: Option<Transform>,
}

impl FieldChain {
    pub fn new(field: FieldName) -> Self {
        Self {
            field,
            rules: Vec::new(),
            transform: None,
        }
    }

    fn rule(mut self, code: ErrorCode, message: &'static str, check: Check) -> Self {
        self.rules.push(Rule {
            code,
            message,
            check,
        });
        self
    }

    pub fn nonempty(self, message: &'static str) -> Self {
        self.rule(ErrorCode::Required, message, Box::new(rules::is_present))
    }

    /// Required after trimming surrounding whitespace
    pub fn nonblank(self, message: &'static str) -> Self {
        self.rule(ErrorCode::Required, message, Box::new(rules::is_present_trimmed))
    }

    pub fn email(self, message: &'static str) -> Self {
        self.rule(ErrorCode::InvalidEmail, message, Box::new(rules::is_email))
    }

    pub fn min_chars(self, min: usize, message: &'static str) -> Self {
        self.rule(
            ErrorCode::TooShort,
            message,
            Box::new(move |v| rules::has_min_chars(v, min)),
        )
    }

    /// Custom predicate reported under `code`
    pub fn refine(
        self,
        code: ErrorCode,
        message: &'static str,
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rule(code, message, Box::new(check))
    }

    /// Applied to the value only when every rule passed
    pub fn transform(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.transform = Some(Box::new(f));
        self
    }

    fn check(&self, value: &str) -> Vec<Issue> {
        self.rules
            .iter()
            .filter(|rule| !(rule.check)(value))
            .map(|rule| Issue {
                field: self.field,
                code: rule.code,
                message: rule.message.to_string(),
            })
            .collect()
    }
}

/// Engine built from field chains
pub struct ChainSchema {
    chains: Vec<FieldChain>,
}

impl ChainSchema {
    pub fn new(chains: Vec<FieldChain>) -> Self {
        Self { chains }
    }

    pub fn create_user() -> Self {
        Self::new(vec![
            FieldChain::new(FieldName::Name)
                .nonblank("O nome é obrigatório")
                .transform(rules::title_case),
            FieldChain::new(FieldName::Email)
                .nonempty("O e-mail é obrigatório")
                .email("Formato de e-mail inválido")
                .refine(
                    ErrorCode::ForeignDomain,
                    "O email precisa ser da NGI (@ngi.com.br)",
                    rules::has_org_domain,
                ),
            FieldChain::new(FieldName::Password)
                .nonempty("A senha é obrigatória")
                .min_chars(
                    rules::MIN_PASSWORD_CHARS,
                    "A senha precisa de no minimo 6 caracteres",
                ),
        ])
    }

    /// Run every chain, returning transformed values or all issues
    pub fn parse(&self, values: &FormValues) -> Result<FormValues, Vec<Issue>> {
        let mut output = values.clone();
        let mut issues = Vec::new();

        for chain in &self.chains {
            let value = values.get(chain.field);
            let found = chain.check(value);
            if found.is_empty() {
                if let Some(transform) = &chain.transform {
                    output.set(chain.field, transform(value));
                }
            } else {
                issues.extend(found);
            }
        }

        if issues.is_empty() {
            Ok(output)
        } else {
            Err(issues)
        }
    }
}

#[async_trait]
impl Engine for ChainSchema {
    type Report = Result<FormValues, Vec<Issue>>;

    fn name(&self) -> &'static str {
        "chain"
    }

    async fn run(&self, values: &FormValues) -> Self::Report {
        self.parse(values)
    }

    fn adapt(&self, report: Self::Report) -> Result<ValidationOutcome, EngineFault> {
        match report {
            Ok(values) => Ok(ValidationOutcome::Valid(values)),
            Err(issues) => {
                let mut errors = FieldErrors::default();
                for issue in issues {
                    errors.insert_first(issue.field, FieldError::new(issue.code, issue.message));
                }
                Ok(ValidationOutcome::Invalid(errors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_email_reports_every_violated_rule() {
        let schema = ChainSchema::create_user();
        let issues = schema
            .parse(&FormValues::new("ana", "", "abcdef"))
            .unwrap_err();
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::Required,
                ErrorCode::InvalidEmail,
                ErrorCode::ForeignDomain
            ]
        );
    }

    #[test]
    fn test_adapt_keeps_first_issue_per_field() {
        let schema = ChainSchema::create_user();
        let report = schema.parse(&FormValues::new("ana", "", "abc"));
        let outcome = schema.adapt(report).unwrap();
        let errors = outcome.errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.message(FieldName::Email),
            Some("O e-mail é obrigatório")
        );
        assert_eq!(
            errors.message(FieldName::Password),
            Some("A senha precisa de no minimo 6 caracteres")
        );
    }

    #[test]
    fn test_transform_skipped_when_field_invalid() {
        let schema = ChainSchema::new(vec![FieldChain::new(FieldName::Name)
            .min_chars(10, "too short")
            .transform(|_| "replaced".to_string())]);
        let issues = schema.parse(&FormValues::new("ana", "", "")).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "too short");
    }

    #[test]
    fn test_transform_applied_when_field_valid() {
        let schema = ChainSchema::new(vec![FieldChain::new(FieldName::Email)
            .transform(|v| v.to_uppercase())]);
        let values = schema.parse(&FormValues::new("", "a@b.c", "")).unwrap();
        assert_eq!(values.email, "A@B.C");
    }

    #[test]
    fn test_fields_without_chain_pass_through() {
        let schema = ChainSchema::new(vec![]);
        let values = FormValues::new("x", "y", "z");
        assert_eq!(schema.parse(&values), Ok(values));
    }
}
