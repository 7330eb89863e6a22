//! Data-described rule engine over untyped JSON objects
//!
//! Rules come from a [`SchemaDescriptor`], which can be built in code or
//! loaded from JSON. Input is a `serde_json::Value`; a malformed descriptor
//! or a non-object input faults instead of producing a verdict.

use super::outcome::{ErrorCode, FieldError, FieldErrors, ValidationOutcome};
use super::rules;
use super::{Engine, EngineFault};
use crate::state::{FieldName, FormValues};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Failure kind reported in a [`Detail`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    Required,
    Email,
    EndsWith,
    MinChars,
    Pattern,
}

impl From<DetailKind> for ErrorCode {
    fn from(kind: DetailKind) -> Self {
        match kind {
            DetailKind::Required => ErrorCode::Required,
            DetailKind::Email => ErrorCode::InvalidEmail,
            DetailKind::Pattern => ErrorCode::Pattern,
            DetailKind::EndsWith => ErrorCode::ForeignDomain,
            DetailKind::MinChars => ErrorCode::TooShort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleDescriptor {
    Required {
        message: String,
        #[serde(default)]
        trim: bool,
    },
    Email {
        message: String,
    },
    EndsWith {
        suffix: String,
        message: String,
    },
    MinChars {
        min: usize,
        message: String,
    },
    Pattern {
        pattern: String,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    TitleCase,
    Trim,
    Lowercase,
}

impl TransformKind {
    fn apply(&self, value: &str) -> String {
        match self {
            Self::TitleCase => rules::title_case(value),
            Self::Trim => value.trim().to_string(),
            Self::Lowercase => value.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub path: String,
    pub rules: Vec<RuleDescriptor>,
    #[serde(default)]
    pub transform: Option<TransformKind>,
}

/// Declarative form schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaDescriptor {
    pub fn from_json(json: &str) -> Result<Self, EngineFault> {
        serde_json::from_str(json).map_err(|e| EngineFault::MalformedSchema(e.to_string()))
    }

    pub fn create_user() -> Self {
        let required = |path: &str, trim: bool| RuleDescriptor::Required {
            message: format!("\"{path}\" is not allowed to be empty"),
            trim,
        };
        Self {
            fields: vec![
                FieldDescriptor {
                    path: "name".to_string(),
                    rules: vec![required("name", true)],
                    transform: Some(TransformKind::TitleCase),
                },
                FieldDescriptor {
                    path: "email".to_string(),
                    rules: vec![
                        required("email", false),
                        RuleDescriptor::Email {
                            message: "\"email\" must be a valid email".to_string(),
                        },
                        RuleDescriptor::EndsWith {
                            suffix: rules::ORG_DOMAIN_SUFFIX.to_string(),
                            message: "O email precisa ser da NGI (@ngi.com.br)".to_string(),
                        },
                    ],
                    transform: None,
                },
                FieldDescriptor {
                    path: "password".to_string(),
                    rules: vec![
                        required("password", false),
                        RuleDescriptor::MinChars {
                            min: rules::MIN_PASSWORD_CHARS,
                            message: "\"password\" length must be at least 6 characters long"
                                .to_string(),
                        },
                    ],
                    transform: None,
                },
            ],
        }
    }
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub path: Vec<String>,
    pub message: String,
    pub kind: DetailKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    Rejected(Vec<Detail>),
    Fault(EngineFault),
}

pub struct DynamicSchema {
    descriptor: SchemaDescriptor,
}

impl DynamicSchema {
    pub fn new(descriptor: SchemaDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn create_user() -> Self {
        Self::new(SchemaDescriptor::create_user())
    }

    /// Validate an untyped object, returning it with transforms applied
    pub fn validate_value(&self, input: &Value) -> Result<Value, EngineError> {
        let object = input
            .as_object()
            .ok_or(EngineError::Fault(EngineFault::NotAnObject))?;

        let mut output: Map<String, Value> = object.clone();
        let mut details = Vec::new();

        for field in &self.descriptor.fields {
            // Missing or non-string values are treated as empty
            let value = object.get(&field.path).and_then(Value::as_str).unwrap_or("");
            match check_rules(&field.path, &field.rules, value).map_err(EngineError::Fault)? {
                Some(detail) => details.push(detail),
                None => {
                    if let Some(transform) = field.transform {
                        output.insert(field.path.clone(), Value::String(transform.apply(value)));
                    }
                }
            }
        }

        if details.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(EngineError::Rejected(details))
        }
    }
}

/// First failing rule of a field, if any
fn check_rules(
    path: &str,
    field_rules: &[RuleDescriptor],
    value: &str,
) -> Result<Option<Detail>, EngineFault> {
    for rule in field_rules {
        let (passed, kind, message) = match rule {
            RuleDescriptor::Required { message, trim } => {
                let present = if *trim {
                    rules::is_present_trimmed(value)
                } else {
                    rules::is_present(value)
                };
                (present, DetailKind::Required, message)
            }
            RuleDescriptor::Email { message } => (rules::is_email(value), DetailKind::Email, message),
            RuleDescriptor::EndsWith { suffix, message } => {
                (value.ends_with(suffix.as_str()), DetailKind::EndsWith, message)
            }
            RuleDescriptor::MinChars { min, message } => {
                (rules::has_min_chars(value, *min), DetailKind::MinChars, message)
            }
            RuleDescriptor::Pattern { pattern, message } => {
                let regex = Regex::new(pattern).map_err(|e| EngineFault::BadPattern {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
                (regex.is_match(value), DetailKind::Pattern, message)
            }
        };

        if !passed {
            return Ok(Some(Detail {
                path: vec![path.to_string()],
                message: message.clone(),
                kind,
            }));
        }
    }
    Ok(None)
}

#[async_trait]
impl Engine for DynamicSchema {
    type Report = Result<Value, EngineError>;

    fn name(&self) -> &'static str {
        "dynamic"
    }

    async fn run(&self, values: &FormValues) -> Self::Report {
        let input = serde_json::to_value(values)
            .map_err(|e| EngineError::Fault(EngineFault::BadOutput(e.to_string())))?;
        self.validate_value(&input)
    }

    fn adapt(&self, report: Self::Report) -> Result<ValidationOutcome, EngineFault> {
        match report {
            Ok(value) => serde_json::from_value::<FormValues>(value)
                .map(ValidationOutcome::Valid)
                .map_err(|e| EngineFault::BadOutput(e.to_string())),
            Err(EngineError::Fault(fault)) => Err(fault),
            Err(EngineError::Rejected(details)) => {
                let mut errors = FieldErrors::default();
                let mut unknown = Vec::new();
                for detail in details {
                    let path = detail.path.join(".");
                    match FieldName::from_key(&path) {
                        Some(field) => errors.insert_first(
                            field,
                            FieldError::new(detail.kind.into(), detail.message),
                        ),
                        None => {
                            tracing::debug!(path = %path, "dropping detail for unknown field");
                            unknown.push(path);
                        }
                    }
                }
                if errors.is_empty() {
                    return Err(EngineFault::UnknownPaths(unknown));
                }
                Ok(ValidationOutcome::Invalid(errors))
            }
        }
    }
}
