//! Engine-independent validation results

use crate::state::{FieldName, FormValues};
use std::collections::BTreeMap;

/// Message shown on every field when an engine could not produce a verdict
pub const ENGINE_FAULT_MESSAGE: &str = "Não foi possível validar o formulário";

/// Identifier of the constraint that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Required,
    InvalidEmail,
    ForeignDomain,
    TooShort,
    /// A custom pattern did not match
    Pattern,
    EngineFault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub code: ErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Per-field errors; an absent key means the field passed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FieldName, FieldError>);

impl FieldErrors {
    /// Record an error unless the field already has one.
    ///
    /// Engines report violations in declaration order, so keeping the first
    /// entry per field keeps the first violated constraint.
    pub fn insert_first(&mut self, field: FieldName, error: FieldError) {
        self.0.entry(field).or_insert(error);
    }

    pub fn get(&self, field: FieldName) -> Option<&FieldError> {
        self.0.get(&field)
    }

    pub fn message(&self, field: FieldName) -> Option<&str> {
        self.get(field).map(|e| e.message.as_str())
    }

    pub fn code(&self, field: FieldName) -> Option<ErrorCode> {
        self.get(field).map(|e| e.code)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &FieldError)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

/// Result of one validation pass; never partially valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(FormValues),
    Invalid(FieldErrors),
}

impl ValidationOutcome {
    /// Synthetic outcome used when an engine faults
    pub fn fault() -> Self {
        let mut errors = FieldErrors::default();
        for field in FieldName::ALL {
            errors.insert_first(
                field,
                FieldError::new(ErrorCode::EngineFault, ENGINE_FAULT_MESSAGE),
            );
        }
        Self::Invalid(errors)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    #[cfg(test)]
    pub fn values(&self) -> Option<&FormValues> {
        match self {
            Self::Valid(values) => Some(values),
            Self::Invalid(_) => None,
        }
    }
}
