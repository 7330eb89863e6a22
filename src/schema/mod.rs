//! Schema validation engines
//!
//! Every engine speaks its own native report format. [`Validator`] adapts a
//! report into a [`ValidationOutcome`] so controllers only ever see
//! `dyn Schema`:
//! - `chain`: typed rule chains, synchronous, reports every violation
//! - `deferred`: asynchronous per-field checks, string-keyed report
//! - `dynamic`: data-described rules over untyped JSON objects

mod chain;
mod deferred;
mod dynamic;
mod outcome;
pub mod rules;

pub use chain::ChainSchema;
pub use deferred::DeferredSchema;
pub use dynamic::{DynamicSchema, SchemaDescriptor};
pub use outcome::{ErrorCode, FieldErrors, ValidationOutcome};
#[cfg(test)]
pub use outcome::FieldError;

use crate::state::FormValues;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Anything that can turn form values into a validation outcome
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Schema: Send + Sync {
    /// Short engine name for titles and logs
    fn name(&self) -> &'static str;

    /// Validate and transform; never fails
    async fn validate(&self, values: &FormValues) -> ValidationOutcome;
}

/// Failure inside an engine that prevents a verdict
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineFault {
    #[error("schema descriptor is malformed: {0}")]
    MalformedSchema(String),
    #[error("invalid pattern on `{path}`: {reason}")]
    BadPattern { path: String, reason: String },
    #[error("input is not an object")]
    NotAnObject,
    #[error("engine produced an unusable value: {0}")]
    BadOutput(String),
    #[error("engine reported errors only for unknown fields: {0:?}")]
    UnknownPaths(Vec<String>),
}

/// A validation engine together with its report adapter
#[async_trait]
pub trait Engine: Send + Sync {
    /// Native result of one run
    type Report: Send;

    fn name(&self) -> &'static str;

    async fn run(&self, values: &FormValues) -> Self::Report;

    /// Map the native report to an outcome, first error per field
    fn adapt(&self, report: Self::Report) -> Result<ValidationOutcome, EngineFault>;
}

/// Adapts an [`Engine`] to the [`Schema`] seam
pub struct Validator<E> {
    engine: E,
}

impl<E: Engine> Validator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<E: Engine> Schema for Validator<E> {
    fn name(&self) -> &'static str {
        self.engine.name()
    }

    async fn validate(&self, values: &FormValues) -> ValidationOutcome {
        let report = self.engine.run(values).await;
        match self.engine.adapt(report) {
            Ok(outcome) => {
                tracing::debug!(engine = self.engine.name(), valid = outcome.is_valid(), "validated");
                outcome
            }
            Err(fault) => {
                tracing::warn!(engine = self.engine.name(), %fault, "schema engine fault");
                ValidationOutcome::fault()
            }
        }
    }
}

/// Which engine backs a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Chain,
    Deferred,
    Dynamic,
}

impl EngineKind {
    #[cfg(test)]
    pub const ALL: [EngineKind; 3] = [EngineKind::Chain, EngineKind::Deferred, EngineKind::Dynamic];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Chain => "Chain",
            Self::Deferred => "Deferred",
            Self::Dynamic => "Dynamic",
        }
    }

    /// Matches [`Schema::name`] of the built schema
    #[cfg(test)]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::Deferred => "deferred",
            Self::Dynamic => "dynamic",
        }
    }

    /// Build the create-user schema for this engine.
    ///
    /// `descriptor` only applies to the dynamic engine.
    pub fn build(&self, descriptor: Option<SchemaDescriptor>) -> Arc<dyn Schema> {
        match self {
            Self::Chain => Arc::new(Validator::new(ChainSchema::create_user())),
            Self::Deferred => Arc::new(Validator::new(DeferredSchema::create_user())),
            Self::Dynamic => {
                let engine = descriptor
                    .map(DynamicSchema::new)
                    .unwrap_or_else(DynamicSchema::create_user);
                Arc::new(Validator::new(engine))
            }
        }
    }
}
