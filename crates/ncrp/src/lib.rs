//! NCRP form-definition wire/boundary support.
//!
//! This crate provides **wire models** and **format/translation helpers** for the YAML files
//! that describe a National Cancer Registry Programme core form:
//! - the per-field classification tree (mandatory / recommended / optional)
//! - "at least one of" field groups
//!
//! This crate focuses on:
//! - strict serialisation/deserialisation (unknown keys are rejected)
//! - translation between the wire structs and domain-level carriers
//!
//! Rule evaluation lives in `oncoreg-core`; this crate knows nothing about tiers, sections or
//! form records.

pub mod definition;

pub use definition::{
    ClassificationNode, FormDefinition, FormDefinitionData, GroupRule, SCHEMA_VERSION,
};

/// Errors returned by the `ncrp` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum NcrpError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with an [`NcrpError`].
pub type NcrpResult<T> = Result<T, NcrpError>;
