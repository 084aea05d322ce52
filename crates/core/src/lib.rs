//! # oncoreg core
//!
//! Rule engine for the NCRP core registration forms (incidence and mortality).
//!
//! This crate decides, for a form record supplied by a rendering layer:
//! - which fields to show at the collector's chosen visibility tier
//! - which conditional branch (urban/rural address, diagnosis method, staging, ...) is active
//! - whether the record is valid for submission
//!
//! All engine operations are pure functions of a [`FormSchema`], a [`Tier`] and a
//! [`FormRecord`]. Schemas are built once at start-up (see [`load_schema`]) and can be shared
//! across threads without locking.
//!
//! **No transport or storage concerns**: persistence, HTTP, authentication and UI rendering
//! live outside this crate.

pub mod classification;
pub mod config;
pub mod constants;
pub mod discriminator;
pub mod error;
mod forms;
pub mod record;
pub mod schema;
pub mod sections;
pub mod validation;
pub mod visibility;

pub use classification::{ClassificationTable, TableBuilder, Tier};
pub use config::{definition_path_from_env_value, load_schema, tier_from_env_value, CoreConfig};
pub use discriminator::{Branch, DiscriminatorKind};
pub use error::{FormError, FormResult};
pub use record::FormRecord;
pub use schema::{FormKind, FormSchema};
pub use sections::{FieldSpec, Section, SectionSet};
pub use validation::{AtLeastOneGroup, FieldFormat, ValidationResult, Validator};
pub use visibility::{is_visible, is_visible_str};
