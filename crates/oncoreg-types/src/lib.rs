//! Validated value types shared across the oncoreg crates.
//!
//! - [`NonEmptyText`]: trimmed text guaranteed to contain something.
//! - [`Classification`]: the paper-form designation of a registry field.
//! - [`FieldPath`]: a parsed, validated address of a (possibly nested) form field.

mod classification;
mod path;
mod text;

pub use classification::{Classification, ClassificationError};
pub use path::{validate_segment_name, FieldPath, PathError, Segment};
pub use text::{NonEmptyText, TextError};
