//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the engine. Environment variables are read by the binary only; the parsers
//! here take the raw values so that request handling never touches process-wide state.

use crate::classification::Tier;
use crate::constants::{DEFAULT_TIER, MAX_DEFINITION_BYTES};
use crate::schema::{FormKind, FormSchema};
use crate::{FormError, FormResult};
use ncrp::FormDefinition;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    default_tier: Tier,
    incidence_definition: Option<PathBuf>,
    mortality_definition: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// Definition overrides must name existing files.
    pub fn new(
        default_tier: Tier,
        incidence_definition: Option<PathBuf>,
        mortality_definition: Option<PathBuf>,
    ) -> FormResult<Self> {
        for path in incidence_definition.iter().chain(&mortality_definition) {
            if !path.is_file() {
                return Err(FormError::InvalidInput(format!(
                    "form definition '{}' is not a file",
                    path.display()
                )));
            }
        }

        Ok(Self {
            default_tier,
            incidence_definition,
            mortality_definition,
        })
    }

    pub fn default_tier(&self) -> Tier {
        self.default_tier
    }

    /// The definition file replacing the built-in table for `kind`, if any.
    pub fn definition_path(&self, kind: FormKind) -> Option<&Path> {
        match kind {
            FormKind::Incidence => self.incidence_definition.as_deref(),
            FormKind::Mortality => self.mortality_definition.as_deref(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_tier: DEFAULT_TIER,
            incidence_definition: None,
            mortality_definition: None,
        }
    }
}

/// Parse the default tier from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_TIER`].
pub fn tier_from_env_value(value: Option<String>) -> FormResult<Tier> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<Tier>()).transpose()?;

    Ok(parsed.unwrap_or(DEFAULT_TIER))
}

/// Parse an optional definition path; empty/whitespace values mean "no override".
pub fn definition_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Build the schema for `kind`, applying the configured definition override.
pub fn load_schema(config: &CoreConfig, kind: FormKind) -> FormResult<FormSchema> {
    let schema = FormSchema::builtin(kind)?;

    let Some(path) = config.definition_path(kind) else {
        tracing::info!(form = %kind, "using built-in form definition");
        return Ok(schema);
    };

    let text = read_definition(path)?;
    let definition = FormDefinition::parse(&text)?;
    let schema = schema.with_definition(&definition)?;
    tracing::info!(
        form = %kind,
        path = %path.display(),
        fields = schema.table().len(),
        "loaded form definition override"
    );
    Ok(schema)
}

fn read_definition(path: &Path) -> FormResult<String> {
    let metadata = std::fs::metadata(path).map_err(FormError::FileRead)?;
    if metadata.len() > MAX_DEFINITION_BYTES {
        return Err(FormError::InvalidInput(format!(
            "form definition '{}' exceeds {MAX_DEFINITION_BYTES} bytes",
            path.display()
        )));
    }
    std::fs::read_to_string(path).map_err(FormError::FileRead)
}
