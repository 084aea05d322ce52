//! Constants used throughout the oncoreg core crate.

use crate::Tier;

/// Tier selected when nothing else is configured; the paper-form toggle starts here.
pub const DEFAULT_TIER: Tier = Tier::Mandatory;

/// Environment variable naming the default visibility tier.
pub const DEFAULT_TIER_ENV: &str = "ONCOREG_DEFAULT_TIER";

/// Environment variable naming a YAML definition that replaces the incidence table.
pub const INCIDENCE_DEFINITION_ENV: &str = "ONCOREG_INCIDENCE_DEFINITION";

/// Environment variable naming a YAML definition that replaces the mortality table.
pub const MORTALITY_DEFINITION_ENV: &str = "ONCOREG_MORTALITY_DEFINITION";

/// Upper bound on the size of a definition file read at start-up.
pub const MAX_DEFINITION_BYTES: u64 = 1024 * 1024;

/// Date format accepted for every date field on the core forms.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
