use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed designation a registry field carries on the paper form it digitises.
///
/// The NCRP core forms colour their items: red items are mandatory, blue items are
/// recommended and black items are optional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Mandatory,
    Recommended,
    Optional,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Mandatory,
        Classification::Recommended,
        Classification::Optional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Mandatory => "mandatory",
            Classification::Recommended => "recommended",
            Classification::Optional => "optional",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown classification '{0}' (expected mandatory, recommended or optional)")]
pub struct ClassificationError(pub String);

impl FromStr for Classification {
    type Err = ClassificationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "mandatory" => Ok(Classification::Mandatory),
            "recommended" => Ok(Classification::Recommended),
            "optional" => Ok(Classification::Optional),
            other => Err(ClassificationError(other.to_owned())),
        }
    }
}
