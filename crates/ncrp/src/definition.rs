//! Form-definition wire models and translation helpers.
//!
//! A form definition is a YAML mapping:
//!
//! ```yaml
//! schema_version: 1
//! form: incidence
//! fields:
//!   centreName: mandatory
//!   registrationNumber:
//!     year: mandatory
//!     regNo: mandatory
//!   otherSources[]:
//!     code: optional
//! groups:
//!   - key: fullName
//!     members: [fullName.first, fullName.second, fullName.last]
//!     message: At least one name of the patient is required
//! ```
//!
//! Notes:
//! - a key ending in `[]` declares a repeated group; it must map to nested fields
//! - leaves are `mandatory`, `recommended` or `optional`

use crate::{NcrpError, NcrpResult};
use oncoreg_types::{validate_segment_name, Classification, FieldPath, NonEmptyText};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The only wire schema version this crate reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

const REPEATED_SUFFIX: &str = "[]";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Domain-level carrier for a parsed form definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormDefinitionData {
    /// Form identifier, for example `incidence` or `mortality`.
    pub form: String,

    /// Top-level fields and groups of the classification tree.
    pub fields: BTreeMap<String, ClassificationNode>,

    /// "At least one of" groups.
    pub groups: Vec<GroupRule>,
}

/// A node of the classification tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassificationNode {
    Field(Classification),
    Group(BTreeMap<String, ClassificationNode>),
    /// A group that repeats; the children describe one item.
    Repeated(BTreeMap<String, ClassificationNode>),
}

/// A set of sibling fields that is satisfied when any member holds a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRule {
    /// Key the group's error is reported under, for example `fullName`.
    pub key: FieldPath,
    pub members: Vec<FieldPath>,
    pub message: NonEmptyText,
}

// ============================================================================
// Public FormDefinition operations
// ============================================================================

/// Form-definition operations.
///
/// Zero-sized type used for namespacing; all methods are associated functions.
pub struct FormDefinition;

impl FormDefinition {
    /// Parse a form definition from YAML text.
    ///
    /// Uses `serde_path_to_error` so a schema mismatch names the failing key
    /// (e.g. `fields.centreName`).
    ///
    /// # Errors
    ///
    /// Returns [`NcrpError::Translation`] if the YAML does not match the wire schema, the
    /// schema version is unsupported, a field name is invalid, a repeated group maps to a
    /// leaf, or a group rule is malformed.
    pub fn parse(yaml_text: &str) -> NcrpResult<FormDefinitionData> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, FormDefinitionWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(NcrpError::Translation(format!(
                    "Form definition schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_domain(wire)
    }

    /// Render a form definition as YAML text.
    pub fn render(data: &FormDefinitionData) -> NcrpResult<String> {
        let wire = domain_to_wire(data)?;
        serde_yaml::to_string(&wire).map_err(|e| {
            NcrpError::Translation(format!("Failed to serialize form definition: {e}"))
        })
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormDefinitionWire {
    schema_version: u32,
    form: String,
    fields: BTreeMap<String, NodeWire>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<GroupRuleWire>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum NodeWire {
    Leaf(Classification),
    Group(BTreeMap<String, NodeWire>),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupRuleWire {
    key: String,
    members: Vec<String>,
    message: NonEmptyText,
}

// ============================================================================
// Translation helpers
// ============================================================================

fn wire_to_domain(wire: FormDefinitionWire) -> NcrpResult<FormDefinitionData> {
    if wire.schema_version != SCHEMA_VERSION {
        return Err(NcrpError::Translation(format!(
            "unsupported schema_version {} (expected {SCHEMA_VERSION})",
            wire.schema_version
        )));
    }

    let form = wire.form.trim();
    if form.is_empty() {
        return Err(NcrpError::Translation("form cannot be empty".into()));
    }

    let fields = nodes_to_domain(wire.fields, "fields")?;
    if fields.is_empty() {
        return Err(NcrpError::Translation("fields cannot be empty".into()));
    }

    let groups = wire
        .groups
        .into_iter()
        .enumerate()
        .map(|(position, group)| group_to_domain(group, position))
        .collect::<NcrpResult<Vec<_>>>()?;

    Ok(FormDefinitionData {
        form: form.to_owned(),
        fields,
        groups,
    })
}

fn nodes_to_domain(
    nodes: BTreeMap<String, NodeWire>,
    parent: &str,
) -> NcrpResult<BTreeMap<String, ClassificationNode>> {
    let mut out = BTreeMap::new();

    for (key, node) in nodes {
        let location = format!("{parent}.{key}");
        let (name, repeated) = match key.strip_suffix(REPEATED_SUFFIX) {
            Some(name) => (name, true),
            None => (key.as_str(), false),
        };
        validate_segment_name(name).map_err(|e| {
            NcrpError::Translation(format!("invalid field name at {location}: {e}"))
        })?;

        let domain = match (node, repeated) {
            (NodeWire::Leaf(classification), false) => ClassificationNode::Field(classification),
            (NodeWire::Leaf(_), true) => {
                return Err(NcrpError::Translation(format!(
                    "repeated group at {location} must map to nested fields"
                )))
            }
            (NodeWire::Group(children), repeated) => {
                if children.is_empty() {
                    return Err(NcrpError::Translation(format!(
                        "group at {location} declares no fields"
                    )));
                }
                let children = nodes_to_domain(children, &location)?;
                if repeated {
                    ClassificationNode::Repeated(children)
                } else {
                    ClassificationNode::Group(children)
                }
            }
        };

        if out.insert(name.to_owned(), domain).is_some() {
            return Err(NcrpError::Translation(format!(
                "field '{name}' is declared more than once under {parent}"
            )));
        }
    }

    Ok(out)
}

fn group_to_domain(wire: GroupRuleWire, position: usize) -> NcrpResult<GroupRule> {
    let parse = |text: &str| {
        FieldPath::parse(text).map_err(|e| {
            NcrpError::Translation(format!("groups[{position}]: invalid field path: {e}"))
        })
    };

    if wire.members.is_empty() {
        return Err(NcrpError::Translation(format!(
            "groups[{position}]: members cannot be empty"
        )));
    }

    Ok(GroupRule {
        key: parse(&wire.key)?,
        members: wire
            .members
            .iter()
            .map(|member| parse(member))
            .collect::<NcrpResult<Vec<_>>>()?,
        message: wire.message,
    })
}

fn domain_to_wire(data: &FormDefinitionData) -> NcrpResult<FormDefinitionWire> {
    if data.form.trim().is_empty() {
        return Err(NcrpError::InvalidInput("form cannot be empty".into()));
    }

    Ok(FormDefinitionWire {
        schema_version: SCHEMA_VERSION,
        form: data.form.clone(),
        fields: nodes_to_wire(&data.fields),
        groups: data
            .groups
            .iter()
            .map(|group| GroupRuleWire {
                key: group.key.to_string(),
                members: group.members.iter().map(ToString::to_string).collect(),
                message: group.message.clone(),
            })
            .collect(),
    })
}

fn nodes_to_wire(nodes: &BTreeMap<String, ClassificationNode>) -> BTreeMap<String, NodeWire> {
    nodes
        .iter()
        .map(|(name, node)| match node {
            ClassificationNode::Field(classification) => {
                (name.clone(), NodeWire::Leaf(*classification))
            }
            ClassificationNode::Group(children) => {
                (name.clone(), NodeWire::Group(nodes_to_wire(children)))
            }
            ClassificationNode::Repeated(children) => (
                format!("{name}{REPEATED_SUFFIX}"),
                NodeWire::Group(nodes_to_wire(children)),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"schema_version: 1
form: incidence
fields:
  centreName: mandatory
  registrationNumber:
    year: mandatory
    regNo: mandatory
  otherSources[]:
    code: optional
    date: optional
  fullName:
    first: mandatory
    second: recommended
    last: recommended
groups:
  - key: fullName
    members: [fullName.first, fullName.second, fullName.last]
    message: At least one name of the patient is required
"#;

    #[test]
    fn parses_nested_and_repeated_fields() {
        let data = FormDefinition::parse(SAMPLE).expect("should parse sample");
        assert_eq!(data.form, "incidence");
        assert_eq!(
            data.fields.get("centreName"),
            Some(&ClassificationNode::Field(Classification::Mandatory))
        );

        match data.fields.get("otherSources") {
            Some(ClassificationNode::Repeated(children)) => {
                assert_eq!(
                    children.get("code"),
                    Some(&ClassificationNode::Field(Classification::Optional))
                );
            }
            other => panic!("expected repeated group, got {other:?}"),
        }

        match data.fields.get("registrationNumber") {
            Some(ClassificationNode::Group(children)) => assert_eq!(children.len(), 2),
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn parses_group_rules() {
        let data = FormDefinition::parse(SAMPLE).expect("should parse sample");
        assert_eq!(data.groups.len(), 1);
        let group = &data.groups[0];
        assert_eq!(group.key.to_string(), "fullName");
        assert_eq!(group.members.len(), 3);
        assert_eq!(group.members[1].to_string(), "fullName.second");
        assert_eq!(
            group.message.as_str(),
            "At least one name of the patient is required"
        );
    }

    #[test]
    fn render_then_parse_preserves_the_definition() {
        let data = FormDefinition::parse(SAMPLE).expect("should parse sample");
        let yaml = FormDefinition::render(&data).expect("should render");
        assert!(yaml.contains("otherSources[]"));
        let reparsed = FormDefinition::parse(&yaml).expect("should parse rendered yaml");
        assert_eq!(reparsed, data);
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let input = SAMPLE.replace("form: incidence", "form: incidence\nunexpected_key: 1");
        let err = FormDefinition::parse(&input).expect_err("should reject unknown key");
        match err {
            NcrpError::Translation(msg) => assert!(msg.contains("unexpected_key")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_classification_with_its_path() {
        let input = SAMPLE.replace("centreName: mandatory", "centreName: red");
        let err = FormDefinition::parse(&input).expect_err("should reject unknown value");
        match err {
            NcrpError::Translation(msg) => assert!(msg.contains("centreName"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unsupported_schema_version() {
        let input = SAMPLE.replace("schema_version: 1", "schema_version: 2");
        let err = FormDefinition::parse(&input).expect_err("should reject version");
        match err {
            NcrpError::Translation(msg) => assert!(msg.contains("schema_version 2")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_repeated_leaf() {
        let input = SAMPLE.replace("centreName: mandatory", "centreName[]: mandatory");
        let err = FormDefinition::parse(&input).expect_err("should reject repeated leaf");
        match err {
            NcrpError::Translation(msg) => assert!(msg.contains("fields.centreName[]")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_field_names() {
        let input = SAMPLE.replace("centreName: mandatory", "\"centre name\": mandatory");
        let err = FormDefinition::parse(&input).expect_err("should reject invalid name");
        assert!(matches!(err, NcrpError::Translation(msg) if msg.contains("invalid field name")));
    }

    #[test]
    fn rejects_malformed_group_rules() {
        let bad_member = SAMPLE.replace("fullName.second,", "fullName..second,");
        let err = FormDefinition::parse(&bad_member).expect_err("should reject member");
        assert!(matches!(err, NcrpError::Translation(msg) if msg.contains("groups[0]")));

        let no_members = SAMPLE.replace(
            "members: [fullName.first, fullName.second, fullName.last]",
            "members: []",
        );
        let err = FormDefinition::parse(&no_members).expect_err("should reject empty members");
        assert!(matches!(err, NcrpError::Translation(msg) if msg.contains("cannot be empty")));

        let blank_message = SAMPLE.replace(
            "message: At least one name of the patient is required",
            "message: \"  \"",
        );
        assert!(FormDefinition::parse(&blank_message).is_err());
    }

    #[test]
    fn rejects_empty_field_groups() {
        let input = SAMPLE.replace(
            "  registrationNumber:\n    year: mandatory\n    regNo: mandatory\n",
            "  registrationNumber: {}\n",
        );
        let err = FormDefinition::parse(&input).expect_err("should reject empty group");
        assert!(matches!(err, NcrpError::Translation(msg) if msg.contains("declares no fields")));
    }

    #[test]
    fn render_rejects_blank_form_name() {
        let mut data = FormDefinition::parse(SAMPLE).expect("should parse sample");
        data.form = " ".into();
        assert!(matches!(
            FormDefinition::render(&data),
            Err(NcrpError::InvalidInput(_))
        ));
    }
}
