//! Field classification registry.
//!
//! A [`ClassificationTable`] maps every declared field path of a form to its paper-form
//! [`Classification`]. Tables are built once at start-up and are read-only afterwards, so a
//! single table can be shared by any number of editing sessions.
//!
//! Lookups are fail-closed: a path that is missing, that addresses a group instead of a leaf,
//! or that walks through a leaf is reported as unclassified (`None`), never as an error.

use crate::{FormError, FormResult};
use ncrp::ClassificationNode;
use oncoreg_types::{validate_segment_name, Classification, FieldPath, Segment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Visibility level selected by the data collector.
///
/// Tiers are totally ordered, `Mandatory < Recommended < All`, and each tier shows a superset
/// of the fields shown by the tiers below it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Mandatory,
    Recommended,
    All,
}

impl Tier {
    pub const ORDERED: [Tier; 3] = [Tier::Mandatory, Tier::Recommended, Tier::All];

    /// The lowest tier at which a field of the given classification is shown.
    pub fn of(classification: Classification) -> Tier {
        match classification {
            Classification::Mandatory => Tier::Mandatory,
            Classification::Recommended => Tier::Recommended,
            Classification::Optional => Tier::All,
        }
    }

    /// True when a field of the given classification is shown at this tier.
    pub fn admits(self, classification: Classification) -> bool {
        Tier::of(classification) <= self
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Mandatory => "mandatory",
            Tier::Recommended => "recommended",
            Tier::All => "all",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = FormError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mandatory" => Ok(Tier::Mandatory),
            "recommended" => Ok(Tier::Recommended),
            "all" => Ok(Tier::All),
            other => Err(FormError::InvalidInput(format!(
                "unknown visibility tier '{other}' (expected mandatory, recommended or all)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Leaf(Classification),
    Group(Group),
    Repeated(Group),
}

type Group = BTreeMap<String, Node>;

/// Where a lookup currently stands while walking a path.
enum Cursor<'a> {
    Group(&'a Group),
    Repeated(&'a Group),
    Leaf(Classification),
}

/// Immutable map from field paths to classifications.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationTable {
    root: Group,
}

impl ClassificationTable {
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Returns the declared classification of `path`, or `None` when it is unclassified.
    ///
    /// Both concrete item paths (`otherSources[0].code`) and schema paths
    /// (`otherSources[].code`) resolve through a repeated group.
    pub fn classify(&self, path: &FieldPath) -> Option<Classification> {
        let mut cursor = Cursor::Group(&self.root);

        for segment in path.segments() {
            cursor = match (cursor, segment) {
                (Cursor::Group(children), Segment::Field(name)) => match children.get(name)? {
                    Node::Leaf(classification) => Cursor::Leaf(*classification),
                    Node::Group(group) => Cursor::Group(group),
                    Node::Repeated(item) => Cursor::Repeated(item),
                },
                (Cursor::Repeated(item), Segment::Index(_) | Segment::Each) => Cursor::Group(item),
                _ => return None,
            };
        }

        match cursor {
            Cursor::Leaf(classification) => Some(classification),
            _ => None,
        }
    }

    /// Classifies a raw path string; unparseable paths are unclassified.
    pub fn classify_str(&self, path: &str) -> Option<Classification> {
        FieldPath::parse(path)
            .ok()
            .and_then(|path| self.classify(&path))
    }

    /// Every declared leaf with its schema path, in deterministic (sorted) order.
    pub fn leaves(&self) -> Vec<(FieldPath, Classification)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &mut Vec::new(), &mut out);
        out
    }

    /// Number of declared leaves.
    pub fn len(&self) -> usize {
        self.leaves().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Builds a table from a parsed form-definition tree.
    pub fn from_definition(fields: &BTreeMap<String, ClassificationNode>) -> FormResult<Self> {
        fn convert(nodes: &BTreeMap<String, ClassificationNode>) -> TableBuilder {
            nodes
                .iter()
                .fold(TableBuilder::default(), |builder, (name, node)| match node {
                    ClassificationNode::Field(classification) => {
                        builder.field(name.clone(), *classification)
                    }
                    ClassificationNode::Group(children) => {
                        builder.group(name.clone(), |_| convert(children))
                    }
                    ClassificationNode::Repeated(children) => {
                        builder.repeated(name.clone(), |_| convert(children))
                    }
                })
        }

        convert(fields).build()
    }

    /// Converts the table back into a form-definition tree.
    pub fn to_definition(&self) -> BTreeMap<String, ClassificationNode> {
        fn convert(group: &Group) -> BTreeMap<String, ClassificationNode> {
            group
                .iter()
                .map(|(name, node)| {
                    let node = match node {
                        Node::Leaf(classification) => ClassificationNode::Field(*classification),
                        Node::Group(children) => ClassificationNode::Group(convert(children)),
                        Node::Repeated(item) => ClassificationNode::Repeated(convert(item)),
                    };
                    (name.clone(), node)
                })
                .collect()
        }

        convert(&self.root)
    }
}

fn collect_leaves(
    group: &Group,
    prefix: &mut Vec<Segment>,
    out: &mut Vec<(FieldPath, Classification)>,
) {
    for (name, node) in group {
        prefix.push(Segment::Field(name.clone()));
        match node {
            Node::Leaf(classification) => {
                if let Ok(path) = FieldPath::from_segments(prefix.clone()) {
                    out.push((path, *classification));
                }
            }
            Node::Group(children) => collect_leaves(children, prefix, out),
            Node::Repeated(item) => {
                prefix.push(Segment::Each);
                collect_leaves(item, prefix, out);
                prefix.pop();
            }
        }
        prefix.pop();
    }
}

/// Fallible builder for [`ClassificationTable`].
///
/// Names are validated and duplicates rejected when [`TableBuilder::build`] runs.
#[derive(Default)]
pub struct TableBuilder {
    entries: Vec<(String, Entry)>,
}

enum Entry {
    Leaf(Classification),
    Group(TableBuilder),
    Repeated(TableBuilder),
}

impl TableBuilder {
    pub fn field(mut self, name: impl Into<String>, classification: Classification) -> Self {
        self.entries.push((name.into(), Entry::Leaf(classification)));
        self
    }

    pub fn group(
        mut self,
        name: impl Into<String>,
        build: impl FnOnce(TableBuilder) -> TableBuilder,
    ) -> Self {
        let children = build(TableBuilder::default());
        self.entries.push((name.into(), Entry::Group(children)));
        self
    }

    /// Declares a repeated group; `build` describes the fields of one item.
    pub fn repeated(
        mut self,
        name: impl Into<String>,
        build: impl FnOnce(TableBuilder) -> TableBuilder,
    ) -> Self {
        let item = build(TableBuilder::default());
        self.entries.push((name.into(), Entry::Repeated(item)));
        self
    }

    pub fn build(self) -> FormResult<ClassificationTable> {
        Ok(ClassificationTable {
            root: self.into_group("")?,
        })
    }

    fn into_group(self, prefix: &str) -> FormResult<Group> {
        let mut group = Group::new();

        for (name, entry) in self.entries {
            validate_segment_name(&name)?;
            let location = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };

            let node = match entry {
                Entry::Leaf(classification) => Node::Leaf(classification),
                Entry::Group(children) => Node::Group(non_empty(children, &location)?),
                Entry::Repeated(item) => {
                    Node::Repeated(non_empty(item, &format!("{location}[]"))?)
                }
            };

            if group.insert(name, node).is_some() {
                return Err(FormError::DuplicateField(location));
            }
        }

        Ok(group)
    }
}

fn non_empty(builder: TableBuilder, location: &str) -> FormResult<Group> {
    let group = builder.into_group(location)?;
    if group.is_empty() {
        return Err(FormError::InvalidDeclaration(format!(
            "group '{location}' declares no fields"
        )));
    }
    Ok(group)
}
