//! Typed field paths.
//!
//! A [`FieldPath`] is parsed once from its dotted textual form, e.g.
//! `placeOfResidence.urban.pinCode` or `otherSources[0].hospitalNo`, into a sequence of
//! [`Segment`]s. Repeated groups are addressed explicitly: `[n]` names one concrete item and
//! `[]` names every item of the group (the schema-level form used by classification tables).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// A named member of a group.
    Field(String),
    /// One concrete item of a repeated group.
    Index(usize),
    /// Every item of a repeated group.
    Each,
}

/// Errors produced while parsing or building a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path cannot be empty")]
    Empty,
    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),
    #[error("field path '{path}' has invalid segment '{segment}' (use ASCII letters, digits, '_')")]
    InvalidSegment { path: String, segment: String },
    #[error("field path '{0}' has an unterminated index")]
    UnterminatedIndex(String),
    #[error("field path '{path}' has invalid index '{index}'")]
    InvalidIndex { path: String, index: String },
    #[error("field path '{0}' must start with a field name")]
    LeadingIndex(String),
}

/// Checks that `name` is usable as a single field segment.
pub fn validate_segment_name(name: &str) -> Result<(), PathError> {
    if name.is_empty() {
        return Err(PathError::EmptySegment(name.to_owned()));
    }
    let ok = name
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_'));
    if !ok {
        return Err(PathError::InvalidSegment {
            path: name.to_owned(),
            segment: name.to_owned(),
        });
    }
    Ok(())
}

/// A parsed, validated address of a form field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parses a dotted path such as `registrationNumber.year` or `otherSources[0].date`.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in input.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };

            if name.is_empty() {
                if segments.is_empty() && !rest.is_empty() {
                    return Err(PathError::LeadingIndex(input.to_owned()));
                }
                return Err(PathError::EmptySegment(input.to_owned()));
            }
            validate_segment_name(name).map_err(|_| PathError::InvalidSegment {
                path: input.to_owned(),
                segment: name.to_owned(),
            })?;
            segments.push(Segment::Field(name.to_owned()));

            while !rest.is_empty() {
                if !rest.starts_with('[') {
                    return Err(PathError::InvalidSegment {
                        path: input.to_owned(),
                        segment: part.to_owned(),
                    });
                }
                let close = rest
                    .find(']')
                    .ok_or_else(|| PathError::UnterminatedIndex(input.to_owned()))?;
                let inner = &rest[1..close];
                if inner.is_empty() {
                    segments.push(Segment::Each);
                } else if inner.bytes().all(|b| b.is_ascii_digit()) {
                    let index = inner.parse().map_err(|_| PathError::InvalidIndex {
                        path: input.to_owned(),
                        index: inner.to_owned(),
                    })?;
                    segments.push(Segment::Index(index));
                } else {
                    return Err(PathError::InvalidIndex {
                        path: input.to_owned(),
                        index: inner.to_owned(),
                    });
                }
                rest = &rest[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    /// Builds a path from already separated segments.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, PathError> {
        match segments.first() {
            None => return Err(PathError::Empty),
            Some(Segment::Field(_)) => {}
            Some(_) => {
                return Err(PathError::LeadingIndex(
                    FieldPath {
                        segments: segments.clone(),
                    }
                    .to_string(),
                ))
            }
        }
        for segment in &segments {
            if let Segment::Field(name) = segment {
                validate_segment_name(name)?;
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when the path names one concrete value (no `[]` segments).
    pub fn is_concrete(&self) -> bool {
        !self.segments.contains(&Segment::Each)
    }

    /// The schema-level form of this path: every concrete item index becomes `[]`.
    pub fn to_schema(&self) -> FieldPath {
        let segments = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Index(_) => Segment::Each,
                other => other.clone(),
            })
            .collect();
        FieldPath { segments }
    }

    /// Appends a named member.
    pub fn child(&self, name: &str) -> Result<FieldPath, PathError> {
        validate_segment_name(name)?;
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(name.to_owned()));
        Ok(FieldPath { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Each => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FieldPath::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Segment {
        Segment::Field(name.to_owned())
    }

    #[test]
    fn parses_nested_group_path() {
        let path = FieldPath::parse("placeOfResidence.urban.pinCode").expect("valid path");
        assert_eq!(
            path.segments(),
            &[field("placeOfResidence"), field("urban"), field("pinCode")]
        );
        assert!(path.is_concrete());
    }

    #[test]
    fn parses_repeated_group_items() {
        let item = FieldPath::parse("otherSources[0].hospitalNo").expect("valid path");
        assert_eq!(
            item.segments(),
            &[field("otherSources"), Segment::Index(0), field("hospitalNo")]
        );

        let every = FieldPath::parse("otherSources[].hospitalNo").expect("valid path");
        assert_eq!(
            every.segments(),
            &[field("otherSources"), Segment::Each, field("hospitalNo")]
        );
        assert!(!every.is_concrete());
        assert_eq!(item.to_schema(), every);
    }

    #[test]
    fn renders_back_to_the_parsed_text() {
        for text in [
            "centreName",
            "tnm.t",
            "otherSources[3].date",
            "otherSources[].code",
            "matrix[1][2].cell",
        ] {
            let path = FieldPath::parse(text).expect("valid path");
            assert_eq!(path.to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(FieldPath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            FieldPath::parse("a..b"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            FieldPath::parse("tnm."),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            FieldPath::parse("[0].code"),
            Err(PathError::LeadingIndex(_))
        ));
        assert!(matches!(
            FieldPath::parse("otherSources[0.code"),
            Err(PathError::UnterminatedIndex(_))
        ));
        assert!(matches!(
            FieldPath::parse("otherSources[x].code"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            FieldPath::parse("otherSources[+1].code"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            FieldPath::parse("full name.first"),
            Err(PathError::InvalidSegment { segment, .. }) if segment == "full name"
        ));
        assert!(matches!(
            FieldPath::parse("otherSources[0]x.code"),
            Err(PathError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn builds_children() {
        let tnm = FieldPath::parse("tnm").expect("valid path");
        let t = tnm.child("t").expect("valid child");
        assert_eq!(t.to_string(), "tnm.t");
        assert!(tnm.child("bad name").is_err());
    }

    #[test]
    fn from_segments_requires_a_leading_field() {
        assert_eq!(FieldPath::from_segments(Vec::new()), Err(PathError::Empty));
        assert!(matches!(
            FieldPath::from_segments(vec![Segment::Index(0)]),
            Err(PathError::LeadingIndex(_))
        ));
        let path = FieldPath::from_segments(vec![field("otherSources"), Segment::Index(1)])
            .expect("valid segments");
        assert_eq!(path.to_string(), "otherSources[1]");
    }

    #[test]
    fn serde_uses_the_textual_form() {
        let path = FieldPath::parse("otherSources[0].date").expect("valid path");
        let json = serde_json::to_string(&path).expect("serialise");
        assert_eq!(json, "\"otherSources[0].date\"");
        let back: FieldPath = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, path);
        assert!(serde_json::from_str::<FieldPath>("\"a..b\"").is_err());
    }
}
