//! The user-entered values of one incidence or mortality submission.
//!
//! A [`FormRecord`] is a plain nested JSON object owned by one editing session. Lookups never
//! fail: a path that does not reach a value simply reads as absent.

use crate::{FormError, FormResult};
use oncoreg_types::{FieldPath, Segment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord {
    fields: Map<String, Value>,
}

impl FormRecord {
    /// An empty record, as created when a collector starts a new entry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> FormResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(FormError::InvalidInput(format!(
                "form record must be a JSON object, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn from_json_str(input: &str) -> FormResult<Self> {
        serde_json::from_str(input).map_err(FormError::RecordDeserialization)
    }

    /// The raw value at a concrete path. Schema paths (`[]`) never address a single value.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let Segment::Field(name) = first else {
            return None;
        };

        let mut current = self.fields.get(name)?;
        for segment in rest {
            current = match (segment, current) {
                (Segment::Field(name), Value::Object(map)) => map.get(name)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// The trimmed textual value at `path`; blank strings read as absent.
    ///
    /// Numbers and booleans are rendered to text so that codes entered as `1` and `"1"`
    /// behave the same.
    pub fn text(&self, path: &FieldPath) -> Option<Cow<'_, str>> {
        match self.get(path)? {
            Value::String(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then_some(Cow::Borrowed(trimmed))
            }
            Value::Number(number) => Some(Cow::Owned(number.to_string())),
            Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
            _ => None,
        }
    }

    pub fn is_present(&self, path: &FieldPath) -> bool {
        self.get(path).is_some_and(value_is_present)
    }

    /// Number of items currently held by the repeated group at `path`.
    pub fn item_count(&self, path: &FieldPath) -> usize {
        match self.get(path) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    /// Sets the value at a concrete path, creating intermediate objects.
    ///
    /// An index may overwrite an existing item or append exactly one new item.
    pub fn set(&mut self, path: &FieldPath, value: Value) -> FormResult<()> {
        if !path.is_concrete() {
            return Err(FormError::InvalidInput(format!(
                "cannot set a value at schema path '{path}'"
            )));
        }
        let Some((Segment::Field(name), rest)) = path.segments().split_first() else {
            return Err(FormError::InvalidInput(format!(
                "path '{path}' must start with a field name"
            )));
        };

        let mut slot = self.fields.entry(name.clone()).or_insert(Value::Null);
        for segment in rest {
            slot = match segment {
                Segment::Field(name) => {
                    if !slot.is_object() {
                        *slot = Value::Object(Map::new());
                    }
                    slot.as_object_mut()
                        .ok_or_else(|| not_settable(path))?
                        .entry(name.clone())
                        .or_insert(Value::Null)
                }
                Segment::Index(index) => {
                    if !slot.is_array() {
                        *slot = Value::Array(Vec::new());
                    }
                    let items = slot.as_array_mut().ok_or_else(|| not_settable(path))?;
                    if *index > items.len() {
                        return Err(FormError::InvalidInput(format!(
                            "cannot set '{path}': item {index} would leave a gap after {} items",
                            items.len()
                        )));
                    }
                    if *index == items.len() {
                        items.push(Value::Null);
                    }
                    items.get_mut(*index).ok_or_else(|| not_settable(path))?
                }
                Segment::Each => return Err(not_settable(path)),
            };
        }

        *slot = value;
        Ok(())
    }

    /// Expands every `[]` of a schema path into the item indices present in this record.
    ///
    /// Concrete paths expand to themselves; a repeated group with no items expands to nothing.
    pub fn expand(&self, path: &FieldPath) -> Vec<FieldPath> {
        let mut out = Vec::new();
        self.expand_from(path.segments(), &mut Vec::new(), &mut out);
        out
    }

    fn expand_from(
        &self,
        segments: &[Segment],
        prefix: &mut Vec<Segment>,
        out: &mut Vec<FieldPath>,
    ) {
        match segments.split_first() {
            None => {
                if let Ok(path) = FieldPath::from_segments(prefix.clone()) {
                    out.push(path);
                }
            }
            Some((Segment::Each, rest)) => {
                let count = FieldPath::from_segments(prefix.clone())
                    .map(|group| self.item_count(&group))
                    .unwrap_or(0);
                for index in 0..count {
                    prefix.push(Segment::Index(index));
                    self.expand_from(rest, prefix, out);
                    prefix.pop();
                }
            }
            Some((segment, rest)) => {
                prefix.push(segment.clone());
                self.expand_from(rest, prefix, out);
                prefix.pop();
            }
        }
    }
}

/// Presence rule shared by the validator: blank strings, nulls, empty arrays and objects
/// without any present member are absent.
pub fn value_is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => map.values().any(value_is_present),
    }
}

fn not_settable(path: &FieldPath) -> FormError {
    FormError::InvalidInput(format!("cannot set a value at '{path}'"))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
