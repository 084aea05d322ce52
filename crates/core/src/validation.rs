//! Submission-time validation of a [`FormRecord`].
//!
//! The validator enforces the mandatory subset of a form independently of the tier the
//! collector is looking at. Results are always data: a path → message map that is empty when
//! the record is valid.

use crate::classification::ClassificationTable;
use crate::constants::DATE_FORMAT;
use crate::record::FormRecord;
use crate::sections::{FieldSpec, SectionSet};
use crate::{FormError, FormResult};
use chrono::NaiveDate;
use oncoreg_types::{Classification, FieldPath, NonEmptyText};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Shape a present value must have.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldFormat {
    #[default]
    Text,
    /// Calendar date, `YYYY-MM-DD`.
    Date,
    /// Exactly this many ASCII digits.
    Digits(usize),
}

impl FieldFormat {
    /// Checks a trimmed, non-empty value. The error is the message tail after the label.
    pub fn check(self, value: &str) -> Result<(), String> {
        match self {
            FieldFormat::Text => Ok(()),
            FieldFormat::Date => {
                let parsed = has_date_shape(value)
                    .then(|| NaiveDate::parse_from_str(value, DATE_FORMAT).ok())
                    .flatten();
                match parsed {
                    Some(_) => Ok(()),
                    None => Err("must be a date in YYYY-MM-DD format".to_string()),
                }
            }
            FieldFormat::Digits(len) => {
                if value.len() == len && value.bytes().all(|b| b.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err(format!("must be exactly {len} digits"))
                }
            }
        }
    }
}

/// Exactly `YYYY-MM-DD`: four-digit year, zero-padded month and day, no sign.
fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(position, byte)| match position {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Sibling fields that are satisfied together: the group passes when any member is present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtLeastOneGroup {
    key: FieldPath,
    members: Vec<FieldPath>,
    message: NonEmptyText,
}

impl AtLeastOneGroup {
    pub fn new(key: FieldPath, members: Vec<FieldPath>, message: NonEmptyText) -> FormResult<Self> {
        if members.is_empty() {
            return Err(FormError::InvalidDeclaration(format!(
                "group '{key}' has no members"
            )));
        }
        if let Some(path) = std::iter::once(&key)
            .chain(&members)
            .find(|path| !path.is_concrete())
        {
            return Err(FormError::InvalidDeclaration(format!(
                "group '{key}' refers to '{path}', which is inside a repeated group"
            )));
        }
        Ok(Self {
            key,
            members,
            message,
        })
    }

    pub fn key(&self) -> &FieldPath {
        &self.key
    }

    pub fn members(&self) -> &[FieldPath] {
        &self.members
    }

    pub fn message(&self) -> &NonEmptyText {
        &self.message
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.members.iter().any(|member| member == path)
    }
}

/// Errors found in one validation pass, keyed by concrete field path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message for a path wins.
    fn insert(&mut self, path: String, message: String) {
        if let Entry::Vacant(slot) = self.errors.entry(path) {
            slot.insert(message);
        }
    }
}

/// Reusable validator over one form's table, sections and groups.
pub struct Validator<'a> {
    table: &'a ClassificationTable,
    sections: &'a SectionSet,
    groups: &'a [AtLeastOneGroup],
}

impl<'a> Validator<'a> {
    pub fn new(
        table: &'a ClassificationTable,
        sections: &'a SectionSet,
        groups: &'a [AtLeastOneGroup],
    ) -> Self {
        Self {
            table,
            sections,
            groups,
        }
    }

    pub fn validate(&self, record: &FormRecord) -> ValidationResult {
        let result = ValidationRun::new(self, record).execute();
        tracing::debug!(errors = result.len(), "form record validated");
        result
    }
}

/// Short-lived validation execution.
struct ValidationRun<'v, 'a> {
    validator: &'v Validator<'a>,
    record: &'v FormRecord,
    active: Vec<&'a FieldSpec>,
    result: ValidationResult,
}

impl<'v, 'a> ValidationRun<'v, 'a> {
    fn new(validator: &'v Validator<'a>, record: &'v FormRecord) -> Self {
        Self {
            validator,
            record,
            active: validator.sections.active_fields(record),
            result: ValidationResult::default(),
        }
    }

    fn execute(mut self) -> ValidationResult {
        self.check_mandatory();
        self.check_groups();
        self.check_discriminators();
        self.check_formats();
        self.result
    }

    fn check_mandatory(&mut self) {
        let validator = self.validator;
        for (leaf, classification) in validator.table.leaves() {
            if classification != Classification::Mandatory {
                continue;
            }
            if validator.groups.iter().any(|group| group.contains(&leaf)) {
                continue;
            }

            for path in self.record.expand(&leaf) {
                if !validator.sections.is_field_active(&path, self.record) {
                    continue;
                }
                if !self.record.is_present(&path) {
                    let message = format!("{} is required", self.label(&leaf));
                    self.result.insert(path.to_string(), message);
                }
            }
        }
    }

    fn check_groups(&mut self) {
        let validator = self.validator;
        for group in validator.groups {
            let any_mandatory = group.members.iter().any(|member| {
                validator.table.classify(member) == Some(Classification::Mandatory)
            });
            let any_active = group
                .members
                .iter()
                .any(|member| validator.sections.is_field_active(member, self.record));
            if !any_mandatory || !any_active {
                continue;
            }

            if !group
                .members
                .iter()
                .any(|member| self.record.is_present(member))
            {
                self.result
                    .insert(group.key.to_string(), group.message.as_str().to_string());
            }
        }
    }

    fn check_discriminators(&mut self) {
        for code in self.validator.sections.unrecognised_codes(self.record) {
            let path = &code.discriminator.path;
            let message = format!(
                "{} has an unrecognised code '{}' (expected one of {})",
                self.label(path),
                code.value,
                code.discriminator.kind.codes().join(", ")
            );
            self.result.insert(path.to_string(), message);
        }
    }

    fn check_formats(&mut self) {
        for field in self.active.clone() {
            if field.format == FieldFormat::Text {
                continue;
            }
            for path in self.record.expand(&field.path) {
                let Some(value) = self.record.text(&path) else {
                    continue;
                };
                if let Err(problem) = field.format.check(&value) {
                    self.result
                        .insert(path.to_string(), format!("{} {problem}", field.label));
                }
            }
        }
    }

    /// Label of the active declaration of a path, falling back to any declaration and then
    /// to the path itself.
    fn label(&self, schema_path: &FieldPath) -> String {
        let schema_path = schema_path.to_schema();
        self.active
            .iter()
            .copied()
            .find(|field| field.path == schema_path)
            .or_else(|| {
                self.validator
                    .sections
                    .declared_fields()
                    .into_iter()
                    .find(|field| field.path == schema_path)
            })
            .map(|field| field.label.to_string())
            .unwrap_or_else(|| schema_path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discriminator::{Branch, DiscriminatorKind, StagingSystem};
    use crate::sections::Section;
    use serde_json::json;
    use Classification::{Mandatory, Optional, Recommended};

    fn path(text: &str) -> FieldPath {
        FieldPath::parse(text).expect("valid path")
    }

    fn table() -> ClassificationTable {
        ClassificationTable::builder()
            .field("centreName", Mandatory)
            .group("fullName", |g| {
                g.field("first", Mandatory)
                    .field("second", Recommended)
                    .field("last", Recommended)
            })
            .field("stagingSystem", Optional)
            .group("tnm", |g| g.field("t", Mandatory).field("n", Recommended))
            .repeated("otherSources", |item| {
                item.field("code", Mandatory).field("date", Optional)
            })
            .field("dateOfRegistration", Recommended)
            .build()
            .expect("table")
    }

    fn sections() -> SectionSet {
        let identity = Section::builder("identity", "Identifying Information")
            .field("centreName", "Name of Participating Centre")
            .field("fullName.first", "First Name")
            .field("fullName.second", "Second Name")
            .field("fullName.last", "Last Name")
            .date("dateOfRegistration", "Date of Registration")
            .field("otherSources[].code", "Source Code")
            .date("otherSources[].date", "Date")
            .build()
            .expect("identity");
        let staging = Section::builder("staging", "Staging")
            .discriminator("stagingSystem", "Staging System", DiscriminatorKind::Staging)
            .branch(&[Branch::Staging(StagingSystem::Tnm)], |b| {
                b.field("tnm.t", "T").field("tnm.n", "N")
            })
            .build()
            .expect("staging");
        SectionSet::new(vec![identity, staging]).expect("sections")
    }

    fn groups() -> Vec<AtLeastOneGroup> {
        vec![AtLeastOneGroup::new(
            path("fullName"),
            vec![path("fullName.first"), path("fullName.second"), path("fullName.last")],
            NonEmptyText::new("At least one name of the patient is required").expect("text"),
        )
        .expect("group")]
    }

    fn validate(value: serde_json::Value) -> ValidationResult {
        let (table, sections, groups) = (table(), sections(), groups());
        let record = FormRecord::from_value(value).expect("record");
        Validator::new(&table, &sections, &groups).validate(&record)
    }

    #[test]
    fn reports_missing_mandatory_fields_with_labels() {
        let result = validate(json!({ "centreName": "  ", "fullName": { "last": "Nair" } }));
        assert_eq!(
            result.get("centreName"),
            Some("Name of Participating Centre is required")
        );
        assert!(!result.contains("fullName"));
        assert!(!result.contains("fullName.first"));
        assert!(!result.is_valid());
    }

    #[test]
    fn name_group_fails_only_when_every_member_is_empty() {
        let result = validate(json!({
            "centreName": "RCC",
            "fullName": { "first": "", "second": "" }
        }));
        assert_eq!(
            result.get("fullName"),
            Some("At least one name of the patient is required")
        );
        assert_eq!(result.len(), 1);

        let result = validate(json!({ "centreName": "RCC", "fullName": { "second": "Kumar" } }));
        assert!(result.is_valid(), "{:?}", result.errors());
    }

    #[test]
    fn inactive_branch_fields_are_exempt() {
        let result = validate(json!({ "centreName": "RCC", "fullName": { "first": "A" } }));
        assert!(!result.contains("tnm.t"));

        let result = validate(json!({
            "centreName": "RCC",
            "fullName": { "first": "A" },
            "stagingSystem": "1",
            "tnm": { "t": "" }
        }));
        assert_eq!(result.get("tnm.t"), Some("T is required"));
        assert!(!result.contains("tnm.n"));
    }

    #[test]
    fn repeated_group_items_are_checked_individually() {
        let result = validate(json!({
            "centreName": "RCC",
            "fullName": { "first": "A" },
            "otherSources": [
                { "code": "H1", "date": "2024-02-30" },
                { "code": "", "date": "2024-02-29" }
            ]
        }));
        assert!(!result.contains("otherSources[0].code"));
        assert_eq!(result.get("otherSources[1].code"), Some("Source Code is required"));
        assert_eq!(
            result.get("otherSources[0].date"),
            Some("Date must be a date in YYYY-MM-DD format")
        );
        assert!(!result.contains("otherSources[1].date"));
    }

    #[test]
    fn unrecognised_discriminator_codes_are_reported() {
        let result = validate(json!({
            "centreName": "RCC",
            "fullName": { "first": "A" },
            "stagingSystem": "7"
        }));
        let message = result.get("stagingSystem").expect("code error");
        assert!(message.starts_with("Staging System has an unrecognised code '7'"));
        assert!(!result.contains("tnm.t"));
    }

    #[test]
    fn validation_is_idempotent_and_serialises_as_a_map() {
        let (table, sections, groups) = (table(), sections(), groups());
        let record = FormRecord::from_value(json!({ "dateOfRegistration": "01/01/2024" }))
            .expect("record");
        let validator = Validator::new(&table, &sections, &groups);

        let first = validator.validate(&record);
        let second = validator.validate(&record);
        assert_eq!(first, second);
        assert_eq!(
            first.get("dateOfRegistration"),
            Some("Date of Registration must be a date in YYYY-MM-DD format")
        );

        let json = serde_json::to_value(&first).expect("json");
        assert_eq!(json["centreName"], "Name of Participating Centre is required");
    }

    #[test]
    fn formats_check_present_values_only() {
        assert!(FieldFormat::Digits(6).check("560001").is_ok());
        assert!(FieldFormat::Digits(6).check("56001").is_err());
        assert!(FieldFormat::Digits(2).check("2a").is_err());
        assert!(FieldFormat::Date.check("2024-01-01").is_ok());
        assert!(FieldFormat::Date.check("2024-13-01").is_err());
        for loose in ["2024-1-1", "24-01-01", "+2024-01-01", "02024-01-01", "2024/01/01"] {
            assert!(FieldFormat::Date.check(loose).is_err(), "{loose} should be rejected");
        }
        assert!(FieldFormat::Text.check("anything").is_ok());
    }

    #[test]
    fn groups_reject_empty_or_repeated_members() {
        let message = NonEmptyText::new("x").expect("text");
        let err = AtLeastOneGroup::new(path("fullName"), Vec::new(), message.clone())
            .expect_err("no members");
        assert!(matches!(err, FormError::InvalidDeclaration(_)));

        let err = AtLeastOneGroup::new(path("sources"), vec![path("otherSources[].code")], message)
            .expect_err("repeated member");
        assert!(matches!(err, FormError::InvalidDeclaration(_)));
    }
}
