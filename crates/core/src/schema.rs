//! Form schemas: one classification table, section layout and group set per form.
//!
//! A [`FormSchema`] is built once at start-up and is read-only afterwards. It is `Send + Sync`
//! and can be shared by reference across any number of editing sessions.

use crate::classification::{ClassificationTable, Tier};
use crate::discriminator::Branch;
use crate::forms::{incidence, mortality};
use crate::record::FormRecord;
use crate::sections::SectionSet;
use crate::validation::{AtLeastOneGroup, ValidationResult, Validator};
use crate::visibility;
use crate::{FormError, FormResult};
use ncrp::{FormDefinitionData, GroupRule};
use oncoreg_types::{Classification, FieldPath};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The NCRP core forms shipped with the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Incidence,
    Mortality,
}

impl FormKind {
    pub const ALL: [FormKind; 2] = [FormKind::Incidence, FormKind::Mortality];

    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Incidence => "incidence",
            FormKind::Mortality => "mortality",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FormKind::Incidence => "Core Form - Incidence Data",
            FormKind::Mortality => "Core Form - Mortality Data",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = FormError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "incidence" => Ok(FormKind::Incidence),
            "mortality" => Ok(FormKind::Mortality),
            other => Err(FormError::InvalidInput(format!(
                "unknown form '{other}' (expected incidence or mortality)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSchema {
    kind: FormKind,
    table: ClassificationTable,
    sections: SectionSet,
    groups: Vec<AtLeastOneGroup>,
}

impl FormSchema {
    /// Builds the built-in schema for `kind`.
    pub fn builtin(kind: FormKind) -> FormResult<Self> {
        let (table, sections, groups) = match kind {
            FormKind::Incidence => (
                incidence::table()?,
                incidence::sections()?,
                incidence::groups()?,
            ),
            FormKind::Mortality => (
                mortality::table()?,
                mortality::sections()?,
                mortality::groups()?,
            ),
        };

        Ok(Self {
            kind,
            table,
            sections,
            groups,
        })
    }

    /// Replaces the classification table and groups with those of a definition file.
    ///
    /// The section layout is part of the engine and is kept. Section fields the new table does
    /// not classify are logged; they stay hidden below the `all` tier.
    pub fn with_definition(self, definition: &FormDefinitionData) -> FormResult<Self> {
        let found: FormKind = definition.form.parse()?;
        if found != self.kind {
            return Err(FormError::FormMismatch {
                expected: self.kind.to_string(),
                found: found.to_string(),
            });
        }

        let table = ClassificationTable::from_definition(&definition.fields)?;
        let groups = definition
            .groups
            .iter()
            .map(|rule| {
                AtLeastOneGroup::new(rule.key.clone(), rule.members.clone(), rule.message.clone())
            })
            .collect::<FormResult<Vec<_>>>()?;

        let schema = Self {
            table,
            groups,
            ..self
        };
        for path in schema.unclassified_section_fields() {
            tracing::warn!(
                form = %schema.kind,
                path = %path,
                "form definition leaves a section field unclassified"
            );
        }
        Ok(schema)
    }

    /// The effective definition, suitable for rendering as an override file.
    pub fn to_definition(&self) -> FormDefinitionData {
        FormDefinitionData {
            form: self.kind.to_string(),
            fields: self.table.to_definition(),
            groups: self
                .groups
                .iter()
                .map(|group| GroupRule {
                    key: group.key().clone(),
                    members: group.members().to_vec(),
                    message: group.message().clone(),
                })
                .collect(),
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn table(&self) -> &ClassificationTable {
        &self.table
    }

    pub fn sections(&self) -> &SectionSet {
        &self.sections
    }

    pub fn groups(&self) -> &[AtLeastOneGroup] {
        &self.groups
    }

    /// Classification of a raw path; `None` when unclassified or malformed.
    pub fn classify(&self, path: &str) -> Option<Classification> {
        self.table.classify_str(path)
    }

    pub fn is_visible(&self, path: &str, tier: Tier) -> bool {
        visibility::is_visible_str(&self.table, path, tier)
    }

    pub fn active_branch(&self, section: &str, record: &FormRecord) -> Option<Branch> {
        self.sections.active_branch(section, record)
    }

    pub fn section_has_visible_field(&self, section: &str, tier: Tier) -> bool {
        self.sections
            .section_has_visible_field(section, &self.table, tier)
    }

    pub fn validator(&self) -> Validator<'_> {
        Validator::new(&self.table, &self.sections, &self.groups)
    }

    pub fn validate(&self, record: &FormRecord) -> ValidationResult {
        self.validator().validate(record)
    }

    /// Section fields that the table does not classify.
    pub fn unclassified_section_fields(&self) -> Vec<&FieldPath> {
        self.sections
            .declared_fields()
            .into_iter()
            .filter(|field| self.table.classify(&field.path).is_none())
            .map(|field| &field.path)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discriminator::{DiagnosisMethod, ImagingTechnique, ResidenceType};
    use ncrp::FormDefinition;
    use serde_json::json;

    fn incidence() -> FormSchema {
        FormSchema::builtin(FormKind::Incidence).expect("incidence schema")
    }

    fn record(value: serde_json::Value) -> FormRecord {
        FormRecord::from_value(value).expect("record")
    }

    #[test]
    fn builtin_schemas_cover_every_section_field() {
        for kind in FormKind::ALL {
            let schema = FormSchema::builtin(kind).expect("schema");
            assert!(schema.unclassified_section_fields().is_empty(), "{kind}");
            assert!(!schema.groups().is_empty());
        }
    }

    #[test]
    fn every_declared_path_classifies_as_declared() {
        for kind in FormKind::ALL {
            let schema = FormSchema::builtin(kind).expect("schema");
            for (path, classification) in schema.table().leaves() {
                assert_eq!(schema.classify(&path.to_string()), Some(classification));
            }
        }
    }

    #[test]
    fn visibility_properties_hold_for_every_declared_path() {
        let schema = incidence();
        for (path, classification) in schema.table().leaves() {
            let path = path.to_string();
            assert!(schema.is_visible(&path, Tier::All));
            if classification == Classification::Mandatory {
                assert!(schema.is_visible(&path, Tier::Mandatory));
            }
            if schema.is_visible(&path, Tier::Mandatory) {
                assert!(schema.is_visible(&path, Tier::Recommended));
            }
        }
        assert!(!schema.is_visible("patientName.first", Tier::Mandatory));
        assert!(!schema.is_visible("patientName.first", Tier::Recommended));
        assert!(schema.is_visible("patientName.first", Tier::All));
    }

    #[test]
    fn residence_branch_resolves_from_type() {
        let schema = incidence();
        let urban = record(json!({ "placeOfResidence": { "type": "urban" } }));
        let rural = record(json!({ "placeOfResidence": { "type": "rural" } }));
        let other = record(json!({ "placeOfResidence": { "type": "village" } }));

        assert_eq!(
            schema.active_branch("residence", &urban),
            Some(Branch::Residence(ResidenceType::Urban))
        );
        assert_eq!(
            schema.active_branch("residence", &rural),
            Some(Branch::Residence(ResidenceType::Rural))
        );
        assert_eq!(schema.active_branch("residence", &other), None);
        assert_eq!(schema.active_branch("residence", &FormRecord::new()), None);
    }

    #[test]
    fn secondary_method_follows_primary_method() {
        let schema = incidence();
        let imaging = record(json!({
            "methodOfDiagnosis": { "primaryMethod": "3", "secondaryMethod": "5" }
        }));
        assert_eq!(
            schema.active_branch("methodOfDiagnosis", &imaging),
            Some(Branch::Diagnosis(DiagnosisMethod::Xray))
        );
        assert_eq!(
            schema.active_branch("imagingMethod", &imaging),
            Some(Branch::Imaging(ImagingTechnique::CtScan))
        );
        assert_eq!(schema.active_branch("microscopicMethod", &imaging), None);

        let result = schema.validate(&record(json!({
            "methodOfDiagnosis": { "primaryMethod": "3" }
        })));
        assert_eq!(
            result.get("methodOfDiagnosis.secondaryMethod"),
            Some("X-Ray / Imaging Techniques is required")
        );

        let result = schema.validate(&record(json!({
            "methodOfDiagnosis": { "primaryMethod": "1" }
        })));
        assert!(!result.contains("methodOfDiagnosis.secondaryMethod"));
    }

    #[test]
    fn demographics_heading_depends_on_tier() {
        let schema = incidence();
        assert!(!schema.section_has_visible_field("demographics", Tier::Mandatory));
        assert!(!schema.section_has_visible_field("demographics", Tier::Recommended));
        assert!(schema.section_has_visible_field("demographics", Tier::All));
        assert!(schema.section_has_visible_field("residence", Tier::Mandatory));
        assert!(schema.section_has_visible_field("staging", Tier::Mandatory));
    }

    #[test]
    fn registration_scenario_reports_centre_but_not_name() {
        let schema = incidence();
        let result = schema.validate(&record(json!({
            "centreName": "",
            "centreCode": "C1",
            "registrationNumber": { "year": "24", "regNo": "00001" },
            "fullName": { "first": "", "second": "Kumar" },
            "dateOfRegistration": "2024-01-01"
        })));

        assert_eq!(
            result.get("centreName"),
            Some("Name of Participating Centre is required")
        );
        assert!(!result.contains("fullName"));
        assert!(!result.contains("fullName.first"));
        assert!(!result.contains("centreCode"));
        assert!(!result.contains("registrationNumber.year"));
        assert!(!result.contains("dateOfRegistration"));
    }

    #[test]
    fn tnm_fields_never_enter_the_mandatory_error_set() {
        let schema = incidence();
        for staging in [json!(null), json!("1"), json!("2"), json!("tnm")] {
            let result = schema.validate(&record(json!({
                "stagingSystem": staging,
                "tnm": { "t": "", "n": "", "m": "" }
            })));
            for part in ["tnm.t", "tnm.n", "tnm.m"] {
                assert!(!result.contains(part), "{part} with {staging}");
            }
        }
    }

    #[test]
    fn treatment_dates_are_checked_only_when_treatment_received() {
        let schema = incidence();
        let received = schema.validate(&record(json!({
            "cancerDirectedTreatment": { "received": "1", "dateOfCommencement": "12-03-2024" }
        })));
        assert_eq!(
            received.get("cancerDirectedTreatment.dateOfCommencement"),
            Some("Date of Commencement must be a date in YYYY-MM-DD format")
        );

        let declined = schema.validate(&record(json!({
            "cancerDirectedTreatment": { "received": "2", "dateOfCommencement": "12-03-2024" }
        })));
        assert!(!declined.contains("cancerDirectedTreatment.dateOfCommencement"));
    }

    #[test]
    fn mortality_hospital_name_is_required_only_for_hospital_deaths() {
        let schema = FormSchema::builtin(FormKind::Mortality).expect("mortality schema");
        let hospital = schema.validate(&record(json!({ "placeOfDeath": "1" })));
        assert_eq!(
            hospital.get("hospitalDetails.name"),
            Some("Hospital/Nursing Home Name is required")
        );

        let residence = schema.validate(&record(json!({ "placeOfDeath": "3" })));
        assert!(!residence.contains("hospitalDetails.name"));
        assert_eq!(
            residence.get("fullName"),
            Some("At least one name of the deceased is required")
        );
    }

    #[test]
    fn definition_round_trips_through_yaml() {
        let schema = incidence();
        let yaml = FormDefinition::render(&schema.to_definition()).expect("render");
        let parsed = FormDefinition::parse(&yaml).expect("parse");
        let rebuilt = incidence().with_definition(&parsed).expect("apply");
        assert_eq!(rebuilt, schema);
    }

    #[test]
    fn definition_overrides_classification() {
        let yaml = r#"
schema_version: 1
form: incidence
fields:
  centreName: optional
  religion: mandatory
groups:
  - key: fullName
    members: [fullName.first, fullName.second]
    message: Give a first or second name
"#;
        let definition = FormDefinition::parse(yaml).expect("parse");
        let schema = incidence().with_definition(&definition).expect("apply");

        assert_eq!(schema.classify("centreName"), Some(Classification::Optional));
        assert_eq!(schema.classify("age"), None);
        assert!(!schema.unclassified_section_fields().is_empty());

        let result = schema.validate(&FormRecord::new());
        assert_eq!(result.get("religion"), Some("Religion is required"));
        assert!(!result.contains("centreName"));
        assert!(!result.contains("fullName"));
    }

    #[test]
    fn definition_for_another_form_is_rejected() {
        let yaml = "schema_version: 1\nform: mortality\nfields:\n  centreName: mandatory\n";
        let definition = FormDefinition::parse(yaml).expect("parse");
        let err = incidence()
            .with_definition(&definition)
            .expect_err("form mismatch");
        assert!(matches!(
            err,
            FormError::FormMismatch { expected, found }
                if expected == "incidence" && found == "mortality"
        ));
    }

    #[test]
    fn form_kinds_parse() {
        assert_eq!("Mortality".parse::<FormKind>().expect("kind"), FormKind::Mortality);
        assert!(matches!(
            "death".parse::<FormKind>().expect_err("unknown"),
            FormError::InvalidInput(_)
        ));
    }

    #[test]
    fn schemas_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormSchema>();

        let schema = std::sync::Arc::new(incidence());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let schema = std::sync::Arc::clone(&schema);
                std::thread::spawn(move || schema.validate(&FormRecord::new()).len())
            })
            .collect();
        let counts: Vec<usize> = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .collect();
        assert!(counts.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
