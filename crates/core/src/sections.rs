//! Conditional section evaluator.
//!
//! A form is laid out as an ordered list of [`Section`]s, one per heading of the paper form.
//! A section may carry a discriminator (a field whose closed code list selects a branch) and
//! may itself be gated on the active branch of an earlier section. The evaluator only reports
//! which branch is active; it never clears values held by inactive branches.

use crate::classification::{ClassificationTable, Tier};
use crate::discriminator::{Branch, DiscriminatorKind};
use crate::record::FormRecord;
use crate::validation::FieldFormat;
use crate::visibility::is_visible;
use crate::{FormError, FormResult};
use oncoreg_types::FieldPath;
use std::collections::HashSet;

/// One field a section can expose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Schema path; repeated groups use `[]`.
    pub path: FieldPath,
    /// Paper-form label used in validation messages.
    pub label: &'static str,
    pub format: FieldFormat,
}

/// Requirement that a parent section has resolved to one of `branches`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentGate {
    pub section: &'static str,
    pub branches: Vec<Branch>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discriminator {
    pub path: FieldPath,
    pub kind: DiscriminatorKind,
}

/// Fields that are only active while the section resolves to one of `when`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchFields {
    pub when: Vec<Branch>,
    pub fields: Vec<FieldSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    id: &'static str,
    title: &'static str,
    parent: Option<ParentGate>,
    discriminator: Option<Discriminator>,
    fields: Vec<FieldSpec>,
    branches: Vec<BranchFields>,
}

impl Section {
    pub fn builder(id: &'static str, title: &'static str) -> SectionBuilder {
        SectionBuilder {
            id,
            title,
            parent: None,
            discriminator: None,
            fields: FieldsBuilder::default(),
            branches: Vec::new(),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn parent(&self) -> Option<&ParentGate> {
        self.parent.as_ref()
    }

    pub fn discriminator(&self) -> Option<&Discriminator> {
        self.discriminator.as_ref()
    }

    /// Fields shown whenever the section is active, including its discriminator.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn branches(&self) -> &[BranchFields] {
        &self.branches
    }

    /// Every field declared under the section, regardless of branch.
    pub fn all_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields
            .iter()
            .chain(self.branches.iter().flat_map(|branch| branch.fields.iter()))
    }
}

/// Raw field declarations shared by sections and branches. Paths are parsed on build.
#[derive(Default)]
pub struct FieldsBuilder {
    fields: Vec<(&'static str, &'static str, FieldFormat)>,
}

impl FieldsBuilder {
    pub fn field(self, path: &'static str, label: &'static str) -> Self {
        self.formatted(path, label, FieldFormat::Text)
    }

    pub fn date(self, path: &'static str, label: &'static str) -> Self {
        self.formatted(path, label, FieldFormat::Date)
    }

    pub fn digits(self, path: &'static str, label: &'static str, len: usize) -> Self {
        self.formatted(path, label, FieldFormat::Digits(len))
    }

    pub fn formatted(
        mut self,
        path: &'static str,
        label: &'static str,
        format: FieldFormat,
    ) -> Self {
        self.fields.push((path, label, format));
        self
    }

    fn build(self, section: &str, seen: &mut HashSet<FieldPath>) -> FormResult<Vec<FieldSpec>> {
        self.fields
            .into_iter()
            .map(|(path, label, format)| {
                let path = FieldPath::parse(path)?.to_schema();
                if !seen.insert(path.clone()) {
                    return Err(FormError::DuplicateField(format!("{section}: {path}")));
                }
                Ok(FieldSpec { path, label, format })
            })
            .collect()
    }
}

pub struct SectionBuilder {
    id: &'static str,
    title: &'static str,
    parent: Option<(&'static str, Vec<Branch>)>,
    discriminator: Option<(&'static str, DiscriminatorKind)>,
    fields: FieldsBuilder,
    branches: Vec<(Vec<Branch>, FieldsBuilder)>,
}

impl SectionBuilder {
    /// Only activate this section while `parent` resolves to one of `branches`.
    pub fn gated_by(mut self, parent: &'static str, branches: &[Branch]) -> Self {
        self.parent = Some((parent, branches.to_vec()));
        self
    }

    /// Declares the section's discriminator; it is also one of the section's own fields.
    pub fn discriminator(
        mut self,
        path: &'static str,
        label: &'static str,
        kind: DiscriminatorKind,
    ) -> Self {
        self.discriminator = Some((path, kind));
        self.fields = self.fields.field(path, label);
        self
    }

    pub fn field(mut self, path: &'static str, label: &'static str) -> Self {
        self.fields = self.fields.field(path, label);
        self
    }

    pub fn date(mut self, path: &'static str, label: &'static str) -> Self {
        self.fields = self.fields.date(path, label);
        self
    }

    pub fn digits(mut self, path: &'static str, label: &'static str, len: usize) -> Self {
        self.fields = self.fields.digits(path, label, len);
        self
    }

    /// Fields active only while the discriminator resolves to one of `when`.
    pub fn branch(
        mut self,
        when: &[Branch],
        build: impl FnOnce(FieldsBuilder) -> FieldsBuilder,
    ) -> Self {
        self.branches
            .push((when.to_vec(), build(FieldsBuilder::default())));
        self
    }

    pub fn build(self) -> FormResult<Section> {
        let id = self.id;
        let mut seen = HashSet::new();
        let fields = self.fields.build(id, &mut seen)?;

        let discriminator = match self.discriminator {
            Some((path, kind)) => {
                let path = FieldPath::parse(path)?;
                if !path.is_concrete() {
                    return Err(FormError::InvalidDeclaration(format!(
                        "section '{id}' discriminator '{path}' cannot sit inside a repeated group"
                    )));
                }
                Some(Discriminator { path, kind })
            }
            None => None,
        };

        let mut branches = Vec::with_capacity(self.branches.len());
        for (when, builder) in self.branches {
            let Some(discriminator) = &discriminator else {
                return Err(FormError::InvalidDeclaration(format!(
                    "section '{id}' declares branches without a discriminator"
                )));
            };
            if when.is_empty() {
                return Err(FormError::InvalidDeclaration(format!(
                    "section '{id}' declares a branch with no values"
                )));
            }
            if when.iter().any(|branch| branch.kind() != discriminator.kind) {
                return Err(FormError::InvalidDeclaration(format!(
                    "section '{id}' declares a branch for another discriminator"
                )));
            }
            branches.push(BranchFields {
                when,
                fields: builder.build(id, &mut seen)?,
            });
        }

        Ok(Section {
            id,
            title: self.title,
            parent: self
                .parent
                .map(|(section, branches)| ParentGate { section, branches }),
            discriminator,
            fields,
            branches,
        })
    }
}

/// A discriminator holding a value outside its code list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnrecognisedCode<'a> {
    pub section: &'static str,
    pub discriminator: &'a Discriminator,
    pub value: String,
}

/// The ordered sections of one form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionSet {
    sections: Vec<Section>,
}

impl SectionSet {
    /// Checks that section ids are unique and that every parent gate refers to an earlier
    /// section whose discriminator matches the gate's branches.
    pub fn new(sections: Vec<Section>) -> FormResult<Self> {
        for (index, section) in sections.iter().enumerate() {
            let earlier = &sections[..index];
            if earlier.iter().any(|other| other.id == section.id) {
                return Err(FormError::InvalidDeclaration(format!(
                    "section '{}' is declared more than once",
                    section.id
                )));
            }

            let Some(gate) = &section.parent else {
                continue;
            };
            let parent = earlier
                .iter()
                .find(|other| other.id == gate.section)
                .ok_or_else(|| FormError::UnknownParentSection {
                    section: section.id.to_string(),
                    parent: gate.section.to_string(),
                })?;
            let Some(discriminator) = &parent.discriminator else {
                return Err(FormError::InvalidDeclaration(format!(
                    "section '{}' is gated on '{}', which has no discriminator",
                    section.id, gate.section
                )));
            };
            if gate.branches.is_empty()
                || gate
                    .branches
                    .iter()
                    .any(|branch| branch.kind() != discriminator.kind)
            {
                return Err(FormError::InvalidDeclaration(format!(
                    "section '{}' has a parent gate that does not match '{}'",
                    section.id, gate.section
                )));
            }
        }

        Ok(Self { sections })
    }

    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// The branch selected by the section's discriminator, or `None` when the section is
    /// inactive, has no discriminator, or its value is unset or unrecognised.
    pub fn active_branch(&self, id: &str, record: &FormRecord) -> Option<Branch> {
        let section = self.get(id)?;
        if !self.section_is_active(section, record) {
            tracing::debug!(section = id, "section inactive: parent branch does not match");
            return None;
        }

        let discriminator = section.discriminator.as_ref()?;
        let value = record.text(&discriminator.path)?;
        let branch = discriminator.kind.resolve(&value);
        if branch.is_none() {
            tracing::debug!(
                section = id,
                path = %discriminator.path,
                value = %value,
                "discriminator value not recognised"
            );
        }
        branch
    }

    /// True when the section's parent gates (recursively) are satisfied.
    pub fn is_section_active(&self, id: &str, record: &FormRecord) -> bool {
        self.get(id)
            .is_some_and(|section| self.section_is_active(section, record))
    }

    fn section_is_active(&self, section: &Section, record: &FormRecord) -> bool {
        match &section.parent {
            None => true,
            Some(gate) => self
                .active_branch(gate.section, record)
                .is_some_and(|branch| gate.branches.contains(&branch)),
        }
    }

    /// True when any field under the section, in any branch, is visible at `tier`.
    pub fn section_has_visible_field(
        &self,
        id: &str,
        table: &ClassificationTable,
        tier: Tier,
    ) -> bool {
        self.get(id).is_some_and(|section| {
            section
                .all_fields()
                .any(|field| is_visible(table, &field.path, tier))
        })
    }

    /// Fields of the section that are active for `record`: its own fields plus those of the
    /// active branch. Empty when the section itself is inactive.
    pub fn section_active_fields(&self, id: &str, record: &FormRecord) -> Vec<&FieldSpec> {
        let Some(section) = self.get(id) else {
            return Vec::new();
        };
        if !self.section_is_active(section, record) {
            return Vec::new();
        }

        let branch = self.active_branch(id, record);
        section
            .fields
            .iter()
            .chain(
                section
                    .branches
                    .iter()
                    .filter(|fields| branch.is_some_and(|b| fields.when.contains(&b)))
                    .flat_map(|fields| fields.fields.iter()),
            )
            .collect()
    }

    /// Every active field of the form, first declaration wins when a path is shared.
    pub fn active_fields(&self, record: &FormRecord) -> Vec<&FieldSpec> {
        let mut seen = HashSet::new();
        self.sections
            .iter()
            .flat_map(|section| self.section_active_fields(section.id, record))
            .filter(|field| seen.insert(field.path.clone()))
            .collect()
    }

    /// Every field any section declares, first declaration wins.
    pub fn declared_fields(&self) -> Vec<&FieldSpec> {
        let mut seen = HashSet::new();
        self.sections
            .iter()
            .flat_map(Section::all_fields)
            .filter(|field| seen.insert(field.path.clone()))
            .collect()
    }

    /// Whether the branch governing `path` is active.
    ///
    /// Paths no section declares are treated as active. A path declared by several
    /// sections is active when any of its declarations is.
    pub fn is_field_active(&self, path: &FieldPath, record: &FormRecord) -> bool {
        let path = path.to_schema();
        let mut declared = false;

        for section in &self.sections {
            let own = section.fields.iter().any(|field| field.path == path);
            let in_branches: Vec<&BranchFields> = section
                .branches
                .iter()
                .filter(|branch| branch.fields.iter().any(|field| field.path == path))
                .collect();
            if !own && in_branches.is_empty() {
                continue;
            }
            declared = true;

            if !self.section_is_active(section, record) {
                continue;
            }
            if own {
                return true;
            }
            if let Some(active) = self.active_branch(section.id, record) {
                if in_branches.iter().any(|branch| branch.when.contains(&active)) {
                    return true;
                }
            }
        }

        !declared
    }

    /// Active sections whose discriminator holds a value outside its code list.
    pub fn unrecognised_codes(&self, record: &FormRecord) -> Vec<UnrecognisedCode<'_>> {
        self.sections
            .iter()
            .filter(|section| self.section_is_active(section, record))
            .filter_map(|section| {
                let discriminator = section.discriminator.as_ref()?;
                let value = record.text(&discriminator.path)?;
                match discriminator.kind.resolve(&value) {
                    Some(_) => None,
                    None => Some(UnrecognisedCode {
                        section: section.id,
                        discriminator,
                        value: value.into_owned(),
                    }),
                }
            })
            .collect()
    }
}
