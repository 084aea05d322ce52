//! Built-in NCRP core forms.

pub(crate) mod incidence;
pub(crate) mod mortality;

use crate::classification::TableBuilder;
use crate::validation::AtLeastOneGroup;
use crate::FormResult;
use oncoreg_types::{Classification, FieldPath, NonEmptyText};

/// Address block repeated across both forms.
pub(crate) fn address(builder: TableBuilder) -> TableBuilder {
    builder
        .field("address", Classification::Optional)
        .field("cityTownDistrict", Classification::Optional)
        .field("pinCode", Classification::Optional)
}

pub(crate) fn relative(builder: TableBuilder) -> TableBuilder {
    builder
        .field("name", Classification::Optional)
        .field("mobile", Classification::Optional)
}

/// `fullName.first | second | last`, satisfied by any one name.
pub(crate) fn name_group(message: &str) -> FormResult<AtLeastOneGroup> {
    let key = FieldPath::parse("fullName")?;
    let members = ["first", "second", "last"]
        .into_iter()
        .map(|part| key.child(part))
        .collect::<Result<Vec<_>, _>>()?;
    let message = NonEmptyText::new(message)
        .map_err(|err| crate::FormError::InvalidDeclaration(err.to_string()))?;
    AtLeastOneGroup::new(key, members, message)
}

#[cfg(test)]
pub(crate) fn assert_sections_are_classified(
    table: &crate::ClassificationTable,
    sections: &crate::SectionSet,
) {
    for section in sections.iter() {
        for field in section.all_fields() {
            assert!(
                table.classify(&field.path).is_some(),
                "section '{}' exposes unclassified field '{}'",
                section.id(),
                field.path
            );
        }
    }
}
