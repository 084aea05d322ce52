//! Core Form – Mortality Data.

use crate::classification::ClassificationTable;
use crate::discriminator::{
    Branch, CauseOfDeath, DiscriminatorKind, InformationSource, PlaceOfDeath, ResidenceType,
};
use crate::sections::{Section, SectionSet};
use crate::validation::AtLeastOneGroup;
use crate::FormResult;
use oncoreg_types::Classification::{Mandatory, Optional, Recommended};

use super::{address, name_group};

pub(crate) fn table() -> FormResult<ClassificationTable> {
    ClassificationTable::builder()
        .field("centreName", Mandatory)
        .field("centreCode", Mandatory)
        .group("mortalityRegNo", |g| {
            g.field("year", Mandatory).field("regNo", Mandatory)
        })
        .field("dateOfDeath", Mandatory)
        .group("fullName", |g| {
            g.field("first", Mandatory)
                .field("second", Recommended)
                .field("last", Recommended)
        })
        .field("uniqueIdNumber", Recommended)
        .group("placeOfResidence", |g| {
            g.field("type", Recommended)
                .group("urban", |u| {
                    u.field("houseNo", Recommended)
                        .field("roadName", Recommended)
                        .field("areaLocality", Recommended)
                        .field("wardNumber", Recommended)
                })
                .group("rural", |r| {
                    r.field("houseNoAndWard", Recommended)
                        .field("gramPanchayat", Recommended)
                })
                .field("cityTown", Recommended)
                .field("district", Recommended)
                .field("pinCode", Recommended)
                .group("contactInfo", |c| {
                    c.field("telephone", Recommended)
                        .field("mobile", Recommended)
                        .field("email", Recommended)
                })
        })
        .field("durationOfStay", Recommended)
        .field("relativeName", Optional)
        .field("relativeCode", Optional)
        .group("relativeAddress", address)
        .field("age", Mandatory)
        .field("sex", Mandatory)
        .field("religion", Mandatory)
        .field("placeOfDeath", Mandatory)
        .group("hospitalDetails", |g| {
            g.field("name", Mandatory)
                .field("code", Recommended)
                .field("registrationNumber", Recommended)
        })
        .group("deathCertification", |g| {
            g.field("certifiedBy", Mandatory)
                .field("autopsyReport", Optional)
                .field("certifierDetails", Optional)
        })
        .field("causeOfDeath", Mandatory)
        .group("cancerDetails", |g| {
            g.field("icd10", Recommended)
                .field("morphology", Recommended)
                .field("dateOfDiagnosis", Recommended)
        })
        .group("sourceInfo", |g| {
            g.field("source", Mandatory)
                .group("corporationDetails", |c| {
                    c.field("unitName", Optional)
                        .field("code", Optional)
                        .field("registrationNo", Optional)
                        .field("dateOfRegistration", Optional)
                })
                .group("hospitalDetails", |h| {
                    h.field("code", Optional)
                        .field("registrationNo", Optional)
                        .field("dateOfRegistration", Optional)
                })
        })
        .group("matchedDeaths", |g| {
            g.field("incidenceRegNo", Optional)
                .field("dateOfFirstDiagnosis", Optional)
        })
        .field("completedBy", Mandatory)
        .field("completionDate", Mandatory)
        .build()
}

pub(crate) fn sections() -> FormResult<SectionSet> {
    let in_hospital = [
        Branch::PlaceOfDeath(PlaceOfDeath::Hospital),
        Branch::PlaceOfDeath(PlaceOfDeath::NursingHome),
    ];
    let with_cancer = [
        Branch::CauseOfDeath(CauseOfDeath::DueToCancer),
        Branch::CauseOfDeath(CauseOfDeath::OtherWithCancer),
    ];
    let from_corporation = [
        Branch::InformationSource(InformationSource::Corporation),
        Branch::InformationSource(InformationSource::Both),
    ];
    let from_hospital = [
        Branch::InformationSource(InformationSource::Hospital),
        Branch::InformationSource(InformationSource::Both),
    ];

    SectionSet::new(vec![
        Section::builder("centre", "1-2. Participating Centre")
            .field("centreName", "Name of Participating Centre")
            .field("centreCode", "Centre Code")
            .digits("mortalityRegNo.year", "Registration Year", 2)
            .digits("mortalityRegNo.regNo", "Registration Number", 5)
            .build()?,
        Section::builder("dateOfDeath", "3. Date of Death")
            .date("dateOfDeath", "Date of Death")
            .build()?,
        Section::builder("patientName", "4. Patient Information")
            .field("fullName.first", "First Name")
            .field("fullName.second", "Second Name")
            .field("fullName.last", "Last Name")
            .field("uniqueIdNumber", "Unique Identification Number")
            .build()?,
        Section::builder("residence", "5. Place of Residence")
            .discriminator(
                "placeOfResidence.type",
                "Place of Residence",
                DiscriminatorKind::Residence,
            )
            .branch(&[Branch::Residence(ResidenceType::Urban)], |b| {
                b.field("placeOfResidence.urban.houseNo", "House No.")
                    .field("placeOfResidence.urban.roadName", "Road/Street Name")
                    .field("placeOfResidence.urban.areaLocality", "Area/Locality")
                    .field("placeOfResidence.urban.wardNumber", "Ward/Corporation/Division")
            })
            .branch(&[Branch::Residence(ResidenceType::Rural)], |b| {
                b.field("placeOfResidence.rural.houseNoAndWard", "House No. and Ward")
                    .field(
                        "placeOfResidence.rural.gramPanchayat",
                        "Name of Gram Panchayat/Village",
                    )
            })
            .field("placeOfResidence.cityTown", "Name of City/Town")
            .field("placeOfResidence.district", "District")
            .digits("placeOfResidence.pinCode", "PIN Code", 6)
            .field("placeOfResidence.contactInfo.telephone", "Telephone No.")
            .digits("placeOfResidence.contactInfo.mobile", "Mobile", 10)
            .field("placeOfResidence.contactInfo.email", "Email ID")
            .build()?,
        Section::builder("durationOfStay", "6. Duration of Stay")
            .field("durationOfStay", "Duration of Stay (In Years)")
            .build()?,
        Section::builder("relative", "7. Relative/Next of Kin")
            .field("relativeName", "Name of Relative/Next of Kin/Informant")
            .field("relativeCode", "Relationship with Deceased")
            .field("relativeAddress.address", "Address of Relative/Informant")
            .field("relativeAddress.cityTownDistrict", "City/Town/District")
            .digits("relativeAddress.pinCode", "PIN Code", 6)
            .build()?,
        Section::builder("ageAndSex", "8-10. Age, Sex and Religion")
            .field("age", "Age (In Years)")
            .field("sex", "Sex")
            .field("religion", "Religion")
            .build()?,
        Section::builder("placeOfDeath", "11. Place of Death")
            .discriminator("placeOfDeath", "Place of Death", DiscriminatorKind::PlaceOfDeath)
            .branch(&in_hospital, |b| {
                b.field("hospitalDetails.name", "Hospital/Nursing Home Name")
                    .field("hospitalDetails.code", "Hospital Code")
                    .field("hospitalDetails.registrationNumber", "Hospital Registration Number")
            })
            .build()?,
        Section::builder("certification", "12. Certification of Death")
            .field("deathCertification.certifiedBy", "Death Certified by")
            .field("deathCertification.autopsyReport", "Autopsy Report")
            .field(
                "deathCertification.certifierDetails",
                "Name, Title and Address of Person Certifying Death",
            )
            .build()?,
        Section::builder("causeOfDeath", "13. Cause of Death")
            .discriminator("causeOfDeath", "Cause of Death", DiscriminatorKind::CauseOfDeath)
            .branch(&with_cancer, |b| {
                b.field("cancerDetails.icd10", "ICD-10")
                    .field("cancerDetails.morphology", "Morphology")
                    .date("cancerDetails.dateOfDiagnosis", "Date of Diagnosis")
            })
            .build()?,
        Section::builder("sourceOfInformation", "14. Source of Information")
            .discriminator(
                "sourceInfo.source",
                "Source",
                DiscriminatorKind::InformationSource,
            )
            .branch(&from_corporation, |b| {
                b.field(
                    "sourceInfo.corporationDetails.unitName",
                    "Corporation Unit/Zilla Panchayat Name",
                )
                .field("sourceInfo.corporationDetails.code", "Corporation Unit Code")
                .field(
                    "sourceInfo.corporationDetails.registrationNo",
                    "Corporation Registration Number",
                )
                .date(
                    "sourceInfo.corporationDetails.dateOfRegistration",
                    "Corporation Date of Registration",
                )
            })
            .branch(&from_hospital, |b| {
                b.field("sourceInfo.hospitalDetails.code", "Hospital Code")
                    .field(
                        "sourceInfo.hospitalDetails.registrationNo",
                        "Hospital Registration Number",
                    )
                    .date(
                        "sourceInfo.hospitalDetails.dateOfRegistration",
                        "Hospital Date of Registration",
                    )
            })
            .build()?,
        Section::builder("matchedDeaths", "15. For Matched Deaths")
            .field("matchedDeaths.incidenceRegNo", "Incidence Registration Number")
            .date("matchedDeaths.dateOfFirstDiagnosis", "Date of First Diagnosis")
            .build()?,
        Section::builder("completion", "16. Form Completion")
            .field("completedBy", "Name of Person Completing Form")
            .date("completionDate", "Date of Completion")
            .build()?,
    ])
}

pub(crate) fn groups() -> FormResult<Vec<AtLeastOneGroup>> {
    Ok(vec![name_group("At least one name of the deceased is required")?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::assert_sections_are_classified;
    use crate::record::FormRecord;
    use oncoreg_types::FieldPath;
    use serde_json::json;

    #[test]
    fn every_section_field_is_classified() {
        let table = table().expect("mortality table");
        let sections = sections().expect("mortality sections");
        assert_sections_are_classified(&table, &sections);
    }

    #[test]
    fn source_of_information_gates_both_detail_blocks() {
        let sections = sections().expect("mortality sections");
        let corporation = FieldPath::parse("sourceInfo.corporationDetails.code").expect("path");
        let hospital = FieldPath::parse("sourceInfo.hospitalDetails.code").expect("path");

        let both = FormRecord::from_value(json!({ "sourceInfo": { "source": "3" } }))
            .expect("record");
        assert!(sections.is_field_active(&corporation, &both));
        assert!(sections.is_field_active(&hospital, &both));

        let hospital_only =
            FormRecord::from_value(json!({ "sourceInfo": { "source": "hospital" } }))
                .expect("record");
        assert!(!sections.is_field_active(&corporation, &hospital_only));
        assert!(sections.is_field_active(&hospital, &hospital_only));
    }
}
