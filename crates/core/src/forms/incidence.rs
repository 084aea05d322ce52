//! Core Form – Incidence Data (patient registration).
//!
//! Classifications follow the paper form's colouring: red items are mandatory, blue items
//! recommended and black items optional.

use crate::classification::ClassificationTable;
use crate::discriminator::{
    Branch, DiagnosisMethod, DiscriminatorKind, ResidenceType, StagingSystem, TreatmentReceived,
};
use crate::sections::{Section, SectionSet};
use crate::validation::AtLeastOneGroup;
use crate::FormResult;
use oncoreg_types::Classification::{Mandatory, Optional, Recommended};

use super::{address, name_group, relative};

pub(crate) fn table() -> FormResult<ClassificationTable> {
    ClassificationTable::builder()
        // 1-2. Centre and registration number
        .field("centreName", Mandatory)
        .field("centreCode", Mandatory)
        .group("registrationNumber", |g| {
            g.field("year", Mandatory).field("regNo", Mandatory)
        })
        // 3. Source of registration
        .group("sourceRegistration", |g| {
            g.field("name", Mandatory)
                .field("code", Mandatory)
                .field("department", Recommended)
                .field("departmentCode", Recommended)
                .field("physician", Recommended)
                .field("mobileNo", Recommended)
        })
        .field("hospitalRegNo", Mandatory)
        .field("dateOfRegistration", Recommended)
        .field("caseRegisteredAs", Recommended)
        // 4. Other sources
        .repeated("otherSources", |item| {
            item.field("code", Optional)
                .field("hospitalNo", Optional)
                .field("date", Optional)
        })
        .field("dateOfFirstDiagnosis", Mandatory)
        // 6. Patient
        .group("fullName", |g| {
            g.field("first", Mandatory)
                .field("second", Recommended)
                .field("last", Recommended)
        })
        .field("aadhaar", Recommended)
        // 7. Relatives
        .group("relativeInfo", |g| {
            ["father", "mother", "spouse", "son", "daughter"]
                .into_iter()
                .fold(g, |g, kin| g.group(kin, relative))
                .group("others", |o| relative(o).field("relation", Optional))
        })
        .field("relativeCode", Optional)
        // 8. Place of residence
        .group("placeOfResidence", |g| {
            g.field("type", Mandatory)
                .group("urban", |u| {
                    u.field("houseNo", Recommended)
                        .field("roadName", Recommended)
                        .field("areaLocality", Recommended)
                        .field("wardNumber", Mandatory)
                        .field("cityTown", Recommended)
                        .field("district", Mandatory)
                        .field("pinCode", Mandatory)
                })
                .group("rural", |r| {
                    r.field("houseNoAndWard", Recommended)
                        .field("gramPanchayat", Recommended)
                        .field("subUnitDistrict", Recommended)
                        .field("phcName", Recommended)
                        .field("district", Mandatory)
                        .field("pinCode", Mandatory)
                })
                .group("contactInfo", |c| {
                    c.group("telephone", |t| {
                        t.field("office", Recommended).field("residence", Recommended)
                    })
                    .field("mobile", Recommended)
                    .field("email", Recommended)
                })
        })
        .field("durationOfStay", Mandatory)
        // 10-11. Other addresses and place of birth
        .group("otherAddresses", |g| {
            g.group("local", address)
                .group("office", address)
                .group("native", address)
        })
        .group("placeOfBirth", address)
        // 12-14. Age and sex
        .field("age", Mandatory)
        .field("dateofBirth", Optional)
        .field("ageEstimatedBy", Optional)
        .field("sex", Mandatory)
        // 15-19. Basic demographics
        .field("maritalStatus", Optional)
        .field("motherTongue", Optional)
        .field("religion", Optional)
        .field("otherReligion", Optional)
        .field("culturalBackground", Optional)
        .field("education", Optional)
        // 20-27. Diagnostic details
        .field("diagnosticStatus", Optional)
        .group("methodOfDiagnosis", |g| {
            g.field("primaryMethod", Mandatory)
                .field("secondaryMethod", Mandatory)
        })
        .field("anatomicalSite", Optional)
        .group("pathologicalDiagnosis", |g| {
            g.field("primarySite", Mandatory)
                .field("morphology", Mandatory)
                .field("slideNo", Recommended)
                .field("slideDate", Recommended)
        })
        .group("icdCoding", |g| {
            g.field("primarySite", Mandatory)
                .field("primaryHistology", Mandatory)
                .field("secondarySite", Recommended)
                .field("morphologyMetastasis", Recommended)
        })
        .field("siteOfTumour", Mandatory)
        .field("laterality", Optional)
        .field("sequence", Recommended)
        // 28-31. Clinical stage and treatment
        .field("clinicalExtent", Mandatory)
        .field("stagingSystem", Mandatory)
        .group("tnm", |g| {
            g.field("t", Recommended)
                .field("n", Recommended)
                .field("m", Recommended)
        })
        .field("compositeStage", Recommended)
        .field("intentionToTreat", Optional)
        .group("cancerDirectedTreatment", |g| {
            g.field("received", Recommended)
                .field("dateOfCommencement", Recommended)
                .field("typeOfTreatment", Recommended)
                .field("dateOfCompletion", Recommended)
        })
        // 32-35. Follow-up and completion
        .field("dateOfLastContact", Recommended)
        .field("dateOfDeath", Recommended)
        .field("mortalityRegNo", Optional)
        .field("personCompletingForm", Mandatory)
        .field("dateOfCompletion", Mandatory)
        .field("sourceOfInformation", Optional)
        .build()
}

pub(crate) fn sections() -> FormResult<SectionSet> {
    let urban = Branch::Residence(ResidenceType::Urban);
    let rural = Branch::Residence(ResidenceType::Rural);

    SectionSet::new(vec![
        Section::builder("centre", "Participating Centre")
            .field("centreName", "Name of Participating Centre")
            .field("centreCode", "Centre Code")
            .digits("registrationNumber.year", "Registration Year", 2)
            .digits("registrationNumber.regNo", "Registration Number", 5)
            .build()?,
        Section::builder("sourceOfRegistration", "3. Source of Registration")
            .field("sourceRegistration.name", "Name of Source of Registration")
            .field("sourceRegistration.code", "Source Code")
            .field("sourceRegistration.department", "Department/Unit")
            .field("sourceRegistration.departmentCode", "Department Code")
            .field("sourceRegistration.physician", "Physician Name")
            .digits("sourceRegistration.mobileNo", "Physician Mobile Number", 10)
            .field("hospitalRegNo", "Hospital Registration Number")
            .date("dateOfRegistration", "Date of Registration")
            .field("caseRegisteredAs", "Case Registered As")
            .build()?,
        Section::builder("otherSources", "4. Other Sources of Registration")
            .field("otherSources[].code", "Source Code")
            .field("otherSources[].hospitalNo", "Hospital/LAB/NH No.")
            .date("otherSources[].date", "Date")
            .build()?,
        Section::builder("firstDiagnosis", "5. Date of First Diagnosis")
            .date("dateOfFirstDiagnosis", "Date of First Diagnosis")
            .build()?,
        Section::builder("patientName", "6. Name of Patient")
            .field("fullName.first", "First Name")
            .field("fullName.second", "Second Name")
            .field("fullName.last", "Last Name")
            .digits("aadhaar", "Aadhaar (Unique Identification) Number", 12)
            .build()?,
        Section::builder("relatives", "7. Relative / Next of Kin")
            .field("relativeInfo.father.name", "Father's Name")
            .digits("relativeInfo.father.mobile", "Father's Mobile Number", 10)
            .field("relativeInfo.mother.name", "Mother's Name")
            .digits("relativeInfo.mother.mobile", "Mother's Mobile Number", 10)
            .field("relativeInfo.spouse.name", "Spouse's Name")
            .digits("relativeInfo.spouse.mobile", "Spouse's Mobile Number", 10)
            .field("relativeInfo.son.name", "Son's Name")
            .digits("relativeInfo.son.mobile", "Son's Mobile Number", 10)
            .field("relativeInfo.daughter.name", "Daughter's Name")
            .digits("relativeInfo.daughter.mobile", "Daughter's Mobile Number", 10)
            .field("relativeInfo.others.name", "Other Relative's Name")
            .digits("relativeInfo.others.mobile", "Other Relative's Mobile Number", 10)
            .field("relativeInfo.others.relation", "Relation")
            .field("relativeCode", "Code of Relative/Next of Kin")
            .build()?,
        Section::builder("residence", "8. Place of Residence")
            .discriminator(
                "placeOfResidence.type",
                "Place of Residence",
                DiscriminatorKind::Residence,
            )
            .branch(&[urban], |b| {
                b.field("placeOfResidence.urban.houseNo", "House No.")
                    .field("placeOfResidence.urban.roadName", "Road/Street Name")
                    .field("placeOfResidence.urban.areaLocality", "Area/Locality")
                    .field("placeOfResidence.urban.wardNumber", "Ward/Corporation/Division")
                    .field("placeOfResidence.urban.cityTown", "City/Town")
                    .field("placeOfResidence.urban.district", "District")
                    .digits("placeOfResidence.urban.pinCode", "PIN Code", 6)
            })
            .branch(&[rural], |b| {
                b.field("placeOfResidence.rural.houseNoAndWard", "House No. and Ward")
                    .field(
                        "placeOfResidence.rural.gramPanchayat",
                        "Name of Gram Panchayat/Village",
                    )
                    .field("placeOfResidence.rural.subUnitDistrict", "Name of Sub-Unit of District")
                    .field("placeOfResidence.rural.phcName", "Name of PHC/Sub Centre")
                    .field("placeOfResidence.rural.district", "District")
                    .digits("placeOfResidence.rural.pinCode", "PIN Code", 6)
            })
            .field("placeOfResidence.contactInfo.telephone.office", "Telephone (Office)")
            .field("placeOfResidence.contactInfo.telephone.residence", "Telephone (Residence)")
            .digits("placeOfResidence.contactInfo.mobile", "Mobile", 10)
            .field("placeOfResidence.contactInfo.email", "Email")
            .build()?,
        Section::builder("durationOfStay", "9. Duration of Stay")
            .field("durationOfStay", "Duration of Stay (in years)")
            .build()?,
        Section::builder("otherAddresses", "10. Other Addresses")
            .field("otherAddresses.local.address", "Local Address")
            .field("otherAddresses.local.cityTownDistrict", "Local City/Town/District")
            .digits("otherAddresses.local.pinCode", "Local PIN Code", 6)
            .field("otherAddresses.office.address", "Office Address")
            .field("otherAddresses.office.cityTownDistrict", "Office City/Town/District")
            .digits("otherAddresses.office.pinCode", "Office PIN Code", 6)
            .field("otherAddresses.native.address", "Native Address")
            .field("otherAddresses.native.cityTownDistrict", "Native City/Town/District")
            .digits("otherAddresses.native.pinCode", "Native PIN Code", 6)
            .build()?,
        Section::builder("placeOfBirth", "11. Place of Birth")
            .field("placeOfBirth.address", "Address")
            .field("placeOfBirth.cityTownDistrict", "City/Town/District")
            .digits("placeOfBirth.pinCode", "PIN Code", 6)
            .build()?,
        Section::builder("ageAndSex", "Age and Sex")
            .field("age", "Age (in years)")
            .date("dateofBirth", "Date of Birth")
            .field("ageEstimatedBy", "Age Estimated By")
            .field("sex", "Sex")
            .build()?,
        Section::builder("demographics", "Basic Demographics")
            .field("maritalStatus", "Marital Status")
            .field("motherTongue", "Mother Tongue")
            .field("religion", "Religion")
            .field("otherReligion", "Other Religion")
            .field("culturalBackground", "Cultural Group / Background")
            .field("education", "Education")
            .build()?,
        Section::builder("diagnosticStatus", "20. Diagnostic Status")
            .field("diagnosticStatus", "Diagnostic Status at Registration at RI")
            .build()?,
        Section::builder("methodOfDiagnosis", "21. Method of Diagnosis")
            .discriminator(
                "methodOfDiagnosis.primaryMethod",
                "Primary Method",
                DiscriminatorKind::Diagnosis,
            )
            .build()?,
        Section::builder("microscopicMethod", "Microscopic Methods")
            .gated_by(
                "methodOfDiagnosis",
                &[Branch::Diagnosis(DiagnosisMethod::Microscopic)],
            )
            .discriminator(
                "methodOfDiagnosis.secondaryMethod",
                "Microscopic Methods",
                DiscriminatorKind::Microscopic,
            )
            .build()?,
        Section::builder("imagingMethod", "X-Ray / Imaging Techniques")
            .gated_by("methodOfDiagnosis", &[Branch::Diagnosis(DiagnosisMethod::Xray)])
            .discriminator(
                "methodOfDiagnosis.secondaryMethod",
                "X-Ray / Imaging Techniques",
                DiscriminatorKind::Imaging,
            )
            .build()?,
        Section::builder("otherMethod", "Other Methods")
            .gated_by("methodOfDiagnosis", &[Branch::Diagnosis(DiagnosisMethod::Others)])
            .discriminator(
                "methodOfDiagnosis.secondaryMethod",
                "Other Methods",
                DiscriminatorKind::OtherMethod,
            )
            .build()?,
        Section::builder("anatomicalSite", "22. Anatomical Site")
            .field("anatomicalSite", "Anatomical Site of Specimen/Biopsy/Smear")
            .build()?,
        Section::builder("pathologicalDiagnosis", "23. Pathological Diagnosis")
            .field("pathologicalDiagnosis.primarySite", "Primary Site of Tumour - Topography")
            .field("pathologicalDiagnosis.morphology", "Morphology")
            .field("pathologicalDiagnosis.slideNo", "Pathology Slide No.")
            .date("pathologicalDiagnosis.slideDate", "Pathology Slide Date")
            .build()?,
        Section::builder("icdCoding", "24. ICD-O-3 Coding")
            .field("icdCoding.primarySite", "ICD-O-3 Primary Site - Topography")
            .field("icdCoding.primaryHistology", "ICD-O-3 Primary Histology - Morphology")
            .field("icdCoding.secondarySite", "Secondary Site of Tumour")
            .field("icdCoding.morphologyMetastasis", "Morphology of Metastasis")
            .build()?,
        Section::builder("tumourSite", "25-27. Site of Tumour")
            .field("siteOfTumour", "Site of Tumour (ICD-10)")
            .field("laterality", "Laterality")
            .field("sequence", "Sequence")
            .build()?,
        Section::builder("clinicalExtent", "28. Clinical Extent of Disease")
            .field("clinicalExtent", "Clinical Extent of Disease Before Treatment")
            .build()?,
        Section::builder("staging", "29. Staging")
            .discriminator(
                "stagingSystem",
                "Staging System Followed",
                DiscriminatorKind::Staging,
            )
            .branch(&[Branch::Staging(StagingSystem::Tnm)], |b| {
                b.field("tnm.t", "T").field("tnm.n", "N").field("tnm.m", "M")
            })
            .field("compositeStage", "Composite Stage")
            .build()?,
        Section::builder("intentionToTreat", "30. Intention to Treat")
            .field("intentionToTreat", "Intention to Treat at RI")
            .build()?,
        Section::builder("treatment", "31. Cancer Directed Treatment")
            .discriminator(
                "cancerDirectedTreatment.received",
                "Cancer Directed Treatment Received",
                DiscriminatorKind::Treatment,
            )
            .branch(&[Branch::Treatment(TreatmentReceived::Yes)], |b| {
                b.date(
                    "cancerDirectedTreatment.dateOfCommencement",
                    "Date of Commencement",
                )
                .field(
                    "cancerDirectedTreatment.typeOfTreatment",
                    "Type of Treatment Given",
                )
                .date("cancerDirectedTreatment.dateOfCompletion", "Date of Completion")
            })
            .build()?,
        Section::builder("followUp", "Follow-up")
            .date("dateOfLastContact", "Date of Last Contact")
            .date("dateOfDeath", "Date of Death")
            .field("mortalityRegNo", "Mortality Registration Number")
            .build()?,
        Section::builder("completion", "35. Form Completion")
            .field("personCompletingForm", "Name of Person Completing Form")
            .date("dateOfCompletion", "Date of Completion")
            .field("sourceOfInformation", "Source of Information")
            .build()?,
    ])
}

pub(crate) fn groups() -> FormResult<Vec<AtLeastOneGroup>> {
    Ok(vec![name_group("At least one name of the patient is required")?])
}
