//! Closed code lists for the fields that select a conditional branch.
//!
//! Each discriminator is a plain enum carrying its paper-form code (`"2"`) and a stable
//! variant name (`"microscopic"`). Record values are resolved with [`DiscriminatorKind::resolve`],
//! which accepts either spelling; anything else resolves to `None`.

use serde::Serialize;
use std::fmt;

macro_rules! discriminator {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Paper-form code stored in the record.
            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Resolves a record value given as code or (case-insensitive) name.
            pub fn from_code(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.code() == value || v.name().eq_ignore_ascii_case(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

discriminator! {
    /// Item 8: urban or non-urban place of residence.
    ResidenceType {
        Urban => ("urban", "urban"),
        Rural => ("rural", "rural"),
    }
}

discriminator! {
    /// Item 21: primary method of diagnosis.
    DiagnosisMethod {
        ClinicalOnly => ("1", "clinicalOnly"),
        Microscopic => ("2", "microscopic"),
        Xray => ("3", "xray"),
        Dco => ("4", "dco"),
        Others => ("8", "others"),
        Unknown => ("9", "unknown"),
    }
}

discriminator! {
    MicroscopicMethod {
        HistologyOfPrimary => ("1", "histologyOfPrimary"),
        HistologyOfMetastasis => ("2", "histologyOfMetastasis"),
        AutopsyWithHistology => ("3", "autopsyWithHistology"),
        BoneMarrow => ("4", "boneMarrow"),
        BloodFilm => ("5", "bloodFilm"),
        CytologyOfPrimary => ("6", "cytologyOfPrimary"),
        CytologyOfMetastasis => ("7", "cytologyOfMetastasis"),
    }
}

discriminator! {
    ImagingTechnique {
        XRay => ("1", "xRay"),
        Isotopes => ("2", "isotopes"),
        Angiography => ("3", "angiography"),
        Ultrasonogram => ("4", "ultrasonogram"),
        CtScan => ("5", "ctScan"),
        Mri => ("6", "mri"),
        PetScan => ("7", "petScan"),
        AllOthers => ("8", "allOthers"),
    }
}

discriminator! {
    OtherMethod {
        Endoscopy => ("1", "endoscopy"),
        SurgeryWithoutHistology => ("2", "surgeryWithoutHistology"),
        BiochemicalTests => ("3", "biochemicalTests"),
        ImmunologicalTests => ("4", "immunologicalTests"),
        FlowCytometry => ("5", "flowCytometry"),
        TumourMarkers => ("6", "tumourMarkers"),
        GeneticStudies => ("7", "geneticStudies"),
        Others => ("8", "others"),
    }
}

discriminator! {
    /// Item 29.1: staging system followed.
    StagingSystem {
        Tnm => ("1", "tnm"),
        Figo => ("2", "figo"),
        AnnArbor => ("3", "annArbor"),
        NotApplicable => ("4", "notApplicable"),
        Others => ("8", "others"),
        Unknown => ("9", "unknown"),
    }
}

discriminator! {
    /// Item 31: cancer directed treatment received.
    TreatmentReceived {
        Yes => ("1", "yes"),
        No => ("2", "no"),
        AdvisedNotAccepted => ("3", "advisedNotAccepted"),
        Incomplete => ("4", "incomplete"),
        Unknown => ("9", "unknown"),
    }
}

discriminator! {
    PlaceOfDeath {
        Hospital => ("1", "hospital"),
        NursingHome => ("2", "nursingHome"),
        Residence => ("3", "residence"),
        Others => ("4", "others"),
    }
}

discriminator! {
    CauseOfDeath {
        DueToCancer => ("1", "dueToCancer"),
        OtherWithCancer => ("2", "otherWithCancer"),
        OtherWithoutCancer => ("3", "otherWithoutCancer"),
    }
}

discriminator! {
    /// Mortality item 14: where the death was reported from.
    InformationSource {
        Corporation => ("1", "corporation"),
        Hospital => ("2", "hospital"),
        Both => ("3", "both"),
        ActiveFollowUp => ("4", "activeFollowUp"),
        HomeVisits => ("5", "homeVisits"),
        Others => ("6", "others"),
    }
}

/// The code list a section's discriminator is resolved against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiscriminatorKind {
    Residence,
    Diagnosis,
    Microscopic,
    Imaging,
    OtherMethod,
    Staging,
    Treatment,
    PlaceOfDeath,
    CauseOfDeath,
    InformationSource,
}

impl DiscriminatorKind {
    pub fn resolve(self, value: &str) -> Option<Branch> {
        match self {
            DiscriminatorKind::Residence => ResidenceType::from_code(value).map(Branch::Residence),
            DiscriminatorKind::Diagnosis => {
                DiagnosisMethod::from_code(value).map(Branch::Diagnosis)
            }
            DiscriminatorKind::Microscopic => {
                MicroscopicMethod::from_code(value).map(Branch::Microscopic)
            }
            DiscriminatorKind::Imaging => ImagingTechnique::from_code(value).map(Branch::Imaging),
            DiscriminatorKind::OtherMethod => {
                OtherMethod::from_code(value).map(Branch::OtherMethod)
            }
            DiscriminatorKind::Staging => StagingSystem::from_code(value).map(Branch::Staging),
            DiscriminatorKind::Treatment => {
                TreatmentReceived::from_code(value).map(Branch::Treatment)
            }
            DiscriminatorKind::PlaceOfDeath => {
                PlaceOfDeath::from_code(value).map(Branch::PlaceOfDeath)
            }
            DiscriminatorKind::CauseOfDeath => {
                CauseOfDeath::from_code(value).map(Branch::CauseOfDeath)
            }
            DiscriminatorKind::InformationSource => {
                InformationSource::from_code(value).map(Branch::InformationSource)
            }
        }
    }

    /// Accepted codes, for error messages.
    pub fn codes(self) -> Vec<&'static str> {
        fn codes_of<T: Copy>(all: &[T], code: fn(T) -> &'static str) -> Vec<&'static str> {
            all.iter().copied().map(code).collect()
        }

        match self {
            DiscriminatorKind::Residence => codes_of(ResidenceType::ALL, ResidenceType::code),
            DiscriminatorKind::Diagnosis => codes_of(DiagnosisMethod::ALL, DiagnosisMethod::code),
            DiscriminatorKind::Microscopic => {
                codes_of(MicroscopicMethod::ALL, MicroscopicMethod::code)
            }
            DiscriminatorKind::Imaging => codes_of(ImagingTechnique::ALL, ImagingTechnique::code),
            DiscriminatorKind::OtherMethod => codes_of(OtherMethod::ALL, OtherMethod::code),
            DiscriminatorKind::Staging => codes_of(StagingSystem::ALL, StagingSystem::code),
            DiscriminatorKind::Treatment => {
                codes_of(TreatmentReceived::ALL, TreatmentReceived::code)
            }
            DiscriminatorKind::PlaceOfDeath => codes_of(PlaceOfDeath::ALL, PlaceOfDeath::code),
            DiscriminatorKind::CauseOfDeath => codes_of(CauseOfDeath::ALL, CauseOfDeath::code),
            DiscriminatorKind::InformationSource => {
                codes_of(InformationSource::ALL, InformationSource::code)
            }
        }
    }
}

/// An active branch: the resolved value of one discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Branch {
    Residence(ResidenceType),
    Diagnosis(DiagnosisMethod),
    Microscopic(MicroscopicMethod),
    Imaging(ImagingTechnique),
    OtherMethod(OtherMethod),
    Staging(StagingSystem),
    Treatment(TreatmentReceived),
    PlaceOfDeath(PlaceOfDeath),
    CauseOfDeath(CauseOfDeath),
    InformationSource(InformationSource),
}

impl Branch {
    pub fn kind(self) -> DiscriminatorKind {
        match self {
            Branch::Residence(_) => DiscriminatorKind::Residence,
            Branch::Diagnosis(_) => DiscriminatorKind::Diagnosis,
            Branch::Microscopic(_) => DiscriminatorKind::Microscopic,
            Branch::Imaging(_) => DiscriminatorKind::Imaging,
            Branch::OtherMethod(_) => DiscriminatorKind::OtherMethod,
            Branch::Staging(_) => DiscriminatorKind::Staging,
            Branch::Treatment(_) => DiscriminatorKind::Treatment,
            Branch::PlaceOfDeath(_) => DiscriminatorKind::PlaceOfDeath,
            Branch::CauseOfDeath(_) => DiscriminatorKind::CauseOfDeath,
            Branch::InformationSource(_) => DiscriminatorKind::InformationSource,
        }
    }

    /// Variant name of the resolved value, e.g. `urban` or `tnm`.
    pub fn name(self) -> &'static str {
        match self {
            Branch::Residence(v) => v.name(),
            Branch::Diagnosis(v) => v.name(),
            Branch::Microscopic(v) => v.name(),
            Branch::Imaging(v) => v.name(),
            Branch::OtherMethod(v) => v.name(),
            Branch::Staging(v) => v.name(),
            Branch::Treatment(v) => v.name(),
            Branch::PlaceOfDeath(v) => v.name(),
            Branch::CauseOfDeath(v) => v.name(),
            Branch::InformationSource(v) => v.name(),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Branch::Residence(v) => v.code(),
            Branch::Diagnosis(v) => v.code(),
            Branch::Microscopic(v) => v.code(),
            Branch::Imaging(v) => v.code(),
            Branch::OtherMethod(v) => v.code(),
            Branch::Staging(v) => v.code(),
            Branch::Treatment(v) => v.code(),
            Branch::PlaceOfDeath(v) => v.code(),
            Branch::CauseOfDeath(v) => v.code(),
            Branch::InformationSource(v) => v.code(),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Branch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_codes_and_names() {
        assert_eq!(
            DiscriminatorKind::Diagnosis.resolve("2"),
            Some(Branch::Diagnosis(DiagnosisMethod::Microscopic))
        );
        assert_eq!(
            DiscriminatorKind::Diagnosis.resolve("Microscopic"),
            Some(Branch::Diagnosis(DiagnosisMethod::Microscopic))
        );
        assert_eq!(
            DiscriminatorKind::Staging.resolve(" 1 "),
            Some(Branch::Staging(StagingSystem::Tnm))
        );
        assert_eq!(
            DiscriminatorKind::Residence.resolve("RURAL"),
            Some(Branch::Residence(ResidenceType::Rural))
        );
    }

    #[test]
    fn unknown_values_resolve_to_none() {
        assert_eq!(DiscriminatorKind::Residence.resolve("suburban"), None);
        assert_eq!(DiscriminatorKind::Residence.resolve(""), None);
        assert_eq!(DiscriminatorKind::Diagnosis.resolve("5"), None);
        assert_eq!(DiscriminatorKind::Treatment.resolve("maybe"), None);
    }

    #[test]
    fn code_lists_match_the_paper_form() {
        assert_eq!(MicroscopicMethod::ALL.len(), 7);
        assert_eq!(ImagingTechnique::ALL.len(), 8);
        assert_eq!(OtherMethod::ALL.len(), 8);
        assert_eq!(
            DiscriminatorKind::Diagnosis.codes(),
            vec!["1", "2", "3", "4", "8", "9"]
        );
        assert_eq!(DiscriminatorKind::CauseOfDeath.codes(), vec!["1", "2", "3"]);
    }

    #[test]
    fn branches_report_their_kind() {
        for kind in [
            DiscriminatorKind::Residence,
            DiscriminatorKind::Diagnosis,
            DiscriminatorKind::Microscopic,
            DiscriminatorKind::Imaging,
            DiscriminatorKind::OtherMethod,
            DiscriminatorKind::Staging,
            DiscriminatorKind::Treatment,
            DiscriminatorKind::PlaceOfDeath,
            DiscriminatorKind::CauseOfDeath,
            DiscriminatorKind::InformationSource,
        ] {
            for code in kind.codes() {
                let branch = kind.resolve(code).expect("declared code resolves");
                assert_eq!(branch.kind(), kind);
                assert_eq!(branch.code(), code);
            }
        }
    }

    #[test]
    fn branches_serialise_by_name() {
        let json = serde_json::to_string(&Branch::Staging(StagingSystem::Tnm)).expect("json");
        assert_eq!(json, "\"tnm\"");
    }
}
