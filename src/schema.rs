//! Column aliases accumulated across export versions, one list per logical field.
//! Order is priority: cleaned columns, then raw, then legacy flat names.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalField {
    Name,
    Npi,
    WorkHistory,
    Residency,
    MedicalSchool,
    Emails,
    Insurance,
    LinkedinUrl,
    DoximityUrl,
    LicenseState,
}

impl LogicalField {
    pub const ALL: [LogicalField; 10] = [
        LogicalField::Name,
        LogicalField::Npi,
        LogicalField::WorkHistory,
        LogicalField::Residency,
        LogicalField::MedicalSchool,
        LogicalField::Emails,
        LogicalField::Insurance,
        LogicalField::LinkedinUrl,
        LogicalField::DoximityUrl,
        LogicalField::LicenseState,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LogicalField::Name => &["cleaned.name", "raw.name", "name", "full_name"],
            LogicalField::Npi => &["cleaned.npi", "raw.npi", "npi", "NPI"],
            LogicalField::WorkHistory => &[
                "cleaned.work_experience",
                "raw.work_experience",
                "work_experience",
            ],
            LogicalField::Residency => &["cleaned.residency", "raw.residency", "residency"],
            LogicalField::MedicalSchool => &[
                "cleaned.medical_school",
                "raw.medical_school",
                "medical_school",
            ],
            LogicalField::Emails => &["cleaned.emails", "raw.emails", "emails"],
            LogicalField::Insurance => &[
                "cleaned.insurance_accepted",
                "raw.insurance_accepted",
                "insurance_accepted",
                "cleaned.insurance",
                "raw.insurance",
                "insurance",
            ],
            LogicalField::LinkedinUrl => &[
                "cleaned.linkedin_url.url",
                "raw.linkedin_url.url",
                "cleaned.linkedin_url",
                "raw.linkedin_url",
                "linkedin_url",
            ],
            LogicalField::DoximityUrl => &[
                "cleaned.doximity_url.url",
                "raw.doximity_url.url",
                "cleaned.doximity_url",
                "raw.doximity_url",
                "doximity_url",
            ],
            LogicalField::LicenseState => &[
                "cleaned.license_state",
                "raw.license_state",
                "license_state",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cleaned_columns_come_first() {
        for field in LogicalField::ALL {
            let first = field.aliases()[0];
            assert!(first.starts_with("cleaned."), "{field:?} starts with {first}");
        }
    }

    #[test]
    fn no_alias_is_shared_between_fields() {
        let mut seen = HashSet::new();
        for field in LogicalField::ALL {
            for alias in field.aliases() {
                assert!(seen.insert(*alias), "{alias} listed twice");
            }
        }
    }
}
