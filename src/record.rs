use serde::Serialize;
use serde_json::Value;

use crate::constants::UNKNOWN_NAME;
use crate::item::Item;
use crate::parse::parse;
use crate::resolver::{Row, resolve};
use crate::schema::LogicalField;

/// One physician, normalized from one source row. Built once per load and
/// only read afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Record {
    pub name: Option<String>,
    pub npi: Option<String>,
    pub work_history: Vec<Item>,
    pub residency: Vec<Item>,
    pub medical_school: Vec<Item>,
    pub emails: Vec<Item>,
    pub insurance: Vec<Item>,
    pub linkedin_url: Option<String>,
    pub doximity_url: Option<String>,
    pub license_state: Option<String>,
}

impl Record {
    pub fn from_row<R: Row + ?Sized>(row: &R) -> Self {
        Self {
            name: scalar_field(row, LogicalField::Name),
            npi: scalar_field(row, LogicalField::Npi),
            work_history: collection_field(row, LogicalField::WorkHistory),
            residency: collection_field(row, LogicalField::Residency),
            medical_school: collection_field(row, LogicalField::MedicalSchool),
            emails: collection_field(row, LogicalField::Emails),
            insurance: collection_field(row, LogicalField::Insurance),
            linkedin_url: url_field(row, LogicalField::LinkedinUrl),
            doximity_url: url_field(row, LogicalField::DoximityUrl),
            license_state: scalar_field(row, LogicalField::LicenseState),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }

    /// Name or NPI, whichever resolved.
    pub fn row_key(&self) -> Option<&str> {
        self.name.as_deref().or(self.npi.as_deref())
    }

    pub fn collection(&self, field: LogicalField) -> &[Item] {
        match field {
            LogicalField::WorkHistory => &self.work_history,
            LogicalField::Residency => &self.residency,
            LogicalField::MedicalSchool => &self.medical_school,
            LogicalField::Emails => &self.emails,
            LogicalField::Insurance => &self.insurance,
            _ => &[],
        }
    }
}

// Kept verbatim: identifiers such as NPIs must not lose leading zeros.
fn scalar_field<R: Row + ?Sized>(row: &R, field: LogicalField) -> Option<String> {
    resolve(row, field.aliases()).map(value_text)
}

fn url_field<R: Row + ?Sized>(row: &R, field: LogicalField) -> Option<String> {
    scalar_field(row, field).map(|url| url.trim().to_string())
}

fn collection_field<R: Row + ?Sized>(row: &R, field: LogicalField) -> Vec<Item> {
    resolve(row, field.aliases()).map(parse).unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
