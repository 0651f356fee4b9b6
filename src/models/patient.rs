//! Patient record documents (`patients/{id}`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::Severity;

/// One diagnosis line on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisEntry {
    pub diagnosis: String,
    pub severity: Severity,
    #[serde(default)]
    pub notes: String,
}

/// Vital signs captured as entered (free-text units, e.g. "120/80").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<String>,
}

/// Fields a doctor or secretary fills in when creating or editing a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisEntry>,
    #[serde(flatten)]
    pub vitals: Vitals,
}

/// A stored patient record.
///
/// `history` is the append-only archive of pre-update snapshots: each update
/// pushes the prior version (minus its own history) before applying new
/// values. Entries are kept as raw JSON so old shapes survive model changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Document key, duplicated into the document as `patientId`.
    #[serde(rename = "patientId", default)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub age: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub telephone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisEntry>,
    #[serde(flatten)]
    pub vitals: Vitals,
    /// Display string of the author ("email" in the original intake form).
    #[serde(default)]
    pub added_by: String,
    /// Account id of the author. Absent on malformed documents; visibility
    /// fails closed for non-admins when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Account ids explicitly granted access at creation time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Value>,
}

impl PatientRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply an edit in place. History archiving happens in the record
    /// service before this is called.
    pub fn apply(&mut self, draft: PatientDraft) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.gender = draft.gender;
        self.age = draft.age;
        self.birthdate = draft.birthdate;
        self.telephone = draft.telephone;
        self.address = draft.address;
        self.diagnoses = draft.diagnoses;
        self.vitals = draft.vitals;
    }
}
