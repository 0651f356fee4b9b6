//! Prescription documents (`prescriptions/{id}`).
//!
//! The patient fields are a denormalized snapshot taken at authoring time —
//! a snapshot, not a reference. Later edits to the source patient record do
//! not flow into existing prescriptions.

use serde::{Deserialize, Serialize};

use super::patient::DiagnosisEntry;

/// One prescribed drug line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugEntry {
    pub medicine: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub unit: String,
}

/// Authored content of a prescription; everything except the patient
/// snapshot and provenance fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDraft {
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisEntry>,
    #[serde(default)]
    pub drugs: Vec<DrugEntry>,
    #[serde(default)]
    pub examination: String,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRecord {
    /// Document key, duplicated into the document as `prescriptionId`.
    #[serde(rename = "prescriptionId", default)]
    pub id: String,
    // Patient snapshot at time of writing.
    pub patient_first_name: String,
    pub patient_last_name: String,
    #[serde(default)]
    pub patient_gender: String,
    #[serde(default)]
    pub patient_age: u32,
    #[serde(default)]
    pub patient_address: String,
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisEntry>,
    #[serde(default)]
    pub drugs: Vec<DrugEntry>,
    #[serde(default)]
    pub examination: String,
    #[serde(default)]
    pub recommendation: String,
    /// Authoring doctor's display name.
    #[serde(default)]
    pub added_by: String,
    /// Authoring doctor's specialty field.
    #[serde(rename = "field", default, skip_serializing_if = "Option::is_none")]
    pub specialty_field: Option<String>,
    /// Account id of the author; same fail-closed handling as patients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Account id of the prescribing doctor.
    #[serde(default)]
    pub doctor_id: String,
    /// Locale-formatted authoring time, as the original wrote it.
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl PrescriptionRecord {
    pub fn patient_display_name(&self) -> String {
        format!("{} {}", self.patient_first_name, self.patient_last_name)
    }

    /// Full overwrite of the authored content. No history archive is kept
    /// for prescriptions.
    pub fn apply(&mut self, draft: PrescriptionDraft) {
        self.diagnoses = draft.diagnoses;
        self.drugs = draft.drugs;
        self.examination = draft.examination;
        self.recommendation = draft.recommendation;
    }
}
