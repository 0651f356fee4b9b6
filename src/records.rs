//! Patient and prescription operations.
//!
//! Create/update/delete against the `patients` and `prescriptions`
//! collections, guarded by the same role and visibility checks the filter
//! applies, with exactly one audit entry per applied mutation. Patient
//! updates archive the pre-update snapshot into the record's history before
//! new values land; prescription edits are full overwrites with no archive.

use chrono::Utc;

use crate::audit;
use crate::config;
use crate::error::CoreError;
use crate::identity::{load_accounts, resolve_identity, ResolvedIdentity};
use crate::models::{
    Account, LogKind, PatientDraft, PatientRecord, PrescriptionDraft, PrescriptionRecord, Role,
};
use crate::store::DocumentStore;
use crate::visibility::can_view;

/// Resolve the acting principal and its account document.
async fn actor_context<S: DocumentStore>(
    store: &S,
    actor_id: &str,
) -> Result<(ResolvedIdentity, Account), CoreError> {
    if actor_id.is_empty() {
        return Err(CoreError::NotAuthenticated);
    }
    let accounts = load_accounts(store).await?;
    let identity = resolve_identity(actor_id, &accounts);
    let account = accounts
        .get(actor_id)
        .cloned()
        .ok_or_else(|| CoreError::not_authorized("account not provisioned"))?;
    Ok((identity, account))
}

async fn load_patient<S: DocumentStore>(
    store: &S,
    patient_id: &str,
) -> Result<PatientRecord, CoreError> {
    let doc = store
        .read(&config::patient_path(patient_id))
        .await?
        .ok_or_else(|| CoreError::not_found("patient", patient_id))?;
    let mut record: PatientRecord = serde_json::from_value(doc)?;
    record.id = patient_id.to_string();
    Ok(record)
}

async fn load_prescription<S: DocumentStore>(
    store: &S,
    prescription_id: &str,
) -> Result<PrescriptionRecord, CoreError> {
    let doc = store
        .read(&config::prescription_path(prescription_id))
        .await?
        .ok_or_else(|| CoreError::not_found("prescription", prescription_id))?;
    let mut record: PrescriptionRecord = serde_json::from_value(doc)?;
    record.id = prescription_id.to_string();
    Ok(record)
}

/// Decode a `patients` collection snapshot, id set from the key. Documents
/// that fail to decode are skipped rather than poisoning the whole list.
pub fn patients_from_snapshot(snapshot: &serde_json::Value) -> Vec<PatientRecord> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(id, doc)| {
            let mut record: PatientRecord = serde_json::from_value(doc.clone()).ok()?;
            record.id = id.clone();
            Some(record)
        })
        .collect()
}

/// Decode a `prescriptions` collection snapshot, id set from the key.
pub fn prescriptions_from_snapshot(snapshot: &serde_json::Value) -> Vec<PrescriptionRecord> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(id, doc)| {
            let mut record: PrescriptionRecord = serde_json::from_value(doc.clone()).ok()?;
            record.id = id.clone();
            Some(record)
        })
        .collect()
}

// ── Patients ────────────────────────────────────────────────

/// Create a patient record. Doctors and secretaries (and admins) only;
/// `shared_with` is the explicit per-record grant chosen at creation time.
pub async fn create_patient<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    draft: PatientDraft,
    shared_with: Vec<String>,
) -> Result<PatientRecord, CoreError> {
    let (identity, account) = actor_context(store, actor_id).await?;
    if identity.role.is_none() {
        return Err(CoreError::not_authorized(
            "account role does not permit record intake",
        ));
    }

    let mut record = PatientRecord {
        id: store.push_id(),
        first_name: String::new(),
        last_name: String::new(),
        gender: String::new(),
        age: 0,
        birthdate: None,
        telephone: String::new(),
        address: String::new(),
        diagnoses: vec![],
        vitals: Default::default(),
        added_by: account.email.clone(),
        created_by: Some(actor_id.to_string()),
        shared_with,
        created_at: Utc::now().timestamp_millis(),
        updated_by: None,
        updated_at: None,
        history: vec![],
    };
    record.apply(draft);

    store
        .write(
            &config::patient_path(&record.id),
            serde_json::to_value(&record)?,
        )
        .await?;
    tracing::info!(patient = %record.id, actor = actor_id, "patient record created");
    audit::append(
        store,
        LogKind::MedicalRecord,
        format!("Medical Record added by {}", account.display_name()),
    )
    .await?;
    Ok(record)
}

/// Update a patient record, archiving the pre-update snapshot first.
pub async fn update_patient<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    patient_id: &str,
    draft: PatientDraft,
) -> Result<PatientRecord, CoreError> {
    let (identity, account) = actor_context(store, actor_id).await?;
    let mut record = load_patient(store, patient_id).await?;
    if !can_view(&identity, &record) {
        return Err(CoreError::not_authorized("record not visible to principal"));
    }

    // Archive the current version (minus its own history) before the edit.
    let mut snapshot = record.clone();
    snapshot.history = vec![];
    record.history.push(serde_json::to_value(&snapshot)?);

    record.apply(draft);
    record.updated_by = Some(actor_id.to_string());
    record.updated_at = Some(Utc::now().timestamp_millis());

    store
        .write(
            &config::patient_path(patient_id),
            serde_json::to_value(&record)?,
        )
        .await?;
    tracing::info!(patient = patient_id, actor = actor_id, "patient record updated");
    audit::append(
        store,
        LogKind::MedicalRecord,
        format!("Medical Record updated by {}", account.display_name()),
    )
    .await?;
    Ok(record)
}

/// Hard-delete a patient record. Any principal with visibility.
pub async fn delete_patient<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    patient_id: &str,
) -> Result<(), CoreError> {
    let (identity, account) = actor_context(store, actor_id).await?;
    let record = load_patient(store, patient_id).await?;
    if !can_view(&identity, &record) {
        return Err(CoreError::not_authorized("record not visible to principal"));
    }

    store.delete(&config::patient_path(patient_id)).await?;
    tracing::info!(patient = patient_id, actor = actor_id, "patient record deleted");
    audit::append(
        store,
        LogKind::MedicalRecord,
        format!("Record deleted by {}", account.display_name()),
    )
    .await?;
    Ok(())
}

// ── Prescriptions ───────────────────────────────────────────

fn require_prescriber(identity: &ResolvedIdentity) -> Result<(), CoreError> {
    match identity.role {
        Some(Role::Doctor) | Some(Role::Admin) => Ok(()),
        _ => Err(CoreError::not_authorized(
            "only doctors author prescriptions",
        )),
    }
}

/// Author a prescription for a patient record. Doctor (or admin) only; the
/// patient fields are denormalized into the prescription at this moment and
/// never follow later edits to the source record.
pub async fn create_prescription<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    patient_id: &str,
    draft: PrescriptionDraft,
) -> Result<PrescriptionRecord, CoreError> {
    let (identity, account) = actor_context(store, actor_id).await?;
    require_prescriber(&identity)?;
    let patient = load_patient(store, patient_id).await?;
    if !can_view(&identity, &patient) {
        return Err(CoreError::not_authorized("record not visible to principal"));
    }

    let mut record = PrescriptionRecord {
        id: store.push_id(),
        patient_first_name: patient.first_name.clone(),
        patient_last_name: patient.last_name.clone(),
        patient_gender: patient.gender.clone(),
        patient_age: patient.age,
        patient_address: patient.address.clone(),
        diagnoses: vec![],
        drugs: vec![],
        examination: String::new(),
        recommendation: String::new(),
        added_by: account.display_name(),
        specialty_field: account.specialty_field.clone(),
        created_by: Some(actor_id.to_string()),
        doctor_id: actor_id.to_string(),
        created_at: audit::locale_timestamp(),
        updated_by: None,
        updated_at: None,
    };
    record.apply(draft);

    store
        .write(
            &config::prescription_path(&record.id),
            serde_json::to_value(&record)?,
        )
        .await?;
    tracing::info!(
        prescription = %record.id,
        patient = patient_id,
        actor = actor_id,
        "prescription created"
    );
    audit::append(
        store,
        LogKind::Prescription,
        format!("Prescription added by {}", account.display_name()),
    )
    .await?;
    Ok(record)
}

/// Overwrite a prescription's authored content. No history archive.
pub async fn update_prescription<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    prescription_id: &str,
    draft: PrescriptionDraft,
) -> Result<PrescriptionRecord, CoreError> {
    let (identity, account) = actor_context(store, actor_id).await?;
    require_prescriber(&identity)?;
    let mut record = load_prescription(store, prescription_id).await?;
    if !can_view(&identity, &record) {
        return Err(CoreError::not_authorized("record not visible to principal"));
    }

    record.apply(draft);
    record.updated_by = Some(actor_id.to_string());
    record.updated_at = Some(Utc::now().timestamp_millis());

    store
        .write(
            &config::prescription_path(prescription_id),
            serde_json::to_value(&record)?,
        )
        .await?;
    tracing::info!(prescription = prescription_id, actor = actor_id, "prescription updated");
    audit::append(
        store,
        LogKind::Prescription,
        format!("Prescription updated by {}", account.display_name()),
    )
    .await?;
    Ok(record)
}

/// Hard-delete a prescription. Any principal with visibility.
pub async fn delete_prescription<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    prescription_id: &str,
) -> Result<(), CoreError> {
    let (identity, account) = actor_context(store, actor_id).await?;
    let record = load_prescription(store, prescription_id).await?;
    if !can_view(&identity, &record) {
        return Err(CoreError::not_authorized("record not visible to principal"));
    }

    store
        .delete(&config::prescription_path(prescription_id))
        .await?;
    tracing::info!(prescription = prescription_id, actor = actor_id, "prescription deleted");
    audit::append(
        store,
        LogKind::Prescription,
        format!("Prescription deleted by {}", account.display_name()),
    )
    .await?;
    Ok(())
}
