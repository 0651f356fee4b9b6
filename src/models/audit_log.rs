//! Audit log entries (`logs/{id}`).
//!
//! One free-text line per mutating operation. The wire format keeps the
//! original's discriminating field names: the kind of entry is encoded by
//! which of `medicalRecordLog` / `prescriptionLog` / `accountLog` is set.

use serde::{Deserialize, Serialize};

use super::enums::LogKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Document key; not stored inside the document itself.
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_record_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_log: Option<String>,
    /// Locale-formatted timestamp, not canonical. Display ordering parses
    /// it best-effort.
    pub log_time: String,
}

impl AuditLogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>, log_time: String) -> Self {
        let mut entry = Self {
            log_time,
            ..Self::default()
        };
        let message = message.into();
        match kind {
            LogKind::MedicalRecord => entry.medical_record_log = Some(message),
            LogKind::Prescription => entry.prescription_log = Some(message),
            LogKind::Account => entry.account_log = Some(message),
        }
        entry
    }

    pub fn kind(&self) -> Option<LogKind> {
        if self.medical_record_log.is_some() {
            Some(LogKind::MedicalRecord)
        } else if self.prescription_log.is_some() {
            Some(LogKind::Prescription)
        } else if self.account_log.is_some() {
            Some(LogKind::Account)
        } else {
            None
        }
    }

    pub fn message(&self) -> &str {
        self.medical_record_log
            .as_deref()
            .or(self.prescription_log.as_deref())
            .or(self.account_log.as_deref())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_the_populated_field() {
        let entry = AuditLogEntry::new(LogKind::Prescription, "added", "t".into());
        assert_eq!(entry.kind(), Some(LogKind::Prescription));
        assert_eq!(entry.message(), "added");
        assert!(entry.medical_record_log.is_none());
    }

    #[test]
    fn serializes_only_the_populated_field() {
        let entry = AuditLogEntry::new(LogKind::MedicalRecord, "added", "t".into());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["medicalRecordLog"], "added");
        assert!(value.get("prescriptionLog").is_none());
        assert!(value.get("id").is_none());
    }
}
