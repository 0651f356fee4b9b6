pub mod account;
pub mod audit_log;
pub mod enums;
pub mod patient;
pub mod prescription;

pub use account::Account;
pub use audit_log::AuditLogEntry;
pub use enums::{LogKind, Role, Severity};
pub use patient::{DiagnosisEntry, PatientDraft, PatientRecord, Vitals};
pub use prescription::{DrugEntry, PrescriptionDraft, PrescriptionRecord};
