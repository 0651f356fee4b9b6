//! Audit log writes and ordering.
//!
//! Every mutating operation in this crate appends exactly one entry here.
//! Timestamps are the locale-style strings the original log screen showed;
//! display ordering parses them best-effort, newest first.

use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use crate::config;
use crate::error::CoreError;
use crate::models::{AuditLogEntry, LogKind};
use crate::store::DocumentStore;

const TIME_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";

/// Current time in the audit log's display format.
pub fn locale_timestamp() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

/// Append one entry to the `logs` collection.
pub async fn append<S: DocumentStore>(
    store: &S,
    kind: LogKind,
    message: impl Into<String>,
) -> Result<AuditLogEntry, CoreError> {
    let mut entry = AuditLogEntry::new(kind, message, locale_timestamp());
    entry.id = store.push_id();
    store
        .write(&config::log_path(&entry.id), serde_json::to_value(&entry)?)
        .await?;
    tracing::debug!(kind = kind.as_str(), message = entry.message(), "audit entry appended");
    Ok(entry)
}

/// Decode a `logs` collection snapshot into entries, id set from the key.
pub fn entries_from_snapshot(snapshot: &Value) -> Vec<AuditLogEntry> {
    let Some(map) = snapshot.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(id, doc)| {
            let mut entry: AuditLogEntry = serde_json::from_value(doc.clone()).ok()?;
            entry.id = id.clone();
            Some(entry)
        })
        .collect()
}

/// Entries newest first. Unparsable timestamps sort last, in snapshot order.
pub fn sorted_entries(snapshot: &Value) -> Vec<AuditLogEntry> {
    let mut entries = entries_from_snapshot(snapshot);
    entries.sort_by(|a, b| {
        let ta = NaiveDateTime::parse_from_str(&a.log_time, TIME_FORMAT).ok();
        let tb = NaiveDateTime::parse_from_str(&b.log_time, TIME_FORMAT).ok();
        tb.cmp(&ta)
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn append_writes_one_log_document() {
        let store = MemoryStore::new();
        let entry = append(&store, LogKind::MedicalRecord, "Medical Record added by Ana Cruz")
            .await
            .unwrap();

        let logs = store.read(config::LOGS_PATH).await.unwrap().unwrap();
        let map = logs.as_object().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map[&entry.id]["medicalRecordLog"],
            "Medical Record added by Ana Cruz"
        );
    }

    #[test]
    fn sorted_entries_are_newest_first() {
        let snapshot = json!({
            "a": { "medicalRecordLog": "first", "logTime": "01/02/2026, 09:00:00 AM" },
            "b": { "prescriptionLog": "second", "logTime": "01/02/2026, 10:30:00 AM" },
            "c": { "accountLog": "garbled", "logTime": "yesterday-ish" }
        });
        let entries = sorted_entries(&snapshot);
        assert_eq!(entries[0].message(), "second");
        assert_eq!(entries[1].message(), "first");
        assert_eq!(entries[2].message(), "garbled");
    }

    #[test]
    fn locale_timestamp_round_trips_through_sort_format() {
        let stamp = locale_timestamp();
        assert!(NaiveDateTime::parse_from_str(&stamp, TIME_FORMAT).is_ok());
    }
}
