//! Visibility filter.
//!
//! Reduces a raw record collection to what the principal may see. Two grant
//! paths exist and both must be evaluated: the implicit symmetric grant via
//! a confirmed doctor-secretary link, and the explicit asymmetric
//! `sharedWith` grant chosen per record at creation time. Admins see the
//! full collection; everyone else fails closed on records with no author.

use crate::identity::ResolvedIdentity;
use crate::models::{PatientRecord, PrescriptionRecord};

/// A record subject to owner/share based visibility.
pub trait OwnedRecord {
    fn created_by(&self) -> Option<&str>;
    fn shared_with(&self) -> &[String];
}

impl OwnedRecord for PatientRecord {
    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    fn shared_with(&self) -> &[String] {
        &self.shared_with
    }
}

impl OwnedRecord for PrescriptionRecord {
    fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    /// Prescriptions carry no explicit share set.
    fn shared_with(&self) -> &[String] {
        &[]
    }
}

/// May the principal see (and act on) this record?
pub fn can_view(identity: &ResolvedIdentity, record: &impl OwnedRecord) -> bool {
    if identity.is_admin() {
        return true;
    }
    if !identity.provisioned {
        return false;
    }
    match record.created_by() {
        // Authorless record: fails closed for non-admins, even when shared.
        None => false,
        Some(owner) => {
            identity.visible_counterpart_ids.contains(owner)
                || record
                    .shared_with()
                    .iter()
                    .any(|id| *id == identity.principal_id)
        }
    }
}

/// Project a collection snapshot down to the visible subset.
pub fn filter_visible<T: OwnedRecord>(identity: &ResolvedIdentity, records: Vec<T>) -> Vec<T> {
    records
        .into_iter()
        .filter(|r| can_view(identity, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::resolve_identity;
    use crate::models::Account;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn accounts() -> BTreeMap<String, Account> {
        crate::identity::accounts_from_snapshot(&json!({
            "doc1": { "email": "d1@c", "type": "doctor", "secretaries": ["sec1"] },
            "doc2": { "email": "d2@c", "type": "doctor" },
            "sec1": { "email": "s1@c", "type": "secretary", "doctors": ["doc1"] },
            "admin": { "email": "a@c", "type": "admin" }
        }))
    }

    fn patient(id: &str, created_by: Option<&str>, shared_with: &[&str]) -> PatientRecord {
        let mut doc = json!({
            "patientId": id,
            "firstName": "P",
            "lastName": id,
            "gender": "MALE",
            "age": 30,
            "sharedWith": shared_with
        });
        if let Some(owner) = created_by {
            doc["createdBy"] = json!(owner);
        }
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn admin_sees_everything_unfiltered() {
        let identity = resolve_identity("admin", &accounts());
        let records = vec![
            patient("p1", Some("doc1"), &[]),
            patient("p2", Some("stranger"), &[]),
            patient("p3", None, &[]),
        ];
        let visible = filter_visible(&identity, records);
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn owner_sees_own_record() {
        let identity = resolve_identity("doc2", &accounts());
        let record = patient("p1", Some("doc2"), &[]);
        assert!(can_view(&identity, &record));
    }

    #[test]
    fn linked_counterpart_grants_visibility_both_ways() {
        let doctor = resolve_identity("doc1", &accounts());
        let secretary = resolve_identity("sec1", &accounts());

        let by_secretary = patient("p1", Some("sec1"), &[]);
        let by_doctor = patient("p2", Some("doc1"), &[]);

        assert!(can_view(&doctor, &by_secretary));
        assert!(can_view(&secretary, &by_doctor));
    }

    #[test]
    fn explicit_share_grants_visibility_without_a_link() {
        let identity = resolve_identity("doc2", &accounts());
        let record = patient("p1", Some("sec1"), &["doc2"]);
        assert!(can_view(&identity, &record));
    }

    #[test]
    fn authorless_record_fails_closed_for_non_admins() {
        let map = accounts();
        for id in ["doc1", "doc2", "sec1"] {
            let identity = resolve_identity(id, &map);
            // Not even an explicit share rescues an authorless record.
            let record = patient("p1", None, &[id]);
            assert!(!can_view(&identity, &record), "{id} must not see it");
        }
    }

    #[test]
    fn unlinked_doctor_does_not_see_secretary_records() {
        // Record by sec1; doc2 is not linked to sec1.
        let identity = resolve_identity("doc2", &accounts());
        let visible = filter_visible(&identity, vec![patient("p1", Some("sec1"), &[])]);
        assert!(visible.is_empty());
    }

    #[test]
    fn linked_doctor_sees_secretary_records() {
        // Same record, but doc1 is linked to sec1.
        let identity = resolve_identity("doc1", &accounts());
        let visible = filter_visible(&identity, vec![patient("p1", Some("sec1"), &[])]);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn unprovisioned_principal_sees_nothing() {
        let identity = resolve_identity("ghost", &accounts());
        let records = vec![
            patient("p1", Some("ghost"), &[]),
            patient("p2", Some("doc1"), &["ghost"]),
        ];
        assert!(filter_visible(&identity, records).is_empty());
    }

    #[test]
    fn prescriptions_have_no_share_path() {
        let identity = resolve_identity("doc2", &accounts());
        let rx: PrescriptionRecord = serde_json::from_value(json!({
            "prescriptionId": "rx1",
            "patientFirstName": "Luis",
            "patientLastName": "Reyes",
            "createdBy": "doc1",
            "doctorId": "doc1"
        }))
        .unwrap();
        assert!(!can_view(&identity, &rx));

        let own = resolve_identity("doc1", &accounts());
        assert!(can_view(&own, &rx));
    }
}
