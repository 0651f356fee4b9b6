//! Signed-in principal and its relationship sets.
//!
//! Wire shape mirrors the `users/{id}` documents: the role is stored as the
//! free-text `type` field, doctor-secretary links live in `doctors` /
//! `secretaries`, and pending requests in `requestedTo` (outgoing, on the
//! secretary) and `requestedBy` (incoming, on the doctor). A request pair is
//! maintained as a best-effort mirror across both documents.

use serde::{Deserialize, Serialize};

use super::enums::Role;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Document key; not stored inside the document itself.
    #[serde(default, skip_serializing)]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Raw role string as written at sign-up ("doctor", "secretary", "admin").
    #[serde(rename = "type", default)]
    pub role: String,
    /// Doctor-only fields, absent for secretaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_id: Option<String>,
    #[serde(rename = "field", default, skip_serializing_if = "Option::is_none")]
    pub specialty_field: Option<String>,
    /// Linked counterparts: a doctor's secretaries, a secretary's doctors.
    #[serde(default)]
    pub doctors: Vec<String>,
    #[serde(default)]
    pub secretaries: Vec<String>,
    /// Outgoing requests awaiting the counterpart's acceptance.
    #[serde(default)]
    pub requested_to: Vec<String>,
    /// Incoming requests awaiting this account's acceptance.
    #[serde(default)]
    pub requested_by: Vec<String>,
}

impl Account {
    /// Closed role variant, `None` for unknown or absent role strings.
    pub fn parsed_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Confirmed counterparts for this account's role.
    pub fn linked_counterparts(&self) -> &[String] {
        match self.parsed_role() {
            Some(Role::Doctor) => &self.secretaries,
            Some(Role::Secretary) => &self.doctors,
            _ => &[],
        }
    }

    /// "First Last" as the audit log and directory cards render it.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_wire_document() {
        let account: Account = serde_json::from_value(json!({
            "email": "dra.cruz@clinic.ph",
            "username": "dcruz",
            "firstName": "Dela",
            "lastName": "Cruz",
            "type": "doctor",
            "medicalId": "MD-1042",
            "field": "Pediatrics",
            "secretaries": ["sec1"],
            "requestedBy": ["sec2"]
        }))
        .unwrap();

        assert_eq!(account.parsed_role(), Some(Role::Doctor));
        assert_eq!(account.specialty_field.as_deref(), Some("Pediatrics"));
        assert_eq!(account.linked_counterparts(), ["sec1"]);
        assert_eq!(account.requested_by, ["sec2"]);
        assert!(account.requested_to.is_empty());
        assert_eq!(account.display_name(), "Dela Cruz");
    }

    #[test]
    fn counterparts_follow_role() {
        let mut account = Account {
            role: "secretary".into(),
            doctors: vec!["doc1".into()],
            secretaries: vec!["stray".into()],
            ..Account::default()
        };
        assert_eq!(account.linked_counterparts(), ["doc1"]);

        account.role = "nurse".into();
        assert!(account.linked_counterparts().is_empty());
    }

    #[test]
    fn id_is_not_serialized() {
        let account = Account {
            id: "u1".into(),
            email: "a@b.c".into(),
            ..Account::default()
        };
        let value = serde_json::to_value(&account).unwrap();
        assert!(value.get("id").is_none());
    }
}
