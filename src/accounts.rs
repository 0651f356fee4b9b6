//! Account provisioning and profile edits.
//!
//! Sign-up writes the account document with empty relationship sets; the
//! profile screen patches the principal's own document. Both operations
//! append one audit entry. Session establishment itself is out of scope —
//! callers hand in the principal id minted by the identity provider.

use serde_json::{Map, Value};

use crate::audit;
use crate::config;
use crate::error::CoreError;
use crate::models::{Account, LogKind, Role};
use crate::store::DocumentStore;

/// Sign-up payload.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub medical_id: Option<String>,
    pub specialty_field: Option<String>,
}

/// Self-service profile edit; only set fields are patched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub medical_id: Option<String>,
    pub specialty_field: Option<String>,
}

/// Create the account document at sign-up, with empty relationship sets.
///
/// Idempotent: if provisioning already ran for this id (the boot path can
/// retry), the existing document is returned untouched and no audit entry
/// is appended.
pub async fn provision_account<S: DocumentStore>(
    store: &S,
    new: NewAccount,
) -> Result<Account, CoreError> {
    if new.id.is_empty() {
        return Err(CoreError::NotAuthenticated);
    }
    if let Some(existing) = store.read(&config::user_path(&new.id)).await? {
        let mut account: Account = serde_json::from_value(existing)?;
        account.id = new.id;
        return Ok(account);
    }

    let account = Account {
        id: new.id.clone(),
        email: new.email,
        username: new.username,
        first_name: new.first_name,
        last_name: new.last_name,
        role: new.role.as_str().to_string(),
        medical_id: new.medical_id,
        specialty_field: new.specialty_field,
        ..Account::default()
    };

    store
        .write(&config::user_path(&new.id), serde_json::to_value(&account)?)
        .await?;
    tracing::info!(account = %new.id, role = %account.role, "account provisioned");
    audit::append(
        store,
        LogKind::Account,
        format!(
            "Account created for {} ({})",
            account.display_name(),
            account.role
        ),
    )
    .await?;
    Ok(account)
}

/// Patch the principal's own profile fields.
pub async fn update_profile<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    update: ProfileUpdate,
) -> Result<(), CoreError> {
    if actor_id.is_empty() {
        return Err(CoreError::NotAuthenticated);
    }
    let doc = store
        .read(&config::user_path(actor_id))
        .await?
        .ok_or_else(|| CoreError::not_found("account", actor_id))?;
    let mut account: Account = serde_json::from_value(doc)?;
    account.id = actor_id.to_string();

    let mut fields = Map::new();
    let mut set = |key: &str, value: Option<String>| {
        if let Some(v) = value {
            fields.insert(key.to_string(), Value::String(v));
        }
    };
    set("username", update.username);
    set("firstName", update.first_name);
    set("lastName", update.last_name);
    set("medicalId", update.medical_id);
    set("field", update.specialty_field);

    if fields.is_empty() {
        return Ok(());
    }

    // Display name for the audit line reflects the patched values.
    let first = fields
        .get("firstName")
        .and_then(Value::as_str)
        .unwrap_or(&account.first_name);
    let last = fields
        .get("lastName")
        .and_then(Value::as_str)
        .unwrap_or(&account.last_name);
    let message = format!("Profile updated by {first} {last}");

    store.patch(&config::user_path(actor_id), fields).await?;
    tracing::info!(account = actor_id, "profile updated");
    audit::append(store, LogKind::Account, message).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn new_doctor() -> NewAccount {
        NewAccount {
            id: "doc1".into(),
            email: "doc1@clinic.ph".into(),
            username: "dcruz".into(),
            first_name: "Dela".into(),
            last_name: "Cruz".into(),
            role: Role::Doctor,
            medical_id: Some("MD-1042".into()),
            specialty_field: Some("Pediatrics".into()),
        }
    }

    async fn log_count(store: &MemoryStore) -> usize {
        store
            .read(config::LOGS_PATH)
            .await
            .unwrap()
            .and_then(|v| v.as_object().map(|m| m.len()))
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn provisioning_creates_empty_relationship_sets() {
        let store = MemoryStore::new();
        let account = provision_account(&store, new_doctor()).await.unwrap();

        assert!(account.doctors.is_empty());
        assert!(account.secretaries.is_empty());
        assert!(account.requested_to.is_empty());
        assert!(account.requested_by.is_empty());

        let doc = store
            .read(&config::user_path("doc1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["type"], "doctor");
        assert_eq!(doc["field"], "Pediatrics");
        assert_eq!(log_count(&store).await, 1);
    }

    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let store = MemoryStore::new();
        provision_account(&store, new_doctor()).await.unwrap();

        let mut again = new_doctor();
        again.first_name = "Changed".into();
        let account = provision_account(&store, again).await.unwrap();

        assert_eq!(account.first_name, "Dela", "existing document untouched");
        assert_eq!(log_count(&store).await, 1, "no second audit entry");
    }

    #[tokio::test]
    async fn profile_update_patches_only_set_fields() {
        let store = MemoryStore::new();
        provision_account(&store, new_doctor()).await.unwrap();

        update_profile(
            &store,
            "doc1",
            ProfileUpdate {
                specialty_field: Some("Cardiology".into()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();

        let doc = store
            .read(&config::user_path("doc1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["field"], "Cardiology");
        assert_eq!(doc["firstName"], "Dela");
        assert_eq!(log_count(&store).await, 2);
    }

    #[tokio::test]
    async fn empty_update_is_a_noop_without_audit() {
        let store = MemoryStore::new();
        provision_account(&store, new_doctor()).await.unwrap();
        update_profile(&store, "doc1", ProfileUpdate::default())
            .await
            .unwrap();
        assert_eq!(log_count(&store).await, 1);
    }

    #[tokio::test]
    async fn updating_a_missing_account_is_not_found() {
        let store = MemoryStore::new();
        let err = update_profile(&store, "ghost", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
