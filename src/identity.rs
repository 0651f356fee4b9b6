//! Identity & role resolution.
//!
//! Resolves the signed-in principal against the `users` collection into the
//! working set every downstream decision uses: the closed role variant and
//! the visibility set (self plus linked counterparts). A missing account
//! document is *not* an error — it sits on the boot path while provisioning
//! may still be in flight — it resolves to no access.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::config;
use crate::error::CoreError;
use crate::models::{Account, Role};
use crate::store::DocumentStore;

/// The signed-in session, as handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
}

/// Session source consumed by this core. Establishment and teardown of the
/// session itself (login/signup/logout) happen outside.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Principal>;
    fn watch(&self) -> watch::Receiver<Option<Principal>>;
}

/// In-process identity provider for tests and local embedding.
pub struct LocalSession {
    tx: watch::Sender<Option<Principal>>,
}

impl LocalSession {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn sign_in(&self, principal: Principal) {
        self.tx.send_replace(Some(principal));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for LocalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for LocalSession {
    fn current(&self) -> Option<Principal> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<Principal>> {
        self.tx.subscribe()
    }
}

/// Resolved principal: role plus relationship sets.
#[derive(Debug, Clone)]
pub struct ResolvedIdentity {
    pub principal_id: String,
    /// `None` when the account is missing or carries an unknown role;
    /// both resolve to least privilege.
    pub role: Option<Role>,
    /// Whether a backing account document exists at all.
    pub provisioned: bool,
    /// Self plus confirmed counterparts; the access-control working set.
    pub visible_counterpart_ids: BTreeSet<String>,
    pub outgoing_requests: Vec<String>,
    pub incoming_requests: Vec<String>,
}

impl ResolvedIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Resolve a principal id against the full account map. Pure.
pub fn resolve_identity(
    principal_id: &str,
    accounts: &BTreeMap<String, Account>,
) -> ResolvedIdentity {
    let Some(account) = accounts.get(principal_id) else {
        return ResolvedIdentity {
            principal_id: principal_id.to_string(),
            role: None,
            provisioned: false,
            visible_counterpart_ids: BTreeSet::new(),
            outgoing_requests: Vec::new(),
            incoming_requests: Vec::new(),
        };
    };

    let mut visible: BTreeSet<String> = BTreeSet::new();
    visible.insert(principal_id.to_string());
    for counterpart in account.linked_counterparts() {
        visible.insert(counterpart.clone());
    }

    ResolvedIdentity {
        principal_id: principal_id.to_string(),
        role: account.parsed_role(),
        provisioned: true,
        visible_counterpart_ids: visible,
        outgoing_requests: account.requested_to.clone(),
        incoming_requests: account.requested_by.clone(),
    }
}

/// Decode a `users` collection snapshot into an id-keyed account map.
pub fn accounts_from_snapshot(snapshot: &Value) -> BTreeMap<String, Account> {
    let Some(map) = snapshot.as_object() else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(id, doc)| {
            let mut account: Account = serde_json::from_value(doc.clone()).ok()?;
            account.id = id.clone();
            Some((id.clone(), account))
        })
        .collect()
}

/// Read the full account collection from the store.
pub async fn load_accounts<S: DocumentStore>(
    store: &S,
) -> Result<BTreeMap<String, Account>, CoreError> {
    let snapshot = store
        .read(config::USERS_PATH)
        .await?
        .unwrap_or(Value::Null);
    Ok(accounts_from_snapshot(&snapshot))
}

/// Resolve an acting principal straight from the store.
pub async fn resolve_actor<S: DocumentStore>(
    store: &S,
    principal_id: &str,
) -> Result<ResolvedIdentity, CoreError> {
    if principal_id.is_empty() {
        return Err(CoreError::NotAuthenticated);
    }
    let accounts = load_accounts(store).await?;
    Ok(resolve_identity(principal_id, &accounts))
}
