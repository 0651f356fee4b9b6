//! Role-based user directory.
//!
//! The "view users" screen: the account collection minus the principal,
//! partitioned into doctors and secretaries, each carrying the link status
//! that decides which action button the card shows.

use std::collections::BTreeMap;

use crate::identity::resolve_identity;
use crate::linking::{link_status, LinkStatus};
use crate::models::{Account, Role};

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub account: Account,
    pub status: LinkStatus,
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub doctors: Vec<DirectoryEntry>,
    pub secretaries: Vec<DirectoryEntry>,
}

/// Build the directory from a `users` snapshot. Accounts with unknown
/// roles are not listed.
pub fn build_directory(principal_id: &str, accounts: &BTreeMap<String, Account>) -> Directory {
    let identity = resolve_identity(principal_id, accounts);
    let mut directory = Directory::default();

    for (id, account) in accounts {
        if id == principal_id {
            continue;
        }
        let entry = DirectoryEntry {
            account: account.clone(),
            status: link_status(&identity, id),
        };
        match account.parsed_role() {
            Some(Role::Doctor) => directory.doctors.push(entry),
            Some(Role::Secretary) => directory.secretaries.push(entry),
            _ => {}
        }
    }
    directory
}
