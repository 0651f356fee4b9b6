//! Doctor-secretary relationship state machine.
//!
//! States per pair: none → requested → linked. Direction is fixed:
//! secretaries request, doctors accept or either party cancels. There is no
//! unlink transition from `linked`.
//!
//! Every transition is a paired write to both account documents. The store
//! has no multi-document transaction, so the pair is applied as two
//! sequential patches; a failure between them leaves the relationship
//! half-applied (doctor shows linked, secretary does not). Guards are
//! evaluated against the freshly read pair, which narrows but does not
//! close the accept/cancel race.

use serde_json::{json, Map, Value};

use crate::audit;
use crate::config;
use crate::error::CoreError;
use crate::identity::{load_accounts, ResolvedIdentity};
use crate::models::{Account, LogKind, Role};
use crate::store::DocumentStore;

/// State of one secretary-doctor pair, as recorded on the two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    None,
    Requested,
    Linked,
}

/// Whether a mutating call changed anything. Guarded duplicates are no-ops
/// and append no audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Noop,
}

/// Directory-card status of a counterpart, from the principal's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Linked,
    RequestSent,
    IncomingRequest,
    NotLinked,
}

/// Derive the pair state from both sides' sets. Either side recording a
/// link or request counts, so a half-applied pair still guards as active.
pub fn pair_state(secretary: &Account, doctor: &Account) -> LinkState {
    if doctor.secretaries.contains(&secretary.id) || secretary.doctors.contains(&doctor.id) {
        return LinkState::Linked;
    }
    if doctor.requested_by.contains(&secretary.id) || secretary.requested_to.contains(&doctor.id) {
        return LinkState::Requested;
    }
    LinkState::None
}

/// Status of `target_id` relative to the resolved principal, for rendering
/// the directory card's action button.
pub fn link_status(identity: &ResolvedIdentity, target_id: &str) -> LinkStatus {
    if target_id != identity.principal_id && identity.visible_counterpart_ids.contains(target_id) {
        LinkStatus::Linked
    } else if identity.outgoing_requests.iter().any(|id| id == target_id) {
        LinkStatus::RequestSent
    } else if identity.incoming_requests.iter().any(|id| id == target_id) {
        LinkStatus::IncomingRequest
    } else {
        LinkStatus::NotLinked
    }
}

fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn without<'a>(ids: &'a [String], removed: &str) -> Vec<&'a String> {
    ids.iter().filter(|id| *id != removed).collect()
}

/// `none → requested`. Only a secretary acting on a doctor target.
pub async fn request_link<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    doctor_id: &str,
) -> Result<Transition, CoreError> {
    if actor_id.is_empty() {
        return Err(CoreError::NotAuthenticated);
    }
    let accounts = load_accounts(store).await?;
    let secretary = accounts
        .get(actor_id)
        .ok_or_else(|| CoreError::not_authorized("account not provisioned"))?;
    if secretary.parsed_role() != Some(Role::Secretary) {
        return Err(CoreError::not_authorized(
            "only secretaries send link requests",
        ));
    }
    let doctor = accounts
        .get(doctor_id)
        .ok_or_else(|| CoreError::not_found("account", doctor_id))?;
    if doctor.parsed_role() != Some(Role::Doctor) {
        return Err(CoreError::not_authorized("link requests target doctors"));
    }

    if pair_state(secretary, doctor) != LinkState::None {
        return Ok(Transition::Noop);
    }

    // Paired write, not atomic: a failure after the first patch leaves the
    // request recorded on one side only.
    let mut requested_by: Vec<&String> = doctor.requested_by.iter().collect();
    requested_by.push(&secretary.id);
    store
        .patch(
            &config::user_path(doctor_id),
            fields(&[("requestedBy", json!(requested_by))]),
        )
        .await?;

    let mut requested_to: Vec<&String> = secretary.requested_to.iter().collect();
    requested_to.push(&doctor.id);
    store
        .patch(
            &config::user_path(actor_id),
            fields(&[("requestedTo", json!(requested_to))]),
        )
        .await?;

    tracing::info!(secretary = actor_id, doctor = doctor_id, "link requested");
    audit::append(
        store,
        LogKind::Account,
        format!(
            "Link request sent by {} to {}",
            secretary.display_name(),
            doctor.display_name()
        ),
    )
    .await?;
    Ok(Transition::Applied)
}

/// `requested → linked`. Only the targeted doctor, on a pending request.
pub async fn accept_link<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    secretary_id: &str,
) -> Result<Transition, CoreError> {
    if actor_id.is_empty() {
        return Err(CoreError::NotAuthenticated);
    }
    let accounts = load_accounts(store).await?;
    let doctor = accounts
        .get(actor_id)
        .ok_or_else(|| CoreError::not_authorized("account not provisioned"))?;
    if doctor.parsed_role() != Some(Role::Doctor) {
        return Err(CoreError::not_authorized(
            "only doctors accept link requests",
        ));
    }
    let secretary = accounts
        .get(secretary_id)
        .ok_or_else(|| CoreError::not_found("account", secretary_id))?;

    match pair_state(secretary, doctor) {
        LinkState::Requested => {}
        // Already linked, or no pending request at all.
        _ => return Ok(Transition::Noop),
    }

    let mut secretaries = without(&doctor.secretaries, secretary_id);
    secretaries.push(&secretary.id);
    store
        .patch(
            &config::user_path(actor_id),
            fields(&[
                ("requestedBy", json!(without(&doctor.requested_by, secretary_id))),
                ("secretaries", json!(secretaries)),
            ]),
        )
        .await?;

    let mut doctors = without(&secretary.doctors, actor_id);
    doctors.push(&doctor.id);
    store
        .patch(
            &config::user_path(secretary_id),
            fields(&[
                ("requestedTo", json!(without(&secretary.requested_to, actor_id))),
                ("doctors", json!(doctors)),
            ]),
        )
        .await?;

    tracing::info!(doctor = actor_id, secretary = secretary_id, "link accepted");
    audit::append(
        store,
        LogKind::Account,
        format!(
            "Link request from {} accepted by {}",
            secretary.display_name(),
            doctor.display_name()
        ),
    )
    .await?;
    Ok(Transition::Applied)
}

/// `requested → none`. Either party of the pending pair.
pub async fn cancel_link<S: DocumentStore>(
    store: &S,
    actor_id: &str,
    counterpart_id: &str,
) -> Result<Transition, CoreError> {
    if actor_id.is_empty() {
        return Err(CoreError::NotAuthenticated);
    }
    let accounts = load_accounts(store).await?;
    let actor = accounts
        .get(actor_id)
        .ok_or_else(|| CoreError::not_authorized("account not provisioned"))?;
    let counterpart = accounts
        .get(counterpart_id)
        .ok_or_else(|| CoreError::not_found("account", counterpart_id))?;

    let (secretary, doctor) = match (actor.parsed_role(), counterpart.parsed_role()) {
        (Some(Role::Secretary), Some(Role::Doctor)) => (actor, counterpart),
        (Some(Role::Doctor), Some(Role::Secretary)) => (counterpart, actor),
        _ => {
            return Err(CoreError::not_authorized(
                "cancel applies to doctor-secretary pairs",
            ))
        }
    };

    if pair_state(secretary, doctor) != LinkState::Requested {
        return Ok(Transition::Noop);
    }

    store
        .patch(
            &config::user_path(&doctor.id),
            fields(&[("requestedBy", json!(without(&doctor.requested_by, &secretary.id)))]),
        )
        .await?;
    store
        .patch(
            &config::user_path(&secretary.id),
            fields(&[("requestedTo", json!(without(&secretary.requested_to, &doctor.id)))]),
        )
        .await?;

    tracing::info!(
        actor = actor_id,
        counterpart = counterpart_id,
        "link request cancelled"
    );
    audit::append(
        store,
        LogKind::Account,
        format!("Link request cancelled by {}", actor.display_name()),
    )
    .await?;
    Ok(Transition::Applied)
}
