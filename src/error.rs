//! Service-layer error taxonomy.
//!
//! Every mutating operation surfaces one of these at its boundary; callers
//! show a single user-facing notification and do not retry. A half-applied
//! paired write (one side of a relationship transition persisted, the other
//! rejected) is *not* representable here — it is a latent store-level
//! inconsistency that only a reconciliation pass could detect.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Principal id could not be resolved to a session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Principal's role does not permit the requested operation.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Referenced document has no backing entry in the store.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Persistence layer rejected the operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Stored document did not decode into the expected shape.
    #[error("Malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn not_authorized(detail: impl Into<String>) -> Self {
        Self::NotAuthorized(detail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_entity() {
        let err = CoreError::not_found("patient", "p-9");
        assert_eq!(err.to_string(), "Entity not found: patient with id p-9");

        let err = CoreError::not_authorized("secretary cannot author prescriptions");
        assert!(err.to_string().contains("secretary cannot author"));
    }
}
