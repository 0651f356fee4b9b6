//! Clinic record-visibility and relationship core.
//!
//! The policy heart of a clinic management front end backed by a shared
//! live document store: resolving the signed-in principal into a role and
//! visibility set, filtering record collections down to what that principal
//! may see, and running the doctor-secretary link lifecycle — plus the
//! record operations and audit logging wired to them.
//!
//! Client-side checks here are advisory from the store's point of view;
//! real enforcement belongs in the persistence layer's access rules, with
//! these functions as the shared source of truth.

pub mod accounts;
pub mod analytics;
pub mod audit;
pub mod config;
pub mod directory;
pub mod error;
pub mod identity;
pub mod linking;
pub mod models;
pub mod records;
pub mod store;
pub mod visibility;

pub use error::CoreError;
pub use identity::{resolve_identity, ResolvedIdentity};
pub use linking::{accept_link, cancel_link, request_link};
pub use visibility::{can_view, filter_visible};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for embedding applications.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
