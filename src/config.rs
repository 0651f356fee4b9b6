/// Application-level constants
pub const APP_NAME: &str = "Clinicore";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level collection paths in the shared document store.
pub const USERS_PATH: &str = "users";
pub const PATIENTS_PATH: &str = "patients";
pub const PRESCRIPTIONS_PATH: &str = "prescriptions";
pub const LOGS_PATH: &str = "logs";

/// Path to a single account document.
pub fn user_path(id: &str) -> String {
    format!("{USERS_PATH}/{id}")
}

/// Path to a single patient record document.
pub fn patient_path(id: &str) -> String {
    format!("{PATIENTS_PATH}/{id}")
}

/// Path to a single prescription document.
pub fn prescription_path(id: &str) -> String {
    format!("{PRESCRIPTIONS_PATH}/{id}")
}

/// Path to a single audit log entry.
pub fn log_path(id: &str) -> String {
    format!("{LOGS_PATH}/{id}")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,clinicore=debug".to_string()
}
