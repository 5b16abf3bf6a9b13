//! Small helpers shared by the Ignite crates: path expansion for configuration files and
//! redaction of secrets before values reach the logs.

pub mod paths;
pub mod redaction;

pub use paths::{config_file_path, expand_tilde};
pub use redaction::{redact_headers, redact_sensitive};
