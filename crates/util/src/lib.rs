//! Small helpers shared by the wdui crates: secret redaction, path expansion
//! and the user settings file.

mod paths;
mod redaction;
pub mod settings;

pub use paths::expand_tilde;
pub use redaction::{REDACTED, redact_sensitive};
pub use settings::{Settings, SettingsError};
