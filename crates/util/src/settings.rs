//! User settings for the wdui CLI.
//!
//! Settings live in a small JSON file in the standard configuration directory
//! (`~/.config/wdui/settings.json` on most platforms). Every field is optional
//! on disk; a missing file yields the defaults. A few environment variables
//! take precedence over the file so CI jobs can configure the tool without one.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::expand_tilde;

/// Overrides the settings file location.
pub const SETTINGS_PATH_ENV: &str = "WDUI_SETTINGS_PATH";
/// Overrides [`Settings::api_base`].
pub const API_BASE_ENV: &str = "WDUI_API_BASE";
/// Overrides [`Settings::override_path`].
pub const OVERRIDE_PATH_ENV: &str = "WDUI_OVERRIDE_PATH";

pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Base URL of the GitHub REST API.
    pub api_base: String,
    /// Repository path of the override document.
    pub override_path: String,
    /// Directory holding workflow definitions.
    pub workflows_dir: String,
    /// Ref dispatched when none is given.
    pub default_ref: String,
    pub commit_message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            override_path: ".github/workflow-dispatch.yml".to_string(),
            workflows_dir: ".github/workflows".to_string(),
            default_ref: "main".to_string(),
            commit_message: "Update workflow dispatch configuration".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the default location, then applies environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = Self::load_from(&settings_path())?;
        settings.apply_env();
        Ok(settings)
    }

    /// Reads one settings file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file; using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) {
        if let Some(api_base) = non_empty_env(API_BASE_ENV) {
            self.api_base = api_base;
        }
        if let Some(override_path) = non_empty_env(OVERRIDE_PATH_ENV) {
            self.override_path = override_path;
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Location of the settings file, honoring [`SETTINGS_PATH_ENV`].
pub fn settings_path() -> PathBuf {
    if let Some(path) = non_empty_env(SETTINGS_PATH_ENV) {
        return expand_tilde(&path);
    }
    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("wdui").join(SETTINGS_FILE_NAME)
}
