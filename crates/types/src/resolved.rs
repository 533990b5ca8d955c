//! Render-ready input descriptors.

use serde::{Deserialize, Serialize};

use crate::{InputKind, OptionsSource, SelectOption};

/// Where a resolved input came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputOrigin {
    /// Declared by the workflow file.
    #[default]
    Declared,
    /// Defined only by the override document (a UI-only helper field).
    Config,
}

/// One form field: a declared input overlaid with its override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedInput {
    pub name: String,
    /// Stored description; see [`ResolvedInput::display_description`] for what is shown.
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Type the workflow file declared (`string` for config-defined inputs without one).
    pub declared_type: InputKind,
    /// Override type, else declared type.
    pub resolved_type: InputKind,
    /// Override label, else the raw input name.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_from: Option<OptionsSource>,
    #[serde(default)]
    pub origin: InputOrigin,
}

impl ResolvedInput {
    /// Description to render, or `None` when it is auto-generated boilerplate.
    ///
    /// A description that (trimmed, case-insensitively) equals the resolved
    /// type name, or starts with `"<type> input"`, carries no information and
    /// is suppressed. The stored description is left untouched.
    pub fn display_description(&self) -> Option<&str> {
        let trimmed = self.description.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.to_lowercase();
        let type_name = self.resolved_type.as_str();
        if normalized == type_name || normalized.starts_with(&format!("{type_name} input")) {
            return None;
        }
        Some(&self.description)
    }

    /// Values of the option list, if any.
    pub fn option_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .flatten()
            .map(|option| option.value.as_str())
            .collect()
    }

    pub fn is_config_defined(&self) -> bool {
        self.origin == InputOrigin::Config
    }
}
