//! Override document models.
//!
//! A repository may ship a single override file (conventionally
//! `.github/workflow-dispatch.yml`) that customises how each workflow's inputs
//! are labelled, typed, validated, grouped and sourced. The document is keyed
//! by workflow file basename and may hold entries for many workflows at once.
//!
//! Every field is optional. Absence means "inherit from the declared input or
//! the default policy", and serialization omits unset fields so a document
//! written back by the builder stays minimal.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::InputKind;

/// Top-level override document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConfigDocument {
    /// Per-workflow entries keyed by workflow file basename (for example `deploy.yml`).
    #[serde(default, deserialize_with = "deserialize_nullable_map")]
    pub workflows: IndexMap<String, WorkflowConfigEntry>,
}

impl ConfigDocument {
    /// Returns the entry for a workflow file, if the document has one.
    pub fn entry(&self, workflow_file: &str) -> Option<&WorkflowConfigEntry> {
        self.workflows.get(workflow_file)
    }
}

/// Customisation for one workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfigEntry {
    /// Form heading; the workflow's own name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Copy rendered under the heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Presentation theme identifier, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// When true, every submitted value is folded into one JSON string before dispatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_mode: Option<bool>,
    /// Per-input overrides keyed by input name, in authoring order.
    #[serde(default, deserialize_with = "deserialize_nullable_map", skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, InputOverride>,
    /// Titled input groups in display order.
    #[serde(default, deserialize_with = "deserialize_nullable_vec", skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSpec>,
}

impl WorkflowConfigEntry {
    pub fn json_mode(&self) -> bool {
        self.json_mode.unwrap_or(false)
    }

    pub fn input(&self, name: &str) -> Option<&InputOverride> {
        self.inputs.get(name)
    }
}

/// A titled group of inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GroupSpec {
    pub title: String,
    /// Member input names in display order.
    #[serde(default, deserialize_with = "deserialize_nullable_vec")]
    pub inputs: Vec<String>,
}

/// Per-input customisation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InputOverride {
    /// Render-time type, replacing the declared type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<InputKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Regular expression the submitted value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message shown when `pattern` does not match.
    #[serde(default, alias = "validation", skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
    /// Static option list replacing the declared options.
    #[serde(default, deserialize_with = "deserialize_nullable_vec", skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, deserialize_with = "deserialize_scalar_text", skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Fetch the option list from the hosting platform at render time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_from: Option<OptionsSource>,
}

impl InputOverride {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Where a dynamic option list comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OptionsSourceKind {
    Tags,
    Branches,
    Releases,
    Environments,
    Collaborators,
    Labels,
    Milestones,
    /// Arbitrary API endpoint described by `endpoint`, `valuePath` and `labelPath`.
    Api,
}

impl OptionsSourceKind {
    pub const ALL: [OptionsSourceKind; 8] = [
        Self::Tags,
        Self::Branches,
        Self::Releases,
        Self::Environments,
        Self::Collaborators,
        Self::Labels,
        Self::Milestones,
        Self::Api,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Branches => "branches",
            Self::Releases => "releases",
            Self::Environments => "environments",
            Self::Collaborators => "collaborators",
            Self::Labels => "labels",
            Self::Milestones => "milestones",
            Self::Api => "api",
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let normalized = raw.trim();
        Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
    }
}

/// Dynamic option source attached to an input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSource {
    pub source: OptionsSourceKind,
    /// API path for `api` sources; `{owner}` and `{repo}` are substituted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Dot path to the submitted value inside each returned item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_path: Option<String>,
    /// Dot path to the displayed label; falls back to `value_path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_path: Option<String>,
}

impl OptionsSource {
    pub fn new(source: OptionsSourceKind) -> Self {
        Self {
            source,
            endpoint: None,
            value_path: None,
            label_path: None,
        }
    }
}

/// A selectable `{value, label}` pair.
///
/// Accepts either a bare scalar or a `{value, label}` mapping when read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "SelectOptionRepr")]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectOptionRepr {
    Detailed {
        value: JsonValue,
        #[serde(default)]
        label: Option<JsonValue>,
    },
    Scalar(JsonValue),
}

impl TryFrom<SelectOptionRepr> for SelectOption {
    type Error = String;

    fn try_from(repr: SelectOptionRepr) -> Result<Self, Self::Error> {
        match repr {
            SelectOptionRepr::Detailed { value, label } => {
                let value = scalar_to_string(&value).ok_or_else(|| "option value must be a scalar".to_string())?;
                let label = label.as_ref().and_then(scalar_to_string).unwrap_or_else(|| value.clone());
                Ok(SelectOption { value, label })
            }
            SelectOptionRepr::Scalar(value) => scalar_to_string(&value)
                .map(SelectOption::plain)
                .ok_or_else(|| "option must be a scalar or a {value, label} mapping".to_string()),
        }
    }
}

/// Stringifies strings, booleans and numbers; everything else yields `None`.
pub fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Bool(flag) => Some(flag.to_string()),
        JsonValue::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn deserialize_scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

fn deserialize_nullable_map<'de, D, T>(deserializer: D) -> Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let raw = Option::<IndexMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

fn deserialize_nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
