//! Declared workflow input schema.
//!
//! These models capture what a workflow definition declares under its
//! `workflow_dispatch.inputs` trigger. They are produced fresh every time a
//! workflow file is read and are never mutated afterwards; repository-level
//! customisation lives in [`crate::config`].

pub mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Input kinds understood by the form renderer.
///
/// The first five variants are the types a workflow file may declare. The
/// remaining variants are render-time overrides that only an override document
/// can request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    #[default]
    String,
    Boolean,
    Choice,
    Environment,
    Number,
    Select,
    MultiSelect,
    Date,
    Color,
    Slider,
    Json,
    File,
}

impl InputKind {
    /// Kinds a workflow file may declare.
    pub const DECLARED: [InputKind; 5] = [Self::String, Self::Boolean, Self::Choice, Self::Environment, Self::Number];

    /// Kinds an override document may request.
    pub const RENDER: [InputKind; 10] = [
        Self::String,
        Self::Select,
        Self::MultiSelect,
        Self::Boolean,
        Self::Number,
        Self::Date,
        Self::Color,
        Self::Slider,
        Self::Json,
        Self::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Choice => "choice",
            Self::Environment => "environment",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi-select",
            Self::Date => "date",
            Self::Color => "color",
            Self::Slider => "slider",
            Self::Json => "json",
            Self::File => "file",
        }
    }

    /// Maps a `type:` value found in a workflow file to a declared kind.
    ///
    /// Returns `None` for anything outside the declared vocabulary.
    pub fn from_declared(raw: &str) -> Option<Self> {
        let normalized = raw.trim();
        Self::DECLARED.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
    }

    /// Maps an override `type` value (or an editor selection) to a kind.
    pub fn from_render(raw: &str) -> Option<Self> {
        let normalized = raw.trim();
        Self::RENDER.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(normalized))
    }

    /// Whether submitted values must parse as numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Slider)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single input declared by a workflow's `workflow_dispatch` trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeclaredInput {
    /// Input name, unique within the workflow.
    pub name: String,
    /// Help text from the workflow file; empty when none was given.
    #[serde(default)]
    pub description: String,
    /// True only when the workflow file says `required: true`.
    #[serde(default)]
    pub required: bool,
    /// Default value, stringified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Declared type; `string` when the file omits it.
    #[serde(rename = "type", default)]
    pub kind: InputKind,
    /// Allowed values of a `choice` input, in file order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl DeclaredInput {
    /// Builds a plain optional string input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required: false,
            default: None,
            kind: InputKind::String,
            options: None,
        }
    }
}

/// Result of reading a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedWorkflow {
    /// The workflow's `name`, or a placeholder when it has none.
    pub name: String,
    /// Whether a `workflow_dispatch` trigger was found at all.
    pub has_dispatch_trigger: bool,
    /// Declared inputs in file order.
    pub inputs: Vec<DeclaredInput>,
}

impl ParsedWorkflow {
    pub fn input(&self, name: &str) -> Option<&DeclaredInput> {
        self.inputs.iter().find(|input| input.name == name)
    }
}
