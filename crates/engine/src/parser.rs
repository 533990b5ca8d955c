//! Extraction of the declared input schema from a workflow definition.
//!
//! The `workflow_dispatch` trigger can be spelled several ways:
//!
//! ```yaml
//! on: workflow_dispatch            # bare scalar
//! on: [push, workflow_dispatch]    # entry in a trigger list
//! on:
//!   workflow_dispatch:             # key with a null value
//! on:
//!   workflow_dispatch:
//!     inputs: { ... }              # key with an inputs map
//! ```
//!
//! Only a document that is not valid YAML at all is an error. Odd trigger
//! shapes resolve to "no inputs" so a single unusual workflow never breaks a
//! listing.

use serde_yaml::{Mapping, Value as YamlValue};
use thiserror::Error;
use tracing::debug;
use wdui_types::{DeclaredInput, InputKind, ParsedWorkflow};

/// Name reported for workflows without a usable `name` field.
pub const UNNAMED_WORKFLOW: &str = "Unnamed Workflow";

const DISPATCH_TRIGGER: &str = "workflow_dispatch";

/// The workflow definition could not be read as a YAML document.
#[derive(Debug, Error)]
#[error("could not read workflow definition: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl From<serde_yaml::Error> for ParseError {
    fn from(error: serde_yaml::Error) -> Self {
        match error.location() {
            Some(location) => Self {
                message: format!("line {}, column {}: {}", location.line(), location.column(), error),
                line: Some(location.line()),
                column: Some(location.column()),
            },
            None => Self {
                message: error.to_string(),
                line: None,
                column: None,
            },
        }
    }
}

/// Parse workflow definition text into its name and declared dispatch inputs.
pub fn parse_workflow_definition(content: &str) -> Result<ParsedWorkflow, ParseError> {
    let document: YamlValue = serde_yaml::from_str(content)?;

    let name = document
        .get("name")
        .and_then(yaml_scalar_to_string)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNNAMED_WORKFLOW.to_string());

    let Some(trigger) = document.as_mapping().and_then(trigger_section).and_then(locate_dispatch_trigger) else {
        return Ok(ParsedWorkflow {
            name,
            has_dispatch_trigger: false,
            inputs: Vec::new(),
        });
    };

    let inputs = trigger
        .and_then(|trigger| trigger.get("inputs"))
        .and_then(YamlValue::as_mapping)
        .map(declared_inputs_from_mapping)
        .unwrap_or_default();

    Ok(ParsedWorkflow {
        name,
        has_dispatch_trigger: true,
        inputs,
    })
}

/// Returns the `on` section. YAML 1.1 readers turn a bare `on` key into `true`,
/// so that spelling is accepted as well.
fn trigger_section(root: &Mapping) -> Option<&YamlValue> {
    root.get("on").or_else(|| root.get(YamlValue::Bool(true)))
}

/// `None` when the trigger is absent; `Some(None)` when it is present without a body.
fn locate_dispatch_trigger(on: &YamlValue) -> Option<Option<&YamlValue>> {
    match on {
        YamlValue::String(event) if event == DISPATCH_TRIGGER => Some(None),
        YamlValue::Sequence(events) => events
            .iter()
            .any(|event| event.as_str() == Some(DISPATCH_TRIGGER))
            .then_some(None),
        YamlValue::Mapping(events) => events.get(DISPATCH_TRIGGER).map(Some),
        _ => None,
    }
}

fn declared_inputs_from_mapping(inputs: &Mapping) -> Vec<DeclaredInput> {
    inputs
        .iter()
        .filter_map(|(key, definition)| {
            let Some(name) = yaml_scalar_to_string(key) else {
                debug!(?key, "skipping workflow input with a non-scalar name");
                return None;
            };
            Some(declared_input(name, definition))
        })
        .collect()
}

fn declared_input(name: String, definition: &YamlValue) -> DeclaredInput {
    let description = definition
        .get("description")
        .and_then(yaml_scalar_to_string)
        .unwrap_or_default();
    let required = matches!(definition.get("required"), Some(YamlValue::Bool(true)));
    let default = definition.get("default").and_then(yaml_scalar_to_string);

    let kind = match definition.get("type").and_then(YamlValue::as_str) {
        Some(raw) => InputKind::from_declared(raw).unwrap_or_else(|| {
            debug!(input = %name, declared = raw, "unknown input type; treating as string");
            InputKind::String
        }),
        None => InputKind::String,
    };

    let options = match kind {
        InputKind::Choice => definition
            .get("options")
            .and_then(YamlValue::as_sequence)
            .map(|options| options.iter().filter_map(yaml_scalar_to_string).collect()),
        _ => None,
    };

    DeclaredInput {
        name,
        description,
        required,
        default,
        kind,
        options,
    }
}

/// Stringifies YAML strings, booleans and numbers.
pub(crate) fn yaml_scalar_to_string(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(text) => Some(text.clone()),
        YamlValue::Bool(flag) => Some(flag.to_string()),
        YamlValue::Number(number) => Some(number.to_string()),
        YamlValue::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
        _ => None,
    }
}
