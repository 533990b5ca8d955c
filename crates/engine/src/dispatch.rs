//! Turning submitted form values into a dispatch request.

use indexmap::IndexMap;
use wdui_types::{ParsedWorkflow, ResolvedInput, WorkflowConfigEntry, validate_submitted_value};

/// Input name that receives the JSON payload when the workflow declares none.
pub const JSON_PAYLOAD_INPUT: &str = "payload";

/// Starting form values: every non-empty default, keyed by input name.
pub fn initial_values(resolved: &[ResolvedInput]) -> IndexMap<String, String> {
    resolved
        .iter()
        .filter_map(|input| {
            input
                .default
                .as_ref()
                .filter(|value| !value.is_empty())
                .map(|value| (input.name.clone(), value.clone()))
        })
        .collect()
}

/// Per-input error messages; empty when the submission is valid.
///
/// Inputs without a submitted value are checked as if the value were empty.
pub fn validate_submission(resolved: &[ResolvedInput], values: &IndexMap<String, String>) -> IndexMap<String, String> {
    resolved
        .iter()
        .filter_map(|input| {
            let value = values.get(&input.name).map(String::as_str).unwrap_or_default();
            validate_submitted_value(input, value)
                .err()
                .map(|message| (input.name.clone(), message))
        })
        .collect()
}

/// The `inputs` object sent with the dispatch.
///
/// With `jsonMode` every submitted value (config-defined helper fields
/// included) is folded into one JSON string assigned to the first declared
/// input. Otherwise only declared inputs are forwarded.
pub fn build_dispatch_inputs(
    workflow: &ParsedWorkflow,
    entry: Option<&WorkflowConfigEntry>,
    values: &IndexMap<String, String>,
) -> serde_json::Result<IndexMap<String, String>> {
    if entry.is_some_and(WorkflowConfigEntry::json_mode) {
        let target = workflow
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| JSON_PAYLOAD_INPUT.to_string());
        let payload = serde_json::to_string(values)?;
        return Ok(IndexMap::from([(target, payload)]));
    }

    Ok(workflow
        .inputs
        .iter()
        .filter_map(|input| values.get(&input.name).map(|value| (input.name.clone(), value.clone())))
        .collect())
}
