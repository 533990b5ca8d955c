//! Merging declared inputs with their overrides.
//!
//! The merge is per field: an override value wins when it is present and
//! non-empty, otherwise the declared value is used, otherwise a type-appropriate
//! default applies. Labels fall back to the raw input name; title-casing only
//! happens when a starter template is generated.

use std::collections::HashSet;
use std::ops::Deref;

use serde::Serialize;
use wdui_types::{DeclaredInput, GroupSpec, InputOrigin, InputOverride, ResolvedInput, SelectOption, WorkflowConfigEntry};

/// Resolve declared inputs against an optional override entry.
///
/// Output order is the declared order followed by config-defined inputs in the
/// order the override document lists them. A config-defined input is any
/// override key with an `optionsFrom` source that the workflow does not
/// declare; it is synthesized as an optional input with an empty description.
pub fn resolve_inputs(declared: &[DeclaredInput], entry: Option<&WorkflowConfigEntry>) -> Vec<ResolvedInput> {
    let mut resolved: Vec<ResolvedInput> = declared
        .iter()
        .map(|input| overlay(input, entry.and_then(|entry| entry.input(&input.name)), InputOrigin::Declared))
        .collect();

    let Some(entry) = entry else {
        return resolved;
    };

    let declared_names: HashSet<&str> = declared.iter().map(|input| input.name.as_str()).collect();
    for (name, input_override) in &entry.inputs {
        if input_override.options_from.is_none() || declared_names.contains(name.as_str()) {
            continue;
        }
        let base = DeclaredInput::new(name.clone());
        resolved.push(overlay(&base, Some(input_override), InputOrigin::Config));
    }

    resolved
}

fn overlay(input: &DeclaredInput, input_override: Option<&InputOverride>, origin: InputOrigin) -> ResolvedInput {
    let empty = InputOverride::default();
    let input_override = input_override.unwrap_or(&empty);

    let options = if input_override.options.is_empty() {
        input
            .options
            .as_ref()
            .map(|options| options.iter().cloned().map(SelectOption::plain).collect())
    } else {
        Some(input_override.options.clone())
    };

    ResolvedInput {
        name: input.name.clone(),
        description: non_empty(&input_override.description).unwrap_or_else(|| input.description.clone()),
        required: input.required,
        default: non_empty(&input_override.default).or_else(|| input.default.clone()),
        declared_type: input.kind,
        resolved_type: input_override.kind.unwrap_or(input.kind),
        label: non_empty(&input_override.label).unwrap_or_else(|| input.name.clone()),
        options,
        icon: non_empty(&input_override.icon),
        placeholder: non_empty(&input_override.placeholder),
        pattern: non_empty(&input_override.pattern),
        validation_message: non_empty(&input_override.validation_message),
        min: input_override.min,
        max: input_override.max,
        step: input_override.step,
        options_from: input_override.options_from.clone(),
        origin,
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|text| !text.is_empty()).cloned()
}

/// A resolved input as rendered: every resolved field plus the description to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    #[serde(flatten)]
    pub input: ResolvedInput,
    /// `None` when the stored description is boilerplate such as `"string input"`.
    pub display_description: Option<String>,
}

impl From<&ResolvedInput> for FormInput {
    fn from(input: &ResolvedInput) -> Self {
        Self {
            display_description: input.display_description().map(str::to_string),
            input: input.clone(),
        }
    }
}

impl Deref for FormInput {
    type Target = ResolvedInput;

    fn deref(&self) -> &ResolvedInput {
        &self.input
    }
}

/// Resolved inputs arranged for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormLayout {
    /// Inputs outside every group, in resolved order, rendered without a header.
    pub ungrouped: Vec<FormInput>,
    /// Titled sections in group order.
    pub sections: Vec<FormSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSection {
    pub title: String,
    pub inputs: Vec<FormInput>,
}

/// Split resolved inputs into titled group sections and the ungrouped bucket.
///
/// Group members are listed in the group's own order. Names that do not
/// resolve are skipped, and an input claimed by several groups stays in the
/// first one. Groups left without members are omitted.
pub fn arrange_form(resolved: &[ResolvedInput], groups: &[GroupSpec]) -> FormLayout {
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut sections = Vec::new();

    for group in groups {
        let inputs: Vec<FormInput> = group
            .inputs
            .iter()
            .filter_map(|name| resolved.iter().find(|input| &input.name == name))
            .filter(|input| claimed.insert(input.name.as_str()))
            .map(FormInput::from)
            .collect();
        if !inputs.is_empty() {
            sections.push(FormSection {
                title: group.title.clone(),
                inputs,
            });
        }
    }

    let ungrouped = resolved
        .iter()
        .filter(|input| !claimed.contains(input.name.as_str()))
        .map(FormInput::from)
        .collect();

    FormLayout { ungrouped, sections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wdui_types::InputKind;
    use indexmap::IndexMap;
    use wdui_types::{OptionsSource, OptionsSourceKind};

    fn version_input() -> DeclaredInput {
        DeclaredInput {
            name: "version".into(),
            description: String::new(),
            required: true,
            default: Some(String::new()),
            kind: InputKind::String,
            options: None,
        }
    }

    fn entry_with(inputs: Vec<(&str, InputOverride)>) -> WorkflowConfigEntry {
        WorkflowConfigEntry {
            inputs: inputs.into_iter().map(|(name, value)| (name.to_string(), value)).collect::<IndexMap<_, _>>(),
            ..WorkflowConfigEntry::default()
        }
    }

    #[test]
    fn no_override_keeps_declared_fields() {
        let declared = vec![
            version_input(),
            DeclaredInput {
                name: "environment".into(),
                description: "Where to deploy".into(),
                required: false,
                default: Some("staging".into()),
                kind: InputKind::Choice,
                options: Some(vec!["staging".into(), "production".into()]),
            },
        ];

        let resolved = resolve_inputs(&declared, None);
        assert_eq!(resolved.len(), 2);

        let version = &resolved[0];
        assert_eq!(version.name, "version");
        assert_eq!(version.resolved_type, InputKind::String);
        assert_eq!(version.label, "version");
        assert!(version.required);
        assert_eq!(version.default.as_deref(), Some(""));

        let environment = &resolved[1];
        assert_eq!(environment.description, "Where to deploy");
        assert_eq!(environment.resolved_type, InputKind::Choice);
        assert_eq!(environment.option_values(), vec!["staging", "production"]);
        assert_eq!(environment.origin, InputOrigin::Declared);
    }

    #[test]
    fn pattern_override_keeps_raw_label() {
        let entry = entry_with(vec![(
            "version",
            InputOverride {
                pattern: Some(r"^v\d+\.\d+\.\d+$".into()),
                validation_message: Some("Must be semver".into()),
                ..InputOverride::default()
            },
        )]);

        let resolved = resolve_inputs(&[version_input()], Some(&entry));
        assert_eq!(resolved[0].pattern.as_deref(), Some(r"^v\d+\.\d+\.\d+$"));
        assert_eq!(resolved[0].validation_message.as_deref(), Some("Must be semver"));
        assert_eq!(resolved[0].label, "version");
    }

    #[test]
    fn empty_override_values_do_not_win() {
        let entry = entry_with(vec![(
            "version",
            InputOverride {
                label: Some(String::new()),
                default: Some(String::new()),
                kind: Some(InputKind::Select),
                options: vec![SelectOption::new("v1", "Version 1")],
                ..InputOverride::default()
            },
        )]);

        let mut declared = version_input();
        declared.default = Some("v0".into());
        let resolved = resolve_inputs(&[declared], Some(&entry));
        assert_eq!(resolved[0].label, "version");
        assert_eq!(resolved[0].default.as_deref(), Some("v0"));
        assert_eq!(resolved[0].resolved_type, InputKind::Select);
        assert_eq!(resolved[0].declared_type, InputKind::String);
        assert_eq!(resolved[0].options, Some(vec![SelectOption::new("v1", "Version 1")]));
    }

    #[test]
    fn synthesizes_config_defined_inputs_with_sources() {
        let entry = entry_with(vec![
            (
                "branch",
                InputOverride {
                    label: Some("Branch".into()),
                    options_from: Some(OptionsSource::new(OptionsSourceKind::Branches)),
                    ..InputOverride::default()
                },
            ),
            (
                "orphan",
                InputOverride {
                    label: Some("Ignored".into()),
                    ..InputOverride::default()
                },
            ),
        ]);

        let resolved = resolve_inputs(&[version_input()], Some(&entry));
        let names: Vec<_> = resolved.iter().map(|input| input.name.as_str()).collect();
        assert_eq!(names, vec!["version", "branch"]);

        let branch = &resolved[1];
        assert!(!branch.required);
        assert_eq!(branch.description, "");
        assert_eq!(branch.resolved_type, InputKind::String);
        assert_eq!(branch.label, "Branch");
        assert!(branch.is_config_defined());
    }

    #[test]
    fn declared_input_with_source_is_not_duplicated() {
        let entry = entry_with(vec![(
            "version",
            InputOverride {
                options_from: Some(OptionsSource::new(OptionsSourceKind::Tags)),
                ..InputOverride::default()
            },
        )]);
        let resolved = resolve_inputs(&[version_input()], Some(&entry));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].options_from, Some(OptionsSource::new(OptionsSourceKind::Tags)));
    }

    #[test]
    fn arrange_form_groups_and_ungrouped() {
        let declared: Vec<_> = ["a", "b", "c", "d"].into_iter().map(DeclaredInput::new).collect();
        let resolved = resolve_inputs(&declared, None);
        let groups = vec![
            GroupSpec {
                title: "Target".into(),
                inputs: vec!["b".into(), "a".into(), "missing".into()],
            },
            GroupSpec {
                title: "Options".into(),
                inputs: vec!["a".into(), "c".into()],
            },
            GroupSpec {
                title: "Empty".into(),
                inputs: vec![],
            },
        ];

        let layout = arrange_form(&resolved, &groups);
        let section_names: Vec<Vec<&str>> = layout
            .sections
            .iter()
            .map(|section| section.inputs.iter().map(|input| input.name.as_str()).collect())
            .collect();
        assert_eq!(section_names, vec![vec!["b", "a"], vec!["c"]]);
        let ungrouped: Vec<_> = layout.ungrouped.iter().map(|input| input.name.as_str()).collect();
        assert_eq!(ungrouped, vec!["d"]);
    }

    #[test]
    fn layout_output_carries_display_description() {
        let declared = vec![
            DeclaredInput {
                description: "String input".into(),
                ..DeclaredInput::new("version")
            },
            DeclaredInput {
                description: "Where to deploy".into(),
                ..DeclaredInput::new("environment")
            },
        ];
        let resolved = resolve_inputs(&declared, None);
        let layout = arrange_form(&resolved, &[]);

        assert_eq!(layout.ungrouped[0].display_description, None);
        assert_eq!(layout.ungrouped[0].description, "String input");
        assert_eq!(layout.ungrouped[1].display_description.as_deref(), Some("Where to deploy"));

        let json = serde_json::to_value(&layout).expect("serialize layout");
        let first = &json["ungrouped"][0];
        assert_eq!(first["name"], "version");
        assert_eq!(first["description"], "String input");
        assert!(first["displayDescription"].is_null());
        assert_eq!(json["ungrouped"][1]["displayDescription"], "Where to deploy");
    }
}
