use indexmap::IndexMap;
use wdui_types::{DeclaredInput, InputKind, InputOverride, OptionsSource, ParsedWorkflow, SelectOption, WorkflowConfigEntry};

use super::groups::{GroupId, GroupState};
use crate::template::title_case;

/// Editable override fields for one input.
///
/// `label` and `description` start from their effective values (the
/// title-cased name and the declared description) so they can be edited in
/// place; [`BuilderState::to_entry`] leaves them out again when unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDraft {
    pub label: String,
    pub description: String,
    pub kind: Option<InputKind>,
    pub icon: Option<String>,
    pub placeholder: Option<String>,
    pub pattern: Option<String>,
    pub validation_message: Option<String>,
    pub options: Vec<SelectOption>,
    pub default: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub options_from: Option<OptionsSource>,
    pub(super) group: Option<GroupId>,
    declared_description: String,
    declared_default: Option<String>,
    config_defined: bool,
}

impl InputDraft {
    fn new(name: &str, declared: Option<&DeclaredInput>, input_override: Option<&InputOverride>) -> Self {
        let empty = InputOverride::default();
        let input_override = input_override.unwrap_or(&empty);
        let declared_description = declared.map(|input| input.description.clone()).unwrap_or_default();

        Self {
            label: non_empty(&input_override.label).unwrap_or_else(|| title_case(name)),
            description: non_empty(&input_override.description).unwrap_or_else(|| declared_description.clone()),
            kind: input_override.kind,
            icon: input_override.icon.clone(),
            placeholder: input_override.placeholder.clone(),
            pattern: input_override.pattern.clone(),
            validation_message: input_override.validation_message.clone(),
            options: input_override.options.clone(),
            default: input_override.default.clone(),
            min: input_override.min,
            max: input_override.max,
            step: input_override.step,
            options_from: input_override.options_from.clone(),
            group: None,
            declared_description,
            declared_default: declared.and_then(|input| input.default.clone()),
            config_defined: declared.is_none(),
        }
    }

    /// True for inputs that exist only in the override document.
    pub fn is_config_defined(&self) -> bool {
        self.config_defined
    }

    /// The minimal override that reproduces this draft.
    fn to_override(&self, name: &str) -> InputOverride {
        InputOverride {
            kind: self.kind,
            label: Some(self.label.clone()).filter(|label| !label.is_empty() && *label != title_case(name)),
            icon: non_empty(&self.icon),
            description: Some(self.description.clone()).filter(|text| !text.is_empty() && *text != self.declared_description),
            placeholder: non_empty(&self.placeholder),
            pattern: non_empty(&self.pattern),
            validation_message: non_empty(&self.validation_message),
            options: self.options.clone(),
            default: non_empty(&self.default).filter(|value| Some(value) != self.declared_default.as_ref()),
            min: self.min,
            max: self.max,
            step: self.step,
            options_from: self.options_from.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Draft {
    pub(super) title: String,
    pub(super) description: String,
    pub(super) json_mode: bool,
    pub(super) theme: Option<String>,
    pub(super) inputs: IndexMap<String, InputDraft>,
    pub(super) input_order: Vec<String>,
    pub(super) groups: Vec<GroupState>,
}

/// In-memory editing session for one workflow's override entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderState {
    workflow_name: String,
    pub(super) draft: Draft,
    baseline: Draft,
    pub(super) next_group_seq: u64,
    /// Overrides for names that are neither declared nor config-defined; written back untouched.
    retained: IndexMap<String, InputOverride>,
}

impl BuilderState {
    /// Starts a session from the parsed workflow and its current entry.
    ///
    /// Declared inputs come first in declaration order, followed by
    /// config-defined inputs (override keys carrying `optionsFrom`) in
    /// document order.
    pub fn load(workflow: &ParsedWorkflow, entry: Option<&WorkflowConfigEntry>) -> Self {
        let mut inputs: IndexMap<String, InputDraft> = workflow
            .inputs
            .iter()
            .map(|declared| {
                let input_override = entry.and_then(|entry| entry.input(&declared.name));
                (declared.name.clone(), InputDraft::new(&declared.name, Some(declared), input_override))
            })
            .collect();

        let mut retained = IndexMap::new();
        for (name, input_override) in entry.map(|entry| &entry.inputs).into_iter().flatten() {
            if inputs.contains_key(name) {
                continue;
            }
            if input_override.options_from.is_some() {
                inputs.insert(name.clone(), InputDraft::new(name, None, Some(input_override)));
            } else {
                retained.insert(name.clone(), input_override.clone());
            }
        }

        let draft = Draft {
            title: entry
                .and_then(|entry| non_empty(&entry.title))
                .unwrap_or_else(|| workflow.name.clone()),
            description: entry.and_then(|entry| entry.description.clone()).unwrap_or_default(),
            json_mode: entry.is_some_and(WorkflowConfigEntry::json_mode),
            theme: entry.and_then(|entry| entry.theme.clone()),
            input_order: inputs.keys().cloned().collect(),
            inputs,
            groups: Vec::new(),
        };

        let mut state = Self {
            workflow_name: workflow.name.clone(),
            baseline: draft.clone(),
            draft,
            next_group_seq: 0,
            retained,
        };
        if let Some(entry) = entry {
            state.restore_groups(&entry.groups);
        }
        state.baseline = state.draft.clone();
        state
    }

    /// Builds the entry to persist, leaving out every field that matches its default.
    pub fn to_entry(&self) -> WorkflowConfigEntry {
        let mut inputs: IndexMap<String, InputOverride> = self
            .draft
            .inputs
            .iter()
            .map(|(name, draft)| (name.clone(), draft.to_override(name)))
            .filter(|(_, input_override)| !input_override.is_empty())
            .collect();
        for (name, input_override) in &self.retained {
            inputs.entry(name.clone()).or_insert_with(|| input_override.clone());
        }

        let groups = self
            .partition()
            .groups
            .into_iter()
            .filter(|group| !group.members.is_empty())
            .map(|group| wdui_types::GroupSpec {
                title: group.title,
                inputs: group.members,
            })
            .collect();

        WorkflowConfigEntry {
            title: Some(self.draft.title.clone()).filter(|title| !title.is_empty() && *title != self.workflow_name),
            description: Some(self.draft.description.clone()).filter(|text| !text.is_empty()),
            theme: self.draft.theme.clone(),
            json_mode: self.draft.json_mode.then_some(true),
            inputs,
            groups,
        }
    }

    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    pub fn title(&self) -> &str {
        &self.draft.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn description(&self) -> &str {
        &self.draft.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn json_mode(&self) -> bool {
        self.draft.json_mode
    }

    pub fn set_json_mode(&mut self, enabled: bool) {
        self.draft.json_mode = enabled;
    }

    /// Every input name in display order.
    pub fn input_order(&self) -> &[String] {
        &self.draft.input_order
    }

    pub fn input(&self, name: &str) -> Option<&InputDraft> {
        self.draft.inputs.get(name)
    }

    pub fn input_mut(&mut self, name: &str) -> Option<&mut InputDraft> {
        self.draft.inputs.get_mut(name)
    }

    /// True when the session differs from what was loaded (or last saved).
    pub fn is_dirty(&self) -> bool {
        self.draft != self.baseline
    }

    /// Makes the current state the new clean baseline after a successful save.
    pub fn mark_saved(&mut self) {
        self.baseline = self.draft.clone();
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|text| !text.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{parse_config_document, upsert_workflow_entry};
    use wdui_types::{GroupSpec, OptionsSourceKind};

    fn workflow() -> ParsedWorkflow {
        ParsedWorkflow {
            name: "Deploy".into(),
            has_dispatch_trigger: true,
            inputs: vec![
                DeclaredInput {
                    name: "target_env".into(),
                    description: "Where to deploy".into(),
                    required: true,
                    default: Some("staging".into()),
                    kind: InputKind::Choice,
                    options: Some(vec!["staging".into(), "production".into()]),
                },
                DeclaredInput::new("dry-run"),
                DeclaredInput::new("notes"),
            ],
        }
    }

    #[test]
    fn load_without_entry_uses_effective_values() {
        let state = BuilderState::load(&workflow(), None);
        assert_eq!(state.title(), "Deploy");
        assert_eq!(state.input("target_env").map(|input| input.label.as_str()), Some("Target Env"));
        assert_eq!(state.input("dry-run").map(|input| input.label.as_str()), Some("Dry Run"));
        assert_eq!(state.input("target_env").map(|input| input.description.as_str()), Some("Where to deploy"));
        assert!(!state.is_dirty());
        assert_eq!(state.to_entry(), WorkflowConfigEntry::default());
    }

    #[test]
    fn to_entry_omits_defaults() {
        let mut state = BuilderState::load(&workflow(), None);
        let input = state.input_mut("target_env").expect("target_env");
        input.label = "Environment".into();
        input.default = Some("staging".into());
        input.description = "Where to deploy".into();
        let notes = state.input_mut("notes").expect("notes");
        notes.label = "Notes".into();
        notes.placeholder = Some(String::new());
        state.set_json_mode(false);

        let entry = state.to_entry();
        assert_eq!(entry.inputs.len(), 1);
        let target = &entry.inputs["target_env"];
        assert_eq!(target.label.as_deref(), Some("Environment"));
        assert_eq!(target.default, None);
        assert_eq!(target.description, None);
        assert_eq!(entry.json_mode, None);
        assert_eq!(entry.title, None);
    }

    #[test]
    fn reload_of_saved_entry_is_stable() {
        let mut state = BuilderState::load(&workflow(), None);
        state.set_title("Ship it");
        state.set_json_mode(true);
        state.input_mut("notes").expect("notes").kind = Some(InputKind::Json);
        let group = state.add_group("Safety");
        state.assign_group("dry-run", Some(group));
        state.assign_group("notes", Some(group));
        state.move_input("notes", "dry-run");
        state.add_group("Unused");
        assert!(state.is_dirty());

        let entry = state.to_entry();
        assert_eq!(
            entry.groups,
            vec![GroupSpec {
                title: "Safety".into(),
                inputs: vec!["notes".into(), "dry-run".into()],
            }]
        );

        let text = upsert_workflow_entry(None, "deploy.yml", &entry).expect("serialize");
        assert!(!text.contains("id:"), "group ids must not be persisted:\n{text}");
        let reparsed = parse_config_document(&text).expect("reparse");
        let reloaded = BuilderState::load(&workflow(), reparsed.entry("deploy.yml"));

        assert_eq!(reloaded.to_entry(), entry);
        assert_eq!(reloaded.title(), "Ship it");
        assert!(reloaded.json_mode());
        let partition = reloaded.partition();
        assert_eq!(partition.groups.len(), 1);
        assert_eq!(partition.groups[0].members, vec!["notes", "dry-run"]);
        assert!(!reloaded.is_dirty());
    }

    #[test]
    fn config_defined_and_unknown_overrides_survive() {
        let mut inputs = IndexMap::new();
        inputs.insert(
            "branch".to_string(),
            InputOverride {
                options_from: Some(OptionsSource::new(OptionsSourceKind::Branches)),
                ..InputOverride::default()
            },
        );
        inputs.insert(
            "legacy".to_string(),
            InputOverride {
                label: Some("Legacy".into()),
                ..InputOverride::default()
            },
        );
        let entry = WorkflowConfigEntry {
            theme: Some("dark".into()),
            inputs,
            ..WorkflowConfigEntry::default()
        };

        let state = BuilderState::load(&workflow(), Some(&entry));
        assert_eq!(state.input_order(), ["target_env", "dry-run", "notes", "branch"]);
        assert!(state.input("branch").is_some_and(InputDraft::is_config_defined));
        assert!(state.input("legacy").is_none());
        assert_eq!(state.to_entry(), entry);
    }

    #[test]
    fn mark_saved_resets_dirty_flag() {
        let mut state = BuilderState::load(&workflow(), None);
        state.set_description("Deploys the app");
        assert!(state.is_dirty());
        state.mark_saved();
        assert!(!state.is_dirty());
        state.set_description("");
        assert!(state.is_dirty());
    }
}
