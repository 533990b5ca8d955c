//! Group membership and ordering operations.
//!
//! Inputs live in one flat `input_order` sequence. Each input records the group
//! it belongs to (or none), and the per-group member lists are derived from
//! the flat sequence on demand, so ordering and membership can never drift
//! apart.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use wdui_types::GroupSpec;

use super::BuilderState;

/// Session-local group identity. Never written to the override document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupState {
    pub id: GroupId,
    pub title: String,
}

/// Members of one group, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPartition {
    pub id: GroupId,
    pub title: String,
    pub members: Vec<String>,
}

/// Inputs split by group membership.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    pub ungrouped: Vec<String>,
    /// One entry per group in group order, including groups without members.
    pub groups: Vec<GroupPartition>,
}

impl BuilderState {
    pub fn groups(&self) -> &[GroupState] {
        &self.draft.groups
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupState> {
        self.draft.groups.iter().find(|group| group.id == id)
    }

    /// First group carrying `title`.
    pub fn group_by_title(&self, title: &str) -> Option<GroupId> {
        self.draft.groups.iter().find(|group| group.title == title).map(|group| group.id)
    }

    /// Group an input belongs to; `None` for ungrouped or unknown inputs.
    pub fn group_of(&self, input: &str) -> Option<GroupId> {
        self.draft.inputs.get(input).and_then(|draft| draft.group)
    }

    pub fn add_group(&mut self, title: impl Into<String>) -> GroupId {
        let id = GroupId(self.next_group_seq);
        self.next_group_seq += 1;
        self.draft.groups.push(GroupState { id, title: title.into() });
        id
    }

    /// Deletes a group. Its members become ungrouped; no input is removed.
    pub fn remove_group(&mut self, id: GroupId) -> bool {
        let before = self.draft.groups.len();
        self.draft.groups.retain(|group| group.id != id);
        if self.draft.groups.len() == before {
            return false;
        }
        for draft in self.draft.inputs.values_mut() {
            if draft.group == Some(id) {
                draft.group = None;
            }
        }
        true
    }

    pub fn rename_group(&mut self, id: GroupId, title: impl Into<String>) -> bool {
        match self.draft.groups.iter_mut().find(|group| group.id == id) {
            Some(group) => {
                group.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Moves a group into the position currently held by `target`.
    ///
    /// Only the group list is reordered; membership is untouched.
    pub fn move_group(&mut self, id: GroupId, target: GroupId) -> bool {
        let (Some(from), Some(to)) = (self.group_index(id), self.group_index(target)) else {
            return false;
        };
        if from != to {
            let group = self.draft.groups.remove(from);
            self.draft.groups.insert(to, group);
        }
        true
    }

    /// Swaps a group with its neighbour; negative offsets move it up.
    pub fn shift_group(&mut self, id: GroupId, offset: isize) -> bool {
        let Some(index) = self.group_index(id) else {
            return false;
        };
        let Some(target) = index.checked_add_signed(offset).filter(|target| *target < self.draft.groups.len()) else {
            return false;
        };
        self.draft.groups.swap(index, target);
        true
    }

    /// Sets the group of an input; `None` makes it ungrouped.
    ///
    /// Unknown inputs and unknown groups leave the state unchanged.
    pub fn assign_group(&mut self, input: &str, group: Option<GroupId>) -> bool {
        if let Some(id) = group
            && self.group_index(id).is_none()
        {
            return false;
        }
        match self.draft.inputs.get_mut(input) {
            Some(draft) => {
                draft.group = group;
                true
            }
            None => false,
        }
    }

    /// Drops `input` immediately before `reference` in the input order.
    ///
    /// When the reference sits in a different group (or is ungrouped while the
    /// moved input is not), the moved input joins the reference's group.
    /// Repeating the same move leaves the state unchanged.
    pub fn move_input(&mut self, input: &str, reference: &str) -> bool {
        if input == reference || !self.draft.inputs.contains_key(input) || !self.draft.inputs.contains_key(reference) {
            return false;
        }
        let order = &mut self.draft.input_order;
        let Some(from) = order.iter().position(|name| name == input) else {
            return false;
        };
        let moved = order.remove(from);
        let Some(to) = order.iter().position(|name| name == reference) else {
            order.insert(from, moved);
            return false;
        };
        order.insert(to, moved);

        let target_group = self.group_of(reference);
        if let Some(draft) = self.draft.inputs.get_mut(input)
            && draft.group != target_group
        {
            draft.group = target_group;
        }
        true
    }

    /// Splits the input order by membership in one pass.
    pub fn partition(&self) -> Partition {
        let mut groups: Vec<GroupPartition> = self
            .draft
            .groups
            .iter()
            .map(|group| GroupPartition {
                id: group.id,
                title: group.title.clone(),
                members: Vec::new(),
            })
            .collect();
        let slots: HashMap<GroupId, usize> = groups.iter().enumerate().map(|(index, group)| (group.id, index)).collect();

        let mut ungrouped = Vec::new();
        for name in &self.draft.input_order {
            match self.group_of(name).and_then(|id| slots.get(&id)) {
                Some(&slot) => groups[slot].members.push(name.clone()),
                None => ungrouped.push(name.clone()),
            }
        }
        Partition { ungrouped, groups }
    }

    /// Rebuilds groups from persisted specs.
    ///
    /// Each distinct title gets a fresh id; specs repeating a title merge into
    /// the first. Members are linked by name, names that are not inputs are
    /// skipped, and an input listed twice stays with its first group. The
    /// grouped inputs are then reordered within the slots they already occupy
    /// so each group's members come back in their persisted order.
    pub(super) fn restore_groups(&mut self, specs: &[GroupSpec]) {
        let mut by_title: HashMap<&str, GroupId> = HashMap::new();
        let mut persisted_order: Vec<String> = Vec::new();

        for spec in specs {
            let id = match by_title.get(spec.title.as_str()) {
                Some(id) => *id,
                None => {
                    let id = self.add_group(spec.title.clone());
                    by_title.insert(spec.title.as_str(), id);
                    id
                }
            };
            for name in &spec.inputs {
                let Some(draft) = self.draft.inputs.get_mut(name) else {
                    debug!(input = %name, group = %spec.title, "group lists an unknown input; skipping");
                    continue;
                };
                if draft.group.is_some() {
                    continue;
                }
                draft.group = Some(id);
                persisted_order.push(name.clone());
            }
        }

        let grouped: HashSet<String> = persisted_order.iter().cloned().collect();
        let mut persisted = persisted_order.into_iter();
        for slot in self.draft.input_order.iter_mut().filter(|slot| grouped.contains(slot.as_str())) {
            if let Some(name) = persisted.next() {
                *slot = name;
            }
        }
    }

    fn group_index(&self, id: GroupId) -> Option<usize> {
        self.draft.groups.iter().position(|group| group.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wdui_types::{DeclaredInput, ParsedWorkflow, WorkflowConfigEntry};

    fn workflow(names: &[&str]) -> ParsedWorkflow {
        ParsedWorkflow {
            name: "Deploy".into(),
            has_dispatch_trigger: true,
            inputs: names.iter().copied().map(DeclaredInput::new).collect(),
        }
    }

    fn grouped_state() -> BuilderState {
        let entry = WorkflowConfigEntry {
            groups: vec![
                GroupSpec {
                    title: "Target".into(),
                    inputs: vec!["a".into(), "b".into()],
                },
                GroupSpec {
                    title: "Options".into(),
                    inputs: vec!["c".into()],
                },
            ],
            ..WorkflowConfigEntry::default()
        };
        BuilderState::load(&workflow(&["a", "b", "c", "d"]), Some(&entry))
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn removing_a_group_ungroups_its_members() {
        let mut state = grouped_state();
        let target = state.group_by_title("Target").expect("target group");
        let options = state.group_by_title("Options").expect("options group");

        assert!(state.remove_group(target));
        assert_eq!(state.group_of("a"), None);
        assert_eq!(state.group_of("b"), None);
        assert_eq!(state.group_of("c"), Some(options));
        assert_eq!(state.input_order().len(), 4);

        let partition = state.partition();
        assert_eq!(partition.groups.len(), 1);
        assert_eq!(partition.groups[0].title, "Options");
        assert_eq!(partition.ungrouped, vec!["a", "b", "d"]);
    }

    #[test]
    fn move_input_is_idempotent() {
        let mut state = grouped_state();
        assert!(state.move_input("d", "b"));
        let once = state.clone();
        assert!(state.move_input("d", "b"));
        assert_eq!(state, once);
        assert_eq!(state.input_order(), ["a", "d", "b", "c"]);
    }

    #[test]
    fn move_input_adopts_reference_group() {
        let mut state = grouped_state();
        let target = state.group_by_title("Target");

        state.move_input("c", "a");
        assert_eq!(state.group_of("c"), target);
        assert_eq!(state.partition().groups[0].members, vec!["c", "a", "b"]);

        state.move_input("a", "d");
        assert_eq!(state.group_of("a"), None);
        assert_eq!(state.partition().ungrouped, vec!["a", "d"]);
    }

    #[test]
    fn move_input_ignores_unknown_names() {
        let mut state = grouped_state();
        let before = state.clone();
        assert!(!state.move_input("missing", "a"));
        assert!(!state.move_input("a", "missing"));
        assert!(!state.move_input("a", "a"));
        assert_eq!(state, before);
    }

    #[test]
    fn assign_group_requires_known_input_and_group() {
        let mut state = grouped_state();
        let options = state.group_by_title("Options").expect("options group");

        assert!(state.assign_group("d", Some(options)));
        assert_eq!(state.partition().groups[1].members, vec!["c", "d"]);
        assert!(state.assign_group("d", None));
        assert_eq!(state.group_of("d"), None);

        assert!(!state.assign_group("missing", Some(options)));
        state.remove_group(options);
        assert!(!state.assign_group("d", Some(options)));
    }

    #[test]
    fn move_and_shift_groups_reorder_only_the_group_list() {
        let mut state = grouped_state();
        let target = state.group_by_title("Target").expect("target group");
        let options = state.group_by_title("Options").expect("options group");
        let extra = state.add_group("Extra");

        assert!(state.move_group(extra, target));
        let titles: Vec<_> = state.groups().iter().map(|group| group.title.as_str()).collect();
        assert_eq!(titles, vec!["Extra", "Target", "Options"]);
        assert_eq!(state.group_of("c"), Some(options));

        assert!(state.shift_group(options, -1));
        assert!(!state.shift_group(extra, -1));
        let titles: Vec<_> = state.groups().iter().map(|group| group.title.as_str()).collect();
        assert_eq!(titles, vec!["Extra", "Options", "Target"]);
    }

    #[test]
    fn operations_keep_input_order_a_permutation() {
        let mut state = grouped_state();
        let expected = sorted(state.input_order().to_vec());
        let target = state.group_by_title("Target").expect("target group");
        let fresh = state.add_group("Fresh");

        state.move_input("a", "d");
        state.assign_group("d", Some(fresh));
        state.move_input("b", "d");
        state.move_group(fresh, target);
        state.remove_group(target);
        state.move_input("d", "a");
        state.rename_group(fresh, "Renamed");

        assert_eq!(sorted(state.input_order().to_vec()), expected);
        let partition = state.partition();
        let mut covered: Vec<String> = partition.ungrouped.clone();
        covered.extend(partition.groups.into_iter().flat_map(|group| group.members));
        assert_eq!(sorted(covered), expected);
    }

    #[test]
    fn restore_uses_persisted_member_order_and_merges_titles() {
        let entry = WorkflowConfigEntry {
            groups: vec![
                GroupSpec {
                    title: "Target".into(),
                    inputs: vec!["c".into(), "missing".into(), "a".into()],
                },
                GroupSpec {
                    title: "Target".into(),
                    inputs: vec!["d".into(), "c".into()],
                },
            ],
            ..WorkflowConfigEntry::default()
        };
        let state = BuilderState::load(&workflow(&["a", "b", "c", "d"]), Some(&entry));

        assert_eq!(state.groups().len(), 1);
        assert_eq!(state.input_order(), ["c", "b", "a", "d"]);
        let partition = state.partition();
        assert_eq!(partition.groups[0].members, vec!["c", "a", "d"]);
        assert_eq!(partition.ungrouped, vec!["b"]);
    }
}
