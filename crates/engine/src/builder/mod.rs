//! Interactive editing of one workflow's override entry.
//!
//! [`BuilderState`] is created from a parsed workflow plus its existing entry
//! (if any), mutated through synchronous operations, and turned back into a
//! minimal [`WorkflowConfigEntry`](wdui_types::WorkflowConfigEntry) for
//! persistence. Group ids are session-local and never serialized.

mod groups;
mod state;

pub use groups::{GroupId, GroupPartition, GroupState, Partition};
pub use state::{BuilderState, InputDraft};
