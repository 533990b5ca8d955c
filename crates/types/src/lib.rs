//! Strongly typed models shared by the engine, the API client and the CLI.
//!
//! - [`workflow`]: inputs declared by a workflow's `workflow_dispatch` trigger
//! - [`config`]: the repository override document
//! - [`resolved`]: render-ready descriptors produced by merging the two

pub mod config;
pub mod resolved;
pub mod workflow;

pub use config::{ConfigDocument, GroupSpec, InputOverride, OptionsSource, OptionsSourceKind, SelectOption, WorkflowConfigEntry, scalar_to_string};
pub use resolved::{InputOrigin, ResolvedInput};
pub use workflow::validation::{REQUIRED_MESSAGE, validate_submitted_value};
pub use workflow::{DeclaredInput, InputKind, ParsedWorkflow};
