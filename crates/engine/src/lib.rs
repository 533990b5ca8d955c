//! # wdui engine
//!
//! Computes the form a `workflow_dispatch` trigger should render and keeps the
//! repository's override document in sync with edits to that form.
//!
//! ## Usage
//!
//! ```rust
//! use wdui_engine::{parse_config_document, parse_workflow_definition, resolve_inputs};
//!
//! let workflow = parse_workflow_definition(r#"
//! name: Release
//! on:
//!   workflow_dispatch:
//!     inputs:
//!       version:
//!         required: true
//! "#)?;
//! let document = parse_config_document(r#"
//! workflows:
//!   release.yml:
//!     inputs:
//!       version:
//!         label: Version
//! "#)?;
//!
//! let resolved = resolve_inputs(&workflow.inputs, document.entry("release.yml"));
//! assert_eq!(resolved[0].label, "Version");
//! assert!(resolved[0].required);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`parser`**: declared inputs from workflow definition text
//! - **`document`**: override document reading and single-entry updates
//! - **`resolve`**: merging declared inputs with overrides, form layout
//! - **`builder`**: interactive grouping and ordering of inputs
//! - **`persist`**: optimistic-concurrency saves over a [`ContentStore`]
//! - **`store`**: filesystem and in-memory stores
//! - **`options`**: dynamic option lists behind an [`OptionsProvider`]
//! - **`dispatch`**: default values, submission checks and dispatch payloads
//! - **`template`**: starter override documents

pub mod builder;
pub mod dispatch;
pub mod document;
pub mod options;
pub mod parser;
pub mod persist;
pub mod resolve;
pub mod store;
pub mod template;

pub use builder::{BuilderState, GroupId, GroupPartition, GroupState, InputDraft, Partition};
pub use dispatch::{JSON_PAYLOAD_INPUT, build_dispatch_inputs, initial_values, validate_submission};
pub use document::{DEFAULT_OVERRIDE_PATH, DocumentError, parse_config_document, serialize_config_document, upsert_workflow_entry};
pub use options::{OptionsProvider, expand_endpoint, extract_path, load_dynamic_options, options_from_api_payload};
pub use parser::{ParseError, UNNAMED_WORKFLOW, parse_workflow_definition};
pub use persist::{ConfigPersister, LoadedDocument, PersistError};
pub use resolve::{FormInput, FormLayout, FormSection, arrange_form, resolve_inputs};
pub use store::{ContentStore, FileSystemStore, InMemoryContentStore, StoreError, StoredFile};
pub use template::{config_edit_url, generate_config_template, title_case};

/// Key of a workflow inside the override document: the basename of its path.
///
/// `.github/workflows/deploy.yml` and `deploy.yml` both map to `deploy.yml`.
pub fn workflow_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
