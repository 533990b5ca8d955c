//! Reading and writing the override document.
//!
//! Reads go through the typed [`ConfigDocument`] model. Writes splice the
//! edited workflow's entry into the existing text, so every other line
//! (comments, quoting and flow style of other entries included) keeps its
//! exact bytes. When the text layout cannot be spliced safely the document is
//! rebuilt from the untyped YAML tree instead.

use serde_yaml::{Mapping, Value as YamlValue};
use thiserror::Error;
use tracing::debug;
use wdui_types::{ConfigDocument, WorkflowConfigEntry};

/// Conventional location of the override document inside a repository.
pub const DEFAULT_OVERRIDE_PATH: &str = ".github/workflow-dispatch.yml";

const WORKFLOWS_KEY: &str = "workflows";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not parse override document: {0}")]
    Parse(String),
    #[error("override document has an unexpected shape: {0}")]
    Shape(String),
    #[error("could not serialize override document: {0}")]
    Serialize(String),
}

impl DocumentError {
    fn parse(error: serde_yaml::Error) -> Self {
        match error.location() {
            Some(location) => Self::Parse(format!("line {}, column {}: {}", location.line(), location.column(), error)),
            None => Self::Parse(error.to_string()),
        }
    }
}

/// Parse override document text. Blank text is an empty document.
pub fn parse_config_document(content: &str) -> Result<ConfigDocument, DocumentError> {
    if content.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }
    let value: YamlValue = serde_yaml::from_str(content).map_err(DocumentError::parse)?;
    if value.is_null() {
        return Ok(ConfigDocument::default());
    }
    if !value.is_mapping() {
        return Err(DocumentError::Shape("document root must be a mapping".to_string()));
    }
    serde_yaml::from_value(value).map_err(DocumentError::parse)
}

pub fn serialize_config_document(document: &ConfigDocument) -> Result<String, DocumentError> {
    serde_yaml::to_string(document).map_err(|error| DocumentError::Serialize(error.to_string()))
}

/// Replace exactly one workflow entry inside existing document text.
///
/// `existing` is `None` when no document exists yet, in which case a new one
/// holding only `workflows: {<file>: <entry>}` is produced. Other lines keep
/// their exact bytes; a missing entry is appended to the `workflows` block.
pub fn upsert_workflow_entry(existing: Option<&str>, workflow_file: &str, entry: &WorkflowConfigEntry) -> Result<String, DocumentError> {
    let existing = existing.filter(|text| !text.trim().is_empty());
    let mut root = match existing {
        Some(text) => match serde_yaml::from_str::<YamlValue>(text).map_err(DocumentError::parse)? {
            YamlValue::Mapping(mapping) => mapping,
            YamlValue::Null => Mapping::new(),
            _ => return Err(DocumentError::Shape("document root must be a mapping".to_string())),
        },
        None => Mapping::new(),
    };

    let entry_value = serde_yaml::to_value(entry).map_err(serialize_error)?;

    let workflows_key = YamlValue::String(WORKFLOWS_KEY.to_string());
    if matches!(root.get(&workflows_key), None | Some(YamlValue::Null)) {
        root.insert(workflows_key.clone(), YamlValue::Mapping(Mapping::new()));
    }
    let Some(YamlValue::Mapping(workflows)) = root.get_mut(&workflows_key) else {
        return Err(DocumentError::Shape("'workflows' must be a mapping".to_string()));
    };
    workflows.insert(YamlValue::String(workflow_file.to_string()), entry_value.clone());
    let expected = YamlValue::Mapping(root);

    if let Some(text) = existing {
        let rendered = render_entry(workflow_file, entry_value)?;
        // The splice is only trusted when it reads back as the intended tree.
        if let Some(spliced) = splice_entry(text, workflow_file, &rendered)
            && serde_yaml::from_str::<YamlValue>(&spliced).is_ok_and(|value| value == expected)
        {
            return Ok(spliced);
        }
        debug!(workflow = %workflow_file, "override document layout not spliceable; rewriting it whole");
    }

    serde_yaml::to_string(&expected).map_err(serialize_error)
}

fn serialize_error(error: serde_yaml::Error) -> DocumentError {
    DocumentError::Serialize(error.to_string())
}

/// `<file>:` followed by the entry, at indentation zero.
fn render_entry(workflow_file: &str, entry_value: YamlValue) -> Result<String, DocumentError> {
    let mut single = Mapping::new();
    single.insert(YamlValue::String(workflow_file.to_string()), entry_value);
    serde_yaml::to_string(&YamlValue::Mapping(single)).map_err(serialize_error)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Key of a `key: ...` block mapping line, unquoted, plus whatever follows the colon.
fn mapping_key(line: &str) -> Option<(String, &str)> {
    let trimmed = line.trim_start_matches(' ').trim_end_matches(['\r', '\n']);
    let (key, rest) = match trimmed.chars().next()? {
        quote @ ('"' | '\'') => {
            let close = trimmed[1..].find(quote)? + 1;
            (trimmed[1..close].to_string(), trimmed[close + 1..].strip_prefix(':')?)
        }
        _ => {
            let colon = trimmed
                .match_indices(':')
                .map(|(index, _)| index)
                .find(|&index| trimmed[index + 1..].is_empty() || trimmed[index + 1..].starts_with(' '))?;
            (trimmed[..colon].trim_end().to_string(), &trimmed[colon + 1..])
        }
    };
    Some((key, rest))
}

/// True when nothing but a comment follows the key on its line.
fn opens_block(rest: &str) -> bool {
    let rest = rest.trim();
    rest.is_empty() || rest.starts_with('#')
}

fn indent_block(block: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    block
        .split_inclusive('\n')
        .map(|line| if line.trim().is_empty() { line.to_string() } else { format!("{pad}{line}") })
        .collect()
}

/// Swaps (or appends) the `workflows.<file>` block in `text`.
///
/// Returns `None` when `workflows` is not a block mapping at the top level.
fn splice_entry(text: &str, workflow_file: &str, rendered: &str) -> Option<String> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let header = lines.iter().position(|line| {
        indent_of(line) == 0 && !is_blank_or_comment(line) && mapping_key(line).is_some_and(|(key, _)| key == WORKFLOWS_KEY)
    });

    let Some(header) = header else {
        let mut out = text.to_string();
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("workflows:\n");
        out.push_str(&indent_block(rendered, 2));
        return Some(out);
    };
    let (_, header_rest) = mapping_key(lines[header])?;
    if !opens_block(header_rest) {
        return None;
    }

    let block_end = (header + 1..lines.len())
        .find(|&index| !is_blank_or_comment(lines[index]) && indent_of(lines[index]) == 0)
        .unwrap_or(lines.len());
    let child_indent = (header + 1..block_end)
        .map(|index| lines[index])
        .find(|line| !is_blank_or_comment(line))
        .map(indent_of)
        .unwrap_or(2);

    let target = (header + 1..block_end).find(|&index| {
        let line = lines[index];
        !is_blank_or_comment(line)
            && indent_of(line) == child_indent
            && mapping_key(line).is_some_and(|(key, _)| key == workflow_file)
    });

    let (start, end) = match target {
        Some(start) => {
            let mut end = (start + 1..block_end)
                .find(|&index| !lines[index].trim().is_empty() && indent_of(lines[index]) <= child_indent)
                .unwrap_or(block_end);
            while end > start + 1 && lines[end - 1].trim().is_empty() {
                end -= 1;
            }
            (start, end)
        }
        None => {
            let mut insert_at = block_end;
            while insert_at > header + 1 && (lines[insert_at - 1].trim().is_empty() || indent_of(lines[insert_at - 1]) == 0) {
                insert_at -= 1;
            }
            (insert_at, insert_at)
        }
    };

    let mut out: String = lines[..start].concat();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&indent_block(rendered, child_indent));
    out.push_str(&lines[end..].concat());
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use wdui_types::InputOverride;

    #[test]
    fn blank_text_is_an_empty_document() {
        assert_eq!(parse_config_document("").expect("parse blank"), ConfigDocument::default());
        assert_eq!(parse_config_document("# only a comment\n").expect("parse comment"), ConfigDocument::default());
    }

    #[test]
    fn scalar_root_is_rejected() {
        let error = parse_config_document("just text").expect_err("scalar root");
        assert!(matches!(error, DocumentError::Shape(_)));
    }

    #[test]
    fn invalid_yaml_reports_location() {
        let error = parse_config_document("workflows: [").expect_err("invalid yaml");
        assert!(matches!(error, DocumentError::Parse(_)));
    }

    #[test]
    fn upsert_creates_document_when_absent() {
        let entry = WorkflowConfigEntry {
            title: Some("Deploy".into()),
            ..WorkflowConfigEntry::default()
        };
        let text = upsert_workflow_entry(None, "deploy.yml", &entry).expect("upsert");
        let document = parse_config_document(&text).expect("reparse");
        assert_eq!(document.entry("deploy.yml"), Some(&entry));
    }

    #[test]
    fn upsert_preserves_unknown_keys_and_other_entries() {
        let existing = r#"
version: 2
workflows:
  other.yml:
    title: Other
    futureField: [1, 2]
  deploy.yml:
    title: Old
"#;
        let mut inputs = IndexMap::new();
        inputs.insert(
            "target".to_string(),
            InputOverride {
                label: Some("Target".into()),
                ..InputOverride::default()
            },
        );
        let entry = WorkflowConfigEntry {
            inputs,
            ..WorkflowConfigEntry::default()
        };

        let text = upsert_workflow_entry(Some(existing), "deploy.yml", &entry).expect("upsert");
        let root: YamlValue = serde_yaml::from_str(&text).expect("reparse");
        assert_eq!(root["version"], YamlValue::from(2));
        assert_eq!(root["workflows"]["other.yml"]["futureField"][1], YamlValue::from(2));
        assert!(root["workflows"]["deploy.yml"].get("title").is_none());
        assert_eq!(root["workflows"]["deploy.yml"]["inputs"]["target"]["label"], YamlValue::from("Target"));
    }

    const SHARED: &str = "# dispatch forms, edited by hand too\nworkflows:\n  a.yml:\n    title: Old\n\n  b.yml:\n    # owned by the build team\n    title: \"Build\"\n    groups:\n      - {title: 'Target', inputs: [flavor, arch]}\n\n# shared presentation\ntheme: dark\n";

    const B_ENTRY: &str = "  b.yml:\n    # owned by the build team\n    title: \"Build\"\n    groups:\n      - {title: 'Target', inputs: [flavor, arch]}\n";

    fn titled(title: &str) -> WorkflowConfigEntry {
        WorkflowConfigEntry {
            title: Some(title.into()),
            ..WorkflowConfigEntry::default()
        }
    }

    #[test]
    fn replacing_an_entry_keeps_other_bytes() {
        let text = upsert_workflow_entry(Some(SHARED), "a.yml", &titled("New")).expect("upsert");
        assert_eq!(
            text,
            SHARED.replace("  a.yml:\n    title: Old\n", "  a.yml:\n    title: New\n"),
            "only the a.yml block may change"
        );
        assert!(text.contains(B_ENTRY));
    }

    #[test]
    fn new_entry_is_appended_inside_the_workflows_block() {
        let text = upsert_workflow_entry(Some(SHARED), "c.yml", &titled("C")).expect("upsert");
        let expected = SHARED.replace(
            "\n# shared presentation",
            "  c.yml:\n    title: C\n\n# shared presentation",
        );
        assert_eq!(text, expected);
        let document = parse_config_document(&text).expect("reparse");
        assert_eq!(document.workflows.keys().collect::<Vec<_>>(), vec!["a.yml", "b.yml", "c.yml"]);
    }

    #[test]
    fn last_entry_at_end_of_file_is_replaced() {
        let existing = "workflows:\n  'a.yml':   # quoted key\n    title: Old\n    jsonMode: true";
        let text = upsert_workflow_entry(Some(existing), "a.yml", &titled("New")).expect("upsert");
        assert_eq!(text, "workflows:\n  a.yml:\n    title: New\n");
    }

    #[test]
    fn missing_workflows_key_is_appended() {
        let existing = "# notes\nversion: 2\n";
        let text = upsert_workflow_entry(Some(existing), "a.yml", &titled("A")).expect("upsert");
        assert_eq!(text, "# notes\nversion: 2\nworkflows:\n  a.yml:\n    title: A\n");
    }

    #[test]
    fn flow_style_workflows_fall_back_to_a_rewrite() {
        let existing = "workflows: {b.yml: {title: B}}\n";
        let text = upsert_workflow_entry(Some(existing), "a.yml", &titled("A")).expect("upsert");
        let document = parse_config_document(&text).expect("reparse");
        assert_eq!(document.entry("b.yml"), Some(&titled("B")));
        assert_eq!(document.entry("a.yml"), Some(&titled("A")));
    }

    #[test]
    fn upsert_rejects_non_mapping_workflows() {
        let error = upsert_workflow_entry(Some("workflows: [a]\n"), "a.yml", &WorkflowConfigEntry::default()).expect_err("bad shape");
        assert!(matches!(error, DocumentError::Shape(_)));
    }
}
