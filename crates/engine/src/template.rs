//! Starter override documents for workflows that have none yet.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use wdui_types::{DeclaredInput, InputKind};

/// Characters left alone by `encodeURIComponent`.
pub(crate) const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `dry_run` -> `Dry Run`: separators become spaces and every word starts upper-case.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for ch in raw.chars() {
        let ch = if ch == '_' || ch == '-' { ' ' } else { ch };
        let is_word = ch.is_ascii_alphanumeric();
        if is_word && !in_word {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
        in_word = is_word;
    }
    out
}

/// Scaffold override document for one workflow, with title-cased labels and
/// commented hints suited to each input's declared type.
pub fn generate_config_template(workflow_file: &str, inputs: &[DeclaredInput]) -> String {
    let stem = workflow_file
        .strip_suffix(".yml")
        .or_else(|| workflow_file.strip_suffix(".yaml"))
        .unwrap_or(workflow_file);

    let mut yaml = String::new();
    yaml.push_str("# Workflow dispatch form configuration\n");
    yaml.push_str("# Customize how this workflow's inputs are labelled, validated and grouped.\n\n");
    yaml.push_str("workflows:\n");
    yaml.push_str(&format!("  {}:\n", quoted(workflow_file)));
    yaml.push_str(&format!("    title: {}\n", quoted(&title_case(stem))));
    yaml.push_str("    description: \"Describe your workflow here\"\n");
    yaml.push_str("    inputs:\n");

    for input in inputs {
        let label = title_case(&input.name);
        let lower = label.to_lowercase();
        yaml.push_str(&format!("      {}:\n", quoted(&input.name)));
        yaml.push_str(&format!("        label: {}\n", quoted(&label)));
        match input.kind {
            InputKind::Choice => {
                yaml.push_str("        # icon: \"📋\"\n");
                yaml.push_str(&format!("        # placeholder: \"Select {lower}\"\n"));
            }
            InputKind::Boolean => {}
            _ => {
                yaml.push_str(&format!("        # placeholder: \"Enter {lower}\"\n"));
                yaml.push_str("        # pattern: \"^.+$\"\n");
                yaml.push_str(&format!("        # validationMessage: \"Invalid {lower}\"\n"));
            }
        }
    }

    if inputs.len() > 1 {
        let names: Vec<&str> = inputs.iter().map(|input| input.name.as_str()).collect();
        yaml.push_str("    # Organize inputs into groups:\n");
        yaml.push_str("    # groups:\n");
        yaml.push_str("    #   - title: \"Settings\"\n");
        yaml.push_str(&format!("    #     inputs: [{}]\n", names.join(", ")));
    }

    yaml.push_str("    #\n");
    yaml.push_str("    # Dynamic options from the GitHub API:\n");
    yaml.push_str("    # inputs:\n");
    yaml.push_str("    #   tag:\n");
    yaml.push_str("    #     type: select\n");
    yaml.push_str("    #     label: \"Release Tag\"\n");
    yaml.push_str("    #     optionsFrom:\n");
    yaml.push_str("    #       source: tags  # tags, branches, releases, environments, collaborators, labels, milestones\n");
    yaml
}

/// Where to edit the override document on GitHub.
///
/// An existing document opens in the web editor; otherwise the "new file"
/// page is pre-filled with [`generate_config_template`].
pub fn config_edit_url(
    owner: &str,
    repo: &str,
    branch: &str,
    config_path: &str,
    config_exists: bool,
    workflow_file: &str,
    inputs: &[DeclaredInput],
) -> String {
    if config_exists {
        return format!("https://github.com/{owner}/{repo}/edit/{branch}/{config_path}");
    }
    let template = generate_config_template(workflow_file, inputs);
    format!(
        "https://github.com/{owner}/{repo}/new/{branch}?filename={config_path}&value={}",
        utf8_percent_encode(&template, URI_COMPONENT)
    )
}

/// Double-quoted YAML scalar; JSON string syntax is a subset of it.
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}
