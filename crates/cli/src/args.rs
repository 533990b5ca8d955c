//! Value parsers for the repeated `key=value` style flags.

/// `name=text`, split at the first `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// `Title=a,b,c` for `--group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    pub title: String,
    pub inputs: Vec<String>,
}

/// `input:reference` for `--move-input`; places `input` before `reference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMove {
    pub input: String,
    pub reference: String,
}

pub fn parse_key_value(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing name in '{}'", raw));
    }
    Ok(KeyValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

pub fn parse_group_assignment(raw: &str) -> Result<GroupAssignment, String> {
    let KeyValue { key, value } = parse_key_value(raw)?;
    let inputs = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    Ok(GroupAssignment { title: key, inputs })
}

pub fn parse_input_move(raw: &str) -> Result<InputMove, String> {
    let (input, reference) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected input:reference, got '{}'", raw))?;
    let (input, reference) = (input.trim(), reference.trim());
    if input.is_empty() || reference.is_empty() {
        return Err(format!("expected input:reference, got '{}'", raw));
    }
    Ok(InputMove {
        input: input.to_string(),
        reference: reference.to_string(),
    })
}
