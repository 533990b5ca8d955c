//! Validation of submitted form values.
//!
//! These routines check a value typed or picked by the user against the
//! constraints carried by its [`ResolvedInput`]: required flags, patterns,
//! numeric bounds and static option lists.

use regex::Regex;

use crate::{InputKind, ResolvedInput};

pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Validate one submitted value.
///
/// The checks mirror what the dispatch form enforces:
/// - Required inputs must not be empty; empty optional inputs skip every other rule.
/// - Patterns are searched anywhere in the value, like a JavaScript `RegExp.test`.
/// - Numeric kinds must parse and honour `min`/`max`.
/// - Static option lists constrain choice-like kinds unless options are fetched dynamically.
pub fn validate_submitted_value(input: &ResolvedInput, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return if input.required {
            Err(REQUIRED_MESSAGE.to_string())
        } else {
            Ok(())
        };
    }

    if let Some(pattern) = input.pattern.as_deref().filter(|pattern| !pattern.is_empty()) {
        let regex = Regex::new(pattern).map_err(|error| format!("invalid pattern '{}': {}", pattern, error))?;
        if !regex.is_match(value) {
            return Err(input
                .validation_message
                .clone()
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("Must match pattern: {}", pattern)));
        }
    }

    match input.resolved_type {
        kind if kind.is_numeric() => validate_number(input, value),
        InputKind::Boolean => match value {
            "true" | "false" => Ok(()),
            _ => Err("Must be true or false".to_string()),
        },
        InputKind::Json => serde_json::from_str::<serde_json::Value>(value)
            .map(|_| ())
            .map_err(|error| format!("Must be valid JSON: {}", error)),
        InputKind::Choice | InputKind::Select => validate_membership(input, [value]),
        InputKind::MultiSelect => validate_membership(input, value.split(',').map(str::trim).filter(|part| !part.is_empty())),
        _ => Ok(()),
    }
}

fn validate_number(input: &ResolvedInput, value: &str) -> Result<(), String> {
    let number: f64 = value.trim().parse().map_err(|_| "Must be a number".to_string())?;
    if let Some(min) = input.min
        && number < min
    {
        return Err(format!("Must be at least {}", min));
    }
    if let Some(max) = input.max
        && number > max
    {
        return Err(format!("Must be at most {}", max));
    }
    Ok(())
}

fn validate_membership<'a>(input: &ResolvedInput, candidates: impl IntoIterator<Item = &'a str>) -> Result<(), String> {
    // Dynamic lists are only known at render time.
    if input.options_from.is_some() {
        return Ok(());
    }
    let allowed = input.option_values();
    if allowed.is_empty() {
        return Ok(());
    }
    for candidate in candidates {
        if !allowed.contains(&candidate) {
            return Err(format!("'{}' is not one of the available options", candidate));
        }
    }
    Ok(())
}
