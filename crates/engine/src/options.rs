//! Dynamic option lists fetched from the hosting platform at render time.

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use indexmap::IndexMap;
use percent_encoding::utf8_percent_encode;
use serde_json::Value as JsonValue;
use tracing::warn;
use wdui_types::{OptionsSource, ResolvedInput, SelectOption, scalar_to_string};

use crate::template::URI_COMPONENT;

/// Supplies option lists for `optionsFrom` sources.
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    async fn list_options(&self, source: &OptionsSource) -> Result<Vec<SelectOption>>;
}

/// Fetches the options of every input with a dynamic source, concurrently.
///
/// A failed fetch is logged and yields an empty list so one broken source
/// does not block the rest of the form.
pub async fn load_dynamic_options(provider: &dyn OptionsProvider, resolved: &[ResolvedInput]) -> IndexMap<String, Vec<SelectOption>> {
    let pending = resolved.iter().filter_map(|input| {
        let source = input.options_from.as_ref()?;
        Some(async move {
            let options = match provider.list_options(source).await {
                Ok(options) => options,
                Err(error) => {
                    warn!(input = %input.name, source = source.source.as_str(), error = %error, "could not load dynamic options");
                    Vec::new()
                }
            };
            (input.name.clone(), options)
        })
    });
    join_all(pending).await.into_iter().collect()
}

/// Substitutes `{owner}` and `{repo}` in an `api` source endpoint.
///
/// Both values are percent-encoded as single path segments.
pub fn expand_endpoint(endpoint: &str, owner: &str, repo: &str) -> String {
    let owner = utf8_percent_encode(owner, URI_COMPONENT).to_string();
    let repo = utf8_percent_encode(repo, URI_COMPONENT).to_string();
    endpoint.replace("{owner}", &owner).replace("{repo}", &repo)
}

/// Maps an arbitrary API response onto options.
///
/// The response is either an array of items or an object with an `items`
/// array. `valuePath` and `labelPath` are dot paths into each item; the label
/// falls back to the value path, and without a value path the item itself is
/// stringified.
pub fn options_from_api_payload(payload: &JsonValue, source: &OptionsSource) -> Vec<SelectOption> {
    let items: &[JsonValue] = match payload {
        JsonValue::Array(items) => items.as_slice(),
        JsonValue::Object(object) => object.get("items").and_then(JsonValue::as_array).map(Vec::as_slice).unwrap_or_default(),
        _ => &[],
    };
    let value_path = source.value_path.as_deref();
    let label_path = source.label_path.as_deref().or(value_path);

    items
        .iter()
        .map(|item| SelectOption::new(text_at(item, value_path), text_at(item, label_path)))
        .collect()
}

/// Follows a dot path (`commit.sha`, `items.0.name`) through objects and arrays.
pub fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.').try_fold(value, |current, segment| match current {
        JsonValue::Object(object) => object.get(segment),
        JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    })
}

fn text_at(item: &JsonValue, path: Option<&str>) -> String {
    let value = match path {
        Some(path) => match extract_path(item, path) {
            Some(value) => value,
            None => return String::new(),
        },
        None => item,
    };
    match value {
        JsonValue::Null => String::new(),
        other => scalar_to_string(other).unwrap_or_else(|| other.to_string()),
    }
}
