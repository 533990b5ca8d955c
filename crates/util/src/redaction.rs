//! Secret redaction for anything printed to a terminal or log.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Token written in place of a redacted value.
pub const REDACTED: &str = "[REDACTED]";

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // GitHub token formats: classic, fine-grained, OAuth, app and refresh tokens.
        r"\b(?:gh[pousr]_[A-Za-z0-9]{20,}|github_pat_[A-Za-z0-9_]{20,})\b",
        r"(?i)(authorization:\s+)(\S+(?:\s+\S+)*)",
        r"(?i)((?:^|\b)(?:Bearer|token)\s+)([A-Za-z0-9\-._~+/]+=*)",
        r"(?i)(\b[A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)=)(\S+)",
        r#"(?i)("[A-Za-z0-9_]*(?:key|token|secret|password)"\s*:\s*")([^"]+)(")"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets, keeping the key names around them.
///
/// ```
/// use wdui_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("GITHUB_TOKEN=abc123"), "GITHUB_TOKEN=[REDACTED]");
/// assert_eq!(redact_sensitive("authorization: Bearer abc123"), "authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                if captures.get(2).is_some() {
                    format!("{}{}{}", prefix, REDACTED, suffix)
                } else {
                    REDACTED.to_string()
                }
            })
            .to_string();
    }
    redacted
}
