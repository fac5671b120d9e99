//! JSON utility functions shared across crates.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z0-9_+-]*[ \t]*\r?\n?(.*?)```").ok());

/// Strip markdown code block wrappers from JSON content.
///
/// Handles `` ```json ... ``` ``, `` ``` ... ``` ``, and other language identifiers.
#[must_use]
pub fn strip_markdown_json(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6 {
        let without_prefix = trimmed.strip_prefix("```").unwrap_or(trimmed);
        let without_suffix = without_prefix.strip_suffix("```").unwrap_or(without_prefix);
        return without_suffix
            .split_once('\n')
            .map_or_else(|| without_suffix.trim(), |(_, rest)| rest.trim());
    }
    trimmed
}

/// Pull a JSON document out of free-form model output.
///
/// Tries, in order: the whole text with fences stripped, the first fenced
/// block anywhere in the text, and the outermost `{...}` / `[...]` span.
#[must_use]
pub fn extract_json_block(content: &str) -> &str {
    let stripped = strip_markdown_json(content);
    if stripped.starts_with('{') || stripped.starts_with('[') {
        return stripped;
    }
    if let Some(inner) =
        FENCED_BLOCK.as_ref().and_then(|re| re.captures(content)).and_then(|c| c.get(1))
    {
        return inner.as_str().trim();
    }
    let open = stripped.find(['{', '[']);
    let close = stripped.rfind(['}', ']']);
    match (open, close) {
        (Some(start), Some(end)) if end > start => stripped.get(start..=end).unwrap_or(stripped),
        _ => stripped,
    }
}
