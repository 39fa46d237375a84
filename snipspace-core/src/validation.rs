//! Input normalization shared by create and update paths

use crate::{SnipspaceError, SnipspaceResult};

/// Trim a required text field, rejecting blank values.
pub fn require_non_blank(field: &str, value: &str) -> SnipspaceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SnipspaceError::missing_field(field));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field. Blank becomes `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Trim tags, drop blanks and duplicates. First occurrence wins.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() || out.iter().any(|t| t == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}
