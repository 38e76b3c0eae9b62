//! Comma-separated tag input.

/// Split a comma-separated tag input into tags.
///
/// Each tag is trimmed and empty entries are dropped. Order and duplicates are kept.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render tags back into the comma-separated form `parse_tags` accepts.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}
