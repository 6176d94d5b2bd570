//! PHPDoc comment parser.
//!
//! Reduces a raw `/** ... */` block to the lines of text it documents.

/// Parse a doc comment block into its text lines.
///
/// Returns `None` when the block is absent or its first line is empty
/// after the comment markers are stripped.
pub fn parse_doc_comment(comment: Option<&str>) -> Option<Vec<String>> {
    let comment = comment?;
    let body = strip_delimiters(comment.trim());

    let mut lines: Vec<String> = body.lines().map(strip_line_marker).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let first_text = lines.iter().position(|l| !l.is_empty())?;
    lines.drain(..first_text);

    match lines.first() {
        Some(first) if !first.is_empty() => Some(lines),
        _ => None,
    }
}

fn strip_delimiters(comment: &str) -> &str {
    let body = comment
        .strip_prefix("/**")
        .or_else(|| comment.strip_prefix("/*"))
        .unwrap_or(comment);
    body.strip_suffix("*/").unwrap_or(body)
}

/// Remove the leading `*` of a comment line and the whitespace around it.
fn strip_line_marker(line: &str) -> String {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('*')
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
