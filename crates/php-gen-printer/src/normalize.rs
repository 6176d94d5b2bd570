//! Whitespace normalization of generated source.

/// Normalize line endings and whitespace.
///
/// `\r\n` and lone `\r` become `\n`, ASCII control characters other than
/// tab and newline are removed, trailing spaces and tabs are stripped from
/// every line and leading/trailing newlines are trimmed.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned: String = unified
        .chars()
        .filter(|&c| !c.is_ascii_control() || c == '\t' || c == '\n')
        .collect();

    let lines: Vec<&str> = cleaned
        .split('\n')
        .map(|line| line.trim_end_matches([' ', '\t']))
        .collect();
    lines.join("\n").trim_matches('\n').to_string()
}
