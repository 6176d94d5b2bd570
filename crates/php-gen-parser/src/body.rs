//! Method body recovery from source lines.

use crate::error::{ExtractError, Result};

/// Location of a braced block: 1-based lines and 0-based byte columns of
/// the opening and closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceBounds {
    pub open_line: usize,
    pub open_column: usize,
    pub close_line: usize,
    pub close_column: usize,
}

impl BraceBounds {
    /// Bounds covering whole lines `start..=end`.
    pub fn lines(start: usize, end: usize) -> Self {
        BraceBounds {
            open_line: start,
            open_column: 0,
            close_line: end,
            close_column: usize::MAX,
        }
    }
}

/// Recover the text of a braced body from the source lines.
///
/// Text before the opening brace and after the closing brace on their lines
/// is not part of the body. The remaining slice is reduced with
/// [`body_from_lines`].
pub fn extract_body(lines: &[&str], bounds: BraceBounds) -> Result<String> {
    let BraceBounds {
        open_line,
        close_line,
        ..
    } = bounds;
    if open_line == 0 || open_line > close_line || close_line > lines.len() {
        return Err(ExtractError::BodyBoundsInvalid {
            start: open_line,
            end: close_line,
            line_count: lines.len(),
        });
    }

    let mut slice: Vec<&str> = lines[open_line - 1..close_line].to_vec();
    let last = slice.len() - 1;
    slice[last] = cut_after(slice[last], bounds.close_column);
    slice[0] = cut_before(slice[0], bounds.open_column);

    Ok(body_from_lines(&slice))
}

/// Reduce a line slice running from the opening to the closing brace to the body.
///
/// A first line holding only `{` and a last line holding only `}` are
/// dropped. When a boundary brace shares its line with code the line is
/// kept and only that one brace is stripped; braces of nested blocks are
/// part of the body.
pub fn body_from_lines(lines: &[&str]) -> String {
    let mut lines = lines.to_vec();

    let open_kept = !lines.first().is_some_and(|l| l.trim() == "{");
    if !open_kept {
        lines.remove(0);
    }
    let close_kept = !lines.last().is_some_and(|l| l.trim() == "}");
    if !close_kept {
        lines.pop();
    }

    let mut body = lines.join("\n");
    if close_kept {
        if let Some(head) = body.trim_end().strip_suffix('}') {
            body = head.to_string();
        }
    }
    if open_kept {
        if let Some(rest) = body.trim_start().strip_prefix('{') {
            body = rest.to_string();
        }
    }
    body
}

fn cut_before(line: &str, column: usize) -> &str {
    match line.get(column..) {
        Some(rest) if column > 0 => rest,
        _ => line,
    }
}

fn cut_after(line: &str, column: usize) -> &str {
    match column.checked_add(1).and_then(|end| line.get(..end)) {
        Some(head) => head,
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_only_boundary_lines_are_dropped() {
        assert_eq!(body_from_lines(&["{", "  return 1;", "}"]), "  return 1;");
        assert_eq!(
            body_from_lines(&["    {", "        $a = 1;", "", "        return $a;", "    }"]),
            "        $a = 1;\n\n        return $a;"
        );
    }

    #[test]
    fn test_single_shared_line() {
        assert_eq!(body_from_lines(&["{ return 1; }"]), " return 1; ");
        assert_eq!(body_from_lines(&["{ return 1; }"]).trim(), "return 1;");
        assert_eq!(body_from_lines(&["{}"]), "");
    }

    #[test]
    fn test_shared_boundary_lines_are_kept() {
        assert_eq!(
            body_from_lines(&["{ $a = 1;", "  return $a; }"]),
            " $a = 1;\n  return $a; "
        );
    }

    #[test]
    fn test_nested_block_braces_are_kept() {
        assert_eq!(
            body_from_lines(&[
                "    {",
                "        if ($x) {",
                "            return 1;",
                "        }",
                "    }",
            ]),
            "        if ($x) {\n            return 1;\n        }"
        );
        assert_eq!(
            body_from_lines(&["{ if ($x) { return 1; } }"]),
            " if ($x) { return 1; } "
        );
        assert_eq!(
            body_from_lines(&["{", "  foreach ($xs as $x) { echo $x; } }"]),
            "  foreach ($xs as $x) { echo $x; } "
        );
    }

    #[test]
    fn test_extract_body_ending_in_nested_block() {
        let source = "<?php\nclass A\n{\n    public function f($x)\n    {\n        if ($x) {\n            return 1;\n        }\n    }\n}\n";
        let lines: Vec<&str> = source.lines().collect();
        let bounds = BraceBounds {
            open_line: 5,
            open_column: 4,
            close_line: 9,
            close_column: 4,
        };
        assert_eq!(
            extract_body(&lines, bounds).unwrap(),
            "        if ($x) {\n            return 1;\n        }"
        );
    }

    #[test]
    fn test_extract_body_k_and_r_style() {
        let source = "<?php\nclass A {\n    public function f() {\n        return 1;\n    }\n}\n";
        let lines: Vec<&str> = source.lines().collect();
        let bounds = BraceBounds {
            open_line: 3,
            open_column: 24,
            close_line: 5,
            close_column: 4,
        };
        assert_eq!(extract_body(&lines, bounds).unwrap(), "        return 1;");
    }

    #[test]
    fn test_extract_body_allman_style() {
        let source = "<?php\nclass A\n{\n\tpublic function f()\n\t{\n\t\treturn 1;\n\t}\n}\n";
        let lines: Vec<&str> = source.lines().collect();
        let body = extract_body(&lines, BraceBounds::lines(5, 7)).unwrap();
        assert_eq!(body, "\t\treturn 1;");
    }

    #[test]
    fn test_extract_body_single_line_method() {
        let lines = ["    public function f() { return 2; } // done"];
        let bounds = BraceBounds {
            open_line: 1,
            open_column: 24,
            close_line: 1,
            close_column: 36,
        };
        assert_eq!(extract_body(&lines, bounds).unwrap(), " return 2; ");
    }

    #[test]
    fn test_invalid_bounds() {
        let lines = ["{", "}"];
        for (start, end) in [(0, 1), (2, 1), (1, 3)] {
            let err = extract_body(&lines, BraceBounds::lines(start, end)).unwrap_err();
            assert!(
                matches!(err, ExtractError::BodyBoundsInvalid { line_count: 2, .. }),
                "unexpected error for {start}..{end}: {err}"
            );
        }
    }
}
