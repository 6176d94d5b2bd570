//! Extract syntax errors from the tree-sitter CST.
//!
//! The extractor tolerates broken files, but the issues are surfaced in the
//! log so a truncated model can be traced back to its cause.

use tree_sitter::{Node, Tree};

/// A syntax error or missing token reported by tree-sitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// 1-based line.
    pub line: usize,
    /// 0-based byte column.
    pub column: usize,
    pub message: String,
}

/// Collect all ERROR and MISSING nodes in document order.
pub fn extract_syntax_errors(tree: &Tree) -> Vec<SyntaxIssue> {
    let mut issues = Vec::new();
    collect_errors(tree.root_node(), &mut issues);
    issues
}

fn collect_errors(node: Node, issues: &mut Vec<SyntaxIssue>) {
    if !node.has_error() && !node.is_missing() {
        return;
    }

    let start = node.start_position();
    if node.is_error() {
        issues.push(SyntaxIssue {
            line: start.row + 1,
            column: start.column,
            message: "Syntax error".to_string(),
        });
    } else if node.is_missing() {
        issues.push(SyntaxIssue {
            line: start.row + 1,
            column: start.column,
            message: format!("Missing {}", node.kind()),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::FileParser;

    fn issues(source: &str) -> Vec<SyntaxIssue> {
        let tree = FileParser::new().unwrap().parse(source).unwrap();
        extract_syntax_errors(&tree)
    }

    #[test]
    fn test_no_errors_on_valid_php() {
        assert!(issues("<?php\nclass Foo {\n    public function bar(): void {}\n}\n").is_empty());
    }

    #[test]
    fn test_errors_on_invalid_php() {
        let found = issues("<?php\nfunction foo( {\n}\n");
        assert!(!found.is_empty());
        assert!(found[0].line >= 2, "unexpected issue: {:?}", found[0]);
    }

    #[test]
    fn test_multiple_errors() {
        let found = issues("<?php\nclass { }\nfunction ( {}\n");
        assert!(
            found.len() >= 2,
            "Expected multiple errors, got {}",
            found.len()
        );
    }
}
