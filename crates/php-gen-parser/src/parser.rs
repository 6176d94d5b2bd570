//! FileParser: tree-sitter-php wrapper producing a CST for declaration analysis.

use tree_sitter::{Parser, Tree};

use crate::error::{ExtractError, Result};

/// Parses PHP source into a tree-sitter CST.
pub struct FileParser {
    parser: Parser,
}

impl FileParser {
    /// Create a new FileParser with tree-sitter-php language.
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| ExtractError::Parser(format!("failed to load PHP grammar: {e}")))?;
        Ok(FileParser { parser })
    }

    /// Full parse of a source string.
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| ExtractError::Parser("tree-sitter returned no tree".to_string()))
    }
}
