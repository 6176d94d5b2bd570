//! Namespace/class discovery over the token stream.
//!
//! A two-state machine: `Scanning` looks for `namespace` and `class`
//! anchors, `InNamespacePath` accumulates `\Segment` pairs of a qualified
//! namespace name. Only declaration anchors are inspected; bodies are never
//! parsed.

use crate::lexer::{Token, TokenKind};

/// A class declaration found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredClass {
    /// Namespace active at the declaration; empty for the global namespace.
    pub namespace: String,
    pub name: String,
    /// 1-based line of the class name.
    pub line: usize,
}

impl DiscoveredClass {
    /// Fully qualified class name.
    pub fn fqn(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}\\{}", self.namespace, self.name)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    InNamespacePath,
}

/// Incremental scanner state. Feed it tokens with [`NamespaceClassScanner::scan`].
#[derive(Debug)]
pub struct NamespaceClassScanner {
    state: ScanState,
    namespace: String,
    discovered: Vec<DiscoveredClass>,
}

impl Default for NamespaceClassScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceClassScanner {
    pub fn new() -> Self {
        NamespaceClassScanner {
            state: ScanState::Scanning,
            namespace: String::new(),
            discovered: Vec::new(),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Namespace accumulated so far.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Run the state machine over a whole token sequence.
    pub fn scan(mut self, tokens: &[Token<'_>]) -> Vec<DiscoveredClass> {
        let mut i = 0;
        while i < tokens.len() {
            i = self.step(tokens, i);
        }
        self.discovered
    }

    /// Process the token at `i` and return the index of the next unconsumed token.
    fn step(&mut self, tokens: &[Token<'_>], i: usize) -> usize {
        if self.state == ScanState::InNamespacePath {
            let is_segment = tokens[i].kind == TokenKind::NsSeparator
                && tokens
                    .get(i + 1)
                    .is_some_and(|t| t.kind == TokenKind::Identifier);
            if is_segment {
                self.namespace.push('\\');
                self.namespace.push_str(tokens[i + 1].text);
                return i + 2;
            }
            tracing::trace!(namespace = %self.namespace, "namespace path complete");
            self.state = ScanState::Scanning;
        }

        match tokens[i].kind {
            TokenKind::NamespaceKeyword => {
                let next = next_significant(tokens, i + 1);
                match next.map(|j| (j, &tokens[j])) {
                    Some((j, t)) if t.kind == TokenKind::Identifier => {
                        self.namespace = t.text.to_string();
                        self.state = ScanState::InNamespacePath;
                        return j + 1;
                    }
                    Some((j, t)) if t.kind == TokenKind::Punct && t.text == "{" => {
                        self.namespace.clear();
                        return j + 1;
                    }
                    _ => {}
                }
            }
            TokenKind::ClassKeyword => {
                let ws = tokens.get(i + 1);
                let name = tokens.get(i + 2);
                if let (Some(ws), Some(name)) = (ws, name) {
                    if ws.kind == TokenKind::Whitespace && name.kind == TokenKind::Identifier {
                        tracing::trace!(namespace = %self.namespace, class = name.text, "class discovered");
                        self.discovered.push(DiscoveredClass {
                            namespace: self.namespace.clone(),
                            name: name.text.to_string(),
                            line: name.line,
                        });
                        return i + 3;
                    }
                }
            }
            _ => {}
        }
        i + 1
    }
}

fn next_significant(tokens: &[Token<'_>], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&j| !tokens[j].kind.is_trivia())
}

/// Discover every `(namespace, class)` pair in declaration order.
pub fn scan_classes(tokens: &[Token<'_>]) -> Vec<DiscoveredClass> {
    NamespaceClassScanner::new().scan(tokens)
}
