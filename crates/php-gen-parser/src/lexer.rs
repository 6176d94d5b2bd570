//! Lightweight PHP tokenizer.
//!
//! Produces classified tokens with 1-based line numbers. It only needs to be
//! precise enough for the namespace/class scanner: strings, comments and
//! heredocs are swallowed whole so that anchors inside them are never seen.
//! Lexing never fails; bytes it does not understand become `Unknown` tokens.

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Text outside `<?php ... ?>`.
    InlineHtml,
    OpenTag,
    CloseTag,
    Whitespace,
    Comment,
    DocComment,
    /// `$name`
    Variable,
    /// Bare name (class names, namespace segments, function names, ...).
    Identifier,
    /// `\`
    NsSeparator,
    /// The `namespace` keyword, any case.
    NamespaceKeyword,
    /// The `class` keyword, any case.
    ClassKeyword,
    /// Any other reserved word.
    Keyword,
    StringLiteral,
    NumberLiteral,
    /// Operators and structural punctuation.
    Punct,
    Unknown,
}

impl TokenKind {
    /// Whitespace and comments carry no syntax.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }
}

/// A token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// 1-based line of the token's first character.
    pub line: usize,
}

/// Reserved words other than `namespace` and `class`.
const KEYWORDS: &[&str] = &[
    "abstract",
    "and",
    "as",
    "break",
    "case",
    "catch",
    "clone",
    "const",
    "continue",
    "declare",
    "default",
    "die",
    "do",
    "echo",
    "else",
    "elseif",
    "empty",
    "enddeclare",
    "endfor",
    "endforeach",
    "endif",
    "endswitch",
    "endwhile",
    "eval",
    "exit",
    "extends",
    "final",
    "finally",
    "fn",
    "for",
    "foreach",
    "function",
    "global",
    "goto",
    "if",
    "implements",
    "include",
    "include_once",
    "instanceof",
    "insteadof",
    "interface",
    "isset",
    "list",
    "match",
    "new",
    "or",
    "print",
    "private",
    "protected",
    "public",
    "readonly",
    "require",
    "require_once",
    "return",
    "static",
    "switch",
    "throw",
    "trait",
    "try",
    "unset",
    "use",
    "var",
    "while",
    "xor",
    "yield",
];

/// Punctuation sequences that form a single token, longest first.
const MULTI_PUNCT: &[&str] = &[
    "?->", "...", "<=>", "**=", "===", "!==", "<<=", ">>=", "??=", "#[", "::", "->", "=>", "++",
    "--", "==", "!=", "<>", "<=", ">=", "&&", "||", "??", "+=", "-=", "*=", "/=", ".=", "%=",
    "&=", "|=", "^=", "<<", ">>", "**",
];

/// Streaming tokenizer over a PHP source string.
pub struct Lexer<'src> {
    src: &'src str,
    pos: usize,
    line: usize,
    in_php: bool,
    /// Text of the last non-trivia token, used to tell member names from keywords.
    prev_significant: Option<&'src str>,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Lexer {
            src,
            pos: 0,
            line: 1,
            in_php: false,
            prev_significant: None,
        }
    }

    fn bytes(&self) -> &'src [u8] {
        self.src.as_bytes()
    }

    fn rest(&self) -> &'src str {
        &self.src[self.pos..]
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes().get(self.pos + offset).copied()
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token<'src> {
        let text = &self.src[self.pos..self.pos + len];
        let token = Token {
            kind,
            text,
            line: self.line,
        };
        self.line += text.bytes().filter(|&b| b == b'\n').count();
        self.pos += len;
        if !kind.is_trivia() {
            self.prev_significant = Some(text);
        }
        token
    }

    fn lex_html(&mut self) -> Token<'src> {
        let rest = self.rest();
        if rest.starts_with("<?") {
            self.in_php = true;
            let len = if rest.len() >= 5 && rest.as_bytes()[..5].eq_ignore_ascii_case(b"<?php") {
                5
            } else if rest.starts_with("<?=") {
                3
            } else {
                2
            };
            return self.emit(TokenKind::OpenTag, len);
        }
        let len = rest.find("<?").unwrap_or(rest.len());
        self.emit(TokenKind::InlineHtml, len)
    }

    fn lex_php(&mut self) -> Token<'src> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let b = bytes[0];

        if is_whitespace(b) {
            let len = bytes.iter().take_while(|&&c| is_whitespace(c)).count();
            return self.emit(TokenKind::Whitespace, len);
        }

        if rest.starts_with("?>") {
            self.in_php = false;
            let mut len = 2;
            if rest[len..].starts_with("\r\n") {
                len += 2;
            } else if rest[len..].starts_with('\n') {
                len += 1;
            }
            return self.emit(TokenKind::CloseTag, len);
        }

        if rest.starts_with("#[") {
            return self.emit(TokenKind::Punct, 2);
        }
        if b == b'#' || rest.starts_with("//") {
            return self.emit(TokenKind::Comment, line_comment_len(rest));
        }
        if rest.starts_with("/*") {
            let len = rest[2..].find("*/").map(|i| i + 4).unwrap_or(rest.len());
            let is_doc = rest.starts_with("/**") && bytes.get(3).is_some_and(|&c| is_whitespace(c));
            let kind = if is_doc {
                TokenKind::DocComment
            } else {
                TokenKind::Comment
            };
            return self.emit(kind, len);
        }

        match b {
            b'\'' | b'"' | b'`' => {
                return self.emit(TokenKind::StringLiteral, quoted_len(bytes, b));
            }
            b'<' if rest.starts_with("<<<") => {
                if let Some(len) = heredoc_len(rest) {
                    return self.emit(TokenKind::StringLiteral, len);
                }
            }
            b'$' if self.peek(1).is_some_and(is_ident_start) => {
                let len = 1 + ident_len(&bytes[1..]);
                return self.emit(TokenKind::Variable, len);
            }
            b'0'..=b'9' => return self.emit(TokenKind::NumberLiteral, number_len(bytes)),
            b'.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => {
                return self.emit(TokenKind::NumberLiteral, number_len(bytes));
            }
            b'\\' => return self.emit(TokenKind::NsSeparator, 1),
            _ => {}
        }

        if is_ident_start(b) {
            let len = ident_len(bytes);
            let kind = self.classify_word(&rest[..len]);
            return self.emit(kind, len);
        }

        if let Some(p) = MULTI_PUNCT.iter().find(|p| rest.starts_with(**p)) {
            return self.emit(TokenKind::Punct, p.len());
        }
        if b.is_ascii_punctuation() {
            return self.emit(TokenKind::Punct, 1);
        }

        let len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        self.emit(TokenKind::Unknown, len)
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        if matches!(self.prev_significant, Some("->" | "?->" | "::" | "\\")) {
            return TokenKind::Identifier;
        }
        if word.eq_ignore_ascii_case("namespace") {
            TokenKind::NamespaceKeyword
        } else if word.eq_ignore_ascii_case("class") {
            TokenKind::ClassKeyword
        } else if KEYWORDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word))
        {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        if self.pos >= self.src.len() {
            return None;
        }
        Some(if self.in_php {
            self.lex_php()
        } else {
            self.lex_html()
        })
    }
}

/// Tokenize a whole source string.
pub fn tokenize(src: &str) -> Vec<Token<'_>> {
    Lexer::new(src).collect()
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn ident_len(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|&&c| is_ident_char(c)).count()
}

/// `//` and `#` comments stop at the end of the line or at a closing tag.
fn line_comment_len(rest: &str) -> usize {
    let eol = rest.find('\n').unwrap_or(rest.len());
    let line = &rest[..eol];
    match line.find("?>") {
        Some(close) => close,
        None => line.strip_suffix('\r').map(str::len).unwrap_or(eol),
    }
}

fn quoted_len(bytes: &[u8], quote: u8) -> usize {
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn number_len(bytes: &[u8]) -> usize {
    let mut i = 0;
    let mut seen_dot = false;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_alphanumeric() || c == b'_' {
            if (c == b'e' || c == b'E') && matches!(bytes.get(i + 1), Some(b'+' | b'-')) {
                i += 1;
            }
            i += 1;
        } else if c == b'.' && !seen_dot && bytes.get(i + 1).is_some_and(|d| d.is_ascii_digit()) {
            seen_dot = true;
            i += 1;
        } else {
            break;
        }
    }
    i.max(1)
}

/// Length of a heredoc/nowdoc starting at `<<<`, or `None` if the opener is malformed.
fn heredoc_len(rest: &str) -> Option<usize> {
    let after = rest[3..].trim_start_matches([' ', '\t']);
    let mut offset = rest.len() - after.len();
    let quote = after.as_bytes().first().copied().filter(|&c| c == b'"' || c == b'\'');
    if quote.is_some() {
        offset += 1;
    }

    let label_len = ident_len(rest[offset..].as_bytes());
    if label_len == 0 {
        return None;
    }
    let label = &rest[offset..offset + label_len];
    offset += label_len;

    if let Some(q) = quote {
        if rest.as_bytes().get(offset) != Some(&q) {
            return None;
        }
        offset += 1;
    }
    let opener_end = match &rest[offset..] {
        s if s.starts_with("\r\n") => offset + 2,
        s if s.starts_with('\n') => offset + 1,
        _ => return None,
    };

    let mut line_start = opener_end;
    while line_start < rest.len() {
        let line_end = rest[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(rest.len());
        let line = &rest[line_start..line_end];
        let indented = line.trim_start_matches([' ', '\t']);
        if let Some(after_label) = indented.strip_prefix(label) {
            if !after_label.bytes().next().is_some_and(is_ident_char) {
                return Some(line_end - after_label.len());
            }
        }
        line_start = line_end + 1;
    }
    Some(rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, &str)> {
        tokenize(src)
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_namespace_and_class_keywords() {
        let toks = kinds("<?php\nnamespace App\\Models;\nclass User {}\n");
        assert_eq!(toks[0], (TokenKind::OpenTag, "<?php"));
        assert_eq!(toks[1], (TokenKind::NamespaceKeyword, "namespace"));
        assert_eq!(toks[2], (TokenKind::Identifier, "App"));
        assert_eq!(toks[3], (TokenKind::NsSeparator, "\\"));
        assert_eq!(toks[4], (TokenKind::Identifier, "Models"));
        assert_eq!(toks[5], (TokenKind::Punct, ";"));
        assert_eq!(toks[6], (TokenKind::ClassKeyword, "class"));
        assert_eq!(toks[7], (TokenKind::Identifier, "User"));
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let toks = kinds("<?php NameSpace Foo; CLASS Bar {}");
        assert_eq!(toks[1].0, TokenKind::NamespaceKeyword);
        assert_eq!(toks[4].0, TokenKind::ClassKeyword);
        assert_eq!(toks[5], (TokenKind::Identifier, "Bar"));
    }

    #[test]
    fn test_open_tag_glued_to_keyword() {
        let toks = kinds("<?phpnamespace Foo;");
        assert_eq!(toks[0], (TokenKind::OpenTag, "<?php"));
        assert_eq!(toks[1], (TokenKind::NamespaceKeyword, "namespace"));
    }

    #[test]
    fn test_class_constant_fetch_is_identifier() {
        let toks = kinds("<?php $x = Foo::class; $y->class;");
        let class_tokens: Vec<_> = toks.iter().filter(|(_, t)| *t == "class").collect();
        assert_eq!(class_tokens.len(), 2);
        assert!(class_tokens.iter().all(|(k, _)| *k == TokenKind::Identifier));
    }

    #[test]
    fn test_line_numbers() {
        let toks = tokenize("<?php\n\n/** doc */\nclass A\n{\n}\n");
        let class_kw = toks
            .iter()
            .find(|t| t.kind == TokenKind::ClassKeyword)
            .unwrap();
        assert_eq!(class_kw.line, 4);
        let doc = toks
            .iter()
            .find(|t| t.kind == TokenKind::DocComment)
            .unwrap();
        assert_eq!(doc.line, 3);
        let close = toks.iter().rfind(|t| t.text == "}").unwrap();
        assert_eq!(close.line, 6);
    }

    #[test]
    fn test_strings_and_comments_hide_anchors() {
        let src = "<?php\n$a = 'class Fake';\n$b = \"namespace \\\"X\\\"\";\n// class Nope\n# class Nah\n/* class Hidden */\n";
        let toks = kinds(src);
        assert!(!toks.iter().any(|(k, _)| matches!(
            k,
            TokenKind::ClassKeyword | TokenKind::NamespaceKeyword
        )));
        assert_eq!(
            toks.iter()
                .filter(|(k, _)| *k == TokenKind::StringLiteral)
                .count(),
            2
        );
    }

    #[test]
    fn test_heredoc_and_nowdoc() {
        let src = "<?php\n$a = <<<EOT\nclass Inside {}\n  EOT;\n$b = <<<'RAW'\nnamespace Nope;\nRAW;\nclass Real {}\n";
        let toks = kinds(src);
        let classes: Vec<_> = toks
            .iter()
            .filter(|(k, _)| *k == TokenKind::ClassKeyword)
            .collect();
        assert_eq!(classes.len(), 1);
        assert!(!toks.iter().any(|(k, _)| *k == TokenKind::NamespaceKeyword));
        let heredocs: Vec<_> = toks
            .iter()
            .filter(|(k, t)| *k == TokenKind::StringLiteral && t.starts_with("<<<"))
            .collect();
        assert_eq!(heredocs.len(), 2);
        assert!(heredocs[0].1.ends_with("EOT"));
    }

    #[test]
    fn test_inline_html_and_close_tag() {
        let toks = kinds("<p>class NotPhp</p><?php echo 1; ?>\n<b>x</b>");
        assert_eq!(toks[0], (TokenKind::InlineHtml, "<p>class NotPhp</p>"));
        assert_eq!(toks[1].0, TokenKind::OpenTag);
        assert!(toks.iter().any(|(k, _)| *k == TokenKind::CloseTag));
        assert_eq!(toks.last().unwrap(), &(TokenKind::InlineHtml, "<b>x</b>"));
    }

    #[test]
    fn test_doc_comment_vs_block_comment() {
        let toks = kinds("<?php /** doc */ /* plain */ /**/");
        assert_eq!(toks[1].0, TokenKind::DocComment);
        assert_eq!(toks[2].0, TokenKind::Comment);
        assert_eq!(toks[3].0, TokenKind::Comment);
    }

    #[test]
    fn test_variables_numbers_and_punct() {
        let toks = kinds("<?php $count = 1.5e+3 ?? 0x1F; $a?->b(...$c);");
        assert_eq!(toks[1], (TokenKind::Variable, "$count"));
        assert_eq!(toks[3], (TokenKind::NumberLiteral, "1.5e+3"));
        assert_eq!(toks[4], (TokenKind::Punct, "??"));
        assert_eq!(toks[5], (TokenKind::NumberLiteral, "0x1F"));
        assert!(toks.contains(&(TokenKind::Punct, "?->")));
        assert!(toks.contains(&(TokenKind::Punct, "...")));
    }

    #[test]
    fn test_unknown_bytes_do_not_fail() {
        let toks = tokenize("<?php \u{1} class A {}");
        assert!(toks.iter().any(|t| t.kind == TokenKind::Unknown));
        assert!(toks.iter().any(|t| t.kind == TokenKind::ClassKeyword));
    }

    #[test]
    fn test_tokens_cover_source() {
        let src = "<html><?php\nnamespace A\\B;\n/** x */\nfinal class C extends D {}\n?>tail";
        let joined: String = tokenize(src).iter().map(|t| t.text).collect();
        assert_eq!(joined, src);
    }
}
