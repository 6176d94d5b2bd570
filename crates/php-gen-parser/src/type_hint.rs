//! Parameter type hint resolution from signature text.
//!
//! Best-effort: the type is read from what is written before the parameter's
//! `$name`, never from a resolved type symbol.

const PROMOTION_MODIFIERS: &[&str] = &["public", "protected", "private", "readonly"];

/// Resolve the declared type of a parameter from its declaration text,
/// e.g. `?Foo &$bar = null` → `Some("Foo")`, `$bar` → `None`.
pub fn resolve_type_hint(signature: &str) -> Option<String> {
    let before_name = match signature.find('$') {
        Some(idx) => &signature[..idx],
        None => signature,
    };
    let stripped = strip_attributes(before_name);
    let mut text = stripped.trim();

    loop {
        let Some((word, rest)) = split_first_word(text) else {
            break;
        };
        if PROMOTION_MODIFIERS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(word))
        {
            text = rest.trim_start();
        } else {
            break;
        }
    }

    let text = text.trim_end();
    let text = text.strip_suffix("...").unwrap_or(text).trim_end();
    let text = text.strip_suffix('&').unwrap_or(text).trim_end();
    let text = text.strip_prefix('?').unwrap_or(text).trim_start();
    let text = text.strip_suffix("[]").unwrap_or(text);

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Drop `#[...]` attribute groups, honoring nested brackets.
fn strip_attributes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if depth == 0 && c == '#' && chars.peek() == Some(&'[') {
            chars.next();
            depth = 1;
            continue;
        }
        if depth > 0 {
            match c {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
            continue;
        }
        out.push(c);
    }
    out
}

fn split_first_word(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    Some((&text[..end], &text[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped() {
        assert_eq!(resolve_type_hint("$value"), None);
        assert_eq!(resolve_type_hint("&$value"), None);
        assert_eq!(resolve_type_hint("...$rest"), None);
        assert_eq!(resolve_type_hint("$limit = 10"), None);
    }

    #[test]
    fn test_class_and_builtin_types() {
        assert_eq!(resolve_type_hint("Foo $foo").as_deref(), Some("Foo"));
        assert_eq!(resolve_type_hint("array $items = array()").as_deref(), Some("array"));
        assert_eq!(
            resolve_type_hint("\\App\\Model $model").as_deref(),
            Some("\\App\\Model")
        );
    }

    #[test]
    fn test_markers_are_stripped() {
        assert_eq!(resolve_type_hint("?Foo $foo = null").as_deref(), Some("Foo"));
        assert_eq!(resolve_type_hint("Foo &$foo").as_deref(), Some("Foo"));
        assert_eq!(resolve_type_hint("Foo& $foo").as_deref(), Some("Foo"));
        assert_eq!(resolve_type_hint("int ...$ids").as_deref(), Some("int"));
        assert_eq!(resolve_type_hint("Foo[] $list").as_deref(), Some("Foo"));
    }

    #[test]
    fn test_promotion_modifiers_and_attributes() {
        assert_eq!(
            resolve_type_hint("private readonly string $name").as_deref(),
            Some("string")
        );
        assert_eq!(
            resolve_type_hint("#[SensitiveParameter] string $secret").as_deref(),
            Some("string")
        );
        assert_eq!(resolve_type_hint("#[Attr([1, 2])] $x"), None);
    }

    #[test]
    fn test_union_written_as_is() {
        assert_eq!(
            resolve_type_hint("int|string $key").as_deref(),
            Some("int|string")
        );
    }
}
