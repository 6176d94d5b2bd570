//! File-level extraction: read, scan, parse, build.

use std::path::Path;

use php_gen_types::FileModel;

use crate::builder::{DeclarationModelBuilder, DeclarationScope};
use crate::declarations::DeclarationTree;
use crate::diagnostics::extract_syntax_errors;
use crate::error::{ExtractError, Result};
use crate::lexer::tokenize;
use crate::parser::FileParser;
use crate::scanner::{scan_classes, DiscoveredClass};

/// Read a source file, distinguishing a missing file from an unreadable one.
pub fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ExtractError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Extract the classes of one PHP source into a [`FileModel`].
///
/// Classes are discovered by the token scanner in source order; each one is
/// then built from the tree-sitter declaration tree. A class declared inside
/// a method body of another discovered class is left in that body's text
/// rather than listed on its own. Files without class declarations are never
/// parsed.
pub fn extract_file_model(
    source: &str,
    scope: Option<&dyn DeclarationScope>,
) -> Result<FileModel> {
    let tokens = tokenize(source);
    let discovered = scan_classes(&tokens);
    tracing::debug!(
        tokens = tokens.len(),
        classes = discovered.len(),
        "discovered classes"
    );

    let mut model = FileModel::new();
    if discovered.is_empty() {
        return Ok(model);
    }

    let tree = FileParser::new()?.parse(source)?;
    for issue in extract_syntax_errors(&tree) {
        tracing::warn!(
            line = issue.line,
            column = issue.column,
            "syntax error: {}",
            issue.message
        );
    }

    let declarations = DeclarationTree::from_tree(&tree, source);
    let builder = DeclarationModelBuilder::new(&declarations, source).with_scope(scope);

    for class in &discovered {
        if let Some(owner) = carried_by(&declarations, &discovered, class) {
            tracing::debug!(class = %class.fqn(), owner, "class kept in method body");
            continue;
        }
        if model.contains_class(&class.namespace, &class.name) {
            return Err(ExtractError::MalformedDeclaration {
                class: class.fqn(),
                reason: format!("declared more than once (again on line {})", class.line),
            });
        }
        let built = builder.build_class(&class.fqn())?;
        model.add_class(&class.namespace, built);
    }

    Ok(model)
}

/// The discovered class whose method body declares `class`, if any.
fn carried_by<'a>(
    declarations: &'a DeclarationTree,
    discovered: &[DiscoveredClass],
    class: &DiscoveredClass,
) -> Option<&'a str> {
    let fqn = class.fqn();
    let owner = declarations
        .classes
        .iter()
        .find(|decl| decl.line == class.line && decl.fqn.eq_ignore_ascii_case(&fqn))?
        .enclosing_class
        .as_deref()?;
    discovered
        .iter()
        .any(|d| d.fqn().eq_ignore_ascii_case(owner))
        .then_some(owner)
}

/// Read `path` and extract its [`FileModel`].
pub fn extract_path(path: &Path, scope: Option<&dyn DeclarationScope>) -> Result<FileModel> {
    let source = read_source(path)?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "extracting file");
    extract_file_model(&source, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn names(model: &FileModel) -> Vec<(String, Vec<String>)> {
        model.class_names()
    }

    #[test]
    fn test_no_classes_yields_empty_model() {
        let model = extract_file_model("<?php\nfunction helper() { return 1; }\ninterface I {}\n", None)
            .unwrap();
        assert!(model.is_empty());
        assert_eq!(model.namespace_count(), 0);

        let html = extract_file_model("<html><body>class Foo</body></html>", None).unwrap();
        assert!(html.is_empty(), "text outside PHP tags is not code");
    }

    #[test]
    fn test_global_then_named_namespace() {
        let source = "<?php\nnamespace {\n  class A {}\n  class B {}\n}\nnamespace X {\n  class C {}\n}\n";
        let model = extract_file_model(source, None).unwrap();
        assert_eq!(
            names(&model),
            vec![
                (String::new(), vec!["A".to_string(), "B".to_string()]),
                ("X".to_string(), vec!["C".to_string()]),
            ]
        );
    }

    #[test]
    fn test_groups_follow_source_order() {
        let source = "<?php\nnamespace One;\nclass A {}\nclass B {}\nnamespace Two\\Three;\nclass C {}\nnamespace One;\nclass D {}\n";
        let model = extract_file_model(source, None).unwrap();
        assert_eq!(model.namespace_count(), 2);
        assert_eq!(model.class_count(), 4);
        assert_eq!(
            names(&model),
            vec![
                (
                    "One".to_string(),
                    vec!["A".to_string(), "B".to_string(), "D".to_string()]
                ),
                ("Two\\Three".to_string(), vec!["C".to_string()]),
            ]
        );
    }

    #[test]
    fn test_optional_and_required_parameters() {
        let source = "<?php\nclass Greeter {\n  public function greet($name, $greeting = 'Hello') {\n    return \"$greeting $name\";\n  }\n}\n";
        let model = extract_file_model(source, None).unwrap();
        let greet = model.classes("")[0].method("greet").unwrap();
        let name = &greet.parameters[0];
        assert!(!name.is_optional());
        assert_eq!(name.default_value(), None);
        let greeting = &greet.parameters[1];
        assert!(greeting.is_optional());
        assert_eq!(greeting.default_value(), Some("'Hello'"));
    }

    #[test]
    fn test_duplicate_class_is_malformed() {
        let source = "<?php\nif (PHP_VERSION_ID > 80000) {\n  class Compat {}\n} else {\n  class Compat {}\n}\n";
        let err = extract_file_model(source, None).unwrap_err();
        assert!(
            matches!(err, ExtractError::MalformedDeclaration { ref class, .. } if class == "Compat"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_class_in_method_body_stays_in_body() {
        let source = "<?php\nclass A\n{\n    public function f()\n    {\n        class Local {}\n        return new Local();\n    }\n}\nclass B {}\n";
        let model = extract_file_model(source, None).unwrap();
        assert_eq!(
            names(&model),
            vec![(String::new(), vec!["A".to_string(), "B".to_string()])]
        );
        let f = model.classes("")[0].method("f").unwrap();
        assert_eq!(
            f.body.as_deref(),
            Some("        class Local {}\n        return new Local();")
        );
    }

    #[test]
    fn test_class_in_function_body_is_listed() {
        let source = "<?php\nfunction make() {\n  class Local {}\n}\nclass A {}\n";
        let model = extract_file_model(source, None).unwrap();
        assert_eq!(
            names(&model),
            vec![(String::new(), vec!["Local".to_string(), "A".to_string()])]
        );
    }

    #[test]
    fn test_scope_resolves_sibling_declarations() {
        let source = "<?php\nnamespace App;\nclass Child extends Base {}\n";
        let known = |fqn: &str| fqn == "App\\Base";
        let model = extract_file_model(source, Some(&known)).unwrap();
        assert!(model.classes("App")[0].unresolved_references.is_empty());

        let model = extract_file_model(source, None).unwrap();
        assert_eq!(model.classes("App")[0].unresolved_references.len(), 1);
    }

    #[test]
    fn test_extract_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<?php\nnamespace Demo;\n\nfinal class Point {{\n  public $x = 0;\n}}\n").unwrap();
        let model = extract_path(file.path(), None).unwrap();
        let point = &model.classes("Demo")[0];
        assert_eq!(point.short_name, "Point");
        assert!(point.is_final);
        assert_eq!(point.properties[0].default_value.as_deref(), Some("0"));
    }

    #[test]
    fn test_missing_file_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.php");
        match extract_path(&missing, None).unwrap_err() {
            ExtractError::SourceNotFound { path } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
