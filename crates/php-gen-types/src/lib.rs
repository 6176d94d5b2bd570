//! Shared types for phpgen.
//!
//! Contains the declaration model (file, class, property, method, parameter)
//! produced by the parser crate and consumed by the printer and CLI crates.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Kind of a class-like PHP declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl DeclarationKind {
    /// Map a tree-sitter-php node kind to a declaration kind.
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(DeclarationKind::Class),
            "interface_declaration" => Some(DeclarationKind::Interface),
            "trait_declaration" => Some(DeclarationKind::Trait),
            "enum_declaration" => Some(DeclarationKind::Enum),
            _ => None,
        }
    }
}

/// Visibility modifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Parse a visibility keyword (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "public" | "var" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which clause of a class declaration an unresolved name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Parent,
    Interface,
}

/// A parent or interface name that matched no known declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    /// Fully qualified name as resolved from the declaration.
    pub name: String,
    pub kind: ReferenceKind,
}

/// A method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterModel {
    pub name: String,
    pub is_by_reference: bool,
    pub is_variadic: bool,
    pub type_hint: Option<String>,
    is_optional: bool,
    default_value: Option<String>,
}

impl ParameterModel {
    /// A parameter without a default value.
    pub fn required(name: impl Into<String>) -> Self {
        ParameterModel {
            name: name.into(),
            is_by_reference: false,
            is_variadic: false,
            type_hint: None,
            is_optional: false,
            default_value: None,
        }
    }

    /// A parameter whose default value literal is `default_value`.
    pub fn optional(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        ParameterModel {
            is_optional: true,
            default_value: Some(default_value.into()),
            ..ParameterModel::required(name)
        }
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    /// Default value literal; `None` for required parameters.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }
}

/// A property declared directly on a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyModel {
    pub name: String,
    /// Initializer expression text; `None` when the property has no initializer.
    pub default_value: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub doc_lines: Vec<String>,
}

/// A method declared directly on a class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodModel {
    pub name: String,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_by_reference_return: bool,
    pub visibility: Visibility,
    pub parameters: Vec<ParameterModel>,
    pub return_type: Option<String>,
    pub doc_lines: Vec<String>,
    /// Raw body text. `Some("")` for abstract methods, `None` when the body
    /// could not be recovered from the source lines.
    pub body: Option<String>,
}

/// Structural model of one class declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassModel {
    pub short_name: String,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Fully qualified parent class name.
    pub parent: Option<String>,
    /// Fully qualified interface names in declaration order.
    pub interfaces: IndexSet<String>,
    pub doc_lines: Vec<String>,
    /// Constant name → value expression text.
    pub constants: IndexMap<String, String>,
    pub properties: Vec<PropertyModel>,
    pub methods: Vec<MethodModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_references: Vec<UnresolvedReference>,
}

impl ClassModel {
    pub fn new(short_name: impl Into<String>) -> Self {
        ClassModel {
            short_name: short_name.into(),
            ..Default::default()
        }
    }

    /// Look up a method by name (case-insensitive, like PHP).
    pub fn method(&self, name: &str) -> Option<&MethodModel> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn property(&self, name: &str) -> Option<&PropertyModel> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// All classes extracted from a single file, grouped by namespace.
///
/// The empty string is the global namespace. Namespaces and the classes
/// within each keep their first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileModel {
    namespaces: IndexMap<String, Vec<ClassModel>>,
}

impl FileModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a class to its namespace group, creating the group on first use.
    pub fn add_class(&mut self, namespace: &str, class: ClassModel) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .push(class);
    }

    /// Whether `namespace` already holds a class named `short_name` (case-insensitive).
    pub fn contains_class(&self, namespace: &str, short_name: &str) -> bool {
        self.namespaces.get(namespace).is_some_and(|classes| {
            classes
                .iter()
                .any(|c| c.short_name.eq_ignore_ascii_case(short_name))
        })
    }

    /// Namespace groups in discovery order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &[ClassModel])> {
        self.namespaces
            .iter()
            .map(|(ns, classes)| (ns.as_str(), classes.as_slice()))
    }

    pub fn classes(&self, namespace: &str) -> &[ClassModel] {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    pub fn class_count(&self) -> usize {
        self.namespaces.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Namespace → class short names, in discovery order.
    pub fn class_names(&self) -> Vec<(String, Vec<String>)> {
        self.namespaces
            .iter()
            .map(|(ns, classes)| {
                (
                    ns.clone(),
                    classes.iter().map(|c| c.short_name.clone()).collect(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_model_preserves_discovery_order() {
        let mut file = FileModel::new();
        file.add_class("", ClassModel::new("A"));
        file.add_class("X", ClassModel::new("C"));
        file.add_class("", ClassModel::new("B"));

        let names = file.class_names();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], ("".to_string(), vec!["A".into(), "B".into()]));
        assert_eq!(names[1], ("X".to_string(), vec!["C".into()]));
        assert_eq!(file.class_count(), 3);
        assert!(file.contains_class("", "b"));
        assert!(!file.contains_class("X", "A"));
    }

    #[test]
    fn test_parameter_default_only_when_optional() {
        let required = ParameterModel::required("id");
        assert!(!required.is_optional());
        assert_eq!(required.default_value(), None);

        let optional = ParameterModel::optional("limit", "10");
        assert!(optional.is_optional());
        assert_eq!(optional.default_value(), Some("10"));
    }

    #[test]
    fn test_visibility_from_keyword() {
        assert_eq!(Visibility::from_keyword("PRIVATE"), Some(Visibility::Private));
        assert_eq!(Visibility::from_keyword("var"), Some(Visibility::Public));
        assert_eq!(Visibility::from_keyword("static"), None);
        assert_eq!(Visibility::Protected.to_string(), "protected");
    }

    #[test]
    fn test_class_model_serializes_to_json() {
        let mut class = ClassModel::new("Foo");
        class.constants.insert("VERSION".into(), "'1.0'".into());
        class.interfaces.insert("App\\Contract".into());

        let json = serde_json::to_value(&class).unwrap();
        assert_eq!(json["short_name"], "Foo");
        assert_eq!(json["constants"]["VERSION"], "'1.0'");
        assert_eq!(json["interfaces"][0], "App\\Contract");
        assert!(json.get("unresolved_references").is_none());
    }
}
