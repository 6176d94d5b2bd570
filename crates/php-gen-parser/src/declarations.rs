//! Lower the tree-sitter CST into a declaration tree.
//!
//! Walks the CST once and records every class-like declaration with its
//! namespace, modifiers and resolved `extends`/`implements` names, plus a
//! flat list of members, each tagged with the FQN of the class that
//! declares it. Statement and expression bodies are not interpreted; method
//! bodies are only located by their brace positions.

use php_gen_types::{DeclarationKind, Visibility};
use tree_sitter::{Node, Tree};

use crate::body::BraceBounds;

/// A `use` import of a class-like name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseImport {
    pub fqn: String,
    pub alias: Option<String>,
}

impl UseImport {
    /// The name this import is visible under.
    pub fn visible_name(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| self.fqn.rsplit('\\').next().unwrap_or(&self.fqn))
    }
}

/// A class, interface, trait or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub kind: DeclarationKind,
    pub fqn: String,
    pub namespace: String,
    pub short_name: String,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Resolved `extends` names (one for classes, any number for interfaces).
    pub extends: Vec<String>,
    /// Resolved `implements` names.
    pub implements: Vec<String>,
    pub doc_comment: Option<String>,
    /// 1-based line of the declaration name.
    pub line: usize,
    /// FQN of the class-like whose method body contains this declaration.
    pub enclosing_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDecl {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub default_value: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub doc_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDecl {
    pub name: String,
    /// Declaration text up to and including the variable name.
    pub signature: String,
    pub is_by_reference: bool,
    pub is_variadic: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub returns_reference: bool,
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterDecl>,
    pub doc_comment: Option<String>,
    /// Brace positions of the body; `None` for bodiless (abstract) methods.
    pub body: Option<BraceBounds>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberDecl {
    Constant(ConstantDecl),
    Property(PropertyDecl),
    Method(MethodDecl),
}

/// A member together with the class that declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub declaring_class: String,
    pub decl: MemberDecl,
}

/// All declarations of a single file.
#[derive(Debug, Clone, Default)]
pub struct DeclarationTree {
    pub classes: Vec<ClassDecl>,
    pub members: Vec<Member>,
}

impl DeclarationTree {
    /// Extract all declarations from a parsed PHP file.
    pub fn from_tree(tree: &Tree, source: &str) -> Self {
        let mut lowering = Lowering {
            source,
            out: DeclarationTree::default(),
            classes: Vec::new(),
            method_owners: Vec::new(),
        };
        let root = tree.root_node();

        // Namespaces without braces apply to the rest of the file.
        let mut scope = Scope::default();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "namespace_definition" {
                let name = find_namespace_name(child, source).unwrap_or_default();
                let body = child.child_by_field_name("body").or_else(|| {
                    let mut c = child.walk();
                    let found = child
                        .children(&mut c)
                        .find(|n| n.kind() == "compound_statement");
                    found
                });
                match body {
                    Some(body) => {
                        let mut inner = Scope::new(name);
                        lowering.walk_children(body, &mut inner);
                    }
                    None => scope = Scope::new(name),
                }
            } else {
                lowering.walk(child, &mut scope);
            }
        }

        lowering.out
    }

    /// Find a class (not interface/trait/enum) by FQN; exact match first,
    /// then case-insensitive as PHP class names are.
    pub fn find_class(&self, fqn: &str) -> Option<&ClassDecl> {
        let classes = || {
            self.classes
                .iter()
                .filter(|c| c.kind == DeclarationKind::Class)
        };
        classes()
            .find(|c| c.fqn == fqn)
            .or_else(|| classes().find(|c| c.fqn.eq_ignore_ascii_case(fqn)))
    }

    /// Whether any class-like declaration in this file has the given FQN.
    pub fn declares(&self, fqn: &str) -> bool {
        self.classes.iter().any(|c| c.fqn.eq_ignore_ascii_case(fqn))
    }

    /// Members whose declaring class is exactly `fqn`.
    pub fn members_of<'a>(&'a self, fqn: &'a str) -> impl Iterator<Item = &'a MemberDecl> + 'a {
        self.members
            .iter()
            .filter(move |m| m.declaring_class == fqn)
            .map(|m| &m.decl)
    }
}

/// Namespace and imports in effect at a point of the file.
#[derive(Debug, Clone, Default)]
struct Scope {
    namespace: String,
    uses: Vec<UseImport>,
}

impl Scope {
    fn new(namespace: String) -> Self {
        Scope {
            namespace,
            uses: Vec::new(),
        }
    }

    fn qualify(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}\\{}", self.namespace, name)
        }
    }

    /// Resolve a class name as written to its FQN using imports and the namespace.
    fn resolve_class_name(&self, name: &str) -> String {
        if let Some(fq) = name.strip_prefix('\\') {
            return fq.to_string();
        }
        if name.len() > 10 && name.is_char_boundary(10) && name[..10].eq_ignore_ascii_case("namespace\\") {
            return self.qualify(&name[10..]);
        }
        if ["self", "static", "parent"]
            .iter()
            .any(|s| s.eq_ignore_ascii_case(name))
        {
            return name.to_string();
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        if let Some(import) = self
            .uses
            .iter()
            .find(|u| u.visible_name().eq_ignore_ascii_case(first))
        {
            return match rest {
                Some(rest) => format!("{}\\{}", import.fqn, rest),
                None => import.fqn.clone(),
            };
        }

        self.qualify(name)
    }
}

struct Lowering<'s> {
    source: &'s str,
    out: DeclarationTree,
    /// Named class-likes currently being walked, innermost last.
    classes: Vec<String>,
    /// Owning class of each method body currently being walked.
    method_owners: Vec<Option<String>>,
}

impl<'s> Lowering<'s> {
    fn walk(&mut self, node: Node, scope: &mut Scope) {
        match node.kind() {
            "namespace_use_declaration" => self.lower_use_declaration(node, scope),
            "method_declaration" => {
                self.method_owners.push(self.classes.last().cloned());
                self.walk_children(node, scope);
                self.method_owners.pop();
            }
            kind => {
                let declared = DeclarationKind::from_node_kind(kind)
                    .and_then(|decl_kind| self.lower_class_like(node, scope, decl_kind));
                // Class declarations may also sit inside function or method bodies.
                match declared {
                    Some(fqn) => {
                        self.classes.push(fqn);
                        self.walk_children(node, scope);
                        self.classes.pop();
                    }
                    None => self.walk_children(node, scope),
                }
            }
        }
    }

    fn walk_children(&mut self, node: Node, scope: &mut Scope) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, scope);
        }
    }

    fn text(&self, node: Node) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn lower_use_declaration(&mut self, node: Node, scope: &mut Scope) {
        let text = self.text(node);
        let lower = text.to_ascii_lowercase();
        if lower.starts_with("use function") || lower.starts_with("use const") {
            return;
        }

        let prefix = {
            let mut cursor = node.walk();
            let found = node
                .children(&mut cursor)
                .find(|c| c.kind() == "namespace_name")
                .map(|n| self.text(n).trim_start_matches('\\').to_string());
            found
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "namespace_use_clause" => {
                    if let Some(import) = self.use_clause(child) {
                        scope.uses.push(import);
                    }
                }
                "namespace_use_group" => {
                    let mut group_cursor = child.walk();
                    for clause in child.children(&mut group_cursor) {
                        if !matches!(
                            clause.kind(),
                            "namespace_use_clause" | "namespace_use_group_clause"
                        ) {
                            continue;
                        }
                        if let Some(mut import) = self.use_clause(clause) {
                            if let Some(prefix) = &prefix {
                                import.fqn = format!("{}\\{}", prefix, import.fqn);
                            }
                            scope.uses.push(import);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// `qualified_name [as alias]`
    fn use_clause(&self, clause: Node) -> Option<UseImport> {
        let mut fqn: Option<String> = None;
        let mut alias: Option<String> = None;
        let mut saw_as = false;

        let mut cursor = clause.walk();
        for child in clause.children(&mut cursor) {
            match child.kind() {
                "qualified_name" | "namespace_name" | "name" if !saw_as && fqn.is_none() => {
                    fqn = Some(self.text(child).trim_start_matches('\\').to_string());
                }
                "as" => saw_as = true,
                "name" if saw_as => alias = Some(self.text(child).to_string()),
                "namespace_aliasing_clause" => {
                    let mut c = child.walk();
                    let name = child.named_children(&mut c).find(|n| n.kind() == "name");
                    alias = name.map(|n| self.text(n).to_string());
                }
                _ => {}
            }
        }
        if alias.is_none() {
            alias = clause
                .child_by_field_name("alias")
                .map(|n| self.text(n).to_string())
                .filter(|a| fqn.as_deref() != Some(a.as_str()));
        }

        fqn.map(|fqn| UseImport { fqn, alias })
    }

    fn lower_class_like(
        &mut self,
        node: Node,
        scope: &Scope,
        kind: DeclarationKind,
    ) -> Option<String> {
        let name_node = node.child_by_field_name("name")?;
        let short_name = self.text(name_node).to_string();
        let fqn = scope.qualify(&short_name);

        let mut decl = ClassDecl {
            kind,
            fqn: fqn.clone(),
            namespace: scope.namespace.clone(),
            short_name,
            is_abstract: false,
            is_final: false,
            extends: Vec::new(),
            implements: Vec::new(),
            doc_comment: find_doc_comment(node, self.source),
            line: name_node.start_position().row + 1,
            enclosing_class: self.method_owners.last().cloned().flatten(),
        };

        let mut body = node.child_by_field_name("body");
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "abstract_modifier" => decl.is_abstract = true,
                "final_modifier" => decl.is_final = true,
                "base_clause" => decl.extends = self.clause_names(child, scope),
                "class_interface_clause" => decl.implements = self.clause_names(child, scope),
                "declaration_list" | "enum_declaration_list" if body.is_none() => {
                    body = Some(child)
                }
                _ if !child.is_named() => match self.text(child).to_ascii_lowercase().as_str() {
                    "abstract" => decl.is_abstract = true,
                    "final" => decl.is_final = true,
                    _ => {}
                },
                _ => {}
            }
        }
        self.out.classes.push(decl);

        if let Some(body) = body {
            self.lower_class_body(body, &fqn);
        }
        Some(fqn)
    }

    /// Names listed in an `extends` or `implements` clause, resolved to FQNs.
    fn clause_names(&self, clause: Node, scope: &Scope) -> Vec<String> {
        let mut cursor = clause.walk();
        let names = clause
            .named_children(&mut cursor)
            .filter(|c| matches!(c.kind(), "name" | "qualified_name"))
            .map(|c| scope.resolve_class_name(self.text(c)))
            .collect();
        names
    }

    fn lower_class_body(&mut self, body: Node, class_fqn: &str) {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            let decls = match child.kind() {
                "const_declaration" | "class_const_declaration" => self.lower_constants(child),
                "property_declaration" => self.lower_properties(child),
                "method_declaration" => vec![MemberDecl::Method(self.lower_method(child))],
                _ => continue,
            };
            self.out
                .members
                .extend(decls.into_iter().map(|decl| Member {
                    declaring_class: class_fqn.to_string(),
                    decl,
                }));
        }
    }

    fn lower_constants(&self, node: Node) -> Vec<MemberDecl> {
        let mut constants = Vec::new();
        let mut cursor = node.walk();
        for element in node.children(&mut cursor) {
            if element.kind() != "const_element" {
                continue;
            }
            let mut element_cursor = element.walk();
            let named: Vec<Node> = element.named_children(&mut element_cursor).collect();
            let Some(name_node) = named.iter().find(|c| c.kind() == "name") else {
                continue;
            };
            let value = element
                .child_by_field_name("value")
                .or_else(|| named.iter().rev().find(|c| c.id() != name_node.id()).copied());
            constants.push(MemberDecl::Constant(ConstantDecl {
                name: self.text(*name_node).to_string(),
                value: value.map(|v| self.text(v).to_string()).unwrap_or_default(),
            }));
        }
        constants
    }

    fn lower_properties(&self, node: Node) -> Vec<MemberDecl> {
        let visibility = extract_visibility(node, self.source);
        let is_static = has_child_kind(node, "static_modifier");
        let doc_comment = find_doc_comment(node, self.source);

        let mut properties = Vec::new();
        let mut cursor = node.walk();
        for element in node.children(&mut cursor) {
            if element.kind() != "property_element" {
                continue;
            }
            let Some(name_node) = element.child_by_field_name("name").or_else(|| {
                let mut c = element.walk();
                let found = element
                    .named_children(&mut c)
                    .find(|n| n.kind() == "variable_name");
                found
            }) else {
                continue;
            };
            let name = self.text(name_node).trim_start_matches('$').to_string();
            properties.push(MemberDecl::Property(PropertyDecl {
                name,
                default_value: self.property_default(element),
                visibility,
                is_static,
                doc_comment: doc_comment.clone(),
            }));
        }
        properties
    }

    fn property_default(&self, element: Node) -> Option<String> {
        if let Some(value) = element.child_by_field_name("default_value") {
            return Some(self.text(value).trim_start_matches('=').trim().to_string());
        }
        let mut cursor = element.walk();
        let initializer = element
            .named_children(&mut cursor)
            .find(|c| c.kind() == "property_initializer");
        initializer.and_then(|init| {
            let mut c = init.walk();
            let value = init.named_children(&mut c).next();
            value.map(|v| self.text(v).to_string())
        })
    }

    fn lower_method(&self, node: Node) -> MethodDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let body = node.child_by_field_name("body").map(|b| {
            let start = b.start_position();
            let end = b.end_position();
            BraceBounds {
                open_line: start.row + 1,
                open_column: start.column,
                close_line: end.row + 1,
                close_column: end.column.saturating_sub(1),
            }
        });

        MethodDecl {
            name,
            visibility: extract_visibility(node, self.source),
            is_abstract: has_child_kind(node, "abstract_modifier"),
            is_static: has_child_kind(node, "static_modifier"),
            is_final: has_child_kind(node, "final_modifier"),
            returns_reference: has_child_kind(node, "reference_modifier"),
            return_type: node
                .child_by_field_name("return_type")
                .map(|t| self.text(t).to_string()),
            parameters: self.lower_parameters(node),
            doc_comment: find_doc_comment(node, self.source),
            body,
        }
    }

    fn lower_parameters(&self, method: Node) -> Vec<ParameterDecl> {
        let Some(list) = method.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut params = Vec::new();
        let mut cursor = list.walk();
        for param in list.children(&mut cursor) {
            let kind = param.kind();
            if !matches!(
                kind,
                "simple_parameter" | "variadic_parameter" | "property_promotion_parameter"
            ) {
                continue;
            }
            let Some(name_node) = param.child_by_field_name("name") else {
                continue;
            };

            let signature = &self.source[param.start_byte()..name_node.end_byte()];
            let before_var = signature
                .rfind('$')
                .map(|i| signature[..i].trim_end())
                .unwrap_or(signature);
            let before_var = before_var.strip_suffix("...").unwrap_or(before_var).trim_end();

            params.push(ParameterDecl {
                name: self
                    .text(name_node)
                    .trim_start_matches(['&', '$', ' ', '\t'])
                    .to_string(),
                signature: signature.to_string(),
                is_by_reference: has_child_kind(param, "reference_modifier")
                    || before_var.ends_with('&'),
                is_variadic: kind == "variadic_parameter" || signature.contains("..."),
                default_value: param
                    .child_by_field_name("default_value")
                    .map(|v| self.text(v).to_string()),
            });
        }
        params
    }
}

// --- Helper functions ---

/// Find the namespace name from a namespace_definition node.
fn find_namespace_name(node: Node, source: &str) -> Option<String> {
    let name = node.child_by_field_name("name").or_else(|| {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .find(|c| c.kind() == "namespace_name");
        found
    })?;
    Some(source[name.byte_range()].trim_start_matches('\\').to_string())
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).any(|c| c.kind() == kind);
    result
}

fn extract_visibility(node: Node, source: &str) -> Visibility {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if matches!(child.kind(), "visibility_modifier" | "var_modifier") {
            return Visibility::from_keyword(&source[child.byte_range()]).unwrap_or_default();
        }
    }
    Visibility::Public
}

/// The `/** */` comment directly preceding a declaration, if any.
fn find_doc_comment(node: Node, source: &str) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let text = &source[prev.byte_range()];
    text.starts_with("/**").then(|| text.to_string())
}
