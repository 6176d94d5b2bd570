//! Build class models from the declaration tree.

use php_gen_types::{
    ClassModel, MethodModel, ParameterModel, PropertyModel, ReferenceKind, UnresolvedReference,
};

use crate::body::extract_body;
use crate::declarations::{
    ClassDecl, DeclarationTree, MemberDecl, MethodDecl, ParameterDecl, PropertyDecl,
};
use crate::error::{ExtractError, Result};
use crate::phpdoc::parse_doc_comment;
use crate::type_hint::resolve_type_hint;

/// Declarations known outside the file being analyzed.
///
/// Used to decide whether a parent or interface name is resolvable; names
/// matched neither by the file nor by the scope are recorded as unresolved.
pub trait DeclarationScope {
    fn contains_declaration(&self, fqn: &str) -> bool;
}

impl<F> DeclarationScope for F
where
    F: Fn(&str) -> bool,
{
    fn contains_declaration(&self, fqn: &str) -> bool {
        self(fqn)
    }
}

/// Builds [`ClassModel`]s for the classes of one file.
pub struct DeclarationModelBuilder<'a> {
    declarations: &'a DeclarationTree,
    lines: Vec<&'a str>,
    scope: Option<&'a dyn DeclarationScope>,
}

impl<'a> DeclarationModelBuilder<'a> {
    pub fn new(declarations: &'a DeclarationTree, source: &'a str) -> Self {
        DeclarationModelBuilder {
            declarations,
            lines: source.lines().collect(),
            scope: None,
        }
    }

    /// Consult `scope` when checking parent and interface names.
    pub fn with_scope(mut self, scope: Option<&'a dyn DeclarationScope>) -> Self {
        self.scope = scope;
        self
    }

    /// Build the model of the class declared as `fqn`.
    pub fn build_class(&self, fqn: &str) -> Result<ClassModel> {
        let decl = self.declarations.find_class(fqn).ok_or_else(|| {
            ExtractError::MalformedDeclaration {
                class: fqn.to_string(),
                reason: "no class declaration found in the syntax tree".to_string(),
            }
        })?;

        let mut model = ClassModel::new(&decl.short_name);
        model.is_abstract = decl.is_abstract;
        model.is_final = decl.is_final;
        model.parent = decl.extends.first().cloned();
        model.interfaces.extend(decl.implements.iter().cloned());
        model.doc_lines = doc_lines(decl.doc_comment.as_deref());
        model.unresolved_references = self.unresolved_references(decl);

        for member in self.declarations.members_of(&decl.fqn) {
            match member {
                MemberDecl::Constant(constant) => {
                    model
                        .constants
                        .insert(constant.name.clone(), constant.value.clone());
                }
                MemberDecl::Property(property) => model.properties.push(build_property(property)),
                MemberDecl::Method(method) => model.methods.push(self.build_method(decl, method)),
            }
        }

        tracing::debug!(
            class = %decl.fqn,
            constants = model.constants.len(),
            properties = model.properties.len(),
            methods = model.methods.len(),
            "built class model"
        );
        Ok(model)
    }

    fn is_known(&self, fqn: &str) -> bool {
        self.declarations.declares(fqn)
            || self
                .scope
                .is_some_and(|scope| scope.contains_declaration(fqn))
    }

    fn unresolved_references(&self, decl: &ClassDecl) -> Vec<UnresolvedReference> {
        let parent = decl
            .extends
            .first()
            .map(|name| (name, ReferenceKind::Parent));
        let interfaces = decl
            .implements
            .iter()
            .map(|name| (name, ReferenceKind::Interface));

        parent
            .into_iter()
            .chain(interfaces)
            .filter(|(name, _)| !self.is_known(name))
            .map(|(name, kind)| {
                tracing::warn!(class = %decl.fqn, reference = %name, ?kind, "unresolved reference");
                UnresolvedReference {
                    name: name.clone(),
                    kind,
                }
            })
            .collect()
    }

    fn build_method(&self, class: &ClassDecl, method: &MethodDecl) -> MethodModel {
        let body = match (method.is_abstract, method.body) {
            (false, Some(bounds)) => match extract_body(&self.lines, bounds) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(
                        class = %class.fqn,
                        method = %method.name,
                        error = %e,
                        "method body unavailable"
                    );
                    None
                }
            },
            _ => Some(String::new()),
        };

        MethodModel {
            name: method.name.clone(),
            is_abstract: method.is_abstract,
            is_static: method.is_static,
            is_final: method.is_final,
            is_by_reference_return: method.returns_reference,
            visibility: method.visibility,
            parameters: method.parameters.iter().map(build_parameter).collect(),
            return_type: method.return_type.clone(),
            doc_lines: doc_lines(method.doc_comment.as_deref()),
            body,
        }
    }
}

fn build_property(property: &PropertyDecl) -> PropertyModel {
    PropertyModel {
        name: property.name.clone(),
        default_value: property.default_value.clone(),
        visibility: property.visibility,
        is_static: property.is_static,
        doc_lines: doc_lines(property.doc_comment.as_deref()),
    }
}

fn build_parameter(param: &ParameterDecl) -> ParameterModel {
    let mut model = match &param.default_value {
        Some(default) => ParameterModel::optional(&param.name, default),
        None => ParameterModel::required(&param.name),
    };
    model.is_by_reference = param.is_by_reference;
    model.is_variadic = param.is_variadic;
    model.type_hint = resolve_type_hint(&param.signature);
    model
}

fn doc_lines(comment: Option<&str>) -> Vec<String> {
    parse_doc_comment(comment).unwrap_or_default()
}
