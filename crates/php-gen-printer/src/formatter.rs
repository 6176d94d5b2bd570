//! Rendering of class models as PHP source.

use php_gen_types::{ClassModel, MethodModel, ParameterModel, PropertyModel};

/// Renders a single class declaration.
pub trait ClassFormatter {
    fn format_class(&self, class: &ClassModel) -> String;
}

/// Indentation unit of generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Tabs,
    Spaces(usize),
}

impl Indent {
    fn unit(self) -> String {
        match self {
            Indent::Tabs => "\t".to_string(),
            Indent::Spaces(n) => " ".repeat(n),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormatConfig {
    pub indent: Indent,
}

/// Formats classes as PHP declarations: doc block, header, then constants,
/// properties and methods separated by blank lines.
pub struct SourceFormatter {
    config: FormatConfig,
}

impl Default for SourceFormatter {
    fn default() -> Self {
        Self::new(FormatConfig::default())
    }
}

impl SourceFormatter {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    fn indent(&self, text: &str, level: usize) -> String {
        let prefix = self.config.indent.unit().repeat(level);
        text.split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("{prefix}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_property(&self, property: &PropertyModel) -> String {
        let mut out = doc_block(&property.doc_lines);
        out.push_str(property.visibility.as_str());
        if property.is_static {
            out.push_str(" static");
        }
        out.push_str(" $");
        out.push_str(&property.name);
        if let Some(value) = &property.default_value {
            out.push_str(" = ");
            out.push_str(value);
        }
        out.push(';');
        out
    }

    fn format_method(&self, method: &MethodModel) -> String {
        let mut out = doc_block(&method.doc_lines);
        if method.is_abstract {
            out.push_str("abstract ");
        }
        if method.is_final {
            out.push_str("final ");
        }
        out.push_str(method.visibility.as_str());
        out.push(' ');
        if method.is_static {
            out.push_str("static ");
        }
        out.push_str("function ");
        if method.is_by_reference_return {
            out.push('&');
        }
        out.push_str(&method.name);

        let params: Vec<String> = method.parameters.iter().map(format_parameter).collect();
        out.push('(');
        out.push_str(&params.join(", "));
        out.push(')');
        if let Some(return_type) = &method.return_type {
            out.push_str(": ");
            out.push_str(return_type);
        }

        if method.is_abstract {
            out.push(';');
            return out;
        }

        out.push_str("\n{\n");
        let body = dedent(method.body.as_deref().unwrap_or_default());
        if !body.is_empty() {
            out.push_str(&self.indent(&body, 1));
            out.push('\n');
        }
        out.push('}');
        out
    }
}

impl ClassFormatter for SourceFormatter {
    fn format_class(&self, class: &ClassModel) -> String {
        let mut out = doc_block(&class.doc_lines);
        if class.is_abstract {
            out.push_str("abstract ");
        }
        if class.is_final {
            out.push_str("final ");
        }
        out.push_str("class ");
        out.push_str(&class.short_name);
        if let Some(parent) = &class.parent {
            out.push_str(" extends \\");
            out.push_str(parent);
        }
        if !class.interfaces.is_empty() {
            let interfaces: Vec<String> =
                class.interfaces.iter().map(|i| format!("\\{i}")).collect();
            out.push_str(" implements ");
            out.push_str(&interfaces.join(", "));
        }
        out.push_str("\n{\n");

        let mut sections = Vec::new();
        if !class.constants.is_empty() {
            let constants: Vec<String> = class
                .constants
                .iter()
                .map(|(name, value)| format!("const {name} = {value};"))
                .collect();
            sections.push(constants.join("\n"));
        }
        if !class.properties.is_empty() {
            let properties: Vec<String> = class
                .properties
                .iter()
                .map(|p| self.format_property(p))
                .collect();
            sections.push(properties.join("\n\n"));
        }
        if !class.methods.is_empty() {
            let methods: Vec<String> = class.methods.iter().map(|m| self.format_method(m)).collect();
            sections.push(methods.join("\n\n\n"));
        }

        if !sections.is_empty() {
            out.push('\n');
            out.push_str(&self.indent(&sections.join("\n\n"), 1));
            out.push_str("\n\n");
        }
        out.push('}');
        out
    }
}

fn format_parameter(param: &ParameterModel) -> String {
    let mut out = String::new();
    if let Some(type_hint) = &param.type_hint {
        out.push_str(type_hint);
        out.push(' ');
    }
    if param.is_by_reference {
        out.push('&');
    }
    if param.is_variadic {
        out.push_str("...");
    }
    out.push('$');
    out.push_str(&param.name);
    if let Some(default) = param.default_value() {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

fn doc_block(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = String::from("/**\n");
    for line in lines {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            out.push_str(" * ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str(" */\n");
    out
}

/// Strip surrounding blank lines and the indentation common to all lines.
fn dedent(body: &str) -> String {
    let lines: Vec<&str> = body.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let common = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| l.get(common..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}
