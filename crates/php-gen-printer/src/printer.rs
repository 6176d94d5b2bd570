//! File-level printing of namespace groups.

use php_gen_types::FileModel;

use crate::formatter::{ClassFormatter, SourceFormatter};
use crate::normalize::normalize;

#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Start the output with `<?php`.
    pub open_tag: bool,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self { open_tag: true }
    }
}

/// Prints a [`FileModel`] as one PHP file.
///
/// Each namespace group is printed in discovery order. When the file holds
/// more than one group the global group is wrapped in a braced
/// `namespace { }` block; named groups get a `namespace X;` header.
pub struct Printer<F = SourceFormatter> {
    formatter: F,
    config: PrinterConfig,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(PrinterConfig::default())
    }
}

impl Printer {
    pub fn new(config: PrinterConfig) -> Self {
        Self::with_formatter(SourceFormatter::default(), config)
    }
}

impl<F: ClassFormatter> Printer<F> {
    pub fn with_formatter(formatter: F, config: PrinterConfig) -> Self {
        Self { formatter, config }
    }

    pub fn print(&self, file: &FileModel) -> String {
        let mut out = String::new();
        if self.config.open_tag {
            out.push_str("<?php\n\n");
        }

        let wrap_global = file.namespace_count() > 1;
        for (namespace, classes) in file.namespaces() {
            let rendered = classes
                .iter()
                .map(|class| self.formatter.format_class(class))
                .collect::<Vec<_>>()
                .join("\n\n\n");

            let group = if namespace.is_empty() {
                if wrap_global {
                    format!("namespace {{\n\n{rendered}\n\n\n}}")
                } else {
                    rendered
                }
            } else {
                format!("namespace {namespace};\n\n{rendered}")
            };
            out.push_str(&normalize(&group));
            out.push_str("\n\n\n");
        }

        tracing::debug!(
            namespaces = file.namespace_count(),
            classes = file.class_count(),
            bytes = out.len(),
            "printed file"
        );
        out
    }
}
