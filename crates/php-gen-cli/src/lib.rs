//! Command-line front end for phpgen.
//!
//! Extracts the classes of one PHP file and prints them back as PHP source
//! or as a JSON model.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use php_gen_index::DeclarationIndex;
use php_gen_parser::{extract_path, DeclarationScope, ExtractError};
use php_gen_printer::{FormatConfig, Indent, Printer, PrinterConfig, SourceFormatter};
use php_gen_types::FileModel;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// PHP source
    Php,
    /// JSON class model
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "phpgen",
    version,
    about = "Extract PHP class declarations and print them back as source"
)]
pub struct Args {
    /// PHP file to extract classes from
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Php)]
    pub format: OutputFormat,

    /// Indent generated code with N spaces instead of tabs
    #[arg(long = "indent-spaces", value_name = "N")]
    pub indent_spaces: Option<usize>,

    /// Omit the leading `<?php` tag
    #[arg(long = "no-open-tag")]
    pub no_open_tag: bool,

    /// File whose declarations resolve parent and interface names (repeatable)
    #[arg(long = "scope", value_name = "FILE")]
    pub scope: Vec<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("failed to serialize model: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extract `args.file` and render it in the requested format.
pub fn run(args: &Args) -> Result<String, CliError> {
    let index = DeclarationIndex::new();
    for path in &args.scope {
        index.index_file(path)?;
    }
    let scope: Option<&dyn DeclarationScope> = if args.scope.is_empty() {
        None
    } else {
        Some(&index)
    };

    let model = extract_path(&args.file, scope)?;
    tracing::info!(
        file = %args.file.display(),
        namespaces = model.namespace_count(),
        classes = model.class_count(),
        "extracted file"
    );

    match args.format {
        OutputFormat::Php => Ok(render_php(&model, args)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&model)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn render_php(model: &FileModel, args: &Args) -> String {
    let indent = match args.indent_spaces {
        Some(n) => Indent::Spaces(n),
        None => Indent::Tabs,
    };
    let formatter = SourceFormatter::new(FormatConfig { indent });
    let config = PrinterConfig {
        open_tag: !args.no_open_tag,
    };
    Printer::with_formatter(formatter, config).print(model)
}
