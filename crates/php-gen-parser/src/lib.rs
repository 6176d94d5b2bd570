//! PHP class declaration extraction for phpgen.
//!
//! A token scanner discovers which classes a file declares and in which
//! namespace; tree-sitter-php provides the declarations those classes are
//! built from.

pub mod body;
pub mod builder;
pub mod declarations;
pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod phpdoc;
pub mod pipeline;
pub mod scanner;
pub mod type_hint;

pub use builder::{DeclarationModelBuilder, DeclarationScope};
pub use error::{ExtractError, Result};
pub use pipeline::{extract_file_model, extract_path, read_source};
