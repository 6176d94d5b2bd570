//! Errors raised while loading and extracting a PHP file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed declaration of class `{class}`: {reason}")]
    MalformedDeclaration { class: String, reason: String },

    #[error("body bounds {start}..{end} outside source of {line_count} lines")]
    BodyBoundsInvalid {
        start: usize,
        end: usize,
        line_count: usize,
    },

    #[error("parser error: {0}")]
    Parser(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
