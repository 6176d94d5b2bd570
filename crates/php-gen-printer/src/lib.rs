//! Source printer for phpgen.
//!
//! Turns a [`php_gen_types::FileModel`] back into PHP source, one class
//! at a time through a [`ClassFormatter`].

pub mod formatter;
pub mod normalize;
pub mod printer;

pub use formatter::{ClassFormatter, FormatConfig, Indent, SourceFormatter};
pub use printer::{Printer, PrinterConfig};
