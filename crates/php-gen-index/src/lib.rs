//! Declaration index for phpgen.
//!
//! Records the class-like declarations of many files so references to
//! classes declared in sibling files resolve during extraction.

pub mod workspace;

pub use workspace::{DeclarationIndex, IndexedDeclaration};
