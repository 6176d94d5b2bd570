//! Cross-file index of class-like declarations.

use dashmap::DashMap;
use php_gen_parser::declarations::DeclarationTree;
use php_gen_parser::parser::FileParser;
use php_gen_parser::{read_source, DeclarationScope, Result};
use php_gen_types::DeclarationKind;
use std::path::Path;
use std::sync::Arc;

/// A class, interface, trait or enum known to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedDeclaration {
    pub fqn: String,
    pub kind: DeclarationKind,
    /// Key of the file that declares it.
    pub file: String,
}

/// Global index of the class-like declarations of a set of files.
///
/// Lookups are case-insensitive, as PHP class names are. A name declared by
/// several files stays known until the last of them is removed.
pub struct DeclarationIndex {
    /// Lowercased FQN → declarations in indexing order; never empty
    declarations: DashMap<String, Vec<Arc<IndexedDeclaration>>>,

    /// File key → lowercased FQNs declared in that file
    files: DashMap<String, Vec<String>>,
}

impl DeclarationIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        DeclarationIndex {
            declarations: DashMap::new(),
            files: DashMap::new(),
        }
    }

    /// Index the declarations of `source` under `file`, replacing whatever
    /// was indexed for it before. Returns the number of declarations added.
    pub fn index_source(&self, file: &str, source: &str) -> Result<usize> {
        let tree = FileParser::new()?.parse(source)?;
        let declarations = DeclarationTree::from_tree(&tree, source);

        self.remove_file(file);

        let mut keys = Vec::with_capacity(declarations.classes.len());
        for class in &declarations.classes {
            let key = class.fqn.to_ascii_lowercase();
            self.declarations
                .entry(key.clone())
                .or_default()
                .push(Arc::new(IndexedDeclaration {
                    fqn: class.fqn.clone(),
                    kind: class.kind,
                    file: file.to_string(),
                }));
            keys.push(key);
        }

        tracing::debug!(file, declarations = keys.len(), "indexed file");
        let count = keys.len();
        self.files.insert(file.to_string(), keys);
        Ok(count)
    }

    /// Read and index a file; its display path is the file key.
    pub fn index_file(&self, path: &Path) -> Result<usize> {
        let source = read_source(path)?;
        self.index_source(&path.display().to_string(), &source)
    }

    /// Remove all declarations of a file.
    pub fn remove_file(&self, file: &str) {
        if let Some((_, keys)) = self.files.remove(file) {
            for key in keys {
                if let Some(mut owners) = self.declarations.get_mut(&key) {
                    owners.retain(|decl| decl.file != file);
                }
                self.declarations.remove_if(&key, |_, owners| owners.is_empty());
            }
        }
    }

    /// Look up a declaration by fully qualified name. When several files
    /// declare it, the most recently indexed one wins.
    pub fn get(&self, fqn: &str) -> Option<Arc<IndexedDeclaration>> {
        self.declarations
            .get(&normalize_fqn(fqn))
            .and_then(|r| r.value().last().cloned())
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.declarations.contains_key(&normalize_fqn(fqn))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl Default for DeclarationIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationScope for DeclarationIndex {
    fn contains_declaration(&self, fqn: &str) -> bool {
        self.contains(fqn)
    }
}

fn normalize_fqn(fqn: &str) -> String {
    fqn.trim_start_matches('\\').to_ascii_lowercase()
}
