//! Grammar registry
//!
//! Maps grammar names and file extensions to shared grammars. The host owns
//! the registry; there is no global instance.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use super::builtin;
use super::rules::Grammar;
use super::tokens::StyleTable;
use crate::error::Result;

/// Loaded grammars, looked up by name or by file extension
pub struct GrammarRegistry {
    grammars: HashMap<String, Rc<Grammar>>,
    /// Lowercased extension to grammar name
    extension_map: HashMap<String, String>,
}

impl GrammarRegistry {
    /// Create a registry with the built-in grammars and default styles
    pub fn new() -> Result<Self> {
        Self::with_styles(&StyleTable::default())
    }

    /// Create a registry with the built-in grammars resolved through `styles`
    pub fn with_styles(styles: &StyleTable) -> Result<Self> {
        let mut registry = Self::empty();
        for grammar in builtin::all_grammars(styles)? {
            registry.add_grammar(grammar);
        }
        Ok(registry)
    }

    /// Create a registry without any grammar
    pub fn empty() -> Self {
        Self {
            grammars: HashMap::new(),
            extension_map: HashMap::new(),
        }
    }

    /// Add a grammar, replacing any grammar of the same name
    pub fn add_grammar(&mut self, grammar: Grammar) -> Rc<Grammar> {
        let name = grammar.name.clone();
        for ext in &grammar.extensions {
            self.extension_map.insert(ext.to_lowercase(), name.clone());
        }
        debug!(grammar = %name, extensions = ?grammar.extensions, "register grammar");
        let grammar = Rc::new(grammar);
        self.grammars.insert(name, grammar.clone());
        grammar
    }

    /// Get a grammar by name
    pub fn get(&self, name: &str) -> Option<Rc<Grammar>> {
        self.grammars.get(name).cloned()
    }

    /// Get a grammar by name, ignoring case
    pub fn find(&self, name: &str) -> Option<Rc<Grammar>> {
        self.get(name).or_else(|| {
            self.grammars
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, grammar)| grammar.clone())
        })
    }

    /// Detect the grammar for a file from its extension
    pub fn detect(&self, path: &Path) -> Option<Rc<Grammar>> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(&ext).and_then(|name| self.get(name))
    }

    /// Names of all grammars, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.grammars.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::style::{Color, StyleAttributes};
    use crate::syntax::tokens::TokenType;

    #[test]
    fn test_detect() {
        let registry = GrammarRegistry::new().unwrap();

        let name = |p: &str| registry.detect(Path::new(p)).map(|g| g.name.clone());
        assert_eq!(name("main.rs").as_deref(), Some("Rust"));
        assert_eq!(name("test.py").as_deref(), Some("Python"));
        assert_eq!(name("Cargo.toml").as_deref(), Some("TOML"));
        assert_eq!(name("main.c").as_deref(), Some("C"));
        assert_eq!(name("MAIN.C").as_deref(), Some("C"));
        assert_eq!(name("no_extension"), None);
        assert_eq!(name("notes.txt"), None);
    }

    #[test]
    fn test_names_sorted() {
        let registry = GrammarRegistry::new().unwrap();
        assert_eq!(registry.names(), vec!["C", "Python", "Rust", "TOML"]);
    }

    #[test]
    fn test_get_and_find() {
        let registry = GrammarRegistry::new().unwrap();
        assert!(registry.get("Rust").is_some());
        assert!(registry.get("rust").is_none());
        assert_eq!(registry.find("rust").map(|g| g.name.clone()).as_deref(), Some("Rust"));
        assert!(registry.find("cobol").is_none());
    }

    #[test]
    fn test_add_grammar_replaces() {
        let mut registry = GrammarRegistry::empty();
        assert!(registry.names().is_empty());

        let mut grammar = Grammar::new("Plain");
        grammar.add_extension("TXT");
        registry.add_grammar(grammar);
        assert_eq!(registry.names(), vec!["Plain"]);
        assert!(registry.detect(Path::new("a.txt")).is_some());

        registry.add_grammar(Grammar::new("Plain"));
        assert_eq!(registry.names(), vec!["Plain"]);
    }

    #[test]
    fn test_with_styles() {
        let mut styles = StyleTable::new();
        let keyword = StyleAttributes::fg(Color::Rgb(1, 2, 3));
        styles.set("Keyword", keyword);

        let registry = GrammarRegistry::with_styles(&styles).unwrap();
        let rust = registry.get("Rust").unwrap();
        assert_eq!(rust.style(TokenType::Keyword), keyword);
        assert_eq!(rust.named_style("Keyword"), Some(keyword));
    }
}
