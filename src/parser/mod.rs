//! Language registry: routes files to a tree-sitter grammar and produces
//! an arena syntax tree with error diagnostics.
//!
//! This module provides:
//! - `LanguageId` and the extension table (`identify`)
//! - `LanguageRegistry`: one lazily created parser per language
//! - `SyntaxTree`: the read-only arena every extractor borrows
//!
//! # Lifecycle
//!
//! Create one `LanguageRegistry` at startup and share it by reference. A
//! parser for a language is created on the first parse of that language
//! and kept for the lifetime of the registry. If creation fails (grammar
//! compiled out, ABI mismatch) the failure is cached too, and every later
//! parse of that language reports the same `ParserUnavailable`.
//!
//! All parser access goes through `LanguageRegistry::acquire`. Each parser
//! sits behind its own mutex: concurrent parses of one language serialize,
//! different languages proceed in parallel.

mod language;
mod tree;

pub use language::{identify, LanguageId};
pub use tree::{Descendants, NodeId, Span, SyntaxNode, SyntaxTree};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;

use crate::config::Config;
use crate::error::{AnalysisError, Result};

/// A node flagged by the parser as an error or a missing token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    pub node: NodeId,
    /// Node kind; `ERROR` for error nodes, the expected token for missing ones.
    pub kind: &'static str,
    pub missing: bool,
    pub start_line: usize,
    pub start_col: usize,
}

/// Result of parsing one file.
///
/// The tree is exclusively owned here. Extractors and the complexity engine
/// only borrow it.
#[derive(Debug)]
pub struct ParseResult {
    pub path: PathBuf,
    pub language: LanguageId,
    pub tree: SyntaxTree,
    /// True when `errors` is non-empty. The tree is still usable.
    pub has_errors: bool,
    pub errors: Vec<SyntaxDiagnostic>,
    pub parse_time: Duration,
}

impl ParseResult {
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Path as a display string, used in log fields.
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

type ParserSlot = OnceCell<std::result::Result<Mutex<tree_sitter::Parser>, String>>;

/// Owner of every tree-sitter parser in the process.
pub struct LanguageRegistry {
    config: Config,
    /// One slot per language, filled on first use and never evicted.
    parsers: HashMap<LanguageId, ParserSlot>,
}

impl LanguageRegistry {
    pub fn new(config: Config) -> Self {
        let parsers = LanguageId::ALL
            .iter()
            .map(|lang| (*lang, OnceCell::new()))
            .collect();
        Self { config, parsers }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extension lookup. Does not consult the enabled-language list.
    pub fn identify<P: AsRef<Path>>(&self, path: P) -> LanguageId {
        identify(path)
    }

    /// Whether a parser (or a cached failure) exists for `language`.
    pub fn is_loaded(&self, language: LanguageId) -> bool {
        self.parsers
            .get(&language)
            .map(|slot| slot.get().is_some())
            .unwrap_or(false)
    }

    /// Single acquisition point for parsers.
    fn acquire(&self, language: LanguageId) -> Result<&Mutex<tree_sitter::Parser>> {
        let slot = self
            .parsers
            .get(&language)
            .ok_or_else(|| AnalysisError::ParserUnavailable {
                language,
                reason: "no grammar registered".to_string(),
            })?;

        slot.get_or_init(|| {
            let created = create_parser(language);
            match &created {
                Ok(_) => tracing::debug!(%language, "created parser"),
                Err(reason) => tracing::warn!(%language, %reason, "parser unavailable"),
            }
            created
        })
        .as_ref()
        .map_err(|reason| AnalysisError::ParserUnavailable {
            language,
            reason: reason.clone(),
        })
    }

    /// Parse a file using the configured size limit.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<ParseResult> {
        self.parse(path, self.config.max_file_size)
    }

    /// Parse a file from disk.
    ///
    /// Checks run in a fixed order: existence, size, language, parser
    /// acquisition. An oversized file is rejected from its metadata alone,
    /// without reading it or touching a parser.
    pub fn parse<P: AsRef<Path>>(&self, path: P, max_size_bytes: u64) -> Result<ParseResult> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AnalysisError::NotFound {
                path: path.to_path_buf(),
            },
            _ => AnalysisError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_file() {
            return Err(AnalysisError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() > max_size_bytes {
            return Err(AnalysisError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: max_size_bytes,
            });
        }

        let language = self.supported_language(path)?;
        let parser = self.acquire(language)?;

        let source = fs::read(path).map_err(|e| AnalysisError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.run_parser(parser, path.to_path_buf(), language, source)
    }

    /// Parse bytes supplied by a caller that already read the file.
    ///
    /// `path` is only used as an identity for diagnostics.
    pub fn parse_source<P: Into<PathBuf>>(
        &self,
        language: LanguageId,
        path: P,
        source: Vec<u8>,
    ) -> Result<ParseResult> {
        let path = path.into();
        let size = source.len() as u64;
        if size > self.config.max_file_size {
            return Err(AnalysisError::TooLarge {
                path,
                size,
                limit: self.config.max_file_size,
            });
        }
        if !language.is_known() || !self.config.is_enabled(language) {
            return Err(AnalysisError::UnsupportedLanguage { path });
        }
        let parser = self.acquire(language)?;
        self.run_parser(parser, path, language, source)
    }

    fn supported_language(&self, path: &Path) -> Result<LanguageId> {
        let language = identify(path);
        if !language.is_known() || !self.config.is_enabled(language) {
            return Err(AnalysisError::UnsupportedLanguage {
                path: path.to_path_buf(),
            });
        }
        Ok(language)
    }

    fn run_parser(
        &self,
        parser: &Mutex<tree_sitter::Parser>,
        path: PathBuf,
        language: LanguageId,
        source: Vec<u8>,
    ) -> Result<ParseResult> {
        let started = Instant::now();
        let parsed = {
            // A panic while parsing leaves the parser itself usable.
            let mut parser = parser.lock().unwrap_or_else(|e| e.into_inner());
            parser.parse(&source, None)
        };
        let Some(ts_tree) = parsed else {
            return Err(AnalysisError::ParseFailure { path, language });
        };

        let tree = SyntaxTree::build(&ts_tree, source);
        let errors = collect_diagnostics(&tree);
        let parse_time = started.elapsed();

        tracing::debug!(
            path = %path.display(),
            %language,
            nodes = tree.len(),
            elapsed_us = parse_time.as_micros() as u64,
            "parsed file"
        );
        if !errors.is_empty() {
            tracing::warn!(
                path = %path.display(),
                errors = errors.len(),
                "file parsed with syntax errors"
            );
        }

        Ok(ParseResult {
            path,
            language,
            has_errors: !errors.is_empty(),
            tree,
            errors,
            parse_time,
        })
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn create_parser(language: LanguageId) -> std::result::Result<Mutex<tree_sitter::Parser>, String> {
    let grammar = language
        .grammar()
        .ok_or_else(|| format!("grammar for {} is not compiled in", language))?;
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| format!("incompatible grammar: {}", e))?;
    Ok(Mutex::new(parser))
}

/// Full-tree scan for error and missing nodes.
fn collect_diagnostics(tree: &SyntaxTree) -> Vec<SyntaxDiagnostic> {
    tree.descendants(tree.root())
        .filter_map(|id| {
            let node = tree.node(id);
            (node.is_error || node.is_missing).then(|| SyntaxDiagnostic {
                node: id,
                kind: node.kind,
                missing: node.is_missing,
                start_line: node.span.start_line,
                start_col: node.span.start_col,
            })
        })
        .collect()
}

#[cfg(test)]
#[cfg(feature = "all-languages")]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_python_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "m.py", "def f(x):\n    return x\n");

        let registry = LanguageRegistry::default();
        let result = registry.parse(&path, 1024).unwrap();

        assert_eq!(result.language, LanguageId::Python);
        assert!(!result.has_errors);
        assert!(result.errors.is_empty());
        assert_eq!(result.tree.kind(result.root()), "module");
    }

    #[test]
    fn test_parse_result_debug_omits_source() {
        let registry = LanguageRegistry::default();
        let result = registry
            .parse_source(LanguageId::Python, "m.py", b"secret_token = 1\n".to_vec())
            .unwrap();

        let debug = format!("{:?}", result);
        assert!(debug.contains("SyntaxTree"));
        assert!(debug.contains("source_len: 17"));
        assert!(!debug.contains("secret_token"));
    }

    #[test]
    fn test_not_found() {
        let registry = LanguageRegistry::default();
        let err = registry.parse("/definitely/not/here.py", 1024).unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_too_large_skips_parser() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "big.py", &"x = 1\n".repeat(100));

        let registry = LanguageRegistry::default();
        let err = registry.parse(&path, 10).unwrap_err();

        assert!(matches!(err, AnalysisError::TooLarge { limit: 10, .. }));
        assert!(!registry.is_loaded(LanguageId::Python));
    }

    #[test]
    fn test_too_large_reported_before_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", &"words ".repeat(50));

        let registry = LanguageRegistry::default();
        let err = registry.parse(&path, 8).unwrap_err();
        assert!(matches!(err, AnalysisError::TooLarge { .. }));
    }

    #[test]
    fn test_unsupported_language() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", "hello");

        let registry = LanguageRegistry::default();
        let err = registry.parse(&path, 1024).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn test_disabled_language_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "main.go", "package main\n");

        let config = Config {
            enabled_languages: vec![LanguageId::Python],
            ..Config::default()
        };
        let registry = LanguageRegistry::new(config);
        let err = registry.parse(&path, 1024).unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedLanguage { .. }));
        assert!(!registry.is_loaded(LanguageId::Go));
    }

    #[test]
    fn test_syntax_errors_still_return_tree() {
        let registry = LanguageRegistry::default();
        let result = registry
            .parse_source(LanguageId::Python, "broken.py", b"def f(:\n    pass\n".to_vec())
            .unwrap();

        assert!(result.has_errors);
        assert!(!result.errors.is_empty());
        assert!(result.errors.iter().all(|d| d.start_line >= 1));
    }

    #[test]
    fn test_missing_token_reported() {
        let registry = LanguageRegistry::default();
        let result = registry
            .parse_source(LanguageId::Go, "m.go", b"package main\nfunc f() { x := (1 + 2 }\n".to_vec())
            .unwrap();
        assert!(result.has_errors);
    }

    #[test]
    fn test_parser_reused_across_parses() {
        let registry = LanguageRegistry::default();
        assert!(!registry.is_loaded(LanguageId::Rust));
        registry
            .parse_source(LanguageId::Rust, "a.rs", b"fn a() {}".to_vec())
            .unwrap();
        assert!(registry.is_loaded(LanguageId::Rust));
        let second = registry
            .parse_source(LanguageId::Rust, "b.rs", b"fn b() {}".to_vec())
            .unwrap();
        assert_eq!(second.tree.kind(second.root()), "source_file");
    }

    #[test]
    fn test_concurrent_parses_same_language() {
        use rayon::prelude::*;

        let registry = LanguageRegistry::default();
        let ok = (0..16)
            .into_par_iter()
            .map(|i| {
                let src = format!("def f{}(a, b):\n    return a or b\n", i);
                registry.parse_source(LanguageId::Python, format!("f{}.py", i), src.into_bytes())
            })
            .filter(|r| r.as_ref().map(|p| !p.has_errors).unwrap_or(false))
            .count();
        assert_eq!(ok, 16);
    }

    #[test]
    fn test_arena_links() {
        let registry = LanguageRegistry::default();
        let result = registry
            .parse_source(LanguageId::Python, "m.py", b"a = 1\nb = 2\n".to_vec())
            .unwrap();
        let tree = &result.tree;
        let root = tree.root();
        let stmts: Vec<_> = tree.named_children(root).collect();
        assert_eq!(stmts.len(), 2);
        assert_eq!(tree.parent(stmts[1]), Some(root));
        assert_eq!(tree.prev_named_sibling(stmts[1]), Some(stmts[0]));
        assert_eq!(tree.text(stmts[1]), "b = 2");
        assert_eq!(tree.start_line(stmts[1]), 2);
        assert_eq!(tree.descendants(root).next(), Some(root));
    }
}
