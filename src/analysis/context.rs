//! Batch analysis over a set of files.
//!
//! The AnalysisContext provides:
//! - One `LanguageRegistry` shared by every worker
//! - Caching of per-file results to avoid re-parsing
//! - Parallel analysis of a batch with typed per-file failures
//! - Cross-file symbol lookup

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;

use crate::analysis::{extract_symbols, FileSymbolSet, FunctionSymbol, TypeSymbol};
use crate::complexity::{self, ComplexityMetrics};
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::graph::DependencyGraph;
use crate::parser::LanguageRegistry;

/// Everything produced for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileAnalysis {
    /// Path relative to the context's base directory, `/`-separated.
    pub path: String,
    pub symbols: FileSymbolSet,
    pub complexity: ComplexityMetrics,
    /// Number of error and missing nodes in the tree.
    pub syntax_errors: usize,
    pub parse_time: Duration,
}

/// A file of a batch that could not be analyzed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: AnalysisError,
}

/// Results of [`AnalysisContext::analyze_files_parallel`].
#[derive(Debug, Default)]
pub struct BatchAnalysis {
    pub files: BTreeMap<String, FileAnalysis>,
    pub failures: Vec<FileFailure>,
}

impl BatchAnalysis {
    /// Build the dependency graph once the whole batch is in.
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_files(self.files.iter().map(|(path, a)| (path.as_str(), &a.symbols)))
    }

    /// Symbol sets keyed by path.
    pub fn symbol_sets(&self) -> BTreeMap<String, FileSymbolSet> {
        self.files
            .iter()
            .map(|(path, a)| (path.clone(), a.symbols.clone()))
            .collect()
    }
}

/// Analysis context for a set of files under one base directory.
///
/// Results are cached per file, so analyzing the same path twice parses it
/// once.
pub struct AnalysisContext {
    /// Base directory for relative path resolution.
    base_dir: PathBuf,
    registry: LanguageRegistry,
    /// Cached results, keyed by relative path.
    cache: RwLock<HashMap<String, FileAnalysis>>,
}

impl AnalysisContext {
    pub fn new<P: AsRef<Path>>(base_dir: P, config: Config) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            registry: LanguageRegistry::new(config),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Analyze a file and cache the result.
    ///
    /// Returns the cached result if the file was already analyzed.
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P) -> Result<FileAnalysis> {
        let abs_path = self.absolute(path.as_ref());
        let key = self.relative_key(&abs_path);

        if let Some(cached) = self.read_cache().get(&key) {
            return Ok(cached.clone());
        }

        let parsed = self.registry.parse_file(&abs_path)?;
        let symbols = extract_symbols(&parsed);
        let analysis = FileAnalysis {
            path: key.clone(),
            complexity: complexity::analyze_file(&symbols),
            symbols,
            syntax_errors: parsed.errors.len(),
            parse_time: parsed.parse_time,
        };

        self.write_cache().insert(key, analysis.clone());
        Ok(analysis)
    }

    /// Analyze a batch on the rayon pool, one task per file.
    ///
    /// A failing file never stops the batch; it is reported in
    /// [`BatchAnalysis::failures`] with its typed error.
    pub fn analyze_files_parallel(&self, paths: &[PathBuf]) -> BatchAnalysis {
        use rayon::prelude::*;

        let results: Vec<_> = paths
            .par_iter()
            .map(|p| (p, self.analyze_file(p)))
            .collect();

        let mut batch = BatchAnalysis::default();
        for (path, result) in results {
            match result {
                Ok(analysis) => {
                    batch.files.insert(analysis.path.clone(), analysis);
                }
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "failed to analyze file");
                    batch.failures.push(FileFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            analyzed = batch.files.len(),
            failed = batch.failures.len(),
            "batch analysis complete"
        );
        batch
    }

    /// Cached result for a file, if it has been analyzed.
    pub fn cached<P: AsRef<Path>>(&self, path: P) -> Option<FileAnalysis> {
        let key = self.relative_key(&self.absolute(path.as_ref()));
        self.read_cache().get(&key).cloned()
    }

    /// Find functions, methods and types named `name` across all analyzed
    /// files.
    pub fn find_symbol(&self, name: &str) -> Vec<SymbolMatch> {
        let cache = self.read_cache();
        let mut matches = Vec::new();

        for analysis in cache.values() {
            let symbols = &analysis.symbols;
            for func in symbols.functions.iter().filter(|f| f.name == name) {
                matches.push(SymbolMatch::function(&analysis.path, None, func));
            }
            for ty in &symbols.classes {
                if ty.name == name {
                    matches.push(SymbolMatch::type_symbol(&analysis.path, ty));
                }
                for method in ty.methods.iter().filter(|m| m.name == name) {
                    matches.push(SymbolMatch::function(&analysis.path, Some(&ty.name), method));
                }
            }
        }

        // Sort for deterministic output
        matches.sort_by(|a, b| (&a.file, a.line).cmp(&(&b.file, b.line)));
        matches
    }

    /// All analyzed file paths, sorted.
    pub fn analyzed_files(&self) -> Vec<String> {
        let mut files: Vec<_> = self.read_cache().keys().cloned().collect();
        files.sort();
        files
    }

    pub fn clear_cache(&self) {
        self.write_cache().clear();
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Cache and graph key: `/`-joined, with `..` folded where it can be and
    /// kept where it leaves the base directory.
    fn relative_key(&self, abs_path: &Path) -> String {
        let rel = abs_path.strip_prefix(&self.base_dir).unwrap_or(abs_path);
        let mut parts: Vec<String> = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
                Component::ParentDir => match parts.last().map(String::as_str) {
                    // `/..` is `/`
                    Some("") => {}
                    None | Some("..") => parts.push("..".to_string()),
                    Some(_) => {
                        parts.pop();
                    }
                },
                // outside the base directory the key stays absolute
                Component::RootDir => parts.push(String::new()),
                Component::Prefix(prefix) => {
                    parts.push(prefix.as_os_str().to_string_lossy().to_string())
                }
                Component::CurDir => {}
            }
        }
        parts.join("/")
    }

    // A panic in one worker must not poison the cache for the others.
    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, FileAnalysis>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, FileAnalysis>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// A symbol match result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatch {
    /// The file containing the symbol.
    pub file: String,
    pub name: String,
    /// Owning type for methods.
    pub owner: Option<String>,
    pub is_type: bool,
    pub line: usize,
}

impl SymbolMatch {
    fn function(file: &str, owner: Option<&str>, func: &FunctionSymbol) -> Self {
        Self {
            file: file.to_string(),
            name: func.name.clone(),
            owner: owner.map(str::to_string),
            is_type: false,
            line: func.start_line,
        }
    }

    fn type_symbol(file: &str, ty: &TypeSymbol) -> Self {
        Self {
            file: file.to_string(),
            name: ty.name.clone(),
            owner: None,
            is_type: true,
            line: ty.start_line,
        }
    }
}
