//! Codeshape - structural analysis of multi-language codebases.
//!
//! Codeshape parses source files with tree-sitter and reduces them to a
//! language-agnostic symbol model: functions, types, imports and exports.
//! On top of that model it computes cyclomatic complexity and builds a
//! cross-file dependency graph with cycle detection.
//!
//! # Architecture
//!
//! - `parser`: language registry, memoized parsers and the arena syntax tree
//! - `analysis`: canonical symbol model, nine language extractors and batch
//!   analysis
//! - `complexity`: cyclomatic complexity and nesting depth
//! - `graph`: import resolution, dependency graph, cycles and metrics
//! - `config`: YAML configuration
//! - `error`: typed input errors
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use codeshape::{AnalysisContext, Config};
//!
//! let ctx = AnalysisContext::new("src", Config::default());
//! let files = vec![PathBuf::from("src/main.py"), PathBuf::from("src/util.py")];
//! let batch = ctx.analyze_files_parallel(&files);
//! let graph = batch.dependency_graph();
//! println!("{} cycles", graph.cycles.len());
//! ```
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod analysis;
pub mod complexity;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;

pub use analysis::{
    extract_symbols, extractor_for, AnalysisContext, BatchAnalysis, FileAnalysis,
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
    TypeSymbol,
};
pub use complexity::{analyze_file as analyze_complexity, ComplexityMetrics};
pub use config::Config;
pub use error::{AnalysisError, Result};
pub use graph::{detect_cycles, CircularDependency, DependencyGraph, DependencyMetrics};
pub use parser::{identify, LanguageId, LanguageRegistry, ParseResult};
