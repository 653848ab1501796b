//! Symbol extraction.
//!
//! This module reduces a parsed syntax tree into the canonical symbol model
//! shared by every language:
//! - Functions and methods (parameters, return type, docs, complexity)
//! - Types (classes, structs, interfaces, traits, enums, modules)
//! - Imports and exports
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ ParseResult     │────▶│ Extractors   │────▶│ FileSymbolSet │
//! └─────────────────┘     │ (9 languages)│     │ (functions,   │
//!                         └──────────────┘     │  types, deps) │
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                         ┌──────────────┐     ┌───────────────┐
//!                         │ Dependency   │◀────│AnalysisContext│
//!                         │ Graph        │     │ (batch cache) │
//!                         └──────────────┘     └───────────────┘
//! ```
//!
//! # Adding a New Language
//!
//! 1. Add the grammar and extensions in `src/parser/language.rs`
//! 2. Create a module in `src/analysis/languages/` (e.g., `kotlin.rs`)
//! 3. Implement the `LanguageExtractor` trait
//! 4. Add it to the dispatch in `languages/mod.rs` and its decision kinds
//!    in `src/complexity.rs`
//!
//! See `languages/go.rs` for a compact reference implementation.

mod common;
mod context;
mod facts;
mod languages;
mod traits;

pub use common::clean_doc;
pub use context::{AnalysisContext, BatchAnalysis, FileAnalysis, FileFailure, SymbolMatch};
pub use facts::{FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, TypeKind, TypeSymbol};
pub use languages::{
    extract_symbols, extractor_for, CExtractor, CppExtractor, GoExtractor, JavaExtractor,
    JavaScriptExtractor, PythonExtractor, RubyExtractor, RustExtractor, TypeScriptExtractor,
};
pub use traits::LanguageExtractor;
