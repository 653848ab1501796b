//! Language-specific extractor implementations.
//!
//! Dispatch is a plain match on [`LanguageId`]: every extractor is a
//! stateless unit struct held in a static.

mod c;
mod cpp;
mod go;
mod java;
mod javascript;
mod python;
mod ruby;
mod rust_lang;
mod typescript;

pub use c::CExtractor;
pub use cpp::CppExtractor;
pub use go::GoExtractor;
pub use java::JavaExtractor;
pub use javascript::JavaScriptExtractor;
pub use python::PythonExtractor;
pub use ruby::RubyExtractor;
pub use rust_lang::RustExtractor;
pub use typescript::TypeScriptExtractor;

use crate::parser::{LanguageId, ParseResult};

use super::{FileSymbolSet, LanguageExtractor};

static C_EXTRACTOR: CExtractor = CExtractor;
static CPP_EXTRACTOR: CppExtractor = CppExtractor;
static GO_EXTRACTOR: GoExtractor = GoExtractor;
static JAVA_EXTRACTOR: JavaExtractor = JavaExtractor;
static JAVASCRIPT_EXTRACTOR: JavaScriptExtractor = JavaScriptExtractor;
static PYTHON_EXTRACTOR: PythonExtractor = PythonExtractor;
static RUBY_EXTRACTOR: RubyExtractor = RubyExtractor;
static RUST_EXTRACTOR: RustExtractor = RustExtractor;
static TYPESCRIPT_EXTRACTOR: TypeScriptExtractor = TypeScriptExtractor;

/// Get the extractor for a language.
///
/// Returns None for `unknown`. TSX is served by the TypeScript extractor.
pub fn extractor_for(language: LanguageId) -> Option<&'static dyn LanguageExtractor> {
    let extractor: &'static dyn LanguageExtractor = match language.extractor_family() {
        LanguageId::C => &C_EXTRACTOR,
        LanguageId::Cpp => &CPP_EXTRACTOR,
        LanguageId::Go => &GO_EXTRACTOR,
        LanguageId::Java => &JAVA_EXTRACTOR,
        LanguageId::JavaScript => &JAVASCRIPT_EXTRACTOR,
        LanguageId::Python => &PYTHON_EXTRACTOR,
        LanguageId::Ruby => &RUBY_EXTRACTOR,
        LanguageId::Rust => &RUST_EXTRACTOR,
        LanguageId::TypeScript => &TYPESCRIPT_EXTRACTOR,
        _ => return None,
    };
    Some(extractor)
}

/// Extract the canonical symbol set from a parse result.
///
/// Never fails. A language without an extractor yields an empty set.
pub fn extract_symbols(parsed: &ParseResult) -> FileSymbolSet {
    let Some(extractor) = extractor_for(parsed.language) else {
        return FileSymbolSet::empty(parsed.language);
    };
    let mut symbols = extractor.extract(parsed);
    symbols.language = parsed.language;
    symbols.has_parse_errors = parsed.has_errors;
    tracing::debug!(
        path = %parsed.path.display(),
        functions = symbols.functions.len(),
        classes = symbols.classes.len(),
        imports = symbols.imports.len(),
        "extracted symbols"
    );
    symbols
}
