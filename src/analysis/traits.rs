//! Core trait for language extraction.

use crate::parser::{LanguageId, ParseResult};

use super::FileSymbolSet;

/// Language-specific extractor.
///
/// Each supported language implements this trait to reduce its syntax tree
/// into the canonical symbol model.
///
/// # Failure model
///
/// `extract` never fails. A symbol whose node has an unexpected shape is
/// logged and skipped; the rest of the file is still extracted. A tree with
/// syntax errors is walked on a best-effort basis.
pub trait LanguageExtractor: Send + Sync {
    /// The language this extractor handles.
    fn language(&self) -> LanguageId;

    /// Walk the tree and populate a symbol set.
    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet;
}
