//! Typed errors surfaced by the parsing front end.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::LanguageId;

/// Errors returned by [`LanguageRegistry::parse`](crate::parser::LanguageRegistry::parse).
///
/// Input errors are never retried internally. A tree with syntax errors is
/// not an error; see [`ParseResult::has_errors`](crate::parser::ParseResult).
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("file too large: {} is {size} bytes (limit {limit})", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("unsupported language: {}", path.display())]
    UnsupportedLanguage { path: PathBuf },

    #[error("parser unavailable for {language}: {reason}")]
    ParserUnavailable { language: LanguageId, reason: String },

    #[error("parse failure: {} ({language})", path.display())]
    ParseFailure { path: PathBuf, language: LanguageId },

    #[error("io error: {} ({source})", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// True for the input error kinds a caller should render to the user
    /// (missing, oversized or unsupported files).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::NotFound { .. }
                | AnalysisError::TooLarge { .. }
                | AnalysisError::UnsupportedLanguage { .. }
        )
    }
}

/// Convenience alias for results using `AnalysisError`.
pub type Result<T> = std::result::Result<T, AnalysisError>;
