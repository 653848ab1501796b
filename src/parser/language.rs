//! Language identifiers and the extension table.

use std::fmt;
use std::path::Path;

use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Supported source languages.
///
/// `Unknown` is a valid terminal value: it blocks parsing and yields an
/// empty symbol set from extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Java,
    Go,
    Rust,
    C,
    Cpp,
    Ruby,
    Unknown,
}

/// Extension (lowercase, without dot) to language.
static EXTENSIONS: phf::Map<&'static str, LanguageId> = phf_map! {
    "py" => LanguageId::Python,
    "pyi" => LanguageId::Python,
    "pyw" => LanguageId::Python,
    "js" => LanguageId::JavaScript,
    "jsx" => LanguageId::JavaScript,
    "mjs" => LanguageId::JavaScript,
    "cjs" => LanguageId::JavaScript,
    "ts" => LanguageId::TypeScript,
    "mts" => LanguageId::TypeScript,
    "cts" => LanguageId::TypeScript,
    "tsx" => LanguageId::Tsx,
    "java" => LanguageId::Java,
    "go" => LanguageId::Go,
    "rs" => LanguageId::Rust,
    "c" => LanguageId::C,
    "h" => LanguageId::C,
    "cc" => LanguageId::Cpp,
    "cpp" => LanguageId::Cpp,
    "cxx" => LanguageId::Cpp,
    "c++" => LanguageId::Cpp,
    "hh" => LanguageId::Cpp,
    "hpp" => LanguageId::Cpp,
    "hxx" => LanguageId::Cpp,
    "h++" => LanguageId::Cpp,
    "rb" => LanguageId::Ruby,
    "rake" => LanguageId::Ruby,
    "gemspec" => LanguageId::Ruby,
};

impl LanguageId {
    /// Every parseable language, in declaration order.
    pub const ALL: [LanguageId; 10] = [
        LanguageId::Python,
        LanguageId::JavaScript,
        LanguageId::TypeScript,
        LanguageId::Tsx,
        LanguageId::Java,
        LanguageId::Go,
        LanguageId::Rust,
        LanguageId::C,
        LanguageId::Cpp,
        LanguageId::Ruby,
    ];

    /// Look up a language by file extension (case-insensitive, dot optional).
    pub fn from_extension(ext: &str) -> LanguageId {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        EXTENSIONS.get(ext.as_str()).copied().unwrap_or(LanguageId::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageId::Python => "python",
            LanguageId::JavaScript => "javascript",
            LanguageId::TypeScript => "typescript",
            LanguageId::Tsx => "tsx",
            LanguageId::Java => "java",
            LanguageId::Go => "go",
            LanguageId::Rust => "rust",
            LanguageId::C => "c",
            LanguageId::Cpp => "cpp",
            LanguageId::Ruby => "ruby",
            LanguageId::Unknown => "unknown",
        }
    }

    /// The language whose extractor handles this one. TSX shares the
    /// TypeScript extractor.
    pub fn extractor_family(&self) -> LanguageId {
        match self {
            LanguageId::Tsx => LanguageId::TypeScript,
            other => *other,
        }
    }

    pub fn is_known(&self) -> bool {
        *self != LanguageId::Unknown
    }

    /// File extensions used when probing for import targets.
    pub fn extensions() -> impl Iterator<Item = &'static str> {
        RESOLVE_EXTENSIONS.iter().copied()
    }

    /// Load the grammar for this language, if it was compiled in.
    pub(crate) fn grammar(&self) -> Option<tree_sitter::Language> {
        match self {
            #[cfg(feature = "lang-python")]
            LanguageId::Python => Some(tree_sitter_python::LANGUAGE.into()),
            #[cfg(feature = "lang-javascript")]
            LanguageId::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            #[cfg(feature = "lang-typescript")]
            LanguageId::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            #[cfg(feature = "lang-typescript")]
            LanguageId::Tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
            #[cfg(feature = "lang-java")]
            LanguageId::Java => Some(tree_sitter_java::LANGUAGE.into()),
            #[cfg(feature = "lang-go")]
            LanguageId::Go => Some(tree_sitter_go::LANGUAGE.into()),
            #[cfg(feature = "lang-rust")]
            LanguageId::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            #[cfg(feature = "lang-c")]
            LanguageId::C => Some(tree_sitter_c::LANGUAGE.into()),
            #[cfg(feature = "lang-cpp")]
            LanguageId::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
            #[cfg(feature = "lang-ruby")]
            LanguageId::Ruby => Some(tree_sitter_ruby::LANGUAGE.into()),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

/// Ordered suffixes tried when resolving an import to a file.
const RESOLVE_EXTENSIONS: &[&str] = &[
    "py", "ts", "tsx", "js", "jsx", "mjs", "cjs", "go", "rs", "java", "rb", "c", "h", "cpp", "cc",
    "hpp",
];

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LanguageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" => Ok(LanguageId::Python),
            "javascript" => Ok(LanguageId::JavaScript),
            "typescript" => Ok(LanguageId::TypeScript),
            "tsx" => Ok(LanguageId::Tsx),
            "java" => Ok(LanguageId::Java),
            "go" => Ok(LanguageId::Go),
            "rust" => Ok(LanguageId::Rust),
            "c" => Ok(LanguageId::C),
            "cpp" | "c++" => Ok(LanguageId::Cpp),
            "ruby" => Ok(LanguageId::Ruby),
            "unknown" => Ok(LanguageId::Unknown),
            _ => Err(format!("unknown language: {}", s)),
        }
    }
}

/// Identify the language of a path from its extension.
///
/// Pure lookup; the file is never touched.
pub fn identify<P: AsRef<Path>>(path: P) -> LanguageId {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(LanguageId::from_extension)
        .unwrap_or(LanguageId::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_by_extension() {
        assert_eq!(identify("src/main.py"), LanguageId::Python);
        assert_eq!(identify("a/b/c.tsx"), LanguageId::Tsx);
        assert_eq!(identify("lib.rs"), LanguageId::Rust);
        assert_eq!(identify("foo.h"), LanguageId::C);
        assert_eq!(identify("foo.hpp"), LanguageId::Cpp);
        assert_eq!(identify("Rakefile.rake"), LanguageId::Ruby);
    }

    #[test]
    fn test_identify_is_case_insensitive() {
        assert_eq!(identify("Main.JAVA"), LanguageId::Java);
        assert_eq!(identify("App.Ts"), LanguageId::TypeScript);
    }

    #[test]
    fn test_identify_unknown() {
        assert_eq!(identify("README.md"), LanguageId::Unknown);
        assert_eq!(identify("Makefile"), LanguageId::Unknown);
        assert_eq!(identify("archive.tar.gz"), LanguageId::Unknown);
    }

    #[test]
    fn test_from_str_round_trip() {
        for lang in LanguageId::ALL {
            assert_eq!(lang.as_str().parse::<LanguageId>().unwrap(), lang);
        }
        assert!("cobol".parse::<LanguageId>().is_err());
    }

    #[test]
    fn test_tsx_uses_typescript_extractor() {
        assert_eq!(LanguageId::Tsx.extractor_family(), LanguageId::TypeScript);
        assert_eq!(LanguageId::Go.extractor_family(), LanguageId::Go);
    }
}
