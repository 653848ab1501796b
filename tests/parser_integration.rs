//! Integration tests for the language registry.
//!
//! These tests parse the testdata fixtures from disk and check the error
//! ordering and parser memoization of `LanguageRegistry`.

use std::fs;
use std::path::PathBuf;

use codeshape::{identify, AnalysisError, Config, LanguageId, LanguageRegistry};
use tempfile::TempDir;

fn project_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("project")
}

// =============================================================================
// Language identification
// =============================================================================

#[test]
fn test_identify_fixture_files() {
    let root = project_path();
    let cases = [
        ("app/main.py", LanguageId::Python),
        ("web/index.ts", LanguageId::TypeScript),
        ("go/server.go", LanguageId::Go),
        ("rust/lib.rs", LanguageId::Rust),
        ("c/util.h", LanguageId::C),
        ("c/main.c", LanguageId::C),
        ("ruby/app.rb", LanguageId::Ruby),
        ("java/com/acme/App.java", LanguageId::Java),
    ];
    for (path, expected) in cases {
        assert_eq!(identify(root.join(path)), expected, "{}", path);
    }
    assert_eq!(identify("README"), LanguageId::Unknown);
    assert_eq!(identify("style.css"), LanguageId::Unknown);
}

// =============================================================================
// Parsing fixtures
// =============================================================================

#[test]
#[cfg(feature = "all-languages")]
fn test_parse_every_fixture_without_errors() {
    let registry = LanguageRegistry::default();
    let root = project_path();
    for path in [
        "app/main.py",
        "app/models.py",
        "web/index.ts",
        "web/api.ts",
        "go/server.go",
        "rust/lib.rs",
        "rust/parser.rs",
        "c/util.h",
        "c/util.c",
        "c/main.c",
        "ruby/app.rb",
        "ruby/lib/helper.rb",
        "java/com/acme/App.java",
        "java/com/acme/util/Strings.java",
    ] {
        let parsed = registry
            .parse_file(root.join(path))
            .unwrap_or_else(|e| panic!("{}: {}", path, e));
        assert!(!parsed.has_errors, "{} has syntax errors: {:?}", path, parsed.errors);
        assert!(parsed.tree.len() > 1, "{}", path);
    }
}

#[test]
#[cfg(feature = "lang-python")]
fn test_parsers_are_memoized() {
    let registry = LanguageRegistry::default();
    assert!(!registry.is_loaded(LanguageId::Python));

    let root = project_path();
    registry.parse_file(root.join("app/main.py")).unwrap();
    assert!(registry.is_loaded(LanguageId::Python));
    assert!(!registry.is_loaded(LanguageId::Go));

    // same parser, second file
    registry.parse_file(root.join("app/models.py")).unwrap();
    assert!(registry.is_loaded(LanguageId::Python));
}

#[test]
#[cfg(feature = "lang-python")]
fn test_concurrent_parses_share_registry() {
    use rayon::prelude::*;

    let registry = LanguageRegistry::default();
    let root = project_path();
    let files: Vec<PathBuf> = (0..16)
        .map(|i| root.join(if i % 2 == 0 { "app/main.py" } else { "app/utils.py" }))
        .collect();

    let ok = files
        .par_iter()
        .filter(|p| registry.parse_file(p).map(|r| !r.has_errors).unwrap_or(false))
        .count();
    assert_eq!(ok, files.len());
}

// =============================================================================
// Input errors
// =============================================================================

#[test]
fn test_missing_file_is_not_found() {
    let registry = LanguageRegistry::default();
    let err = registry
        .parse_file(project_path().join("app/nope.py"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound { .. }));
    assert!(err.is_input_error());
}

#[test]
fn test_size_checked_before_language() {
    let temp = TempDir::new().unwrap();
    let big = temp.path().join("notes.txt");
    fs::write(&big, vec![b'x'; 64]).unwrap();

    let registry = LanguageRegistry::default();
    // unsupported extension, but the size limit is checked first
    let err = registry.parse(&big, 16).unwrap_err();
    assert!(matches!(err, AnalysisError::TooLarge { size: 64, limit: 16, .. }));

    let err = registry.parse(&big, 1024).unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedLanguage { .. }));
}

#[test]
fn test_disabled_language_is_unsupported() {
    let config = Config {
        enabled_languages: vec![LanguageId::Go],
        ..Config::default()
    };
    let registry = LanguageRegistry::new(config);
    let err = registry
        .parse_file(project_path().join("app/main.py"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::UnsupportedLanguage { .. }));
    assert!(!registry.is_loaded(LanguageId::Python));
}

#[test]
#[cfg(feature = "lang-go")]
fn test_syntax_errors_are_not_failures() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.go");
    fs::write(&path, "package main\nfunc main( {\n").unwrap();

    let parsed = LanguageRegistry::default().parse_file(&path).unwrap();
    assert!(parsed.has_errors);
    assert!(!parsed.errors.is_empty());
}
