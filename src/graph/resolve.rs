//! Heuristic import resolution.
//!
//! No per-language module system is modelled. An import is turned into a
//! list of candidate paths, and the candidates are matched against the
//! batch's file keys: exact equality first, then a suffix on a `/`
//! boundary, then (relative imports only) substring containment either
//! way, on whole path segments. Bare index file names such as
//! `__init__.py` only ever match exactly. Within a tier the first candidate wins, and within a candidate the
//! first file in key order.

use std::collections::{HashMap, HashSet};

use crate::analysis::ImportRecord;
use crate::parser::LanguageId;

/// Index files tried when an import names a directory.
const PACKAGE_INDEX_FILES: &[&str] = &["__init__.py", "mod.rs"];

/// Normalized view of the batch's file keys.
pub(crate) struct FileIndex<'a> {
    /// Normalized key and original key, in key order.
    files: Vec<(String, &'a str)>,
    exact: HashMap<String, &'a str>,
    /// Last path segment to positions in `files`.
    by_name: HashMap<String, Vec<usize>>,
}

impl<'a> FileIndex<'a> {
    pub(crate) fn new<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut files = Vec::new();
        let mut exact = HashMap::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for key in keys {
            let normalized = normalize_path(key);
            exact.entry(normalized.clone()).or_insert(key);
            by_name
                .entry(file_name(&normalized).to_string())
                .or_default()
                .push(files.len());
            files.push((normalized, key));
        }
        Self { files, exact, by_name }
    }

    fn exact(&self, candidate: &str) -> Option<&'a str> {
        self.exact.get(candidate).copied()
    }

    fn suffix(&self, candidate: &str) -> Option<&'a str> {
        if is_bare_index(candidate) {
            return None;
        }
        let positions = self.by_name.get(file_name(candidate))?;
        positions
            .iter()
            .map(|i| &self.files[*i])
            .find(|(path, _)| {
                path.len() > candidate.len()
                    && path.ends_with(candidate)
                    && path.as_bytes()[path.len() - candidate.len() - 1] == b'/'
            })
            .map(|(_, key)| *key)
    }

    fn substring(&self, candidate: &str) -> Option<&'a str> {
        if is_bare_index(candidate) {
            return None;
        }
        self.files
            .iter()
            .find(|(path, _)| contains_segments(path, candidate) || contains_segments(candidate, path))
            .map(|(_, key)| *key)
    }

    /// First file matching any candidate, best tier first.
    fn find(&self, candidates: &[String], tolerant: bool) -> Option<&'a str> {
        candidates
            .iter()
            .find_map(|c| self.exact(c))
            .or_else(|| candidates.iter().find_map(|c| self.suffix(c)))
            .or_else(|| {
                if tolerant {
                    candidates.iter().find_map(|c| self.substring(c))
                } else {
                    None
                }
            })
    }
}

/// Resolve one import of `importer` to a file key of the batch.
pub(crate) fn resolve<'a>(
    index: &FileIndex<'a>,
    importer: &str,
    language: LanguageId,
    import: &ImportRecord,
) -> Option<&'a str> {
    let importer = normalize_path(importer);
    if import.is_relative {
        let candidates = expand(relative_bases(&importer, language, import));
        if let Some(found) = index.find(&candidates, true) {
            return Some(found);
        }
        // project-rooted paths written without a marker, e.g. `#include "a/b.h"`
        if has_relative_marker(&import.module) {
            return None;
        }
    }
    let candidates = expand(absolute_bases(import));
    index.find(&candidates, false)
}

/// Package key for an unresolved absolute import.
///
/// `@scope/pkg/sub` keeps `@scope/pkg` together; anything else keeps its
/// first segment split on `.`, `/` or `::`.
pub fn package_name(module: &str) -> String {
    let module = module.trim();
    if module.starts_with('@') {
        return module.splitn(3, '/').take(2).collect::<Vec<_>>().join("/");
    }
    module
        .split("::")
        .flat_map(|s| s.split(['.', '/']))
        .find(|s| !s.is_empty())
        .unwrap_or(module)
        .to_string()
}

/// Fold `.` and `..` segments, unify separators and drop a leading `./`.
pub(crate) fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn join(dir: &str, rest: &str) -> String {
    if dir.is_empty() {
        normalize_path(rest)
    } else if rest.is_empty() {
        normalize_path(dir)
    } else {
        normalize_path(&format!("{}/{}", dir, rest))
    }
}

/// True when `needle` occurs in `haystack` as whole path segments.
fn contains_segments(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        (start == 0 || bytes[start - 1] == b'/') && (end == bytes.len() || bytes[end] == b'/')
    })
}

/// An index file name with no directory, e.g. `__init__.py` or `index.ts`.
fn is_bare_index(candidate: &str) -> bool {
    !candidate.contains('/')
        && (PACKAGE_INDEX_FILES.contains(&candidate)
            || candidate
                .strip_prefix("index.")
                .map(|ext| LanguageId::from_extension(ext).is_known())
                .unwrap_or(false))
}

fn has_relative_marker(module: &str) -> bool {
    module.starts_with('.')
        || module.starts_with('/')
        || module.starts_with("self::")
        || module.starts_with("super::")
        || module == "self"
        || module == "super"
}

fn has_known_extension(path: &str) -> bool {
    file_name(path)
        .rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && LanguageId::from_extension(ext).is_known())
        .unwrap_or(false)
}

/// Candidate base paths for a relative import, most specific first.
fn relative_bases(importer: &str, language: LanguageId, import: &ImportRecord) -> Vec<String> {
    let dir = parent_dir(importer);
    let module = import.module.as_str();

    if language == LanguageId::Rust
        && (module.starts_with("self") || module.starts_with("super"))
    {
        return rust_relative_bases(importer, module);
    }

    // Python: `.` is the current package, each further dot ascends one level
    if module.starts_with('.') && !module.starts_with("./") && !module.starts_with("../") {
        let dots = module.chars().take_while(|c| *c == '.').count();
        let rest = module[dots..].replace('.', "/");
        let mut target = dir.to_string();
        for _ in 1..dots {
            target = parent_dir(&target).to_string();
        }
        let package = join(&target, &rest);
        let mut bases = Vec::new();
        if rest.is_empty() {
            // from . import a, b
            bases.extend(import.names.iter().filter(|n| *n != "*").map(|n| join(&package, n)));
            bases.push(package);
        } else {
            bases.push(package.clone());
            bases.extend(import.names.iter().filter(|n| *n != "*").map(|n| join(&package, n)));
        }
        return bases;
    }

    vec![join(dir, module)]
}

/// `self::a::b` and `super::a` relative to the importing module's directory.
fn rust_relative_bases(importer: &str, module: &str) -> Vec<String> {
    let dir = parent_dir(importer);
    let stem = file_name(importer).trim_end_matches(".rs");
    let owns_dir = matches!(stem, "mod" | "lib" | "main");
    let mut module_dir = if owns_dir {
        dir.to_string()
    } else {
        join(dir, stem)
    };

    let mut segments: Vec<&str> = module.split("::").collect();
    let mut consumed = 0;
    for segment in &segments {
        match *segment {
            "self" => {}
            "super" => module_dir = parent_dir(&module_dir).to_string(),
            _ => break,
        }
        consumed += 1;
    }
    segments.drain(..consumed);

    let mut bases = Vec::new();
    // the last segments may name items rather than modules
    for len in (0..=segments.len()).rev() {
        let path = segments[..len].join("/");
        if len == 0 {
            // `use super::*` targets the parent module itself
            if !owns_dir || module.starts_with("super") {
                bases.push(module_dir.clone());
            }
        } else {
            bases.push(join(&module_dir, &path));
        }
    }
    bases
}

/// Candidate base paths for an absolute import.
fn absolute_bases(import: &ImportRecord) -> Vec<String> {
    let module = import.module.trim();
    let module = module.strip_prefix("crate::").unwrap_or(module);
    if module.is_empty() {
        return Vec::new();
    }

    if has_known_extension(module) || module.contains('/') {
        return vec![normalize_path(module)];
    }

    let fragment = module.replace("::", "/").replace('.', "/");
    let mut bases = vec![fragment.clone()];
    // item imports: `crate::a::Item`, `pkg.mod.func`, `com.x.Type`
    if let Some((parent, _)) = fragment.rsplit_once('/') {
        bases.push(parent.to_string());
    }
    bases
}

/// Expand base paths into concrete file candidates.
fn expand(bases: Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |candidate: String, out: &mut Vec<String>| {
        if !candidate.is_empty() && seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    };

    // an empty base is the project root, which names no module
    for base in bases.into_iter().filter(|b| !b.is_empty()) {
        if has_known_extension(&base) {
            push(base.clone(), &mut out);
        }
        for ext in LanguageId::extensions() {
            push(format!("{}.{}", base, ext), &mut out);
        }
        for ext in LanguageId::extensions() {
            push(join(&base, &format!("index.{}", ext)), &mut out);
        }
        for index in PACKAGE_INDEX_FILES {
            push(join(&base, index), &mut out);
        }
    }
    out
}
