//! Cross-file dependency graph.
//!
//! Built once per batch from every file's [`FileSymbolSet`]. Each import is
//! resolved to another file of the batch or attributed to an external
//! package; internal resolutions become aggregated edges with reverse
//! `imported_by` links, and the finished graph is scanned for cycles.
//!
//! ```text
//! BTreeMap<path, FileSymbolSet> ──▶ resolve ──▶ nodes + edges ──▶ detect_cycles
//!                                      │
//!                                      └──▶ external_dependencies
//! ```

mod cycles;
mod metrics;
mod resolve;

pub use cycles::detect_cycles;
pub use metrics::{metrics, DependencyMetrics, FileRank};
pub use resolve::package_name;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::analysis::FileSymbolSet;

use resolve::{resolve, FileIndex};

/// Severity attached to graph findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// One file of the batch and its resolved relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub path: String,
    /// Internal targets, first occurrence order.
    pub imports: Vec<String>,
    /// Files importing this one.
    pub imported_by: Vec<String>,
    /// Module text of imports that resolved to no file of the batch.
    pub external_imports: Vec<String>,
}

impl FileNode {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Default::default()
        }
    }
}

/// A resolved internal import between two files of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
    /// Number of import statements behind this edge.
    pub import_count: usize,
}

/// A cycle witness: the first and last files are the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularDependency {
    pub files: Vec<String>,
    pub severity: Severity,
}

impl CircularDependency {
    /// Distinct files on the cycle.
    pub fn len(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }
}

/// Dependency graph of one analysis batch. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: BTreeMap<String, FileNode>,
    pub edges: Vec<DependencyEdge>,
    pub cycles: Vec<CircularDependency>,
    /// External package name to number of importing statements.
    pub external_dependencies: BTreeMap<String, usize>,
}

impl DependencyGraph {
    /// Build the graph for a batch keyed by file path.
    pub fn build(files: &BTreeMap<String, FileSymbolSet>) -> Self {
        Self::from_files(files.iter().map(|(path, symbols)| (path.as_str(), symbols)))
    }

    /// Build from `(path, symbols)` pairs. Pairs are visited in path order
    /// whatever order they arrive in.
    pub fn from_files<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a FileSymbolSet)>,
    {
        let mut files: Vec<(&str, &FileSymbolSet)> = files.into_iter().collect();
        files.sort_by(|a, b| a.0.cmp(b.0));
        files.dedup_by(|a, b| a.0 == b.0);

        let index = FileIndex::new(files.iter().map(|(path, _)| *path));
        let mut graph = DependencyGraph {
            nodes: files
                .iter()
                .map(|(path, _)| (path.to_string(), FileNode::new(path)))
                .collect(),
            ..Default::default()
        };
        let mut edge_index: HashMap<(String, String), usize> = HashMap::new();

        for (path, symbols) in &files {
            for import in &symbols.imports {
                match resolve(&index, path, symbols.language, import) {
                    // a file importing itself adds nothing
                    Some(target) if target == *path => {}
                    Some(target) => graph.add_edge(path, target, &mut edge_index),
                    None => graph.add_external(path, import),
                }
            }
        }

        graph.cycles = detect_cycles(&graph);
        tracing::info!(
            files = graph.nodes.len(),
            edges = graph.edges.len(),
            external = graph.external_dependencies.len(),
            cycles = graph.cycles.len(),
            "built dependency graph"
        );
        graph
    }

    fn add_edge(&mut self, source: &str, target: &str, edge_index: &mut HashMap<(String, String), usize>) {
        let key = (source.to_string(), target.to_string());
        if let Some(i) = edge_index.get(&key) {
            self.edges[*i].import_count += 1;
            return;
        }
        edge_index.insert(key, self.edges.len());
        self.edges.push(DependencyEdge {
            source: source.to_string(),
            target: target.to_string(),
            import_count: 1,
        });
        if let Some(node) = self.nodes.get_mut(source) {
            node.imports.push(target.to_string());
        }
        if let Some(node) = self.nodes.get_mut(target) {
            node.imported_by.push(source.to_string());
        }
    }

    fn add_external(&mut self, source: &str, import: &crate::analysis::ImportRecord) {
        if let Some(node) = self.nodes.get_mut(source) {
            if !node.external_imports.contains(&import.module) {
                node.external_imports.push(import.module.clone());
            }
        }
        // an unresolved relative import is a missing file, not a package
        if import.is_relative {
            tracing::debug!(file = source, module = %import.module, "unresolved relative import");
            return;
        }
        let package = package_name(&import.module);
        if !package.is_empty() {
            *self.external_dependencies.entry(package).or_insert(0) += 1;
        }
    }

    pub fn node(&self, path: &str) -> Option<&FileNode> {
        self.nodes.get(path)
    }

    /// Files `path` imports.
    pub fn dependencies_of(&self, path: &str) -> &[String] {
        self.nodes.get(path).map(|n| n.imports.as_slice()).unwrap_or(&[])
    }

    /// Files importing `path`.
    pub fn dependents_of(&self, path: &str) -> &[String] {
        self.nodes.get(path).map(|n| n.imported_by.as_slice()).unwrap_or(&[])
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&DependencyEdge> {
        self.edges.iter().find(|e| e.source == source && e.target == target)
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn metrics(&self, top_n: usize) -> DependencyMetrics {
        metrics(self, top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ImportKind, ImportRecord};
    use crate::parser::LanguageId;

    fn file(language: LanguageId, imports: &[&str]) -> FileSymbolSet {
        let mut set = FileSymbolSet::empty(language);
        set.imports = imports
            .iter()
            .enumerate()
            .map(|(i, m)| ImportRecord::new(*m, ImportKind::EsModule, i + 1))
            .collect();
        set
    }

    fn batch(files: &[(&str, &[&str])]) -> BTreeMap<String, FileSymbolSet> {
        files
            .iter()
            .map(|(path, imports)| (path.to_string(), file(LanguageId::TypeScript, imports)))
            .collect()
    }

    #[test]
    fn test_edges_and_reverse_links() {
        let files = batch(&[
            ("src/a.ts", &["./b", "./c", "./b"]),
            ("src/b.ts", &["./c"]),
            ("src/c.ts", &[]),
        ]);
        let graph = DependencyGraph::build(&files);

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(graph.dependencies_of("src/a.ts"), ["src/b.ts", "src/c.ts"]);
        assert_eq!(graph.dependents_of("src/c.ts"), ["src/a.ts", "src/b.ts"]);
        assert_eq!(graph.edge("src/a.ts", "src/b.ts").unwrap().import_count, 2);
        assert!(graph.edge("src/c.ts", "src/a.ts").is_none());
        assert!(!graph.has_cycles());
    }

    #[test]
    fn test_external_packages() {
        let files = batch(&[
            ("app.ts", &["react", "@scope/pkg", "@scope/pkg/sub", "lodash/fp", "./missing"]),
            ("lib.ts", &["react"]),
        ]);
        let graph = DependencyGraph::build(&files);

        assert!(graph.edges.is_empty());
        assert_eq!(graph.external_dependencies.get("react"), Some(&2));
        assert_eq!(graph.external_dependencies.get("@scope/pkg"), Some(&2));
        assert_eq!(graph.external_dependencies.get("lodash"), Some(&1));
        assert!(!graph.external_dependencies.contains_key("@scope"));
        assert!(!graph.external_dependencies.contains_key("."));
        assert_eq!(graph.external_dependencies.len(), 3);

        let app = graph.node("app.ts").unwrap();
        assert!(app.external_imports.contains(&"./missing".to_string()));
    }

    #[test]
    fn test_self_import_creates_no_edge() {
        let files = batch(&[("a.ts", &["./a"])]);
        let graph = DependencyGraph::build(&files);
        assert!(graph.edges.is_empty());
        assert!(graph.dependencies_of("a.ts").is_empty());
        assert!(!graph.has_cycles());
    }

    #[test]
    fn test_root_directory_import_invents_no_edge() {
        let files = batch(&[("main.ts", &["."]), ("web/index.ts", &["../main"])]);
        let graph = DependencyGraph::build(&files);

        assert!(graph.dependencies_of("main.ts").is_empty());
        assert_eq!(graph.dependencies_of("web/index.ts"), ["main.ts"]);
        assert!(!graph.has_cycles());
        assert_eq!(graph.node("main.ts").unwrap().external_imports, vec!["."]);
        assert!(graph.external_dependencies.is_empty());
    }

    #[test]
    fn test_backslash_keys() {
        let files = batch(&[("src\\a.ts", &["./b"]), ("src\\b.ts", &[])]);
        let graph = DependencyGraph::build(&files);
        assert_eq!(graph.dependencies_of("src\\a.ts"), ["src\\b.ts"]);
    }

    #[test]
    fn test_mutual_imports_form_cycle() {
        let files = batch(&[("a.ts", &["./b"]), ("b.ts", &["./a"])]);
        let graph = DependencyGraph::build(&files);
        assert_eq!(graph.cycles.len(), 1);
        let cycle = &graph.cycles[0];
        assert!(cycle.contains("a.ts") && cycle.contains("b.ts"));
        assert_eq!(cycle.severity, Severity::Warning);
    }

    #[test]
    fn test_graph_serde_round_trip() {
        let files = batch(&[("a.ts", &["./b", "react"]), ("b.ts", &["./a"])]);
        let graph = DependencyGraph::build(&files);
        let json = serde_json::to_string(&graph).unwrap();
        let back: DependencyGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(graph, back);
    }
}
