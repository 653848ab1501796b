//! Summary statistics over a built dependency graph.

use serde::{Deserialize, Serialize};

use super::DependencyGraph;
use crate::complexity::round2;

/// A file and the count it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRank {
    pub path: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyMetrics {
    pub file_count: usize,
    pub edge_count: usize,
    pub external_package_count: usize,
    pub circular_dependency_count: usize,
    pub avg_imports_per_file: f64,
    pub avg_imported_by_per_file: f64,
    /// Files with the most dependents.
    pub most_imported: Vec<FileRank>,
    /// Files with the most internal imports.
    pub most_importing: Vec<FileRank>,
}

/// Compute graph metrics, keeping the `top_n` files of each ranking. Ties
/// keep path order.
pub fn metrics(graph: &DependencyGraph, top_n: usize) -> DependencyMetrics {
    let file_count = graph.nodes.len();
    let total_imports: usize = graph.nodes.values().map(|n| n.imports.len()).sum();
    let total_imported_by: usize = graph.nodes.values().map(|n| n.imported_by.len()).sum();

    DependencyMetrics {
        file_count,
        edge_count: graph.edges.len(),
        external_package_count: graph.external_dependencies.len(),
        circular_dependency_count: graph.cycles.len(),
        avg_imports_per_file: mean(total_imports, file_count),
        avg_imported_by_per_file: mean(total_imported_by, file_count),
        most_imported: top(graph, top_n, |n| n.imported_by.len()),
        most_importing: top(graph, top_n, |n| n.imports.len()),
    }
}

fn top<F>(graph: &DependencyGraph, top_n: usize, count: F) -> Vec<FileRank>
where
    F: Fn(&super::FileNode) -> usize,
{
    let mut ranks: Vec<FileRank> = graph
        .nodes
        .values()
        .map(|n| FileRank {
            path: n.path.clone(),
            count: count(n),
        })
        .filter(|r| r.count > 0)
        .collect();
    // stable: equal counts stay in path order
    ranks.sort_by(|a, b| b.count.cmp(&a.count));
    ranks.truncate(top_n);
    ranks
}

fn mean(total: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(total as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CircularDependency, FileNode, Severity};

    fn node(path: &str, imports: &[&str], imported_by: &[&str]) -> (String, FileNode) {
        (
            path.to_string(),
            FileNode {
                path: path.to_string(),
                imports: imports.iter().map(|s| s.to_string()).collect(),
                imported_by: imported_by.iter().map(|s| s.to_string()).collect(),
                external_imports: Vec::new(),
            },
        )
    }

    #[test]
    fn test_empty_graph() {
        let m = metrics(&DependencyGraph::default(), 5);
        assert_eq!(m.file_count, 0);
        assert_eq!(m.avg_imports_per_file, 0.0);
        assert!(m.most_imported.is_empty());
    }

    #[test]
    fn test_rankings_and_means() {
        let mut graph = DependencyGraph::default();
        graph.nodes.extend([
            node("a", &["b", "c"], &[]),
            node("b", &["c"], &["a"]),
            node("c", &[], &["a", "b"]),
        ]);
        graph.external_dependencies.insert("serde".into(), 3);
        graph.cycles.push(CircularDependency {
            files: vec!["x".into(), "x".into()],
            severity: Severity::Warning,
        });

        let m = metrics(&graph, 10);
        assert_eq!(m.file_count, 3);
        assert_eq!(m.external_package_count, 1);
        assert_eq!(m.circular_dependency_count, 1);
        assert_eq!(m.avg_imports_per_file, 1.0);
        assert_eq!(m.avg_imported_by_per_file, 1.0);

        let imported: Vec<_> = m.most_imported.iter().map(|r| (r.path.as_str(), r.count)).collect();
        assert_eq!(imported, vec![("c", 2), ("b", 1)]);
        let importing: Vec<_> = m.most_importing.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(importing, vec!["a", "b"]);
    }

    #[test]
    fn test_ties_keep_path_order_and_top_n() {
        let mut graph = DependencyGraph::default();
        graph.nodes.extend([
            node("z", &["q"], &[]),
            node("m", &["q"], &[]),
            node("a", &["q"], &[]),
        ]);
        let m = metrics(&graph, 2);
        let importing: Vec<_> = m.most_importing.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(importing, vec!["a", "m"]);
    }

    #[test]
    fn test_mean_rounds_to_two_decimals() {
        assert_eq!(mean(2, 3), 0.67);
        assert_eq!(mean(0, 3), 0.0);
    }
}
