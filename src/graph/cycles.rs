//! Cycle detection over the file graph.
//!
//! One depth-first traversal in path order. Every back-edge to a file still
//! on the DFS stack yields one witness cycle, so a graph with several
//! overlapping cycles may report fewer witnesses than it has elementary
//! cycles.

use std::collections::HashSet;

use super::{CircularDependency, DependencyGraph, Severity};

/// Find witness cycles in `graph`. Each witness starts and ends with the
/// same file.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<CircularDependency> {
    let mut cycles = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    for start in graph.nodes.keys() {
        if visited.contains(start.as_str()) {
            continue;
        }

        // (file, index of the next dependency to explore)
        let mut frames: Vec<(&str, usize)> = vec![(start.as_str(), 0)];
        let mut path: Vec<&str> = vec![start.as_str()];
        visited.insert(start.as_str());
        on_stack.insert(start.as_str());

        while let Some((current, next)) = frames.last_mut() {
            let current: &str = *current;
            let Some(dep) = graph.dependencies_of(current).get(*next) else {
                on_stack.remove(current);
                path.pop();
                frames.pop();
                continue;
            };
            *next += 1;
            let dep = dep.as_str();

            if on_stack.contains(dep) {
                if let Some(from) = path.iter().position(|f| *f == dep) {
                    let mut files: Vec<String> = path[from..].iter().map(|f| f.to_string()).collect();
                    files.push(dep.to_string());
                    cycles.push(CircularDependency {
                        files,
                        severity: Severity::Warning,
                    });
                }
            } else if !visited.contains(dep) && graph.nodes.contains_key(dep) {
                visited.insert(dep);
                on_stack.insert(dep);
                path.push(dep);
                frames.push((dep, 0));
            }
        }
    }

    if !cycles.is_empty() {
        tracing::debug!(count = cycles.len(), "circular dependencies found");
    }
    cycles
}
