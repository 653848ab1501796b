//! Arena-backed syntax tree.
//!
//! The tree-sitter tree is walked once after parsing and flattened into a
//! single `Vec<SyntaxNode>`. Nodes refer to each other by [`NodeId`], so the
//! parent, child and sibling links carry no ownership. The arena owns the
//! source bytes and is never mutated after construction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter rows are 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// One node of the arena.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    /// Grammar kind, e.g. `function_definition` or `&&`.
    pub kind: &'static str,
    /// Field name this node occupies in its parent, if any.
    pub field: Option<&'static str>,
    pub is_named: bool,
    pub is_error: bool,
    pub is_missing: bool,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub index_in_parent: usize,
    pub children: Vec<NodeId>,
}

/// Read-only syntax tree for one source file.
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    source: Vec<u8>,
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // source bytes are omitted, they can be large
        f.debug_struct("SyntaxTree")
            .field("nodes", &self.nodes.len())
            .field("source_len", &self.source.len())
            .finish()
    }
}

impl SyntaxTree {
    /// Flatten a tree-sitter tree into an arena.
    ///
    /// Uses a cursor walk with an explicit parent stack, so deeply nested
    /// input cannot exhaust the call stack.
    pub fn build(tree: &tree_sitter::Tree, source: Vec<u8>) -> Self {
        let mut nodes: Vec<SyntaxNode> = Vec::new();
        let mut cursor = tree.walk();
        let mut parents: Vec<NodeId> = Vec::new();
        let mut current = push_node(&mut nodes, cursor.node(), None, None);

        'walk: loop {
            if cursor.goto_first_child() {
                parents.push(current);
                current = push_node(&mut nodes, cursor.node(), cursor.field_name(), Some(current));
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    let parent = parents.last().copied();
                    current = push_node(&mut nodes, cursor.node(), cursor.field_name(), parent);
                    continue 'walk;
                }
                if !cursor.goto_parent() {
                    break 'walk;
                }
                if parents.pop().is_none() {
                    break 'walk;
                }
            }
        }

        Self { nodes, source }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &'static str {
        self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn start_line(&self, id: NodeId) -> usize {
        self.node(id).span.start_line
    }

    pub fn end_line(&self, id: NodeId) -> usize {
        self.node(id).span.end_line
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Source text covered by a node. Non-UTF-8 ranges read as empty.
    pub fn text(&self, id: NodeId) -> &str {
        let span = self.node(id).span;
        self.source
            .get(span.start_byte..span.end_byte)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or("")
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.node(*c).is_named)
    }

    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children_by_field(id, field).next()
    }

    pub fn children_by_field<'a>(
        &'a self,
        id: NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.node(*c).field == Some(field))
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: &str) -> Option<NodeId> {
        self.children(id).iter().copied().find(|c| self.kind(*c) == kind)
    }

    pub fn has_child_kind(&self, id: NodeId, kind: &str) -> bool {
        self.child_of_kind(id, kind).is_some()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let parent = node.parent?;
        let index = node.index_in_parent.checked_sub(1)?;
        self.children(parent).get(index).copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let parent = node.parent?;
        self.children(parent).get(node.index_in_parent + 1).copied()
    }

    pub fn prev_named_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.prev_sibling(id);
        while let Some(c) = cur {
            if self.node(c).is_named {
                return Some(c);
            }
            cur = self.prev_sibling(c);
        }
        None
    }

    /// Preorder walk of the subtree rooted at `id`, `id` included.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Nearest ancestor (excluding `id`) whose kind is in `kinds`.
    pub fn ancestor_of_kind(&self, id: NodeId, kinds: &[&str]) -> Option<NodeId> {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if kinds.contains(&self.kind(p)) {
                return Some(p);
            }
            cur = self.parent(p);
        }
        None
    }
}

fn push_node(
    nodes: &mut Vec<SyntaxNode>,
    node: tree_sitter::Node,
    field: Option<&'static str>,
    parent: Option<NodeId>,
) -> NodeId {
    let id = NodeId(nodes.len() as u32);
    let index_in_parent = parent.map(|p| nodes[p.index()].children.len()).unwrap_or(0);
    nodes.push(SyntaxNode {
        kind: node.kind(),
        field,
        is_named: node.is_named(),
        is_error: node.is_error(),
        is_missing: node.is_missing(),
        span: Span::from_node(node),
        parent,
        index_in_parent,
        children: Vec::new(),
    });
    if let Some(p) = parent {
        nodes[p.index()].children.push(id);
    }
    id
}

/// Preorder iterator returned by [`SyntaxTree::descendants`].
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
