//! Ruby extractor.
//!
//! Extracts:
//! - `def` methods and `def self.x` singleton methods
//! - Classes (superclass and `include`/`extend`/`prepend` mixins become
//!   bases) and modules; types nested in a body are not hoisted
//! - `require` and `require_relative` calls
//! - Top-level classes and modules as exports

use crate::analysis::common::{
    collapse_ws, doc_comment_before, keep, new_function, push_unique, required_name, unquote,
    DocStyle,
};
use crate::analysis::{
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
    TypeSymbol,
};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

/// Ruby extractor.
pub struct RubyExtractor;

const MIXIN_METHODS: &[&str] = &["include", "extend", "prepend"];

impl RubyExtractor {
    fn method(parsed: &ParseResult, node: NodeId, singleton: bool) -> anyhow::Result<FunctionSymbol> {
        let tree = &parsed.tree;
        let name = required_name(tree, node)?;
        let name = if singleton || tree.kind(node) == "singleton_method" {
            format!("self.{}", name)
        } else {
            name
        };
        let mut func = new_function(parsed, node, name);
        func.parameters = tree
            .child_by_field(node, "parameters")
            .map(|p| Self::parameters(tree, p))
            .unwrap_or_default();
        func.docstring = doc_comment_before(tree, node, DocStyle::Adjacent);
        Ok(func)
    }

    fn parameters(tree: &SyntaxTree, params: NodeId) -> Vec<String> {
        tree.named_children(params)
            .filter_map(|p| match tree.kind(p) {
                "identifier" => Some(tree.text(p).to_string()),
                "optional_parameter" => tree.child_by_field(p, "name").map(|n| tree.text(n).to_string()),
                "keyword_parameter" => tree
                    .child_by_field(p, "name")
                    .map(|n| format!("{}:", tree.text(n))),
                "splat_parameter" | "hash_splat_parameter" | "block_parameter"
                | "forward_parameter" | "destructured_parameter" => Some(collapse_ws(tree.text(p))),
                _ => None,
            })
            .collect()
    }

    /// Statements of a class, module or singleton class body.
    fn body_items(tree: &SyntaxTree, node: NodeId) -> Vec<NodeId> {
        match tree.child_by_field(node, "body") {
            Some(body) => tree.named_children(body).collect(),
            None => tree.named_children(node).collect(),
        }
    }

    /// Receiver-less call to `method`, e.g. `include Comparable`.
    fn bare_call<'t>(tree: &'t SyntaxTree, node: NodeId) -> Option<(&'t str, NodeId)> {
        if tree.kind(node) != "call" || tree.child_by_field(node, "receiver").is_some() {
            return None;
        }
        let method = tree.text(tree.child_by_field(node, "method")?);
        let arguments = tree.child_by_field(node, "arguments")?;
        Some((method, arguments))
    }

    fn declared_type(parsed: &ParseResult, node: NodeId) -> anyhow::Result<TypeSymbol> {
        let tree = &parsed.tree;
        let name = required_name(tree, node)?;
        let kind = if tree.kind(node) == "module" {
            TypeKind::Module
        } else {
            TypeKind::Class
        };

        let mut ty = TypeSymbol::new(name, kind, tree.start_line(node), tree.end_line(node));
        ty.docstring = doc_comment_before(tree, node, DocStyle::Adjacent);
        if let Some(superclass) = tree.child_by_field(node, "superclass") {
            if let Some(base) = tree.named_children(superclass).next() {
                push_unique(&mut ty.bases, tree.text(base));
            }
        }

        for item in Self::body_items(tree, node) {
            match tree.kind(item) {
                "method" | "singleton_method" => {
                    if let Some(m) = keep(parsed, item, Self::method(parsed, item, false)) {
                        ty.methods.push(m);
                    }
                }
                // class << self
                "singleton_class" => {
                    for inner in Self::body_items(tree, item) {
                        if tree.kind(inner) == "method" {
                            if let Some(m) = keep(parsed, inner, Self::method(parsed, inner, true)) {
                                ty.methods.push(m);
                            }
                        }
                    }
                }
                "call" => {
                    let Some((method, arguments)) = Self::bare_call(tree, item) else {
                        continue;
                    };
                    if MIXIN_METHODS.contains(&method) {
                        for arg in tree.named_children(arguments) {
                            if matches!(tree.kind(arg), "constant" | "scope_resolution") {
                                push_unique(&mut ty.bases, tree.text(arg));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(ty)
    }

    fn imports(tree: &SyntaxTree, symbols: &mut FileSymbolSet) {
        for node in tree.descendants(tree.root()) {
            let Some((method, arguments)) = Self::bare_call(tree, node) else {
                continue;
            };
            let relative = match method {
                "require" | "load" => false,
                "require_relative" => true,
                _ => continue,
            };
            let Some(arg) = tree.named_children(arguments).next() else {
                continue;
            };
            // dynamic paths cannot be resolved
            if tree.kind(arg) != "string" || tree.has_child_kind(arg, "interpolation") {
                continue;
            }
            let module = unquote(tree.text(arg));
            if module.is_empty() {
                continue;
            }
            let relative = relative || module.starts_with('.');
            symbols.imports.push(
                ImportRecord::new(module, ImportKind::Require, tree.start_line(node))
                    .relative(relative),
            );
        }
    }
}

impl LanguageExtractor for RubyExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::Ruby
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        let tree = &parsed.tree;
        let mut symbols = FileSymbolSet::empty(LanguageId::Ruby);

        for stmt in tree.named_children(tree.root()) {
            match tree.kind(stmt) {
                "method" | "singleton_method" => {
                    if let Some(f) = keep(parsed, stmt, Self::method(parsed, stmt, false)) {
                        symbols.functions.push(f);
                    }
                }
                "class" | "module" => {
                    if let Some(ty) = keep(parsed, stmt, Self::declared_type(parsed, stmt)) {
                        symbols.add_export(ty.name.clone());
                        symbols.classes.push(ty);
                    }
                }
                _ => {}
            }
        }

        Self::imports(tree, &mut symbols);
        symbols
    }
}
