//! Rust language extractor.
//!
//! Extracts:
//! - Free functions, with `async` from the function modifiers
//! - Structs, unions, enums and traits (supertraits become bases)
//! - Impl blocks: methods attach to the implementing type and the
//!   implemented trait is added to its bases
//! - Attributes as decorators, `///` and `/** */` docs
//! - `use` trees and out-of-line `mod x;` declarations as imports
//! - `pub` items as exports

use crate::analysis::common::{
    collapse_ws, decorator_name, doc_comment_before, has_async_token, keep, new_function,
    push_unique, required_field, required_name, DocStyle,
};
use crate::analysis::{
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
    TypeSymbol,
};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

/// Rust language extractor.
pub struct RustExtractor;

const COMMENT_KINDS: &[&str] = &["line_comment", "block_comment"];

impl RustExtractor {
    /// Outer attributes written above an item, in source order.
    fn attributes(tree: &SyntaxTree, node: NodeId) -> Vec<String> {
        let mut attrs = Vec::new();
        let mut cur = tree.prev_sibling(node);
        while let Some(sib) = cur {
            match tree.kind(sib) {
                "attribute_item" => attrs.push(decorator_name(tree.text(sib))),
                kind if COMMENT_KINDS.contains(&kind) => {}
                _ => break,
            }
            cur = tree.prev_sibling(sib);
        }
        attrs.reverse();
        attrs
    }

    fn is_pub(tree: &SyntaxTree, node: NodeId) -> bool {
        tree.child_of_kind(node, "visibility_modifier")
            .map(|v| tree.text(v).trim() == "pub")
            .unwrap_or(false)
    }

    fn function(parsed: &ParseResult, node: NodeId) -> anyhow::Result<FunctionSymbol> {
        let tree = &parsed.tree;
        let mut func = new_function(parsed, node, required_name(tree, node)?);
        func.parameters = Self::parameters(tree, required_field(tree, node, "parameters")?);
        func.return_type = tree
            .child_by_field(node, "return_type")
            .map(|t| collapse_ws(tree.text(t)));
        func.is_async = tree
            .child_of_kind(node, "function_modifiers")
            .map(|m| has_async_token(tree, m))
            .unwrap_or(false);
        func.docstring = doc_comment_before(tree, node, DocStyle::Rust);
        func.decorators = Self::attributes(tree, node);
        Ok(func)
    }

    fn parameters(tree: &SyntaxTree, params: NodeId) -> Vec<String> {
        tree.named_children(params)
            .filter_map(|p| match tree.kind(p) {
                "self_parameter" => Some(collapse_ws(tree.text(p))),
                "parameter" => tree
                    .child_by_field(p, "pattern")
                    .map(|pat| collapse_ws(tree.text(pat))),
                "variadic_parameter" => Some("...".to_string()),
                _ => None,
            })
            .collect()
    }

    fn declared_type(parsed: &ParseResult, node: NodeId, kind: TypeKind) -> anyhow::Result<TypeSymbol> {
        let tree = &parsed.tree;
        let name = required_name(tree, node)?;
        let mut ty = TypeSymbol::new(name, kind, tree.start_line(node), tree.end_line(node));
        ty.docstring = doc_comment_before(tree, node, DocStyle::Rust);
        ty.decorators = Self::attributes(tree, node);

        if kind == TypeKind::Trait {
            if let Some(bounds) = tree.child_by_field(node, "bounds") {
                for bound in tree.named_children(bounds) {
                    if tree.kind(bound) != "lifetime" {
                        push_unique(&mut ty.bases, collapse_ws(tree.text(bound)));
                    }
                }
            }
            if let Some(body) = tree.child_by_field(node, "body") {
                for item in tree.named_children(body) {
                    if matches!(tree.kind(item), "function_item" | "function_signature_item") {
                        if let Some(method) = keep(parsed, item, Self::function(parsed, item)) {
                            ty.methods.push(method);
                        }
                    }
                }
            }
        }
        Ok(ty)
    }

    /// Bare name of a type path: `a::Config<T>` gives `Config`.
    fn type_name(tree: &SyntaxTree, node: NodeId) -> String {
        let node = match tree.kind(node) {
            "generic_type" => tree.child_by_field(node, "type").unwrap_or(node),
            _ => node,
        };
        let text = tree.text(node);
        let text = text.rsplit("::").next().unwrap_or(text);
        text.trim_start_matches(['&', '*']).trim().to_string()
    }

    fn implementation(parsed: &ParseResult, node: NodeId, symbols: &mut FileSymbolSet) -> anyhow::Result<()> {
        let tree = &parsed.tree;
        let owner = Self::type_name(tree, required_field(tree, node, "type")?);
        let body = required_field(tree, node, "body")?;

        let methods: Vec<FunctionSymbol> = tree
            .named_children(body)
            .filter(|item| tree.kind(*item) == "function_item")
            .filter_map(|item| keep(parsed, item, Self::function(parsed, item)))
            .collect();

        let entry = symbols.class_entry(
            &owner,
            TypeKind::Struct,
            (tree.start_line(node), tree.end_line(node)),
        );
        if let Some(trait_node) = tree.child_by_field(node, "trait") {
            push_unique(&mut entry.bases, collapse_ws(tree.text(trait_node)));
        }
        entry.methods.extend(methods);
        Ok(())
    }

    fn use_records(tree: &SyntaxTree, decl: NodeId, symbols: &mut FileSymbolSet) {
        let Some(argument) = tree.child_by_field(decl, "argument") else {
            return;
        };
        let line = tree.start_line(decl);
        let mut records = Vec::new();
        use_tree(tree, argument, "", line, &mut records);
        symbols.imports.extend(records);
    }
}

fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}::{}", prefix, path)
    }
}

fn rust_import(module: String, names: Vec<String>, line: usize) -> ImportRecord {
    let relative = module == "self"
        || module == "super"
        || module.starts_with("self::")
        || module.starts_with("super::");
    ImportRecord::new(module, ImportKind::Import, line)
        .with_names(names)
        .relative(relative)
}

/// Flatten one `use` tree into records. Plain items of a braced list share
/// a record whose module is the list prefix; everything else gets its own.
fn use_tree(tree: &SyntaxTree, node: NodeId, prefix: &str, line: usize, out: &mut Vec<ImportRecord>) {
    match tree.kind(node) {
        "scoped_use_list" | "use_list" => {
            let (prefix, list) = if tree.kind(node) == "use_list" {
                (prefix.to_string(), node)
            } else {
                let path = tree
                    .child_by_field(node, "path")
                    .map(|p| tree.text(p))
                    .unwrap_or("");
                let Some(list) = tree.child_by_field(node, "list") else {
                    return;
                };
                (join_path(prefix, path), list)
            };

            let mut simple = Vec::new();
            let mut nested = Vec::new();
            for item in tree.named_children(list) {
                match tree.kind(item) {
                    "identifier" | "self" if !prefix.is_empty() => {
                        simple.push(tree.text(item).to_string())
                    }
                    _ => use_tree(tree, item, &prefix, line, &mut nested),
                }
            }
            if !simple.is_empty() {
                out.push(rust_import(prefix, simple, line));
            }
            out.extend(nested);
        }
        "use_as_clause" => {
            let path = tree
                .child_by_field(node, "path")
                .map(|p| tree.text(p))
                .unwrap_or("");
            let alias = tree
                .child_by_field(node, "alias")
                .map(|a| tree.text(a).to_string())
                .unwrap_or_default();
            out.push(rust_import(join_path(prefix, path), vec![alias], line));
        }
        "use_wildcard" => {
            let text = tree.text(node);
            let path = text.trim_end_matches('*').trim_end_matches("::");
            out.push(rust_import(join_path(prefix, path), vec!["*".to_string()], line));
        }
        _ => {
            let full = join_path(prefix, tree.text(node).trim());
            let leaf = full.rsplit("::").next().unwrap_or(&full).to_string();
            out.push(rust_import(full, vec![leaf], line));
        }
    }
}

impl LanguageExtractor for RustExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::Rust
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        let tree = &parsed.tree;
        let mut symbols = FileSymbolSet::empty(LanguageId::Rust);
        let items: Vec<NodeId> = tree.named_children(tree.root()).collect();

        // types first so impl blocks above their type attach to it
        for &item in &items {
            let kind = match tree.kind(item) {
                "struct_item" | "union_item" => TypeKind::Struct,
                "enum_item" => TypeKind::Enum,
                "trait_item" => TypeKind::Trait,
                _ => continue,
            };
            if let Some(ty) = keep(parsed, item, Self::declared_type(parsed, item, kind)) {
                if Self::is_pub(tree, item) {
                    symbols.add_export(ty.name.clone());
                }
                symbols.classes.push(ty);
            }
        }

        for &item in &items {
            match tree.kind(item) {
                "function_item" => {
                    if let Some(f) = keep(parsed, item, Self::function(parsed, item)) {
                        if Self::is_pub(tree, item) {
                            symbols.add_export(f.name.clone());
                        }
                        symbols.functions.push(f);
                    }
                }
                "impl_item" => {
                    let result = Self::implementation(parsed, item, &mut symbols);
                    keep(parsed, item, result);
                }
                "use_declaration" => Self::use_records(tree, item, &mut symbols),
                "mod_item" => {
                    let Some(name) = tree.child_by_field(item, "name") else {
                        continue;
                    };
                    let name = tree.text(name).to_string();
                    // `mod x;` pulls in a sibling file, inline modules do not
                    if tree.child_by_field(item, "body").is_none() {
                        symbols.imports.push(rust_import(
                            format!("self::{}", name),
                            vec![name.clone()],
                            tree.start_line(item),
                        ));
                    }
                    if Self::is_pub(tree, item) {
                        symbols.add_export(name);
                    }
                }
                "const_item" | "static_item" | "type_item" => {
                    if Self::is_pub(tree, item) {
                        if let Some(name) = tree.child_by_field(item, "name") {
                            symbols.add_export(tree.text(name));
                        }
                    }
                }
                _ => {}
            }
        }

        symbols
    }
}
