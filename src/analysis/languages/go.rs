//! Go language extractor.
//!
//! Extracts:
//! - Function declarations
//! - Methods, attached to their receiver type
//! - Struct and interface types (embedded types become bases)
//! - Imports, single and grouped
//! - Exports: capitalized top-level names

use crate::analysis::common::{
    collapse_ws, doc_comment_before, keep, new_function, push_unique, required_field,
    required_name, unquote, DocStyle,
};
use crate::analysis::{
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

/// Go language extractor.
pub struct GoExtractor;

impl GoExtractor {
    fn function(parsed: &ParseResult, node: NodeId) -> anyhow::Result<FunctionSymbol> {
        let tree = &parsed.tree;
        let mut func = new_function(parsed, node, required_name(tree, node)?);
        func.parameters = Self::parameters(tree, required_field(tree, node, "parameters")?);
        func.return_type = tree
            .child_by_field(node, "result")
            .map(|r| collapse_ws(tree.text(r)));
        func.docstring = doc_comment_before(tree, node, DocStyle::Adjacent);
        Ok(func)
    }

    fn parameters(tree: &SyntaxTree, list: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        for param in tree.named_children(list) {
            let variadic = tree.kind(param) == "variadic_parameter_declaration";
            if !variadic && tree.kind(param) != "parameter_declaration" {
                continue;
            }
            let mut declared: Vec<String> = tree
                .children_by_field(param, "name")
                .map(|n| tree.text(n).to_string())
                .collect();
            if declared.is_empty() {
                declared.push("_".to_string());
            }
            for name in declared {
                if variadic {
                    names.push(format!("...{}", name));
                } else {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Base type name of a method receiver: `(s *Stack[T])` gives `Stack`.
    fn receiver_type(tree: &SyntaxTree, method: NodeId) -> anyhow::Result<String> {
        let receiver = required_field(tree, method, "receiver")?;
        tree.descendants(receiver)
            .find(|id| tree.kind(*id) == "type_identifier")
            .map(|id| tree.text(id).to_string())
            .ok_or_else(|| anyhow::anyhow!("receiver without a named type"))
    }

    fn type_spec(
        parsed: &ParseResult,
        decl: NodeId,
        spec: NodeId,
        symbols: &mut FileSymbolSet,
    ) -> anyhow::Result<()> {
        let tree = &parsed.tree;
        let name = required_name(tree, spec)?;
        let ty = required_field(tree, spec, "type")?;
        let kind = match tree.kind(ty) {
            "struct_type" => TypeKind::Struct,
            "interface_type" => TypeKind::Interface,
            _ => return Ok(()),
        };

        // a single spec takes its doc comment from the enclosing declaration
        let single = tree
            .named_children(decl)
            .filter(|id| matches!(tree.kind(*id), "type_spec" | "type_alias"))
            .count()
            == 1;
        let doc = doc_comment_before(tree, spec, DocStyle::Adjacent).or_else(|| {
            if single {
                doc_comment_before(tree, decl, DocStyle::Adjacent)
            } else {
                None
            }
        });

        let entry = symbols.class_entry(&name, kind, (tree.start_line(spec), tree.end_line(spec)));
        entry.kind = kind;
        entry.start_line = tree.start_line(spec);
        entry.end_line = tree.end_line(spec);
        entry.docstring = doc;

        match kind {
            TypeKind::Struct => {
                for field in tree.descendants(ty).filter(|id| tree.kind(*id) == "field_declaration") {
                    // embedded fields have a type and no name
                    if tree.child_by_field(field, "name").is_some() {
                        continue;
                    }
                    if let Some(embedded) = tree.child_by_field(field, "type") {
                        push_unique(&mut entry.bases, tree.text(embedded).trim_start_matches('*'));
                    }
                }
            }
            _ => {
                for elem in tree.named_children(ty) {
                    match tree.kind(elem) {
                        "method_elem" | "method_spec" => {
                            let Some(method_name) = tree.child_by_field(elem, "name") else {
                                continue;
                            };
                            let mut method = new_function(parsed, elem, tree.text(method_name).to_string());
                            method.parameters = tree
                                .child_by_field(elem, "parameters")
                                .map(|p| Self::parameters(tree, p))
                                .unwrap_or_default();
                            method.return_type = tree
                                .child_by_field(elem, "result")
                                .map(|r| collapse_ws(tree.text(r)));
                            method.docstring = doc_comment_before(tree, elem, DocStyle::Adjacent);
                            entry.methods.push(method);
                        }
                        "type_elem" | "interface_type_name" | "constraint_elem" => {
                            push_unique(&mut entry.bases, collapse_ws(tree.text(elem)));
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn imports(tree: &SyntaxTree, decl: NodeId, symbols: &mut FileSymbolSet) {
        for spec in tree.descendants(decl).filter(|id| tree.kind(*id) == "import_spec") {
            let Some(path) = tree.child_by_field(spec, "path") else {
                continue;
            };
            symbols.imports.push(ImportRecord::new(
                unquote(tree.text(path)),
                ImportKind::Import,
                tree.start_line(spec),
            ));
        }
    }
}

fn is_exported(name: &str) -> bool {
    name.chars().next().map(char::is_uppercase).unwrap_or(false)
}

impl LanguageExtractor for GoExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::Go
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        let tree = &parsed.tree;
        let mut symbols = FileSymbolSet::empty(LanguageId::Go);

        // types first so methods declared above their type attach to it
        for decl in tree.named_children(tree.root()) {
            match tree.kind(decl) {
                "type_declaration" => {
                    let specs: Vec<NodeId> = tree
                        .named_children(decl)
                        .filter(|s| tree.kind(*s) == "type_spec")
                        .collect();
                    for spec in specs {
                        let result = Self::type_spec(parsed, decl, spec, &mut symbols);
                        keep(parsed, spec, result);
                    }
                }
                "import_declaration" => Self::imports(tree, decl, &mut symbols),
                _ => {}
            }
        }

        for decl in tree.named_children(tree.root()) {
            match tree.kind(decl) {
                "function_declaration" => {
                    if let Some(f) = keep(parsed, decl, Self::function(parsed, decl)) {
                        symbols.functions.push(f);
                    }
                }
                "method_declaration" => {
                    let result = Self::receiver_type(tree, decl)
                        .and_then(|owner| Ok((owner, Self::function(parsed, decl)?)));
                    if let Some((owner, method)) = keep(parsed, decl, result) {
                        symbols
                            .class_entry(&owner, TypeKind::Struct, (method.start_line, method.end_line))
                            .methods
                            .push(method);
                    }
                }
                _ => {}
            }
        }

        let exported: Vec<String> = symbols
            .functions
            .iter()
            .map(|f| f.name.clone())
            .chain(symbols.classes.iter().map(|c| c.name.clone()))
            .filter(|n| is_exported(n))
            .collect();
        exported.into_iter().for_each(|n| symbols.add_export(n));

        symbols
    }
}
