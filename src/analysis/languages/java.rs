//! Java extractor.
//!
//! Extracts:
//! - Classes, interfaces, enums and records, with `extends`/`implements`
//! - Methods and constructors attached to their type
//! - Annotations as decorators, Javadoc comments
//! - Imports (single-type, on-demand `*` and static)
//! - Public top-level types as exports

use crate::analysis::common::{
    collapse_ws, decorator_name, doc_comment_before, keep, new_function, push_unique,
    required_field, required_name, DocStyle,
};
use crate::analysis::{
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
    TypeSymbol,
};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

/// Java extractor.
pub struct JavaExtractor;

impl JavaExtractor {
    fn type_kind(kind: &str) -> Option<TypeKind> {
        match kind {
            "class_declaration" | "record_declaration" => Some(TypeKind::Class),
            "interface_declaration" | "annotation_type_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            _ => None,
        }
    }

    fn annotations(tree: &SyntaxTree, node: NodeId) -> Vec<String> {
        let Some(modifiers) = tree.child_of_kind(node, "modifiers") else {
            return Vec::new();
        };
        tree.named_children(modifiers)
            .filter(|m| matches!(tree.kind(*m), "marker_annotation" | "annotation"))
            .map(|m| decorator_name(tree.text(m)))
            .collect()
    }

    fn is_public(tree: &SyntaxTree, node: NodeId) -> bool {
        tree.child_of_kind(node, "modifiers")
            .map(|m| tree.children(m).iter().any(|c| tree.kind(*c) == "public"))
            .unwrap_or(false)
    }

    fn declared_type(parsed: &ParseResult, node: NodeId, kind: TypeKind) -> anyhow::Result<TypeSymbol> {
        let tree = &parsed.tree;
        let name = required_name(tree, node)?;
        let body = required_field(tree, node, "body")?;

        let mut ty = TypeSymbol::new(name, kind, tree.start_line(node), tree.end_line(node));
        ty.docstring = doc_comment_before(tree, node, DocStyle::JsDoc);
        ty.decorators = Self::annotations(tree, node);

        for part in tree.named_children(node) {
            match tree.kind(part) {
                // extends Base
                "superclass" => {
                    for t in tree.named_children(part) {
                        push_unique(&mut ty.bases, tree.text(t));
                    }
                }
                // implements A, B / interface extends A, B
                "super_interfaces" | "extends_interfaces" => {
                    for list in tree.named_children(part) {
                        for t in tree.named_children(list) {
                            push_unique(&mut ty.bases, tree.text(t));
                        }
                    }
                }
                _ => {}
            }
        }

        // enum methods sit one level down
        let members: Vec<NodeId> = tree
            .named_children(body)
            .flat_map(|m| {
                if tree.kind(m) == "enum_body_declarations" {
                    tree.named_children(m).collect::<Vec<_>>()
                } else {
                    vec![m]
                }
            })
            .collect();

        for member in members {
            if !matches!(
                tree.kind(member),
                "method_declaration" | "constructor_declaration" | "compact_constructor_declaration"
            ) {
                continue;
            }
            if let Some(method) = keep(parsed, member, Self::method(parsed, member)) {
                ty.methods.push(method);
            }
        }
        Ok(ty)
    }

    fn method(parsed: &ParseResult, node: NodeId) -> anyhow::Result<FunctionSymbol> {
        let tree = &parsed.tree;
        let mut method = new_function(parsed, node, required_name(tree, node)?);
        method.parameters = tree
            .child_by_field(node, "parameters")
            .map(|p| Self::parameters(tree, p))
            .unwrap_or_default();
        method.return_type = tree
            .child_by_field(node, "type")
            .map(|t| collapse_ws(tree.text(t)));
        method.docstring = doc_comment_before(tree, node, DocStyle::JsDoc);
        method.decorators = Self::annotations(tree, node);
        Ok(method)
    }

    fn parameters(tree: &SyntaxTree, params: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        for param in tree.named_children(params) {
            match tree.kind(param) {
                "formal_parameter" => {
                    if let Some(name) = tree.child_by_field(param, "name") {
                        names.push(tree.text(name).to_string());
                    }
                }
                "spread_parameter" => {
                    let name = tree
                        .named_children(param)
                        .find(|c| tree.kind(*c) == "variable_declarator")
                        .and_then(|d| tree.child_by_field(d, "name"));
                    if let Some(name) = name {
                        names.push(format!("...{}", tree.text(name)));
                    }
                }
                _ => {}
            }
        }
        names
    }

    fn import(tree: &SyntaxTree, node: NodeId) -> Option<ImportRecord> {
        let path = tree
            .named_children(node)
            .find(|c| matches!(tree.kind(*c), "scoped_identifier" | "identifier"))?;
        let path = tree.text(path).to_string();
        let line = tree.start_line(node);
        let is_static = tree.has_child_kind(node, "static");

        let record = if tree.has_child_kind(node, "asterisk") {
            ImportRecord::new(path, ImportKind::Import, line).with_names(vec!["*".to_string()])
        } else if is_static {
            // import static a.b.C.member;
            match path.rsplit_once('.') {
                Some((class, member)) => ImportRecord::new(class, ImportKind::Import, line)
                    .with_names(vec![member.to_string()]),
                None => ImportRecord::new(path, ImportKind::Import, line),
            }
        } else {
            ImportRecord::new(path, ImportKind::Import, line)
        };
        Some(record.relative(false))
    }
}

impl LanguageExtractor for JavaExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::Java
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        let tree = &parsed.tree;
        let mut symbols = FileSymbolSet::empty(LanguageId::Java);

        for child in tree.named_children(tree.root()) {
            if tree.kind(child) == "import_declaration" {
                if let Some(record) = Self::import(tree, child) {
                    symbols.imports.push(record);
                }
                continue;
            }
            let Some(kind) = Self::type_kind(tree.kind(child)) else {
                continue;
            };
            if let Some(ty) = keep(parsed, child, Self::declared_type(parsed, child, kind)) {
                if Self::is_public(tree, child) {
                    symbols.add_export(ty.name.clone());
                }
                symbols.classes.push(ty);
            }
        }

        symbols
    }
}

#[cfg(test)]
#[cfg(feature = "lang-java")]
mod tests {
    use super::*;
    use crate::parser::LanguageRegistry;

    fn extract(source: &str) -> FileSymbolSet {
        let parsed = LanguageRegistry::default()
            .parse_source(LanguageId::Java, "Test.java", source.as_bytes().to_vec())
            .unwrap();
        JavaExtractor.extract(&parsed)
    }

    #[test]
    fn test_extract_class() {
        let source = r#"
package com.example;

import java.util.List;
import java.util.concurrent.*;
import static org.junit.Assert.assertEquals;

/**
 * Handles orders.
 */
@Service
@Deprecated(since = "2")
public class OrderService extends BaseService implements Runnable, AutoCloseable {
    public OrderService(Repo repo) {
        this.repo = repo;
    }

    /** Processes every order. */
    @Override
    public List<Order> process(String region, int... ids) {
        for (int id : ids) {
            if (id > 0 && region != null) {
                handle(id);
            }
        }
        return null;
    }

    void helper() {}
}

class Internal {}
"#;
        let symbols = extract(source);
        assert!(symbols.functions.is_empty());
        assert_eq!(symbols.exports, vec!["OrderService"]);

        let service = symbols.class("OrderService").unwrap();
        assert_eq!(service.kind, TypeKind::Class);
        assert_eq!(service.bases, vec!["BaseService", "Runnable", "AutoCloseable"]);
        assert_eq!(service.decorators, vec!["Service", "Deprecated"]);
        assert_eq!(service.docstring.as_deref(), Some("Handles orders."));

        let names: Vec<_> = service.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["OrderService", "process", "helper"]);

        let process = service.method("process").unwrap();
        assert_eq!(process.parameters, vec!["region", "...ids"]);
        assert_eq!(process.return_type.as_deref(), Some("List<Order>"));
        assert_eq!(process.decorators, vec!["Override"]);
        assert_eq!(process.docstring.as_deref(), Some("Processes every order."));
        assert_eq!(process.complexity, 4);
        assert!(service.method("helper").unwrap().docstring.is_none());

        assert_eq!(symbols.imports.len(), 3);
        assert_eq!(symbols.imports[0].module, "java.util.List");
        assert!(symbols.imports[0].names.is_empty());
        assert_eq!(symbols.imports[1].module, "java.util.concurrent");
        assert_eq!(symbols.imports[1].names, vec!["*"]);
        assert_eq!(symbols.imports[2].module, "org.junit.Assert");
        assert_eq!(symbols.imports[2].names, vec!["assertEquals"]);
        assert!(symbols.imports.iter().all(|i| !i.is_relative));
    }

    #[test]
    fn test_interfaces_and_enums() {
        let source = r#"
public interface Repo<T> extends Reader<T>, Closeable {
    T find(String id);
    default void touch() {}
}

enum Level {
    LOW, HIGH;

    boolean isHigh() { return this == HIGH; }
}
"#;
        let symbols = extract(source);
        let repo = symbols.class("Repo").unwrap();
        assert_eq!(repo.kind, TypeKind::Interface);
        assert_eq!(repo.bases, vec!["Reader<T>", "Closeable"]);
        assert_eq!(repo.methods.len(), 2);

        let level = symbols.class("Level").unwrap();
        assert_eq!(level.kind, TypeKind::Enum);
        assert_eq!(level.methods[0].name, "isHigh");
        assert_eq!(level.methods[0].return_type.as_deref(), Some("boolean"));
    }
}
