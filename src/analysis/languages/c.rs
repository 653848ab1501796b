//! C language extractor, and the declaration walker it shares with C++.
//!
//! Extracts:
//! - Function definitions, including ones returning pointers
//! - Struct, union and enum specifiers and `typedef struct` aliases
//! - `#include` directives (quoted includes are relative)
//! - Non-`static` functions and named types as exports
//!
//! Items inside preprocessor conditionals and `extern "C"` blocks are
//! treated as top-level.

use crate::analysis::common::{
    collapse_ws, doc_comment_before, keep, new_function, required_field, unquote, DocStyle,
};
use crate::analysis::{
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
    TypeSymbol,
};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

use super::cpp;

/// C language extractor.
pub struct CExtractor;

impl LanguageExtractor for CExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::C
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        CFamilyWalker::new(parsed, Dialect::C).run()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Dialect {
    C,
    Cpp,
}

const CONTAINERS: &[&str] = &[
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
    "preproc_elifdef",
    "declaration_list",
];

const DECLARATOR_WRAPPERS: &[&str] = &[
    "pointer_declarator",
    "reference_declarator",
    "parenthesized_declarator",
    "attributed_declarator",
];

pub(super) struct CFamilyWalker<'a> {
    parsed: &'a ParseResult,
    tree: &'a SyntaxTree,
    dialect: Dialect,
    symbols: FileSymbolSet,
    /// Out-of-class member definitions, attached once the walk is done.
    pending_methods: Vec<(String, FunctionSymbol)>,
}

impl<'a> CFamilyWalker<'a> {
    pub(super) fn new(parsed: &'a ParseResult, dialect: Dialect) -> Self {
        let language = match dialect {
            Dialect::C => LanguageId::C,
            Dialect::Cpp => LanguageId::Cpp,
        };
        Self {
            parsed,
            tree: &parsed.tree,
            dialect,
            symbols: FileSymbolSet::empty(language),
            pending_methods: Vec::new(),
        }
    }

    pub(super) fn run(mut self) -> FileSymbolSet {
        self.items(self.tree.root());
        for (owner, method) in std::mem::take(&mut self.pending_methods) {
            let entry = self
                .symbols
                .class_entry(&owner, TypeKind::Class, (method.start_line, method.end_line));
            cpp::attach_definition(&mut entry.methods, method);
        }
        self.symbols
    }

    fn items(&mut self, container: NodeId) {
        let tree = self.tree;
        let children: Vec<NodeId> = tree.named_children(container).collect();
        for child in children {
            self.item(child, child);
        }
    }

    /// Handle one declaration-level node. `anchor` is where its doc comment
    /// is looked up (the template wrapper for templated items).
    fn item(&mut self, node: NodeId, anchor: NodeId) {
        let tree = self.tree;
        match tree.kind(node) {
            kind if CONTAINERS.contains(&kind) => self.items(node),
            "linkage_specification" => {
                if let Some(body) = tree.child_by_field(node, "body") {
                    if tree.kind(body) == "declaration_list" {
                        self.items(body);
                    } else {
                        self.item(body, body);
                    }
                }
            }
            "namespace_definition" if self.dialect == Dialect::Cpp => {
                if let Some(body) = tree.child_by_field(node, "body") {
                    self.items(body);
                }
            }
            "template_declaration" if self.dialect == Dialect::Cpp => {
                if let Some(inner) = cpp::template_inner(tree, node) {
                    self.item(inner, anchor);
                }
            }
            "preproc_include" => {
                if let Some(record) = include(tree, node) {
                    self.symbols.imports.push(record);
                }
            }
            "function_definition" => self.function_definition(node, anchor),
            "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier" => {
                self.type_item(node, None, anchor);
            }
            "declaration" | "type_definition" => {
                let Some(spec) = tree.child_by_field(node, "type") else {
                    return;
                };
                if !is_type_specifier(tree, spec) {
                    return;
                }
                // typedef struct { ... } Name;
                let alias = (tree.kind(node) == "type_definition")
                    .then(|| tree.child_by_field(node, "declarator"))
                    .flatten()
                    .map(|d| tree.text(d).to_string());
                self.type_item(spec, alias, anchor);
            }
            _ => {}
        }
    }

    fn function_definition(&mut self, node: NodeId, anchor: NodeId) {
        let tree = self.tree;
        let result = self.function(node, anchor);
        let Some((qualified, func)) = keep(self.parsed, node, result) else {
            return;
        };

        if self.dialect == Dialect::Cpp {
            if let Some(owner) = cpp::qualified_owner(&qualified) {
                self.pending_methods.push((owner, func));
                return;
            }
        }
        if !is_static(tree, node) {
            self.symbols.add_export(func.name.clone());
        }
        self.symbols.functions.push(func);
    }

    /// Build a function from a definition or member declaration. Also
    /// returns the declarator's full name, which may be qualified.
    pub(super) fn function(&self, node: NodeId, anchor: NodeId) -> anyhow::Result<(String, FunctionSymbol)> {
        let tree = self.tree;
        let (declarator, suffix) = function_declarator(tree, required_field(tree, node, "declarator")?)
            .ok_or_else(|| anyhow::anyhow!("no function declarator"))?;
        let qualified = tree.text(required_field(tree, declarator, "declarator")?).trim().to_string();
        if qualified.is_empty() {
            anyhow::bail!("function declarator without a name");
        }
        let name = match qualified.rsplit_once("::") {
            Some((_, member)) => member.to_string(),
            None => qualified.clone(),
        };

        let mut func = new_function(self.parsed, node, name);
        func.parameters = tree
            .child_by_field(declarator, "parameters")
            .map(|p| parameters(tree, p))
            .unwrap_or_default();
        func.return_type = tree
            .child_by_field(node, "type")
            .map(|t| format!("{}{}", collapse_ws(tree.text(t)), suffix));
        func.docstring = doc_comment_before(tree, anchor, DocStyle::Adjacent);
        Ok((qualified, func))
    }

    fn type_item(&mut self, spec: NodeId, alias: Option<String>, anchor: NodeId) {
        let tree = self.tree;
        let Some(body) = tree.child_by_field(spec, "body") else {
            return;
        };
        let name = alias.or_else(|| tree.child_by_field(spec, "name").map(|n| tree.text(n).to_string()));
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return;
        };

        let kind = match tree.kind(spec) {
            "enum_specifier" => TypeKind::Enum,
            "class_specifier" => TypeKind::Class,
            _ => TypeKind::Struct,
        };
        let mut ty = TypeSymbol::new(name, kind, tree.start_line(anchor), tree.end_line(anchor));
        ty.docstring = doc_comment_before(tree, anchor, DocStyle::Adjacent);

        if self.dialect == Dialect::Cpp && kind != TypeKind::Enum {
            ty.bases = cpp::base_classes(tree, spec);
            ty.methods = cpp::members(self, body);
        }

        self.symbols.add_export(ty.name.clone());
        self.symbols.classes.push(ty);
    }

    pub(super) fn parsed(&self) -> &'a ParseResult {
        self.parsed
    }
}

fn is_type_specifier(tree: &SyntaxTree, node: NodeId) -> bool {
    matches!(
        tree.kind(node),
        "struct_specifier" | "union_specifier" | "enum_specifier" | "class_specifier"
    )
}

fn is_static(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.named_children(node)
        .any(|c| tree.kind(c) == "storage_class_specifier" && tree.text(c).trim() == "static")
}

/// Find the `function_declarator` under pointer and reference wrappers,
/// returning it with the wrapper markers for the return type (`" *"`).
pub(super) fn function_declarator(tree: &SyntaxTree, mut node: NodeId) -> Option<(NodeId, String)> {
    let mut suffix = String::new();
    loop {
        match tree.kind(node) {
            "function_declarator" => return Some((node, suffix)),
            kind if DECLARATOR_WRAPPERS.contains(&kind) => {
                match kind {
                    "pointer_declarator" => suffix.push_str(" *"),
                    "reference_declarator" => suffix.push_str(" &"),
                    _ => {}
                }
                node = tree
                    .child_by_field(node, "declarator")
                    .or_else(|| tree.named_children(node).last())?;
            }
            _ => return None,
        }
    }
}

fn parameters(tree: &SyntaxTree, list: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    for param in tree.named_children(list) {
        match tree.kind(param) {
            "parameter_declaration" | "optional_parameter_declaration" => {
                let name = tree
                    .child_by_field(param, "declarator")
                    .and_then(|d| tree.descendants(d).find(|id| tree.kind(*id) == "identifier"));
                if let Some(name) = name {
                    names.push(tree.text(name).to_string());
                }
            }
            "variadic_parameter_declaration" => {
                let name = tree
                    .descendants(param)
                    .find(|id| tree.kind(*id) == "identifier")
                    .map(|id| tree.text(id))
                    .unwrap_or("");
                names.push(format!("...{}", name));
            }
            "variadic_parameter" => names.push("...".to_string()),
            _ => {}
        }
    }
    names
}

fn include(tree: &SyntaxTree, node: NodeId) -> Option<ImportRecord> {
    let path = tree.child_by_field(node, "path")?;
    let quoted = tree.kind(path) == "string_literal";
    let module = unquote(tree.text(path));
    if module.is_empty() {
        return None;
    }
    Some(ImportRecord::new(module, ImportKind::Import, tree.start_line(node)).relative(quoted))
}

#[cfg(test)]
#[cfg(feature = "lang-c")]
mod tests {
    use super::*;
    use crate::parser::LanguageRegistry;

    fn extract(source: &str) -> FileSymbolSet {
        let parsed = LanguageRegistry::default()
            .parse_source(LanguageId::C, "test.c", source.as_bytes().to_vec())
            .unwrap();
        CExtractor.extract(&parsed)
    }

    #[test]
    fn test_extract_functions() {
        let source = r#"
#include <stdio.h>
#include "util/list.h"

/**
 * Duplicates a string.
 */
char *dup(const char *src, size_t n) {
    if (src == NULL || n == 0) {
        return NULL;
    }
    return strndup(src, n);
}

// Logs a message.
static void log_msg(const char *fmt, ...) {
    for (int i = 0; i < 3; i++) {}
}

int main(void) { return 0; }
"#;
        let symbols = extract(source);
        assert_eq!(symbols.functions.len(), 3);

        let dup = symbols.function("dup").unwrap();
        assert_eq!(dup.parameters, vec!["src", "n"]);
        assert_eq!(dup.return_type.as_deref(), Some("char *"));
        assert_eq!(dup.docstring.as_deref(), Some("Duplicates a string."));
        assert_eq!(dup.complexity, 3);

        let log = symbols.function("log_msg").unwrap();
        assert_eq!(log.parameters, vec!["fmt", "..."]);
        assert_eq!(log.docstring.as_deref(), Some("Logs a message."));

        assert!(symbols.function("main").unwrap().parameters.is_empty());
        assert_eq!(symbols.exports, vec!["dup", "main"]);

        assert_eq!(symbols.imports.len(), 2);
        assert_eq!(symbols.imports[0].module, "stdio.h");
        assert!(!symbols.imports[0].is_relative);
        assert_eq!(symbols.imports[1].module, "util/list.h");
        assert!(symbols.imports[1].is_relative);
    }

    #[test]
    fn test_extract_types() {
        let source = r#"
/* A point. */
struct point {
    int x;
    int y;
};

typedef struct {
    int len;
} Buffer;

enum color { RED, GREEN };

union value { int i; float f; };

struct point make_point(int x, int y);
"#;
        let symbols = extract(source);
        let names: Vec<_> = symbols.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["point", "Buffer", "color", "value"]);
        assert_eq!(symbols.class("point").unwrap().docstring.as_deref(), Some("A point."));
        assert_eq!(symbols.class("color").unwrap().kind, TypeKind::Enum);
        assert_eq!(symbols.class("value").unwrap().kind, TypeKind::Struct);
        // prototypes are not definitions
        assert!(symbols.functions.is_empty());
    }

    #[test]
    fn test_preprocessor_and_extern_blocks() {
        let source = r#"
extern "C" {
#ifndef NDEBUG
void trace(int level) {}
#else
void trace_off(void) {}
#endif
}
"#;
        let symbols = extract(source);
        assert_eq!(symbols.function("trace").unwrap().parameters, vec!["level"]);
        assert!(symbols.function("trace_off").is_some());
    }
}
