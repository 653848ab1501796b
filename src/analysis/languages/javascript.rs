//! JavaScript extractor, and the ECMAScript walker shared with TypeScript.
//!
//! Extracts:
//! - Function and generator declarations, `const f = () => ...` bindings
//! - Classes with `extends`, methods and arrow-function class fields
//! - JSDoc (`/** ... */`) comments, anchored on the `export` wrapper
//! - ES imports, re-exports, `require(...)` and `import(...)` calls
//! - Exports from `export` statements and `exports.x = ...` assignments

use crate::analysis::common::{
    decorator_name, doc_comment_before, has_async_token, keep, new_function, push_unique,
    required_field, required_name, unquote, DocStyle,
};
use crate::analysis::{
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
    TypeSymbol,
};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

use super::typescript;

/// JavaScript extractor.
pub struct JavaScriptExtractor;

impl LanguageExtractor for JavaScriptExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::JavaScript
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        EsWalker::new(parsed, Dialect::JavaScript).run()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Dialect {
    JavaScript,
    TypeScript,
}

/// Value kinds that turn a variable binding into a function.
const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

pub(super) struct EsWalker<'a> {
    parsed: &'a ParseResult,
    tree: &'a SyntaxTree,
    dialect: Dialect,
    symbols: FileSymbolSet,
}

impl<'a> EsWalker<'a> {
    pub(super) fn new(parsed: &'a ParseResult, dialect: Dialect) -> Self {
        let language = match dialect {
            Dialect::JavaScript => LanguageId::JavaScript,
            Dialect::TypeScript => LanguageId::TypeScript,
        };
        Self {
            parsed,
            tree: &parsed.tree,
            dialect,
            symbols: FileSymbolSet::empty(language),
        }
    }

    pub(super) fn run(mut self) -> FileSymbolSet {
        let tree = self.tree;
        for child in tree.named_children(tree.root()) {
            self.top_level(child, None);
        }
        self.imports_and_assigned_exports();
        self.symbols
    }

    fn top_level(&mut self, node: NodeId, export: Option<NodeId>) {
        let tree = self.tree;
        let anchor = export.unwrap_or(node);
        match tree.kind(node) {
            "export_statement" => self.export_statement(node),
            "function_declaration" | "generator_function_declaration" => {
                let result = required_name(tree, node).and_then(|name| self.function(node, name, anchor));
                if let Some(f) = keep(self.parsed, node, result) {
                    self.symbols.functions.push(f);
                }
            }
            "class_declaration" | "abstract_class_declaration" | "class" => {
                if let Some(c) = keep(self.parsed, node, self.class(node, anchor)) {
                    self.symbols.classes.push(c);
                }
            }
            "lexical_declaration" | "variable_declaration" => self.bindings(node, anchor),
            "interface_declaration" if self.dialect == Dialect::TypeScript => {
                if let Some(i) = keep(self.parsed, node, typescript::interface(self.parsed, node, anchor)) {
                    self.symbols.classes.push(i);
                }
            }
            "enum_declaration" if self.dialect == Dialect::TypeScript => {
                if let Some(e) = keep(self.parsed, node, typescript::enumeration(self.parsed, node, anchor)) {
                    self.symbols.classes.push(e);
                }
            }
            _ => {}
        }
    }

    /// `const f = () => {}` and `const Foo = class {}` bindings.
    fn bindings(&mut self, declaration: NodeId, anchor: NodeId) {
        let tree = self.tree;
        for declarator in tree.named_children(declaration) {
            if tree.kind(declarator) != "variable_declarator" {
                continue;
            }
            let (Some(name), Some(value)) = (
                tree.child_by_field(declarator, "name"),
                tree.child_by_field(declarator, "value"),
            ) else {
                continue;
            };
            if tree.kind(name) != "identifier" {
                continue;
            }
            let name = tree.text(name).to_string();
            let value_kind = tree.kind(value);
            if FUNCTION_VALUES.contains(&value_kind) {
                let result = self.function(value, name, anchor).map(|mut f| {
                    f.start_line = tree.start_line(declaration);
                    f.end_line = tree.end_line(declaration);
                    f
                });
                if let Some(f) = keep(self.parsed, value, result) {
                    self.symbols.functions.push(f);
                }
            } else if value_kind == "class" {
                let result = self.class(value, anchor).map(|mut c| {
                    c.name = name;
                    c
                });
                if let Some(c) = keep(self.parsed, value, result) {
                    self.symbols.classes.push(c);
                }
            }
        }
    }

    fn export_statement(&mut self, node: NodeId) {
        let tree = self.tree;
        let is_default = tree.has_child_kind(node, "default");

        if let Some(decl) = tree.child_by_field(node, "declaration") {
            self.top_level(decl, Some(node));
            let names = declared_names(tree, decl);
            if is_default && names.is_empty() {
                self.symbols.add_export("default");
            }
            names.into_iter().for_each(|n| self.symbols.add_export(n));
        } else if let Some(value) = tree.child_by_field(node, "value") {
            if FUNCTION_VALUES.contains(&tree.kind(value)) {
                let name = tree
                    .child_by_field(value, "name")
                    .map(|n| tree.text(n).to_string())
                    .unwrap_or_else(|| "default".to_string());
                if let Some(f) = keep(self.parsed, value, self.function(value, name, node)) {
                    self.symbols.functions.push(f);
                }
            }
            self.symbols.add_export("default");
        } else if let Some(clause) = tree.child_of_kind(node, "export_clause") {
            for spec in tree.named_children(clause) {
                if tree.kind(spec) != "export_specifier" {
                    continue;
                }
                let exported = tree
                    .child_by_field(spec, "alias")
                    .or_else(|| tree.child_by_field(spec, "name"));
                if let Some(exported) = exported {
                    self.symbols.add_export(unquote(tree.text(exported)));
                }
            }
        }
    }

    fn function(&self, node: NodeId, name: String, anchor: NodeId) -> anyhow::Result<FunctionSymbol> {
        let tree = self.tree;
        let mut func = new_function(self.parsed, node, name);
        func.parameters = self.parameters(node);
        func.return_type = tree
            .child_by_field(node, "return_type")
            .and_then(|t| typescript::annotation_text(tree, t));
        func.docstring = doc_comment_before(tree, anchor, DocStyle::JsDoc);
        func.is_async = has_async_token(tree, node);
        func.decorators = decorators(tree, node);
        Ok(func)
    }

    fn parameters(&self, node: NodeId) -> Vec<String> {
        let tree = self.tree;
        if let Some(single) = tree.child_by_field(node, "parameter") {
            return vec![tree.text(single).to_string()];
        }
        let Some(params) = tree.child_by_field(node, "parameters") else {
            return Vec::new();
        };
        let mut names = Vec::new();
        for param in tree.named_children(params) {
            let name = match tree.kind(param) {
                "comment" | "decorator" => continue,
                "assignment_pattern" => tree
                    .child_by_field(param, "left")
                    .map(|l| tree.text(l).to_string()),
                "required_parameter" | "optional_parameter" => typescript::parameter_name(tree, param),
                // identifier, rest_pattern, object_pattern, array_pattern
                _ => Some(tree.text(param).to_string()),
            };
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                names.push(name);
            }
        }
        names
    }

    fn class(&self, node: NodeId, anchor: NodeId) -> anyhow::Result<TypeSymbol> {
        let tree = self.tree;
        let name = tree
            .child_by_field(node, "name")
            .map(|n| tree.text(n).to_string())
            .unwrap_or_default();
        let body = required_field(tree, node, "body")?;

        let mut class = TypeSymbol::new(name, TypeKind::Class, tree.start_line(node), tree.end_line(node));
        class.docstring = doc_comment_before(tree, anchor, DocStyle::JsDoc);
        class.decorators = decorators(tree, node);
        if let Some(heritage) = tree.child_of_kind(node, "class_heritage") {
            class.bases = heritage_names(tree, heritage);
        }

        for member in tree.named_children(body) {
            let method = match tree.kind(member) {
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    required_name(tree, member).and_then(|name| self.function(member, name, member))
                }
                "field_definition" | "public_field_definition" => {
                    let value = tree.child_by_field(member, "value");
                    let Some(value) = value.filter(|v| FUNCTION_VALUES.contains(&tree.kind(*v))) else {
                        continue;
                    };
                    let name = tree
                        .child_by_field(member, "property")
                        .or_else(|| tree.child_by_field(member, "name"))
                        .map(|n| tree.text(n).to_string())
                        .unwrap_or_default();
                    self.function(value, name, member).map(|mut f| {
                        f.start_line = tree.start_line(member);
                        f.decorators = decorators(tree, member);
                        f
                    })
                }
                _ => continue,
            };
            if let Some(m) = keep(self.parsed, member, method) {
                if !m.name.is_empty() {
                    class.methods.push(m);
                }
            }
        }
        if class.name.is_empty() {
            class.name = "default".to_string();
        }
        Ok(class)
    }

    fn imports_and_assigned_exports(&mut self) {
        let tree = self.tree;
        for node in tree.descendants(tree.root()) {
            let line = tree.start_line(node);
            match tree.kind(node) {
                "import_statement" => {
                    if let Some(record) = import_statement(tree, node) {
                        self.symbols.imports.push(record);
                    }
                }
                "export_statement" => {
                    let Some(source) = tree.child_by_field(node, "source") else {
                        continue;
                    };
                    let mut names = Vec::new();
                    if let Some(clause) = tree.child_of_kind(node, "export_clause") {
                        for spec in tree.named_children(clause) {
                            if let Some(n) = tree.child_by_field(spec, "name") {
                                names.push(unquote(tree.text(n)));
                            }
                        }
                    } else {
                        names.push("*".to_string());
                    }
                    self.symbols.imports.push(
                        ImportRecord::new(unquote(tree.text(source)), ImportKind::EsModule, line)
                            .with_names(names),
                    );
                }
                "call_expression" => {
                    if let Some(module) = required_module(tree, node) {
                        self.symbols
                            .imports
                            .push(ImportRecord::new(module, ImportKind::Require, line));
                    }
                }
                "assignment_expression" => {
                    if let Some(name) = assigned_export(tree, node) {
                        self.symbols.add_export(name);
                    }
                }
                _ => {}
            }
        }
    }
}

fn import_statement(tree: &SyntaxTree, node: NodeId) -> Option<ImportRecord> {
    let line = tree.start_line(node);
    if let Some(require) = tree.child_of_kind(node, "import_require_clause") {
        // import fs = require("fs")
        let source = tree.child_by_field(require, "source")?;
        let alias = tree.named_children(require).find(|c| tree.kind(*c) == "identifier");
        let names = alias.map(|a| vec![tree.text(a).to_string()]).unwrap_or_default();
        return Some(ImportRecord::new(unquote(tree.text(source)), ImportKind::Require, line).with_names(names));
    }

    let source = tree.child_by_field(node, "source")?;
    let mut names = Vec::new();
    if let Some(clause) = tree.child_of_kind(node, "import_clause") {
        for part in tree.named_children(clause) {
            match tree.kind(part) {
                "identifier" => names.push(tree.text(part).to_string()),
                "namespace_import" => names.push("*".to_string()),
                "named_imports" => {
                    for spec in tree.named_children(part) {
                        if let Some(n) = tree.child_by_field(spec, "name") {
                            names.push(unquote(tree.text(n)));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Some(ImportRecord::new(unquote(tree.text(source)), ImportKind::EsModule, line).with_names(names))
}

/// Module of `require("x")` or `import("x")` with a literal argument.
fn required_module(tree: &SyntaxTree, call: NodeId) -> Option<String> {
    let function = tree.child_by_field(call, "function")?;
    let is_loader = match tree.kind(function) {
        "import" => true,
        "identifier" => tree.text(function) == "require",
        _ => false,
    };
    if !is_loader {
        return None;
    }
    let args = tree.child_by_field(call, "arguments")?;
    let first = tree.named_children(args).next()?;
    // template literals with substitutions are dynamic
    let literal = match tree.kind(first) {
        "string" => true,
        "template_string" => !tree.has_child_kind(first, "template_substitution"),
        _ => false,
    };
    literal.then(|| unquote(tree.text(first)))
}

/// Name assigned through `exports.x = ...` or `module.exports.x = ...`.
fn assigned_export(tree: &SyntaxTree, assignment: NodeId) -> Option<String> {
    let left = tree.child_by_field(assignment, "left")?;
    if tree.kind(left) != "member_expression" {
        return None;
    }
    let object = tree.child_by_field(left, "object")?;
    if !matches!(tree.text(object), "exports" | "module.exports") {
        return None;
    }
    let property = tree.child_by_field(left, "property")?;
    Some(tree.text(property).to_string())
}

/// Names introduced by an exported declaration.
fn declared_names(tree: &SyntaxTree, decl: NodeId) -> Vec<String> {
    match tree.kind(decl) {
        "lexical_declaration" | "variable_declaration" => tree
            .named_children(decl)
            .filter_map(|d| tree.child_by_field(d, "name"))
            .filter(|n| tree.kind(*n) == "identifier")
            .map(|n| tree.text(n).to_string())
            .collect(),
        _ => tree
            .child_by_field(decl, "name")
            .map(|n| vec![tree.text(n).to_string()])
            .unwrap_or_default(),
    }
}

/// Base names from a `class_heritage` node.
pub(super) fn heritage_names(tree: &SyntaxTree, heritage: NodeId) -> Vec<String> {
    let mut bases = Vec::new();
    for part in tree.named_children(heritage) {
        match tree.kind(part) {
            "extends_clause" => {
                for value in tree.children_by_field(part, "value") {
                    push_unique(&mut bases, tree.text(value));
                }
            }
            "implements_clause" => {
                for ty in tree.named_children(part) {
                    push_unique(&mut bases, tree.text(ty));
                }
            }
            "comment" => {}
            // plain JavaScript: `extends <expression>`
            _ => push_unique(&mut bases, tree.text(part)),
        }
    }
    bases
}

/// Decorators attached to a declaration, including ones on an enclosing
/// `export` statement.
pub(super) fn decorators(tree: &SyntaxTree, node: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    match tree.parent(node).filter(|p| tree.kind(*p) == "export_statement") {
        Some(export) => {
            for d in tree.named_children(export).filter(|c| tree.kind(*c) == "decorator") {
                names.push(decorator_name(tree.text(d)));
            }
        }
        None => {
            // TypeScript class bodies hold member decorators as preceding siblings
            let mut cur = tree.prev_named_sibling(node);
            while let Some(sib) = cur.filter(|s| tree.kind(*s) == "decorator") {
                names.push(decorator_name(tree.text(sib)));
                cur = tree.prev_named_sibling(sib);
            }
            names.reverse();
        }
    }
    for d in tree.named_children(node).filter(|c| tree.kind(*c) == "decorator") {
        names.push(decorator_name(tree.text(d)));
    }
    names
}
