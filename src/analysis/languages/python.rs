//! Python extractor.
//!
//! Extracts:
//! - Functions and `async def` functions, with decorators and docstrings
//! - Classes with base classes and methods
//! - `import` and `from ... import` statements (relative forms included)
//! - Exports from `__all__`, or public top-level names

use crate::analysis::common::{
    body_docstring, clean_doc, decorator_name, has_async_token, keep, new_function,
    push_unique, required_field, required_name, unquote,
};
use crate::analysis::{
    FileSymbolSet, FunctionSymbol, ImportKind, ImportRecord, LanguageExtractor, TypeKind,
    TypeSymbol,
};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

/// Python extractor.
pub struct PythonExtractor;

impl PythonExtractor {
    /// Split a possibly decorated definition into (definition, decorators).
    fn unwrap_decorated(tree: &SyntaxTree, node: NodeId) -> (Option<NodeId>, Vec<String>) {
        if tree.kind(node) != "decorated_definition" {
            return (Some(node), Vec::new());
        }
        let decorators = tree
            .named_children(node)
            .filter(|c| tree.kind(*c) == "decorator")
            .map(|c| decorator_name(tree.text(c)))
            .collect();
        (tree.child_by_field(node, "definition"), decorators)
    }

    fn function(
        parsed: &ParseResult,
        node: NodeId,
        decorators: Vec<String>,
    ) -> anyhow::Result<FunctionSymbol> {
        let tree = &parsed.tree;
        let mut func = new_function(parsed, node, required_name(tree, node)?);
        func.parameters = Self::parameters(tree, required_field(tree, node, "parameters")?);
        func.return_type = tree
            .child_by_field(node, "return_type")
            .map(|t| tree.text(t).to_string());
        func.docstring = tree
            .child_by_field(node, "body")
            .and_then(|body| body_docstring(tree, body));
        func.is_async = has_async_token(tree, node);
        func.decorators = decorators;
        Ok(func)
    }

    fn parameters(tree: &SyntaxTree, params: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        for param in tree.named_children(params) {
            let name = match tree.kind(param) {
                "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    tree.text(param).to_string()
                }
                "typed_parameter" => tree
                    .named_children(param)
                    .next()
                    .map(|n| tree.text(n).to_string())
                    .unwrap_or_default(),
                "default_parameter" | "typed_default_parameter" => tree
                    .child_by_field(param, "name")
                    .map(|n| tree.text(n).to_string())
                    .unwrap_or_default(),
                // tuple parameters from Python 2 keep their pattern text
                "tuple_pattern" | "list_pattern" => tree.text(param).to_string(),
                // bare `*` and `/` separators
                _ => continue,
            };
            if !name.is_empty() {
                names.push(name);
            }
        }
        names
    }

    fn class(
        parsed: &ParseResult,
        node: NodeId,
        decorators: Vec<String>,
    ) -> anyhow::Result<TypeSymbol> {
        let tree = &parsed.tree;
        let name = required_name(tree, node)?;
        let body = required_field(tree, node, "body")?;
        let mut class = TypeSymbol::new(name, TypeKind::Class, tree.start_line(node), tree.end_line(node));
        class.decorators = decorators;
        class.docstring = body_docstring(tree, body);

        if let Some(supers) = tree.child_by_field(node, "superclasses") {
            for base in tree.named_children(supers) {
                // metaclass=..., total=False
                if matches!(tree.kind(base), "keyword_argument" | "comment") {
                    continue;
                }
                push_unique(&mut class.bases, tree.text(base));
            }
        }

        for child in tree.named_children(body) {
            let (def, method_decorators) = Self::unwrap_decorated(tree, child);
            let Some(def) = def else { continue };
            if tree.kind(def) == "function_definition" {
                if let Some(method) = keep(parsed, def, Self::function(parsed, def, method_decorators)) {
                    class.methods.push(method);
                }
            }
        }
        Ok(class)
    }

    fn imports(parsed: &ParseResult, symbols: &mut FileSymbolSet) {
        let tree = &parsed.tree;
        for node in tree.descendants(tree.root()) {
            let line = tree.start_line(node);
            match tree.kind(node) {
                "import_statement" => {
                    for name in tree.children_by_field(node, "name") {
                        let module = match tree.kind(name) {
                            "aliased_import" => tree.child_by_field(name, "name").map(|n| tree.text(n)),
                            _ => Some(tree.text(name)),
                        };
                        if let Some(module) = module {
                            symbols.imports.push(ImportRecord::new(module, ImportKind::Import, line));
                        }
                    }
                }
                "import_from_statement" => {
                    if let Some(record) = keep(parsed, node, Self::from_import(tree, node)) {
                        symbols.imports.push(record);
                    }
                }
                _ => {}
            }
        }
    }

    fn from_import(tree: &SyntaxTree, node: NodeId) -> anyhow::Result<ImportRecord> {
        let module = tree.text(required_field(tree, node, "module_name")?).to_string();
        let mut names = Vec::new();
        if tree.has_child_kind(node, "wildcard_import") {
            names.push("*".to_string());
        }
        for name in tree.children_by_field(node, "name") {
            let imported = match tree.kind(name) {
                "aliased_import" => tree.child_by_field(name, "name").map(|n| tree.text(n)),
                _ => Some(tree.text(name)),
            };
            if let Some(imported) = imported {
                names.push(imported.to_string());
            }
        }
        Ok(ImportRecord::new(module, ImportKind::FromImport, tree.start_line(node)).with_names(names))
    }

    /// Names listed in a module-level `__all__` assignment, if any.
    fn dunder_all(tree: &SyntaxTree) -> Option<Vec<String>> {
        for stmt in tree.named_children(tree.root()) {
            if tree.kind(stmt) != "expression_statement" {
                continue;
            }
            let Some(assign) = tree.named_children(stmt).next() else {
                continue;
            };
            if tree.kind(assign) != "assignment" {
                continue;
            }
            let is_all = tree
                .child_by_field(assign, "left")
                .map(|l| tree.text(l) == "__all__")
                .unwrap_or(false);
            if !is_all {
                continue;
            }
            let right = tree.child_by_field(assign, "right")?;
            let names = tree
                .named_children(right)
                .filter(|c| tree.kind(*c) == "string")
                .filter_map(|c| clean_doc(tree.text(c)).or_else(|| Some(unquote(tree.text(c)))))
                .collect();
            return Some(names);
        }
        None
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::Python
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        let tree = &parsed.tree;
        let mut symbols = FileSymbolSet::empty(LanguageId::Python);

        for child in tree.named_children(tree.root()) {
            let (def, decorators) = Self::unwrap_decorated(tree, child);
            let Some(def) = def else { continue };
            match tree.kind(def) {
                "function_definition" => {
                    if let Some(f) = keep(parsed, def, Self::function(parsed, def, decorators)) {
                        symbols.functions.push(f);
                    }
                }
                "class_definition" => {
                    if let Some(c) = keep(parsed, def, Self::class(parsed, def, decorators)) {
                        symbols.classes.push(c);
                    }
                }
                _ => {}
            }
        }

        Self::imports(parsed, &mut symbols);

        match Self::dunder_all(tree) {
            Some(names) => names.into_iter().for_each(|n| symbols.add_export(n)),
            None => {
                let public: Vec<String> = symbols
                    .functions
                    .iter()
                    .map(|f| f.name.clone())
                    .chain(symbols.classes.iter().map(|c| c.name.clone()))
                    .filter(|n| !n.starts_with('_'))
                    .collect();
                public.into_iter().for_each(|n| symbols.add_export(n));
            }
        }

        symbols
    }
}
