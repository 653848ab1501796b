//! Canonical symbol model shared by every language extractor.
//!
//! All records derive serde traits so a persistence layer can round-trip
//! them without loss.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::LanguageId;

/// A function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    /// Flat parameter names. Rest/variadic parameters keep their marker
    /// (`*args`, `**kwargs`, `...rest`, `&block`).
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub docstring: Option<String>,
    /// 1-indexed, inclusive.
    pub start_line: usize,
    /// 1-indexed, inclusive.
    pub end_line: usize,
    /// Cyclomatic complexity, always at least 1.
    pub complexity: u32,
    pub is_async: bool,
    /// Decorator or annotation names without their marker character.
    pub decorators: Vec<String>,
}

/// What kind of type-level unit a [`TypeSymbol`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Trait,
    Enum,
    Module,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Trait => "trait",
            TypeKind::Enum => "enum",
            TypeKind::Module => "module",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A class, struct, interface, trait, enum or module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSymbol {
    pub name: String,
    pub kind: TypeKind,
    pub methods: Vec<FunctionSymbol>,
    /// Base classes, implemented interfaces, embedded types or mixins.
    pub bases: Vec<String>,
    pub docstring: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub decorators: Vec<String>,
}

impl TypeSymbol {
    pub fn new(name: impl Into<String>, kind: TypeKind, start_line: usize, end_line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            methods: Vec::new(),
            bases: Vec::new(),
            docstring: None,
            start_line,
            end_line,
            decorators: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&FunctionSymbol> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Syntax used by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// Whole-module import (`import x`, `use a::b`, `#include`).
    Import,
    /// Selective import from a module (`from x import y`).
    FromImport,
    /// Call with a literal argument (`require("x")`, `import("x")`).
    Require,
    /// ECMAScript `import ... from` or `export ... from`.
    EsModule,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Import => "import",
            ImportKind::FromImport => "from_import",
            ImportKind::Require => "require",
            ImportKind::EsModule => "es_module",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One import statement (or one module of a grouped import).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Module or path text as written, quotes removed.
    pub module: String,
    /// Specifically imported names; empty for whole-module imports.
    pub names: Vec<String>,
    pub is_relative: bool,
    pub kind: ImportKind,
    pub line: usize,
}

impl ImportRecord {
    pub fn new(module: impl Into<String>, kind: ImportKind, line: usize) -> Self {
        let module = module.into();
        let is_relative = module.starts_with('.') || module.starts_with('/');
        Self {
            module,
            names: Vec::new(),
            is_relative,
            kind,
            line,
        }
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn relative(mut self, is_relative: bool) -> Self {
        self.is_relative = is_relative;
        self
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSymbolSet {
    pub language: LanguageId,
    /// Top-level functions only. Methods live on their type.
    pub functions: Vec<FunctionSymbol>,
    pub classes: Vec<TypeSymbol>,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<String>,
    pub has_parse_errors: bool,
}

impl FileSymbolSet {
    /// An empty symbol set.
    pub fn empty(language: LanguageId) -> Self {
        Self {
            language,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            has_parse_errors: false,
        }
    }

    /// Top-level functions followed by every method of every type.
    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionSymbol> {
        self.functions
            .iter()
            .chain(self.classes.iter().flat_map(|c| c.methods.iter()))
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSymbol> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&TypeSymbol> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Find a type by name, creating a placeholder spanning `lines` when
    /// the type is declared elsewhere (Go receivers, Rust impls, C++
    /// out-of-class definitions).
    pub(crate) fn class_entry(
        &mut self,
        name: &str,
        kind: TypeKind,
        lines: (usize, usize),
    ) -> &mut TypeSymbol {
        let index = match self.classes.iter().position(|c| c.name == name) {
            Some(i) => i,
            None => {
                self.classes.push(TypeSymbol::new(name, kind, lines.0, lines.1));
                self.classes.len() - 1
            }
        };
        &mut self.classes[index]
    }

    pub(crate) fn add_export(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() && !self.exports.contains(&name) {
            self.exports.push(name);
        }
    }
}
