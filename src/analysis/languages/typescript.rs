//! TypeScript and TSX extractor.
//!
//! Shares the ECMAScript walker with the JavaScript extractor and adds the
//! typed constructs: return-type annotations, typed and optional
//! parameters, `implements` clauses, abstract classes, interfaces and enums.

use crate::analysis::common::{
    collapse_ws, doc_comment_before, new_function, push_unique, required_field, required_name,
    DocStyle,
};
use crate::analysis::{FileSymbolSet, LanguageExtractor, TypeKind, TypeSymbol};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

use super::javascript::{decorators, Dialect, EsWalker};

/// TypeScript extractor. Also serves `.tsx` files.
pub struct TypeScriptExtractor;

impl LanguageExtractor for TypeScriptExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::TypeScript
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        EsWalker::new(parsed, Dialect::TypeScript).run()
    }
}

/// Type text of a `: T` annotation.
pub(super) fn annotation_text(tree: &SyntaxTree, annotation: NodeId) -> Option<String> {
    let text = tree.text(annotation).trim().trim_start_matches(':');
    let text = collapse_ws(text);
    (!text.is_empty()).then_some(text)
}

/// Name of a `required_parameter` or `optional_parameter`.
///
/// Rest parameters keep their `...` prefix; destructured patterns keep
/// their pattern text.
pub(super) fn parameter_name(tree: &SyntaxTree, param: NodeId) -> Option<String> {
    let pattern = tree.child_by_field(param, "pattern").or_else(|| {
        tree.named_children(param)
            .find(|c| !matches!(tree.kind(*c), "accessibility_modifier" | "override_modifier" | "decorator"))
    })?;
    Some(collapse_ws(tree.text(pattern)))
}

pub(super) fn interface(parsed: &ParseResult, node: NodeId, anchor: NodeId) -> anyhow::Result<TypeSymbol> {
    let tree = &parsed.tree;
    let name = required_name(tree, node)?;
    let body = required_field(tree, node, "body")?;

    let mut iface = TypeSymbol::new(name, TypeKind::Interface, tree.start_line(node), tree.end_line(node));
    iface.docstring = doc_comment_before(tree, anchor, DocStyle::JsDoc);
    if let Some(extends) = tree.child_of_kind(node, "extends_type_clause") {
        for ty in tree.named_children(extends) {
            push_unique(&mut iface.bases, tree.text(ty));
        }
    }

    for member in tree.named_children(body) {
        if tree.kind(member) != "method_signature" {
            continue;
        }
        let Some(name) = tree.child_by_field(member, "name") else {
            continue;
        };
        let mut method = new_function(parsed, member, tree.text(name).to_string());
        method.parameters = signature_parameters(tree, member);
        method.return_type = tree
            .child_by_field(member, "return_type")
            .and_then(|t| annotation_text(tree, t));
        method.docstring = doc_comment_before(tree, member, DocStyle::JsDoc);
        iface.methods.push(method);
    }
    Ok(iface)
}

fn signature_parameters(tree: &SyntaxTree, signature: NodeId) -> Vec<String> {
    let Some(params) = tree.child_by_field(signature, "parameters") else {
        return Vec::new();
    };
    tree.named_children(params)
        .filter(|p| matches!(tree.kind(*p), "required_parameter" | "optional_parameter"))
        .filter_map(|p| parameter_name(tree, p))
        .collect()
}

pub(super) fn enumeration(parsed: &ParseResult, node: NodeId, anchor: NodeId) -> anyhow::Result<TypeSymbol> {
    let tree = &parsed.tree;
    let name = required_name(tree, node)?;
    let mut e = TypeSymbol::new(name, TypeKind::Enum, tree.start_line(node), tree.end_line(node));
    e.docstring = doc_comment_before(tree, anchor, DocStyle::JsDoc);
    e.decorators = decorators(tree, node);
    Ok(e)
}

#[cfg(test)]
#[cfg(feature = "lang-typescript")]
mod tests {
    use super::*;
    use crate::analysis::ImportKind;
    use crate::parser::LanguageRegistry;

    fn extract_as(language: LanguageId, source: &str) -> FileSymbolSet {
        let parsed = LanguageRegistry::default()
            .parse_source(language, "test.ts", source.as_bytes().to_vec())
            .unwrap();
        TypeScriptExtractor.extract(&parsed)
    }

    fn extract(source: &str) -> FileSymbolSet {
        extract_as(LanguageId::TypeScript, source)
    }

    #[test]
    fn test_typed_functions() {
        let source = r#"
/** Loads a user by id. */
export async function loadUser(id: string, opts?: Options, ...rest: number[]): Promise<User> {
  return id && opts ? fetchUser(id) : null;
}

const sum = (a: number, b: number): number => a + b;
"#;
        let symbols = extract(source);
        let load = symbols.function("loadUser").unwrap();
        assert!(load.is_async);
        assert_eq!(load.parameters, vec!["id", "opts", "...rest"]);
        assert_eq!(load.return_type.as_deref(), Some("Promise<User>"));
        assert_eq!(load.docstring.as_deref(), Some("Loads a user by id."));
        // && and the ternary
        assert_eq!(load.complexity, 3);

        let sum = symbols.function("sum").unwrap();
        assert_eq!(sum.return_type.as_deref(), Some("number"));
        assert_eq!(symbols.exports, vec!["loadUser"]);
    }

    #[test]
    fn test_classes_with_heritage_and_decorators() {
        let source = r#"
@Component({ selector: "app" })
export class AppComponent extends Base implements OnInit, OnDestroy {
  constructor(private readonly service: Service) { super(); }

  @Input()
  ngOnInit(): void {}

  ngOnDestroy(): void {}
}

abstract class Shape {
  abstract area(): number;
}
"#;
        let symbols = extract(source);
        let app = symbols.class("AppComponent").unwrap();
        assert_eq!(app.bases, vec!["Base", "OnInit", "OnDestroy"]);
        assert_eq!(app.decorators, vec!["Component"]);
        let names: Vec<_> = app.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["constructor", "ngOnInit", "ngOnDestroy"]);
        assert_eq!(app.method("constructor").unwrap().parameters, vec!["service"]);
        assert_eq!(app.method("ngOnInit").unwrap().decorators, vec!["Input"]);
        assert_eq!(app.method("ngOnInit").unwrap().return_type.as_deref(), Some("void"));

        let shape = symbols.class("Shape").unwrap();
        assert_eq!(shape.method("area").unwrap().complexity, 1);
    }

    #[test]
    fn test_interfaces_and_enums() {
        let source = r#"
/** A repository. */
interface Repo<T> extends Reader<T>, Writer {
  find(id: string): T;
  save(item: T, force?: boolean): void;
  name: string;
}

enum Color { Red, Green }
"#;
        let symbols = extract(source);
        let repo = symbols.class("Repo").unwrap();
        assert_eq!(repo.kind, TypeKind::Interface);
        assert_eq!(repo.bases, vec!["Reader<T>", "Writer"]);
        assert_eq!(repo.docstring.as_deref(), Some("A repository."));
        assert_eq!(repo.methods.len(), 2);
        assert_eq!(repo.method("save").unwrap().parameters, vec!["item", "force"]);

        let color = symbols.class("Color").unwrap();
        assert_eq!(color.kind, TypeKind::Enum);
    }

    #[test]
    fn test_imports() {
        let source = r#"
import type { Config } from "./config";
import fs = require("fs");
import { api } from "@org/client/api";
"#;
        let symbols = extract(source);
        assert_eq!(symbols.imports.len(), 3);
        assert_eq!(symbols.imports[0].module, "./config");
        assert!(symbols.imports[0].is_relative);
        assert_eq!(symbols.imports[1].kind, ImportKind::Require);
        assert_eq!(symbols.imports[1].names, vec!["fs"]);
        assert_eq!(symbols.imports[2].module, "@org/client/api");
    }

    #[test]
    fn test_tsx_component() {
        let source = r#"
export function Button({ label }: Props) {
  return <button>{label ? label : "ok"}</button>;
}
"#;
        let symbols = extract_as(LanguageId::Tsx, source);
        let button = symbols.function("Button").unwrap();
        assert_eq!(button.parameters, vec!["{ label }"]);
        assert_eq!(button.complexity, 2);
    }
}
