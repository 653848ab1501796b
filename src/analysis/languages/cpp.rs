//! C++ extractor.
//!
//! Runs the C declaration walker with the C++ additions: classes and their
//! base clauses, inline and declared member functions, out-of-class
//! `Type::method` definitions, transparent namespaces and templates.

use crate::analysis::common::{collapse_ws, keep, push_unique};
use crate::analysis::{FileSymbolSet, FunctionSymbol, LanguageExtractor};
use crate::parser::{LanguageId, NodeId, ParseResult, SyntaxTree};

use super::c::{function_declarator, CFamilyWalker, Dialect};

/// C++ extractor.
pub struct CppExtractor;

impl LanguageExtractor for CppExtractor {
    fn language(&self) -> LanguageId {
        LanguageId::Cpp
    }

    fn extract(&self, parsed: &ParseResult) -> FileSymbolSet {
        CFamilyWalker::new(parsed, Dialect::Cpp).run()
    }
}

/// The declaration wrapped by a `template <...>` header.
pub(super) fn template_inner(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.named_children(node)
        .filter(|c| {
            !matches!(
                tree.kind(*c),
                "template_parameter_list" | "requires_clause" | "comment"
            )
        })
        .last()
}

/// Owning type of a qualified definition: `ns::Stack<T>::push` gives `Stack`.
pub(super) fn qualified_owner(qualified: &str) -> Option<String> {
    let (owner, _) = qualified.rsplit_once("::")?;
    let owner = owner.rsplit("::").next().unwrap_or(owner);
    let owner = owner.split('<').next().unwrap_or(owner).trim();
    (!owner.is_empty()).then(|| owner.to_string())
}

pub(super) fn base_classes(tree: &SyntaxTree, spec: NodeId) -> Vec<String> {
    let mut bases = Vec::new();
    let Some(clause) = tree.child_of_kind(spec, "base_class_clause") else {
        return bases;
    };
    for base in tree.named_children(clause) {
        if matches!(
            tree.kind(base),
            "type_identifier" | "qualified_identifier" | "template_type"
        ) {
            push_unique(&mut bases, collapse_ws(tree.text(base)));
        }
    }
    bases
}

/// Member functions of a class body: inline definitions and declarations.
pub(super) fn members(walker: &CFamilyWalker<'_>, body: NodeId) -> Vec<FunctionSymbol> {
    let parsed = walker.parsed();
    let tree = &parsed.tree;
    let mut methods = Vec::new();

    for member in tree.named_children(body) {
        let node = if tree.kind(member) == "template_declaration" {
            match template_inner(tree, member) {
                Some(inner) => inner,
                None => continue,
            }
        } else {
            member
        };

        let is_method = match tree.kind(node) {
            "function_definition" => true,
            "field_declaration" | "declaration" => tree
                .child_by_field(node, "declarator")
                .and_then(|d| function_declarator(tree, d))
                .is_some(),
            _ => false,
        };
        if !is_method {
            continue;
        }
        if let Some((_, method)) = keep(parsed, node, walker.function(node, member)) {
            methods.push(method);
        }
    }
    methods
}

/// Attach an out-of-class definition, replacing the in-class declaration
/// with the same name and parameters.
pub(super) fn attach_definition(methods: &mut Vec<FunctionSymbol>, definition: FunctionSymbol) {
    let declared = methods
        .iter()
        .position(|m| m.name == definition.name && m.parameters == definition.parameters);
    match declared {
        Some(i) => methods[i] = definition,
        None => methods.push(definition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_owner() {
        assert_eq!(qualified_owner("Circle::area").as_deref(), Some("Circle"));
        assert_eq!(qualified_owner("geo::Stack<T>::push").as_deref(), Some("Stack"));
        assert_eq!(qualified_owner("draw"), None);
        assert_eq!(qualified_owner("::draw"), None);
    }

    #[cfg(feature = "lang-cpp")]
    mod parsed {
        use super::super::*;
        use crate::analysis::TypeKind;
        use crate::parser::LanguageRegistry;

        fn extract(source: &str) -> FileSymbolSet {
            let parsed = LanguageRegistry::default()
                .parse_source(LanguageId::Cpp, "shape.cpp", source.as_bytes().to_vec())
                .unwrap();
            CppExtractor.extract(&parsed)
        }

        const SOURCE: &str = r#"
#include <vector>
#include "shape.h"

namespace geo {

/// A 2D shape.
class Circle : public Shape, private Noncopyable {
public:
    Circle(double r) : r_(r) {}
    double area() const override;
    double scale(double factor) {
        return factor > 0 ? r_ * factor : 0;
    }
private:
    double r_;
};

double Circle::area() const {
    return 3.14 * r_ * r_;
}

template <typename T>
T clamp(T v, T lo, T hi) {
    return v < lo ? lo : (v > hi ? hi : v);
}

}  // namespace geo

void Widget::draw(const Canvas& canvas) {
    for (auto& item : canvas.items()) {
        try { render(item); } catch (...) {}
    }
}
"#;

        #[test]
        fn test_classes_and_members() {
            let symbols = extract(SOURCE);
            let circle = symbols.class("Circle").unwrap();
            assert_eq!(circle.kind, TypeKind::Class);
            assert_eq!(circle.bases, vec!["Shape", "Noncopyable"]);
            assert_eq!(circle.docstring.as_deref(), Some("A 2D shape."));

            let names: Vec<_> = circle.methods.iter().map(|m| m.name.as_str()).collect();
            assert_eq!(names, vec!["Circle", "area", "scale"]);
            assert_eq!(circle.method("Circle").unwrap().parameters, vec!["r"]);
            assert!(circle.method("Circle").unwrap().return_type.is_none());
            assert_eq!(circle.method("scale").unwrap().complexity, 2);

            // the definition replaces the declaration
            let area = circle.method("area").unwrap();
            assert!(area.start_line > circle.end_line);
        }

        #[test]
        fn test_namespaces_and_templates() {
            let symbols = extract(SOURCE);
            let clamp = symbols.function("clamp").unwrap();
            assert_eq!(clamp.parameters, vec!["v", "lo", "hi"]);
            assert_eq!(clamp.complexity, 3);
            assert_eq!(symbols.exports, vec!["Circle", "clamp"]);
        }

        #[test]
        fn test_out_of_class_definition_synthesizes_type() {
            let symbols = extract(SOURCE);
            assert!(symbols.function("draw").is_none());
            let widget = symbols.class("Widget").unwrap();
            let draw = widget.method("draw").unwrap();
            assert_eq!(draw.parameters, vec!["canvas"]);
            // range-for + catch
            assert_eq!(draw.complexity, 3);
        }

        #[test]
        fn test_includes() {
            let symbols = extract(SOURCE);
            assert_eq!(symbols.imports.len(), 2);
            assert_eq!(symbols.imports[0].module, "vector");
            assert!(!symbols.imports[0].is_relative);
            assert_eq!(symbols.imports[1].module, "shape.h");
            assert!(symbols.imports[1].is_relative);
        }
    }
}
