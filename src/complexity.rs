//! Cyclomatic complexity and nesting depth over the arena tree.
//!
//! CC = 1 + decision points, where a decision point is any node in the
//! function's subtree whose kind is in the language's decision set:
//! branches, loops, exception clauses, multi-way arms, ternaries and the
//! logical `&&` / `||` / `and` / `or` operators.

use serde::{Deserialize, Serialize};

use crate::analysis::FileSymbolSet;
use crate::parser::{LanguageId, NodeId, SyntaxTree};

/// Functions above this complexity are flagged as high complexity.
pub const HIGH_COMPLEXITY_THRESHOLD: u32 = 10;

/// Functions below this complexity are flagged as trivial.
pub const TRIVIAL_COMPLEXITY_THRESHOLD: u32 = 2;

/// Node kinds holding an operator that only counts when it is logical.
const BINARY_KINDS: &[&str] = &["binary_expression", "boolean_operator", "binary"];

const LOGICAL_OPERATORS: &[&str] = &["&&", "||", "and", "or"];

const PYTHON_DECISIONS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
    "conditional_expression",
    "case_clause",
    "for_in_clause",
    "if_clause",
    "boolean_operator",
];

const JS_DECISIONS: &[&str] = &[
    "if_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "catch_clause",
    "ternary_expression",
    "switch_case",
    "binary_expression",
];

const JAVA_DECISIONS: &[&str] = &[
    "if_statement",
    "for_statement",
    "enhanced_for_statement",
    "while_statement",
    "do_statement",
    "catch_clause",
    "ternary_expression",
    "switch_label",
    "binary_expression",
];

const GO_DECISIONS: &[&str] = &[
    "if_statement",
    "for_statement",
    "expression_case",
    "type_case",
    "communication_case",
    "binary_expression",
];

const RUST_DECISIONS: &[&str] = &[
    "if_expression",
    "for_expression",
    "while_expression",
    "match_arm",
    "binary_expression",
];

const C_DECISIONS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "do_statement",
    "case_statement",
    "conditional_expression",
    "binary_expression",
];

const CPP_DECISIONS: &[&str] = &[
    "if_statement",
    "for_statement",
    "for_range_loop",
    "while_statement",
    "do_statement",
    "case_statement",
    "catch_clause",
    "conditional_expression",
    "binary_expression",
];

const RUBY_DECISIONS: &[&str] = &[
    "if",
    "elsif",
    "unless",
    "while",
    "until",
    "for",
    "if_modifier",
    "unless_modifier",
    "while_modifier",
    "until_modifier",
    "rescue",
    "rescue_modifier",
    "when",
    "in_clause",
    "conditional",
    "binary",
];

/// Node kinds that open a nesting level, shared by all languages.
const NESTING_KINDS: &[&str] = &[
    // conditionals
    "if_statement",
    "if_expression",
    "if",
    "unless",
    "conditional_expression",
    "ternary_expression",
    // loops
    "for_statement",
    "for_in_statement",
    "enhanced_for_statement",
    "for_range_loop",
    "for_expression",
    "for",
    "while_statement",
    "while_expression",
    "while",
    "until",
    "do_statement",
    "loop_expression",
    // multi-way arms
    "switch_case",
    "switch_block_statement_group",
    "switch_rule",
    "case_statement",
    "expression_case",
    "type_case",
    "communication_case",
    "case_clause",
    "when",
    "match_arm",
    // exception handling
    "try_statement",
    "catch_clause",
    "except_clause",
    "begin",
    "rescue",
];

/// Decision-node kinds for a language.
pub fn decision_kinds(language: LanguageId) -> &'static [&'static str] {
    match language.extractor_family() {
        LanguageId::Python => PYTHON_DECISIONS,
        LanguageId::JavaScript | LanguageId::TypeScript => JS_DECISIONS,
        LanguageId::Java => JAVA_DECISIONS,
        LanguageId::Go => GO_DECISIONS,
        LanguageId::Rust => RUST_DECISIONS,
        LanguageId::C => C_DECISIONS,
        LanguageId::Cpp => CPP_DECISIONS,
        LanguageId::Ruby => RUBY_DECISIONS,
        _ => &[],
    }
}

/// Cyclomatic complexity of the subtree rooted at `node` (node included).
pub fn cyclomatic(tree: &SyntaxTree, node: NodeId, language: LanguageId) -> u32 {
    let kinds = decision_kinds(language);
    let decisions = tree
        .descendants(node)
        .filter(|id| is_decision(tree, *id, kinds))
        .count();
    1 + decisions as u32
}

fn is_decision(tree: &SyntaxTree, id: NodeId, kinds: &[&str]) -> bool {
    let node = tree.node(id);
    let kind = node.kind;
    // keyword tokens such as Ruby's `if` share the statement's kind name
    if !node.is_named || !kinds.contains(&kind) {
        return false;
    }
    if BINARY_KINDS.contains(&kind) {
        return is_logical_operator(tree, id);
    }
    !is_default_arm(tree, id)
}

/// A `default:` arm is the fall-through path, not a decision. Java and the
/// C family reuse their case node kinds for it; the other grammars give it
/// a kind outside the decision sets.
fn is_default_arm(tree: &SyntaxTree, id: NodeId) -> bool {
    match tree.kind(id) {
        "switch_label" => tree.text(id).trim_start().starts_with("default"),
        "case_statement" => tree.child_by_field(id, "value").is_none(),
        _ => false,
    }
}

fn is_logical_operator(tree: &SyntaxTree, id: NodeId) -> bool {
    let operator = tree
        .child_by_field(id, "operator")
        .or_else(|| tree.children(id).iter().copied().find(|c| !tree.node(*c).is_named));
    operator
        .map(|op| LOGICAL_OPERATORS.contains(&tree.text(op)))
        .unwrap_or(false)
}

/// Maximum lineage depth of nesting constructs below `node`.
///
/// Siblings do not accumulate. Every nesting construct on the path from
/// `node` adds a level, including an `if` reached through an else branch.
pub fn nesting_depth(tree: &SyntaxTree, node: NodeId) -> u32 {
    let mut max_depth = 0;
    let mut stack = vec![(node, 0u32)];
    while let Some((id, depth)) = stack.pop() {
        let depth = if opens_nesting(tree, id) { depth + 1 } else { depth };
        max_depth = max_depth.max(depth);
        for child in tree.children(id) {
            stack.push((*child, depth));
        }
    }
    max_depth
}

fn opens_nesting(tree: &SyntaxTree, id: NodeId) -> bool {
    let node = tree.node(id);
    node.is_named && NESTING_KINDS.contains(&node.kind)
}

pub fn flag_high_complexity(value: u32) -> bool {
    value > HIGH_COMPLEXITY_THRESHOLD
}

pub fn flag_trivial(value: u32) -> bool {
    value < TRIVIAL_COMPLEXITY_THRESHOLD
}

/// File-level complexity statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub function_count: usize,
    /// Mean complexity, rounded to 2 decimals.
    pub average: f64,
    pub max: u32,
    pub min: u32,
    pub high_complexity_count: usize,
    pub trivial_count: usize,
    /// Sum of `complexity - 1` over all functions.
    pub total_decision_points: u32,
}

/// Complexity of one function, with its owning type for methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionComplexity {
    pub name: String,
    pub owner: Option<String>,
    pub line: usize,
    pub complexity: u32,
}

/// Aggregate complexity over every top-level function and every method.
pub fn analyze_file(symbols: &FileSymbolSet) -> ComplexityMetrics {
    let values: Vec<u32> = symbols.all_functions().map(|f| f.complexity).collect();
    if values.is_empty() {
        return ComplexityMetrics::default();
    }

    let total: u64 = values.iter().map(|v| u64::from(*v)).sum();
    ComplexityMetrics {
        function_count: values.len(),
        average: round2(total as f64 / values.len() as f64),
        max: values.iter().copied().max().unwrap_or(0),
        min: values.iter().copied().min().unwrap_or(0),
        high_complexity_count: values.iter().filter(|v| flag_high_complexity(**v)).count(),
        trivial_count: values.iter().filter(|v| flag_trivial(**v)).count(),
        total_decision_points: values.iter().map(|v| v.saturating_sub(1)).sum(),
    }
}

/// Per-function listing, highest complexity first (stable for ties).
pub fn function_complexities(symbols: &FileSymbolSet) -> Vec<FunctionComplexity> {
    let mut out: Vec<FunctionComplexity> = symbols
        .functions
        .iter()
        .map(|f| (None, f))
        .chain(
            symbols
                .classes
                .iter()
                .flat_map(|c| c.methods.iter().map(move |m| (Some(c.name.clone()), m))),
        )
        .map(|(owner, f)| FunctionComplexity {
            name: f.name.clone(),
            owner,
            line: f.start_line,
            complexity: f.complexity,
        })
        .collect();
    out.sort_by(|a, b| b.complexity.cmp(&a.complexity));
    out
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FunctionSymbol, TypeKind, TypeSymbol};

    fn func(name: &str, complexity: u32) -> FunctionSymbol {
        FunctionSymbol {
            name: name.to_string(),
            parameters: vec![],
            return_type: None,
            docstring: None,
            start_line: 1,
            end_line: 2,
            complexity,
            is_async: false,
            decorators: vec![],
        }
    }

    #[test]
    fn test_flags() {
        assert!(flag_high_complexity(11));
        assert!(!flag_high_complexity(10));
        assert!(flag_trivial(1));
        assert!(!flag_trivial(2));
    }

    #[test]
    fn test_empty_file_metrics() {
        let metrics = analyze_file(&FileSymbolSet::empty(LanguageId::Python));
        assert_eq!(metrics, ComplexityMetrics::default());
        assert_eq!(metrics.average, 0.0);
        assert_eq!(metrics.max, 0);
        assert_eq!(metrics.min, 0);
    }

    #[test]
    fn test_analyze_file_includes_methods() {
        let mut set = FileSymbolSet::empty(LanguageId::Java);
        set.functions.push(func("a", 1));
        set.functions.push(func("b", 12));
        let mut class = TypeSymbol::new("C", TypeKind::Class, 1, 20);
        class.methods.push(func("m", 3));
        set.classes.push(class);

        let metrics = analyze_file(&set);
        assert_eq!(metrics.function_count, 3);
        assert_eq!(metrics.average, 5.33);
        assert_eq!(metrics.max, 12);
        assert_eq!(metrics.min, 1);
        assert_eq!(metrics.high_complexity_count, 1);
        assert_eq!(metrics.trivial_count, 1);
        assert_eq!(metrics.total_decision_points, 13);
    }

    #[test]
    fn test_function_complexities_sorted() {
        let mut set = FileSymbolSet::empty(LanguageId::Go);
        set.functions.push(func("low", 1));
        let mut class = TypeSymbol::new("S", TypeKind::Struct, 1, 9);
        class.methods.push(func("high", 7));
        set.classes.push(class);

        let listing = function_complexities(&set);
        assert_eq!(listing[0].name, "high");
        assert_eq!(listing[0].owner.as_deref(), Some("S"));
        assert_eq!(listing[1].owner, None);
    }

    #[cfg(feature = "all-languages")]
    mod parsed {
        use super::*;
        use crate::parser::LanguageRegistry;

        fn parse(language: LanguageId, src: &str) -> crate::parser::ParseResult {
            LanguageRegistry::default()
                .parse_source(language, "test", src.as_bytes().to_vec())
                .unwrap()
        }

        #[test]
        fn test_straight_line_is_one() {
            let result = parse(LanguageId::Python, "def f(a, b):\n    c = a + b\n    return c * 2\n");
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::Python), 1);
        }

        #[test]
        fn test_independent_branches() {
            let src = r#"
def f(x):
    if x > 1:
        pass
    if x > 2:
        pass
    if x > 3:
        pass
"#;
            let result = parse(LanguageId::Python, src);
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::Python), 4);
        }

        #[test]
        fn test_comparison_operators_not_counted() {
            let src = "function f(a, b) { return a + b > 3 && a !== b || b < 0; }";
            let result = parse(LanguageId::JavaScript, src);
            // one && and one ||
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::JavaScript), 3);
        }

        #[test]
        fn test_python_boolean_operators() {
            let result = parse(LanguageId::Python, "def f(a, b):\n    return a and b or not a\n");
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::Python), 3);
        }

        #[test]
        fn test_go_switch_cases() {
            let src = r#"
package main

func f(x int) int {
    switch x {
    case 1:
        return 1
    case 2:
        return 2
    default:
        return 0
    }
}
"#;
            let result = parse(LanguageId::Go, src);
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::Go), 3);
        }

        #[test]
        fn test_default_arm_not_counted_in_java_and_c() {
            let java = r#"
class A {
    int f(int x) {
        switch (x) {
            case 1: return 1;
            case 2: return 2;
            default: return 0;
        }
    }
}
"#;
            let result = parse(LanguageId::Java, java);
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::Java), 3);

            let c = "int f(int x) {\n  switch (x) {\n  case 1: return 1;\n  case 2: return 2;\n  default: return 0;\n  }\n}\n";
            let result = parse(LanguageId::C, c);
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::C), 3);
        }

        #[test]
        fn test_js_default_arm_not_counted() {
            let src = "function f(x) { switch (x) { case 1: return 1; case 2: return 2; default: return 0; } }";
            let result = parse(LanguageId::JavaScript, src);
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::JavaScript), 3);
        }

        #[test]
        fn test_nesting_four_levels() {
            let src = r#"
def f(a, b, c, d):
    if a:
        if b:
            if c:
                if d:
                    return 1
    return 0
"#;
            let result = parse(LanguageId::Python, src);
            assert_eq!(nesting_depth(&result.tree, result.root()), 4);
        }

        #[test]
        fn test_nesting_zero() {
            let result = parse(LanguageId::Python, "def f():\n    return 1\n");
            assert_eq!(nesting_depth(&result.tree, result.root()), 0);
        }

        #[test]
        fn test_siblings_do_not_accumulate() {
            let src = r#"
function f(a) {
    if (a) { g(); }
    for (;;) { break; }
    while (a) { if (a) { h(); } }
}
"#;
            let result = parse(LanguageId::JavaScript, src);
            assert_eq!(nesting_depth(&result.tree, result.root()), 2);
        }

        #[test]
        fn test_else_if_chain_follows_lineage() {
            let src = "function f(a) { if (a == 1) { x(); } else if (a == 2) { y(); } else if (a == 3) { z(); } }";
            let result = parse(LanguageId::JavaScript, src);
            // each `else if` is a child of the previous `if`
            assert_eq!(nesting_depth(&result.tree, result.root()), 3);
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::JavaScript), 4);
        }

        #[test]
        fn test_if_inside_else_if_body() {
            let src = "function f(a, b, c) { if (a) {} else if (b) { if (c) {} } }";
            let result = parse(LanguageId::JavaScript, src);
            assert_eq!(nesting_depth(&result.tree, result.root()), 3);
        }

        #[test]
        fn test_python_elif_clause_adds_no_level() {
            let src = "def f(a):\n    if a == 1:\n        pass\n    elif a == 2:\n        pass\n    else:\n        pass\n";
            let result = parse(LanguageId::Python, src);
            assert_eq!(nesting_depth(&result.tree, result.root()), 1);
        }

        #[test]
        fn test_ruby_unless_and_rescue() {
            let src = r#"
def f(x)
  return 0 unless x
  begin
    g(x)
  rescue StandardError
    1
  end
end
"#;
            let result = parse(LanguageId::Ruby, src);
            assert_eq!(cyclomatic(&result.tree, result.root(), LanguageId::Ruby), 3);
        }
    }
}
