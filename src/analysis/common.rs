//! Helpers shared by every language extractor.

use anyhow::anyhow;
use lazy_static::lazy_static;
use regex::Regex;

use crate::complexity;
use crate::parser::{NodeId, ParseResult, SyntaxTree};

use super::FunctionSymbol;

lazy_static! {
    static ref LEADING_MARKER: Regex = Regex::new(r"^(?:/\*+!?|//[/!]?|#+|\*+)").unwrap();
    static ref TRAILING_CLOSE: Regex = Regex::new(r"\*+/\s*$").unwrap();
    static ref STRING_OPEN: Regex = Regex::new(r#"^[rRuUbBfF]{0,2}("""|'''|"|')"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const COMMENT_KINDS: &[&str] = &["comment", "line_comment", "block_comment"];

/// Which preceding comments count as documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocStyle {
    /// Only a `/** ... */` block directly above the node.
    JsDoc,
    /// Contiguous `///` lines or a `/** */` block.
    Rust,
    /// Any contiguous comment block with no blank line before the node.
    Adjacent,
}

/// Normalize documentation text.
///
/// Strips comment delimiters, string quotes and leading `*` markers, then
/// joins the remaining non-empty lines with single spaces.
pub fn clean_doc(raw: &str) -> Option<String> {
    let body = strip_string_quotes(raw.trim());
    let mut parts = Vec::new();
    for line in body.lines() {
        let without_close = TRAILING_CLOSE.replace(line, "");
        let without_open = LEADING_MARKER.replace(without_close.trim_start(), "");
        let line = without_open.trim();
        if !line.is_empty() {
            parts.push(line.to_string());
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn strip_string_quotes(text: &str) -> &str {
    let Some(caps) = STRING_OPEN.captures(text) else {
        return text;
    };
    let (Some(whole), Some(quote)) = (caps.get(0), caps.get(1)) else {
        return text;
    };
    let inner = &text[whole.end()..];
    inner.strip_suffix(quote.as_str()).unwrap_or(inner)
}

/// Last line a node actually occupies. Tokens that swallow their trailing
/// newline end at column 1 of the following line.
fn last_line(tree: &SyntaxTree, id: NodeId) -> usize {
    let span = tree.span(id);
    if span.end_col == 1 && span.end_line > span.start_line {
        span.end_line - 1
    } else {
        span.end_line
    }
}

/// Documentation comment placed immediately before `node`.
///
/// Attributes and decorators between the comment and the node are skipped.
pub(crate) fn doc_comment_before(tree: &SyntaxTree, node: NodeId, style: DocStyle) -> Option<String> {
    let mut comments: Vec<&str> = Vec::new();
    let mut anchor_line = tree.start_line(node);
    let mut cur = tree.prev_sibling(node);

    while let Some(sib) = cur {
        let kind = tree.kind(sib);
        if matches!(kind, "attribute_item" | "decorator") {
            anchor_line = tree.start_line(sib);
            cur = tree.prev_sibling(sib);
            continue;
        }
        if !COMMENT_KINDS.contains(&kind) || last_line(tree, sib) + 1 < anchor_line {
            break;
        }
        let text = tree.text(sib);
        match style {
            DocStyle::JsDoc => {
                if text.starts_with("/**") {
                    comments.push(text);
                }
                break;
            }
            DocStyle::Rust => {
                let outer_line = text.starts_with("///") && !text.starts_with("////");
                if !outer_line && !text.starts_with("/**") {
                    break;
                }
                comments.push(text);
            }
            DocStyle::Adjacent => comments.push(text),
        }
        anchor_line = tree.start_line(sib);
        cur = tree.prev_sibling(sib);
    }

    comments.reverse();
    clean_doc(&comments.join("\n"))
}

/// Docstring given as a string literal in the first statement of `body`.
pub(crate) fn body_docstring(tree: &SyntaxTree, body: NodeId) -> Option<String> {
    let first = tree
        .named_children(body)
        .find(|c| !COMMENT_KINDS.contains(&tree.kind(*c)))?;
    if tree.kind(first) != "expression_statement" {
        return None;
    }
    let expr = tree.named_children(first).next()?;
    match tree.kind(expr) {
        "string" | "concatenated_string" => clean_doc(tree.text(expr)),
        _ => None,
    }
}

/// True if any direct child is an `async` keyword token.
pub(crate) fn has_async_token(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.children(node).iter().any(|c| tree.kind(*c) == "async")
}

/// Reduce decorator or annotation text to the decorator's name.
///
/// `@app.route("/x")` becomes `app.route`, `#[derive(Debug)]` becomes
/// `derive`, `@Override` stays `Override`.
pub(crate) fn decorator_name(text: &str) -> String {
    let t = text
        .trim()
        .trim_start_matches('@')
        .trim_start_matches("#!")
        .trim_start_matches('#')
        .trim_start_matches('[')
        .trim_end_matches(']');
    let end = t
        .find(|c: char| c == '(' || c == '[' || c == '=' || c.is_whitespace())
        .unwrap_or(t.len());
    t[..end].trim().to_string()
}

/// Collapse every whitespace run to a single space.
pub(crate) fn collapse_ws(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_string()
}

/// Strip quote or angle-bracket delimiters from a module literal.
pub(crate) fn unquote(text: &str) -> String {
    text.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '<' | '>'))
        .to_string()
}

pub(crate) fn required_field(tree: &SyntaxTree, node: NodeId, field: &str) -> anyhow::Result<NodeId> {
    tree.child_by_field(node, field)
        .ok_or_else(|| anyhow!("`{}` has no `{}`", tree.kind(node), field))
}

/// Text of the `name` field, which must be present and non-empty.
pub(crate) fn required_name(tree: &SyntaxTree, node: NodeId) -> anyhow::Result<String> {
    let name = tree.text(required_field(tree, node, "name")?).trim().to_string();
    if name.is_empty() {
        return Err(anyhow!("`{}` has an empty name", tree.kind(node)));
    }
    Ok(name)
}

/// Unwrap a per-symbol result, logging and skipping failures.
pub(crate) fn keep<T>(parsed: &ParseResult, node: NodeId, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                path = %parsed.path.display(),
                line = parsed.tree.start_line(node),
                kind = parsed.tree.kind(node),
                error = %e,
                "skipping symbol"
            );
            None
        }
    }
}

/// Function record spanning `node`, with complexity computed over its subtree.
pub(crate) fn new_function(parsed: &ParseResult, node: NodeId, name: String) -> FunctionSymbol {
    let tree = &parsed.tree;
    FunctionSymbol {
        name,
        parameters: Vec::new(),
        return_type: None,
        docstring: None,
        start_line: tree.start_line(node),
        end_line: tree.end_line(node).max(tree.start_line(node)),
        complexity: complexity::cyclomatic(tree, node, parsed.language),
        is_async: false,
        decorators: Vec::new(),
    }
}

pub(crate) fn push_unique(list: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}
