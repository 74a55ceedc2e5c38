use std::ops::Range;

use tree_sitter::Node;

use super::{create_ts_parser, first_syntax_error, get_node_text};
use crate::types::{DocError, Result, SymbolKind};

/// Go's blank identifier
const BLANK_IDENTIFIER: &str = "_";

/// A top-level Go declaration with its documentation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoDeclaration {
    pub identifier: String,
    pub kind: SymbolKind,
    /// Byte offset of the declaration keyword
    pub start_byte: usize,
    /// Doc comment group attached to the declaration itself
    pub doc: Option<Range<usize>>,
    /// Grouped declarations only: the first spec carries its own doc
    pub first_spec_documented: bool,
}

impl GoDeclaration {
    pub fn is_documented(&self) -> bool {
        self.doc.is_some() || self.first_spec_documented
    }
}

/// Extracts documentable declarations from Go source
pub struct GoParser;

impl GoParser {
    pub fn new() -> Result<Self> {
        let _ = create_ts_parser(tree_sitter_go::LANGUAGE, "Go")?;
        Ok(Self)
    }

    /// Parse a file and list its top-level declarations in source order.
    ///
    /// Syntax errors fail the whole file.
    pub fn declarations(&self, path: &str, content: &str) -> Result<Vec<GoDeclaration>> {
        let mut parser = create_ts_parser(tree_sitter_go::LANGUAGE, "Go").map_err(|mut e| {
            if let DocError::Parse {
                path: ref mut p, ..
            } = e
            {
                *p = path.to_string();
            }
            e
        })?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| DocError::parse(path, "Failed to parse Go file"))?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_syntax_error(root)
                .map(|n| n.start_position().row + 1)
                .unwrap_or(1);
            return Err(DocError::parse(path, format!("syntax error near line {}", line)));
        }

        let src = content.as_bytes();
        let mut cursor = root.walk();
        let declarations = root
            .named_children(&mut cursor)
            .filter_map(|node| extract_declaration(node, src))
            .collect();

        Ok(declarations)
    }
}

fn extract_declaration(node: Node, src: &[u8]) -> Option<GoDeclaration> {
    let (identifier, kind, first_spec) = match node.kind() {
        "function_declaration" => {
            let name = node.child_by_field_name("name")?;
            (get_node_text(name, src).to_string(), SymbolKind::Function, None)
        }
        "method_declaration" => (method_identifier(node, src)?, SymbolKind::Method, None),
        "type_declaration" => {
            let spec = first_spec(node, &["type_spec", "type_alias"])?;
            (spec_name(spec, src)?, SymbolKind::Type, Some(spec))
        }
        "const_declaration" => {
            let spec = first_spec(node, &["const_spec"])?;
            (spec_name(spec, src)?, SymbolKind::Const, Some(spec))
        }
        "var_declaration" => {
            let spec = first_spec(node, &["var_spec"])?;
            (spec_name(spec, src)?, SymbolKind::Var, Some(spec))
        }
        _ => return None,
    };

    if identifier.is_empty() || identifier == BLANK_IDENTIFIER {
        return None;
    }

    Some(GoDeclaration {
        identifier,
        kind,
        start_byte: node.start_byte(),
        doc: leading_comment_group(node),
        first_spec_documented: first_spec
            .and_then(leading_comment_group)
            .is_some(),
    })
}

/// `Name`, `T.Name` or `*T.Name`
fn method_identifier(node: Node, src: &[u8]) -> Option<String> {
    let name = get_node_text(node.child_by_field_name("name")?, src);
    let receiver = node.child_by_field_name("receiver")?;

    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;
    let receiver_type = get_node_text(param.child_by_field_name("type")?, src);

    let (pointer, base) = receiver_type_name(receiver_type);
    if base.is_empty() {
        return None;
    }
    Some(format!(
        "{}{}.{}",
        if pointer { "*" } else { "" },
        base,
        name
    ))
}

/// Split a receiver type into (is_pointer, base type name).
/// Type parameters and redundant parentheses are dropped.
pub(crate) fn receiver_type_name(raw: &str) -> (bool, &str) {
    let raw = strip_parens(raw);
    let (pointer, rest) = match raw.strip_prefix('*') {
        Some(rest) => (true, strip_parens(rest)),
        None => (false, raw),
    };
    let base = rest.split('[').next().unwrap_or(rest).trim();
    (pointer, base)
}

fn strip_parens(s: &str) -> &str {
    let mut s = s.trim();
    while let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        s = inner.trim();
    }
    s
}

/// First spec of a declaration, looking through a wrapping spec list
fn first_spec<'a>(decl: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            return Some(child);
        }
        if child.kind().ends_with("_spec_list") {
            let mut inner = child.walk();
            if let Some(spec) = child
                .named_children(&mut inner)
                .find(|c| kinds.contains(&c.kind()))
            {
                return Some(spec);
            }
        }
    }
    None
}

fn spec_name(spec: Node, src: &[u8]) -> Option<String> {
    let name = spec.child_by_field_name("name")?;
    Some(get_node_text(name, src).to_string())
}

/// Byte range of the comment group directly above `node`, if any.
///
/// The group is made of comments on consecutive lines ending on the line
/// before `node` (or on its own line). A comment trailing earlier code on the
/// same line ends the group.
fn leading_comment_group(node: Node) -> Option<Range<usize>> {
    let mut expected_row = node.start_position().row;
    let mut group: Option<Range<usize>> = None;
    let mut current = node.prev_named_sibling();

    while let Some(comment) = current {
        if comment.kind() != "comment" || comment.end_position().row + 1 < expected_row {
            break;
        }
        if is_trailing_comment(comment) {
            break;
        }
        let end = group.as_ref().map_or(comment.end_byte(), |g| g.end);
        group = Some(comment.start_byte()..end);
        expected_row = comment.start_position().row;
        current = comment.prev_named_sibling();
    }

    group
}

/// Whether `comment` shares its line with the code before it, including an
/// opening `(` of a grouped declaration
fn is_trailing_comment(comment: Node) -> bool {
    match comment.prev_sibling() {
        Some(prev) if prev.kind() == "comment" || prev.kind() == "\n" => false,
        Some(prev) => prev.end_position().row == comment.start_position().row,
        None => false,
    }
}
