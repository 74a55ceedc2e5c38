//! Language Parser Module
//!
//! Tree-sitter based declaration extraction. Only Go is supported.

pub mod go;

pub use go::{GoDeclaration, GoParser};

use crate::types::{DocError, Result};

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// Create a tree-sitter parser for the given language.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| DocError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

/// First ERROR or MISSING node in document order
pub fn first_syntax_error(root: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if root.is_error() || root.is_missing() {
        return Some(root);
    }
    if !root.has_error() {
        return None;
    }
    let mut cursor = root.walk();
    let children: Vec<_> = root.children(&mut cursor).collect();
    children.into_iter().find_map(first_syntax_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_go_parser() {
        assert!(GoParser::new().is_ok());
    }

    #[test]
    fn test_first_syntax_error_none_for_valid_source() {
        let mut parser = create_ts_parser(tree_sitter_go::LANGUAGE, "Go").unwrap();
        let tree = parser.parse("package a\n", None).unwrap();
        assert!(first_syntax_error(tree.root_node()).is_none());
    }
}
