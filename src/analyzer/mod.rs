//! Code Analyzer Module
//!
//! Finds undocumented Go declarations:
//! - Go parsing (tree-sitter) down to declaration boundaries and doc comments
//! - Source tree access (disk or in-memory)
//! - Depth-first symbol location

pub mod locator;
pub mod parser;
pub mod source_tree;

pub use locator::{LocatorOptions, SymbolLocator};
pub use source_tree::{FsTree, MemoryTree, SourceTree, TreeEntry, TreeWriter};
