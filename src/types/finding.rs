//! Finding and inventory types produced by the symbol locator.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Kind of Go declaration a finding refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Type,
    Const,
    Var,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::Type => write!(f, "type"),
            SymbolKind::Const => write!(f, "const"),
            SymbolKind::Var => write!(f, "var"),
        }
    }
}

/// Where a documentation block goes for one declaration.
///
/// `offset` is the start of the declaration's line, so a block inserted there
/// lands directly above it. When the declaration shares its line with earlier
/// code, `offset` is the declaration start and `inline` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    /// Byte offset the block is spliced at
    pub offset: usize,
    /// 1-based line of the declaration
    pub line: usize,
    /// Leading whitespace of the declaration line
    pub indent: String,
    pub inline: bool,
}

/// One undocumented (or, in override mode, re-documented) symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub path: String,
    pub identifier: String,
    pub kind: SymbolKind,
    pub anchor: Anchor,
    /// Byte range of an existing doc comment group to replace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_doc: Option<Range<usize>>,
}

impl Finding {
    pub fn key(&self) -> SymbolKey {
        SymbolKey::new(&self.path, &self.identifier)
    }

    /// Byte range the generated block replaces (empty for plain insertion)
    pub fn edit_range(&self) -> Range<usize> {
        match &self.existing_doc {
            Some(range) => range.start..self.anchor.offset,
            None => self.anchor.offset..self.anchor.offset,
        }
    }
}

/// Correlates generation outcomes back to findings.
///
/// Ordered by path, then identifier (ordinal), matching the flattened task order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SymbolKey {
    pub path: String,
    pub identifier: String,
}

impl SymbolKey {
    pub fn new(path: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.identifier)
    }
}

/// Findings grouped by file path; iteration order is path order
pub type FindingsByFile = BTreeMap<String, Vec<Finding>>;

/// Locator output: findings plus the source each was found in.
///
/// Sources are captured once and shared read-only by every later stage.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub findings: FindingsByFile,
    pub sources: BTreeMap<String, Arc<str>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scanned file. Files without findings are not kept.
    pub fn insert(&mut self, path: String, source: Arc<str>, findings: Vec<Finding>) {
        if findings.is_empty() {
            return;
        }
        self.sources.insert(path.clone(), source);
        self.findings.insert(path, findings);
    }

    pub fn total_findings(&self) -> usize {
        self.findings.values().map(Vec::len).sum()
    }

    pub fn file_count(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn source(&self, path: &str) -> Option<&Arc<str>> {
        self.sources.get(path)
    }

    /// Findings in deterministic (path, identifier) order
    pub fn iter_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.values().flatten()
    }
}
