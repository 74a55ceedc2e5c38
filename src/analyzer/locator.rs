//! Symbol Locator
//!
//! Walks a [`SourceTree`] depth-first and reports every top-level Go
//! declaration that lacks a leading doc comment.
//!
//! ## Traversal
//!
//! - Hidden directories (name starts with `.`) are skipped, except the root
//! - Directories in the exclusion set (default `testdata`, `vendor`) are skipped
//! - Only `.go` files are visited; `_test.go` files are skipped
//! - Include/exclude globs filter on the relative file path
//!
//! A read or parse failure on any visited file aborts the walk.

use std::sync::Arc;

use glob::Pattern;
use tracing::{debug, info, instrument};

use super::parser::{GoDeclaration, GoParser};
use super::source_tree::{SourceTree, join_path};
use crate::config::LocatorConfig;
use crate::pipeline::events::{PipelineEvent, SharedEventSink};
use crate::types::{Anchor, DocError, Finding, Inventory, Result};

const GO_EXTENSION: &str = ".go";
const TEST_SUFFIX: &str = "_test.go";

/// Compiled traversal options
#[derive(Debug, Clone)]
pub struct LocatorOptions {
    pub exclude_dirs: Vec<String>,
    pub include: Vec<Pattern>,
    pub exclude: Vec<Pattern>,
    /// Report documented declarations too, so their docs get replaced
    pub override_existing: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            exclude_dirs: vec!["testdata".to_string(), "vendor".to_string()],
            include: Vec::new(),
            exclude: Vec::new(),
            override_existing: false,
        }
    }
}

impl LocatorOptions {
    pub fn from_config(config: &LocatorConfig) -> Result<Self> {
        Ok(Self {
            exclude_dirs: config.exclude_dirs.clone(),
            include: compile_patterns(&config.include)?,
            exclude: compile_patterns(&config.exclude)?,
            override_existing: config.override_existing,
        })
    }

    fn path_selected(&self, path: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(path)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(path))
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| DocError::Config(format!("Invalid glob pattern '{}': {}", p, e)))
        })
        .collect()
}

/// Finds undocumented declarations in a source tree
pub struct SymbolLocator {
    parser: GoParser,
    options: LocatorOptions,
    events: SharedEventSink,
}

impl SymbolLocator {
    pub fn new(options: LocatorOptions, events: SharedEventSink) -> Result<Self> {
        Ok(Self {
            parser: GoParser::new()?,
            options,
            events,
        })
    }

    /// Walk the whole tree and collect findings
    #[instrument(skip_all)]
    pub fn locate(&self, tree: &dyn SourceTree) -> Result<Inventory> {
        let mut inventory = Inventory::new();
        self.walk(tree, "", &mut inventory)?;

        info!(
            files = inventory.file_count(),
            findings = inventory.total_findings(),
            "Locator: scan complete"
        );
        Ok(inventory)
    }

    fn walk(&self, tree: &dyn SourceTree, dir: &str, inventory: &mut Inventory) -> Result<()> {
        let entries = tree.list(dir).map_err(|source| DocError::Read {
            path: display_dir(dir),
            source,
        })?;

        for entry in entries {
            let path = join_path(dir, &entry.name);

            if entry.is_dir {
                if let Some(reason) = self.skip_dir_reason(&entry.name) {
                    self.events.emit(PipelineEvent::DirectorySkipped { path, reason });
                    continue;
                }
                self.walk(tree, &path, inventory)?;
                continue;
            }

            if let Some(reason) = self.skip_file_reason(&entry.name, &path) {
                self.events.emit(PipelineEvent::FileSkipped { path, reason });
                continue;
            }

            let content = tree.open(&path).map_err(|source| DocError::Read {
                path: path.clone(),
                source,
            })?;
            let findings = self.scan_source(&path, &content)?;

            self.events.emit(PipelineEvent::FileScanned {
                path: path.clone(),
                findings: findings.len(),
            });
            inventory.insert(path, Arc::from(content), findings);
        }

        Ok(())
    }

    fn skip_dir_reason(&self, name: &str) -> Option<String> {
        if name.starts_with('.') {
            return Some("hidden directory".to_string());
        }
        if self.options.exclude_dirs.iter().any(|d| d == name) {
            return Some("excluded directory".to_string());
        }
        None
    }

    fn skip_file_reason(&self, name: &str, path: &str) -> Option<String> {
        if !name.ends_with(GO_EXTENSION) {
            return Some("not a Go source file".to_string());
        }
        if name.ends_with(TEST_SUFFIX) {
            return Some("test file".to_string());
        }
        if !self.options.path_selected(path) {
            return Some("filtered by include/exclude patterns".to_string());
        }
        None
    }

    /// Findings for a single file, sorted by identifier
    pub fn scan_source(&self, path: &str, content: &str) -> Result<Vec<Finding>> {
        let declarations = self.parser.declarations(path, content)?;

        let mut findings: Vec<Finding> = declarations
            .into_iter()
            .filter(|d| self.options.override_existing || !d.is_documented())
            .map(|d| to_finding(path, content, d))
            .collect();

        // Stable sort keeps the first occurrence of repeated names (e.g. `init`)
        findings.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        let before = findings.len();
        findings.dedup_by(|later, first| later.identifier == first.identifier);
        if findings.len() < before {
            debug!(path, dropped = before - findings.len(), "duplicate identifiers dropped");
        }

        Ok(findings)
    }
}

fn to_finding(path: &str, content: &str, decl: GoDeclaration) -> Finding {
    let line_start = line_start(content, decl.start_byte);
    let prefix = &content[line_start..decl.start_byte];
    let inline = !prefix.chars().all(char::is_whitespace);

    let anchor = if inline {
        Anchor {
            offset: decl.start_byte,
            line: line_number(content, decl.start_byte),
            indent: String::new(),
            inline: true,
        }
    } else {
        Anchor {
            offset: line_start,
            line: line_number(content, decl.start_byte),
            indent: prefix.to_string(),
            inline: false,
        }
    };

    // Only a group sitting entirely above the anchor can be replaced
    let existing_doc = decl
        .doc
        .map(|doc| line_start_of(content, doc.start)..anchor.offset)
        .filter(|range| range.start < range.end);

    Finding {
        path: path.to_string(),
        identifier: decl.identifier,
        kind: decl.kind,
        anchor,
        existing_doc,
    }
}

/// Byte offset of the start of the line containing `offset`
fn line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_start_of(content: &str, offset: usize) -> usize {
    let start = line_start(content, offset);
    if content[start..offset].chars().all(char::is_whitespace) {
        start
    } else {
        offset
    }
}

fn line_number(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

fn display_dir(dir: &str) -> String {
    if dir.is_empty() {
        ".".to_string()
    } else {
        dir.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::source_tree::MemoryTree;
    use crate::pipeline::events::CollectingSink;
    use crate::types::SymbolKind;

    fn locator(options: LocatorOptions) -> (SymbolLocator, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let locator = SymbolLocator::new(options, sink.clone()).unwrap();
        (locator, sink)
    }

    fn identifiers(inventory: &Inventory, path: &str) -> Vec<String> {
        inventory.findings[path]
            .iter()
            .map(|f| f.identifier.clone())
            .collect()
    }

    #[test]
    fn test_end_to_end_scenario_single_finding() {
        let tree = MemoryTree::new().with_file(
            "a.go",
            "package a\n\ntype X struct{}\n\n// Y is documented.\ntype Y struct{}\n",
        );
        let (locator, _) = locator(LocatorOptions::default());
        let inventory = locator.locate(&tree).unwrap();

        assert_eq!(inventory.total_findings(), 1);
        let finding = &inventory.findings["a.go"][0];
        assert_eq!(finding.identifier, "X");
        assert_eq!(finding.kind, SymbolKind::Type);
        assert_eq!(finding.anchor.line, 3);
        assert_eq!(finding.anchor.offset, "package a\n\n".len());
    }

    #[test]
    fn test_ordinal_sort_within_file() {
        let tree = MemoryTree::new().with_file(
            "a.go",
            "package a\n\nfunc baz() {}\nfunc bar() {}\nfunc Foo() {}\n",
        );
        let (locator, _) = locator(LocatorOptions::default());
        let inventory = locator.locate(&tree).unwrap();

        assert_eq!(identifiers(&inventory, "a.go"), vec!["Foo", "bar", "baz"]);
    }

    #[test]
    fn test_no_false_positives_for_documented_receivers() {
        let tree = MemoryTree::new().with_file(
            "a.go",
            "package a\n\n// F doc.\nfunc F() {}\n\n// V doc.\nfunc (t T) V() {}\n\n// P doc.\nfunc (t *T) P() {}\n\nfunc (t *T) Q() {}\n",
        );
        let (locator, _) = locator(LocatorOptions::default());
        let inventory = locator.locate(&tree).unwrap();

        assert_eq!(identifiers(&inventory, "a.go"), vec!["*T.Q"]);
    }

    #[test]
    fn test_traversal_skips() {
        let tree = MemoryTree::new()
            .with_file("a.go", "package a\n\nfunc A() {}\n")
            .with_file("a_test.go", "package a\n\nfunc TestA() {}\n")
            .with_file("README.md", "# readme")
            .with_file(".hidden/h.go", "package h\n\nfunc H() {}\n")
            .with_file("testdata/t.go", "package t\n\nfunc T() {}\n")
            .with_file("pkg/b.go", "package pkg\n\nfunc B() {}\n");
        let (locator, sink) = locator(LocatorOptions::default());
        let inventory = locator.locate(&tree).unwrap();

        let paths: Vec<_> = inventory.findings.keys().cloned().collect();
        assert_eq!(paths, vec!["a.go", "pkg/b.go"]);

        let events = sink.events();
        assert!(events.contains(&PipelineEvent::DirectorySkipped {
            path: ".hidden".into(),
            reason: "hidden directory".into(),
        }));
        assert!(events.contains(&PipelineEvent::DirectorySkipped {
            path: "testdata".into(),
            reason: "excluded directory".into(),
        }));
        assert!(events.contains(&PipelineEvent::FileSkipped {
            path: "a_test.go".into(),
            reason: "test file".into(),
        }));
    }

    #[test]
    fn test_include_exclude_patterns() {
        let tree = MemoryTree::new()
            .with_file("api/a.go", "package api\n\nfunc A() {}\n")
            .with_file("api/gen.go", "package api\n\nfunc G() {}\n")
            .with_file("internal/b.go", "package internal\n\nfunc B() {}\n");
        let options = LocatorOptions {
            include: vec![Pattern::new("api/*").unwrap()],
            exclude: vec![Pattern::new("**/gen.go").unwrap()],
            ..Default::default()
        };
        let (locator, _) = locator(options);
        let inventory = locator.locate(&tree).unwrap();

        let paths: Vec<_> = inventory.findings.keys().cloned().collect();
        assert_eq!(paths, vec!["api/a.go"]);
    }

    #[test]
    fn test_parse_error_aborts_with_path() {
        let tree = MemoryTree::new()
            .with_file("a.go", "package a\n\nfunc A() {}\n")
            .with_file("b.go", "package a\n\nfunc (\n");
        let (locator, _) = locator(LocatorOptions::default());
        let err = locator.locate(&tree).unwrap_err();

        assert!(matches!(err, DocError::Parse { ref path, .. } if path == "b.go"));
    }

    #[test]
    fn test_override_reports_documented_with_range() {
        let src = "package a\n\n// Old doc.\nfunc F() {}\n";
        let tree = MemoryTree::new().with_file("a.go", src);
        let options = LocatorOptions {
            override_existing: true,
            ..Default::default()
        };
        let (locator, _) = locator(options);
        let inventory = locator.locate(&tree).unwrap();

        let finding = &inventory.findings["a.go"][0];
        let range = finding.existing_doc.clone().unwrap();
        assert_eq!(&src[range], "// Old doc.\n");
    }

    #[test]
    fn test_indented_and_inline_anchors() {
        let src = "package a\n\n  func F() {}\nvar x = 1; func G() {}\n";
        let tree = MemoryTree::new().with_file("a.go", src);
        let (locator, _) = locator(LocatorOptions::default());
        let inventory = locator.locate(&tree).unwrap();

        let findings = &inventory.findings["a.go"];
        let f = findings.iter().find(|f| f.identifier == "F").unwrap();
        assert_eq!(f.anchor.indent, "  ");
        assert!(!f.anchor.inline);

        let g = findings.iter().find(|f| f.identifier == "G").unwrap();
        assert!(g.anchor.inline);
        assert_eq!(&src[g.anchor.offset..g.anchor.offset + 4], "func");
    }

    #[test]
    fn test_duplicate_init_kept_once() {
        let tree = MemoryTree::new().with_file(
            "a.go",
            "package a\n\nfunc init() {}\n\nfunc init() {}\n",
        );
        let (locator, _) = locator(LocatorOptions::default());
        let inventory = locator.locate(&tree).unwrap();

        let findings = &inventory.findings["a.go"];
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].anchor.line, 3);
    }
}
