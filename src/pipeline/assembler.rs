//! Patch Assembler
//!
//! Merges generated text back into each file's captured source. Edits are
//! applied bottom-up so pending anchors never shift; nothing outside the
//! spliced ranges is touched.
//!
//! The tree must not change between scheduling and assembly: anchors are byte
//! offsets into the source captured by the locator.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use super::scheduler::GenerationReport;
use crate::types::{Finding, Inventory, SymbolKey};

/// New content for one file
#[derive(Debug, Clone, PartialEq)]
pub struct PatchedFile {
    pub original: Arc<str>,
    pub updated: String,
    /// Identifiers that received docs, in identifier order
    pub documented: Vec<String>,
}

/// Final file contents keyed by path. Files without a single successful
/// generation are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    files: BTreeMap<String, PatchedFile>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn get(&self, path: &str) -> Option<&PatchedFile> {
        self.files.get(path)
    }

    /// Files in path order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PatchedFile)> {
        self.files.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Every documented symbol, in (path, identifier) order
    pub fn documented_symbols(&self) -> Vec<SymbolKey> {
        self.files
            .iter()
            .flat_map(|(path, file)| {
                file.documented
                    .iter()
                    .map(move |identifier| SymbolKey::new(path, identifier))
            })
            .collect()
    }
}

/// Render doc text as a `//` comment block at the given indentation.
///
/// Trailing whitespace is trimmed per line and empty lines become a bare
/// `//`. The block ends with a newline.
pub fn format_doc_block(text: &str, indent: &str) -> String {
    let mut block = String::new();
    for line in text.trim().lines() {
        let line = line.trim_end();
        block.push_str(indent);
        if line.is_empty() {
            block.push_str("//");
        } else {
            block.push_str("// ");
            block.push_str(line);
        }
        block.push('\n');
    }
    block
}

pub struct PatchAssembler;

impl PatchAssembler {
    /// Build the patch from every successful outcome in the report
    pub fn assemble(inventory: &Inventory, report: &GenerationReport) -> Patch {
        let mut patch = Patch::default();

        for (path, findings) in &inventory.findings {
            let Some(source) = inventory.source(path) else {
                continue;
            };

            let mut edits: Vec<(&Finding, &str)> = findings
                .iter()
                .filter_map(|finding| {
                    report
                        .outcome(&finding.key())
                        .and_then(|outcome| outcome.text())
                        .map(|text| (finding, text))
                })
                .collect();

            if edits.is_empty() {
                continue;
            }

            let mut documented: Vec<String> =
                edits.iter().map(|(f, _)| f.identifier.clone()).collect();
            documented.sort();

            edits.sort_by_key(|(finding, _)| Reverse(finding.edit_range().start));

            let mut updated = source.to_string();
            for (finding, text) in edits {
                updated.replace_range(splice_range(source, finding), &render_edit(finding, text));
            }

            debug!("Assembled {} docs into {}", documented.len(), path);
            patch.files.insert(
                path.clone(),
                PatchedFile {
                    original: Arc::clone(source),
                    updated,
                    documented,
                },
            );
        }

        patch
    }
}

/// Edit range, widened on an inline declaration to swallow the spaces that
/// separate it from the code before it
fn splice_range(source: &str, finding: &Finding) -> Range<usize> {
    let range = finding.edit_range();
    if finding.anchor.inline && finding.existing_doc.is_none() {
        let code_end = source[..range.start].trim_end_matches([' ', '\t']).len();
        code_end..range.end
    } else {
        range
    }
}

fn render_edit(finding: &Finding, text: &str) -> String {
    let block = format_doc_block(text, &finding.anchor.indent);
    if finding.anchor.inline && finding.existing_doc.is_none() {
        // Declaration shares its line with earlier code: break the line first
        format!("\n{}{}", block, finding.anchor.indent)
    } else {
        block
    }
}
