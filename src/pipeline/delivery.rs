//! Result Delivery
//!
//! Three mutually exclusive ways to hand a [`Patch`] back to the user:
//!
//! - **DryRun**: unified diff per file, nothing touched
//! - **Apply**: overwrite each file in path order; the first failure aborts
//!   and files already written stay written
//! - **Commit**: apply on a named branch, then stage and commit the touched
//!   paths with a deterministic message. Refused when a touched path has
//!   uncommitted edits or differs on the branch from what was scanned.

use std::collections::BTreeMap;

use similar::{ChangeTag, TextDiff};
use tracing::{info, warn};

use super::assembler::Patch;
use super::events::{PipelineEvent, SharedEventSink};
use super::vcs::VersionControl;
use crate::analyzer::TreeWriter;
use crate::config::DeliveryConfig;
use crate::constants::delivery::{COMMIT_SUBJECT_PREFIX, DIFF_CONTEXT_LINES};
use crate::types::{DocError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    DryRun,
    Apply,
    Commit { branch: String },
}

impl DeliveryMode {
    pub fn from_config(config: &DeliveryConfig) -> Self {
        if config.dry_run {
            DeliveryMode::DryRun
        } else if config.commit_enabled() {
            DeliveryMode::Commit {
                branch: config.branch.trim().to_string(),
            }
        } else {
            DeliveryMode::Apply
        }
    }
}

/// What delivery did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Rendered diffs keyed by path
    Previewed(BTreeMap<String, String>),
    /// Paths written, in write order
    Written(Vec<String>),
    Committed {
        branch: String,
        paths: Vec<String>,
        /// `None` when nothing ended up staged
        commit: Option<String>,
    },
    /// Commit requested for an empty patch
    Unchanged,
}

pub struct ResultDelivery<'a> {
    writer: &'a dyn TreeWriter,
    vcs: Option<&'a dyn VersionControl>,
    events: SharedEventSink,
}

impl<'a> ResultDelivery<'a> {
    pub fn new(writer: &'a dyn TreeWriter, events: SharedEventSink) -> Self {
        Self {
            writer,
            vcs: None,
            events,
        }
    }

    pub fn with_vcs(mut self, vcs: &'a dyn VersionControl) -> Self {
        self.vcs = Some(vcs);
        self
    }

    pub fn deliver(&self, patch: &Patch, mode: &DeliveryMode) -> Result<DeliveryOutcome> {
        match mode {
            DeliveryMode::DryRun => Ok(DeliveryOutcome::Previewed(preview(patch))),
            DeliveryMode::Apply => self.apply(patch).map(DeliveryOutcome::Written),
            DeliveryMode::Commit { branch } => self.commit(patch, branch),
        }
    }

    fn apply(&self, patch: &Patch) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(patch.len());
        for (path, file) in patch.iter() {
            self.writer
                .write(path, &file.updated)
                .map_err(|source| DocError::Write {
                    path: path.clone(),
                    source,
                })?;
            self.events
                .emit(PipelineEvent::FileWritten { path: path.clone() });
            written.push(path.clone());
        }
        info!("Wrote {} files", written.len());
        Ok(written)
    }

    fn commit(&self, patch: &Patch, branch: &str) -> Result<DeliveryOutcome> {
        if patch.is_empty() {
            info!("Nothing to commit");
            return Ok(DeliveryOutcome::Unchanged);
        }
        let vcs = self.vcs.ok_or_else(|| {
            DocError::Config("committing requires a git repository at the tree root".to_string())
        })?;

        let touched: Vec<&str> = patch.paths().collect();
        let dirty = vcs.uncommitted_paths(&touched)?;
        if !dirty.is_empty() {
            return Err(DocError::vcs(
                "commit",
                format!(
                    "uncommitted changes in {}; commit or stash them first",
                    dirty.join(", ")
                ),
            ));
        }

        let previous = vcs.current_branch()?;
        vcs.create_or_checkout_branch(branch)?;

        let diverged = self.diverged_paths(patch);
        if !diverged.is_empty() {
            if previous != branch
                && previous != "HEAD"
                && let Err(e) = vcs.create_or_checkout_branch(&previous)
            {
                warn!("Could not switch back to {}: {}", previous, e);
            }
            return Err(DocError::vcs(
                "commit",
                format!(
                    "{} differs from the scanned sources in {}",
                    branch,
                    diverged.join(", ")
                ),
            ));
        }

        let paths = self.apply(patch)?;

        let staged: Vec<&str> = paths.iter().map(String::as_str).collect();
        let commit = vcs.stage_and_commit(&staged, &commit_message(patch))?;

        self.events.emit(PipelineEvent::Committed {
            branch: branch.to_string(),
            commit: commit.clone(),
        });
        Ok(DeliveryOutcome::Committed {
            branch: branch.to_string(),
            paths,
            commit,
        })
    }

    /// Patched paths whose current content is not the content they were
    /// assembled from
    fn diverged_paths(&self, patch: &Patch) -> Vec<String> {
        patch
            .iter()
            .filter(|(path, file)| {
                self.writer.open(path).ok().as_deref() != Some(&*file.original)
            })
            .map(|(path, _)| path.clone())
            .collect()
    }
}

/// Unified diff for every patched file, keyed by path
pub fn preview(patch: &Patch) -> BTreeMap<String, String> {
    patch
        .iter()
        .map(|(path, file)| (path.clone(), render_diff(path, &file.original, &file.updated)))
        .collect()
}

/// Unified diff with `a/` and `b/` headers
pub fn render_diff(path: &str, original: &str, updated: &str) -> String {
    TextDiff::from_lines(original, updated)
        .unified_diff()
        .context_radius(DIFF_CONTEXT_LINES)
        .header(&format!("a/{}", path), &format!("b/{}", path))
        .to_string()
}

/// Lines added and removed between two versions
pub fn diff_line_counts(original: &str, updated: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(original, updated);

    let mut added = 0usize;
    let mut removed = 0usize;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, removed)
}

/// Subject with the symbol count, body listing every documented symbol
pub fn commit_message(patch: &Patch) -> String {
    let symbols = patch.documented_symbols();
    let noun = if symbols.len() == 1 { "symbol" } else { "symbols" };

    let mut message = format!(
        "{} document {} Go {}\n\n",
        COMMIT_SUBJECT_PREFIX,
        symbols.len(),
        noun
    );
    for key in &symbols {
        message.push_str(&format!("- {}\n", key));
    }
    message.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{FsTree, MemoryTree, SourceTree, TreeEntry};
    use crate::pipeline::assembler::PatchAssembler;
    use crate::pipeline::events::CollectingSink;
    use crate::pipeline::scheduler::{GenerationOutcome, GenerationReport};
    use crate::pipeline::testing::{inventory_of, null_sink};
    use crate::pipeline::vcs::GitRepository;
    use crate::pipeline::vcs::test_repo::{git, git_available, init};
    use crate::types::SymbolKey;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const SOURCE: &str = "package a\n\ntype X struct{}\n\n// Y is documented.\ntype Y struct{}\n";
    const PATCHED: &str =
        "package a\n\n// X is a struct.\ntype X struct{}\n\n// Y is documented.\ntype Y struct{}\n";

    fn patch_for(files: &[(&str, &str)], docs: &[(&str, &str, &str)]) -> Patch {
        let tree = files
            .iter()
            .fold(MemoryTree::new(), |tree, (path, content)| {
                tree.with_file(path, content)
            });
        let inventory = inventory_of(&tree);
        let mut report = GenerationReport::default();
        for (path, identifier, text) in docs {
            report.outcomes.insert(
                SymbolKey::new(*path, *identifier),
                GenerationOutcome::Documented(text.to_string()),
            );
        }
        PatchAssembler::assemble(&inventory, &report)
    }

    fn x_patch() -> Patch {
        patch_for(&[("a.go", SOURCE)], &[("a.go", "X", "X is a struct.")])
    }

    /// Writer that fails on one path and records the rest
    struct FlakyWriter {
        fail_on: &'static str,
        written: Mutex<Vec<String>>,
    }

    impl SourceTree for FlakyWriter {
        fn list(&self, _dir: &str) -> io::Result<Vec<TreeEntry>> {
            Ok(Vec::new())
        }

        fn open(&self, path: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        }
    }

    impl TreeWriter for FlakyWriter {
        fn write(&self, path: &str, _content: &str) -> io::Result<()> {
            if path == self.fail_on {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.written.lock().unwrap().push(path.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_mode_from_config() {
        let mut config = DeliveryConfig::default();
        assert_eq!(DeliveryMode::from_config(&config), DeliveryMode::Apply);

        config.branch = " docs-patch ".to_string();
        assert_eq!(
            DeliveryMode::from_config(&config),
            DeliveryMode::Commit {
                branch: "docs-patch".to_string()
            }
        );

        config.branch.clear();
        config.dry_run = true;
        assert_eq!(DeliveryMode::from_config(&config), DeliveryMode::DryRun);
    }

    #[test]
    fn test_dry_run_renders_diff_without_writing() {
        let tree = MemoryTree::new().with_file("a.go", SOURCE);
        let delivery = ResultDelivery::new(&tree, null_sink());

        let outcome = delivery.deliver(&x_patch(), &DeliveryMode::DryRun).unwrap();

        let DeliveryOutcome::Previewed(diffs) = outcome else {
            panic!("expected preview");
        };
        assert_eq!(diffs.len(), 1);
        let diff = &diffs["a.go"];
        assert!(diff.starts_with("--- a/a.go\n+++ b/a.go\n"));
        assert!(diff.contains("+// X is a struct.\n"));
        assert!(!diff.contains("-// Y"));
        assert_eq!(tree.content("a.go").unwrap(), SOURCE);
    }

    #[test]
    fn test_apply_writes_in_path_order() {
        let tree = MemoryTree::new();
        let sink = Arc::new(CollectingSink::new());
        let patch = patch_for(
            &[
                ("b.go", "package p\n\nfunc B() {}\n"),
                ("a.go", "package p\n\nfunc A() {}\n"),
            ],
            &[("a.go", "A", "A is a."), ("b.go", "B", "B is b.")],
        );

        let outcome = ResultDelivery::new(&tree, sink.clone())
            .deliver(&patch, &DeliveryMode::Apply)
            .unwrap();

        assert_eq!(
            outcome,
            DeliveryOutcome::Written(vec!["a.go".to_string(), "b.go".to_string()])
        );
        assert_eq!(
            tree.content("a.go").unwrap(),
            "package p\n\n// A is a.\nfunc A() {}\n"
        );
        assert_eq!(
            sink.events(),
            vec![
                PipelineEvent::FileWritten {
                    path: "a.go".into()
                },
                PipelineEvent::FileWritten {
                    path: "b.go".into()
                },
            ]
        );
    }

    #[test]
    fn test_apply_aborts_on_first_write_failure() {
        let writer = FlakyWriter {
            fail_on: "b.go",
            written: Mutex::new(Vec::new()),
        };
        let patch = patch_for(
            &[
                ("a.go", "package p\n\nfunc A() {}\n"),
                ("b.go", "package p\n\nfunc B() {}\n"),
                ("c.go", "package p\n\nfunc C() {}\n"),
            ],
            &[
                ("a.go", "A", "A is a."),
                ("b.go", "B", "B is b."),
                ("c.go", "C", "C is c."),
            ],
        );

        let err = ResultDelivery::new(&writer, null_sink())
            .deliver(&patch, &DeliveryMode::Apply)
            .unwrap_err();

        assert!(matches!(err, DocError::Write { ref path, .. } if path == "b.go"));
        assert_eq!(*writer.written.lock().unwrap(), vec!["a.go".to_string()]);
    }

    #[test]
    fn test_commit_with_empty_patch_is_noop() {
        let tree = MemoryTree::new();
        let outcome = ResultDelivery::new(&tree, null_sink())
            .deliver(
                &Patch::default(),
                &DeliveryMode::Commit {
                    branch: "docs-patch".to_string(),
                },
            )
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Unchanged);
    }

    #[test]
    fn test_commit_without_repository_fails() {
        let tree = MemoryTree::new();
        let err = ResultDelivery::new(&tree, null_sink())
            .deliver(
                &x_patch(),
                &DeliveryMode::Commit {
                    branch: "docs-patch".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, DocError::Config(_)));
        assert!(tree.content("a.go").is_none());
    }

    #[test]
    fn test_commit_message_lists_symbols() {
        let patch = patch_for(
            &[("a.go", "package p\n\nfunc A() {}\n\nfunc B() {}\n")],
            &[("a.go", "B", "B is b."), ("a.go", "A", "A is a.")],
        );
        assert_eq!(
            commit_message(&patch),
            "docs: document 2 Go symbols\n\n- a.go:A\n- a.go:B"
        );
        assert_eq!(
            commit_message(&x_patch()),
            "docs: document 1 Go symbol\n\n- a.go:X"
        );
    }

    #[test]
    fn test_diff_line_counts() {
        assert_eq!(diff_line_counts(SOURCE, PATCHED), (1, 0));
    }

    #[test]
    fn test_commit_on_docs_branch() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", SOURCE), ("README", "readme\n")]);
        let tree = FsTree::new(dir.path());
        let repo = GitRepository::open(dir.path()).unwrap();

        let outcome = ResultDelivery::new(&tree, null_sink())
            .with_vcs(&repo)
            .deliver(
                &x_patch(),
                &DeliveryMode::Commit {
                    branch: "docs-patch".to_string(),
                },
            )
            .unwrap();

        let DeliveryOutcome::Committed { branch, paths, commit } = outcome else {
            panic!("expected commit");
        };
        assert_eq!(branch, "docs-patch");
        assert_eq!(paths, vec!["a.go".to_string()]);
        let commit = commit.unwrap();

        assert_eq!(repo.current_branch().unwrap(), "docs-patch");
        assert_eq!(
            git(dir.path(), &["show", "--name-only", "--format=", &commit]),
            "a.go"
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("a.go")).unwrap(), PATCHED);
    }

    #[test]
    fn test_commit_refuses_diverged_existing_branch() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", SOURCE)]);
        let start = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
        let with_z = format!("{}\nfunc Z() {{}}\n", SOURCE);
        git(dir.path(), &["checkout", "--quiet", "-b", "docs-patch"]);
        std::fs::write(dir.path().join("a.go"), &with_z).unwrap();
        git(dir.path(), &["commit", "--quiet", "-am", "add Z"]);
        git(dir.path(), &["checkout", "--quiet", &start]);

        let tree = FsTree::new(dir.path());
        let repo = GitRepository::open(dir.path()).unwrap();
        let err = ResultDelivery::new(&tree, null_sink())
            .with_vcs(&repo)
            .deliver(
                &x_patch(),
                &DeliveryMode::Commit {
                    branch: "docs-patch".to_string(),
                },
            )
            .unwrap_err();

        assert!(matches!(err, DocError::Vcs { ref operation, .. } if operation == "commit"));
        assert_eq!(repo.current_branch().unwrap(), start);
        assert_eq!(git(dir.path(), &["show", "docs-patch:a.go"]), with_z.trim_end());
        assert_eq!(git(dir.path(), &["log", "-1", "--format=%s", "docs-patch"]), "add Z");
        assert_eq!(std::fs::read_to_string(dir.path().join("a.go")).unwrap(), SOURCE);
    }

    #[test]
    fn test_commit_onto_existing_branch_matching_sources() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", SOURCE), ("README", "readme\n")]);
        let start = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);
        git(dir.path(), &["checkout", "--quiet", "-b", "docs-patch"]);
        std::fs::write(dir.path().join("README"), "branch readme\n").unwrap();
        git(dir.path(), &["commit", "--quiet", "-am", "readme"]);
        git(dir.path(), &["checkout", "--quiet", &start]);

        let tree = FsTree::new(dir.path());
        let repo = GitRepository::open(dir.path()).unwrap();
        let outcome = ResultDelivery::new(&tree, null_sink())
            .with_vcs(&repo)
            .deliver(
                &x_patch(),
                &DeliveryMode::Commit {
                    branch: "docs-patch".to_string(),
                },
            )
            .unwrap();

        assert!(matches!(outcome, DeliveryOutcome::Committed { commit: Some(_), .. }));
        assert_eq!(git(dir.path(), &["show", "docs-patch:a.go"]), PATCHED.trim_end());
        assert_eq!(git(dir.path(), &["show", "docs-patch:README"]), "branch readme");
        assert_eq!(git(dir.path(), &["log", "-1", "--format=%s", "docs-patch~1"]), "readme");
    }

    #[test]
    fn test_commit_refuses_uncommitted_edits() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", "package a\n")]);
        // Working copy differs from HEAD; the patch is built from it
        std::fs::write(dir.path().join("a.go"), SOURCE).unwrap();
        let start = git(dir.path(), &["rev-parse", "--abbrev-ref", "HEAD"]);

        let tree = FsTree::new(dir.path());
        let repo = GitRepository::open(dir.path()).unwrap();
        let err = ResultDelivery::new(&tree, null_sink())
            .with_vcs(&repo)
            .deliver(
                &x_patch(),
                &DeliveryMode::Commit {
                    branch: "docs-patch".to_string(),
                },
            )
            .unwrap_err();

        assert!(matches!(err, DocError::Vcs { ref message, .. } if message.contains("a.go")));
        assert_eq!(repo.current_branch().unwrap(), start);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.go")).unwrap(), SOURCE);
        assert_eq!(
            git(dir.path(), &["branch", "--list", "docs-patch"]),
            ""
        );
    }
}
