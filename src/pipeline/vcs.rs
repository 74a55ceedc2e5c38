//! Version control plumbing for commit delivery.
//!
//! Commit delivery needs to know where HEAD is and whether the touched paths
//! carry uncommitted edits, then switch to a branch (creating it when
//! absent), stage paths, and commit them. [`GitRepository`] shells out to the
//! `git` binary in the tree root.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, info};

use crate::types::{DocError, Result};

pub trait VersionControl: Send + Sync {
    /// Short name of the checked-out branch, `HEAD` when detached
    fn current_branch(&self) -> Result<String>;

    /// Tracked paths among `paths` whose working copy differs from HEAD
    fn uncommitted_paths(&self, paths: &[&str]) -> Result<Vec<String>>;

    /// Check out `branch`, creating it from the current HEAD when absent
    fn create_or_checkout_branch(&self, branch: &str) -> Result<()>;

    /// Stage `paths` and commit them. Returns the new commit id, or `None`
    /// when nothing was staged.
    fn stage_and_commit(&self, paths: &[&str], message: &str) -> Result<Option<String>>;
}

/// `git` CLI in a working tree
#[derive(Debug, Clone)]
pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let repo = Self {
            root: root.as_ref().to_path_buf(),
        };
        repo.run("rev-parse", &["rev-parse", "--git-dir"])
            .map_err(|e| match e {
                DocError::Vcs { message, .. } => DocError::vcs(
                    "open",
                    format!("{} is not a git repository: {}", repo.root.display(), message),
                ),
                other => other,
            })?;
        Ok(repo)
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        debug!("git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| DocError::vcs(args.first().copied().unwrap_or("git"), e.to_string()))
    }

    /// Run git and fail with stderr on a non-zero exit
    fn run(&self, operation: &str, args: &[&str]) -> Result<Output> {
        let output = self.git(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DocError::vcs(operation, stderr));
        }
        Ok(output)
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        let reference = format!("refs/heads/{}", branch);
        let output = self.git(&["rev-parse", "--verify", "--quiet", &reference])?;
        Ok(output.status.success())
    }
}

impl VersionControl for GitRepository {
    fn current_branch(&self) -> Result<String> {
        let output = self.run("rev-parse", &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(stdout_line(&output))
    }

    fn uncommitted_paths(&self, paths: &[&str]) -> Result<Vec<String>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }
        let mut status = vec!["status", "--porcelain", "--untracked-files=no", "--"];
        status.extend_from_slice(paths);
        let output = self.run("status", &status)?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(porcelain_path)
            .collect())
    }

    fn create_or_checkout_branch(&self, branch: &str) -> Result<()> {
        if self.branch_exists(branch)? {
            self.run("checkout", &["checkout", "--quiet", branch])?;
            info!("Checked out existing branch {}", branch);
        } else {
            self.run("checkout", &["checkout", "--quiet", "-b", branch])?;
            info!("Created branch {}", branch);
        }
        Ok(())
    }

    fn stage_and_commit(&self, paths: &[&str], message: &str) -> Result<Option<String>> {
        if paths.is_empty() {
            return Ok(None);
        }

        let mut add = vec!["add", "--"];
        add.extend_from_slice(paths);
        self.run("add", &add)?;

        let mut staged = vec!["diff", "--cached", "--quiet", "--"];
        staged.extend_from_slice(paths);
        if self.git(&staged)?.status.success() {
            info!("Nothing staged, skipping commit");
            return Ok(None);
        }

        let mut commit = vec!["commit", "--quiet", "-m", message, "--"];
        commit.extend_from_slice(paths);
        self.run("commit", &commit)?;

        let head = self.run("rev-parse", &["rev-parse", "HEAD"])?;
        Ok(Some(stdout_line(&head)))
    }
}

/// Path column of one `git status --porcelain` line; renames report the new path
fn porcelain_path(line: &str) -> Option<String> {
    let path = line.get(3..)?;
    let path = path.rsplit_once(" -> ").map_or(path, |(_, to)| to);
    Some(path.trim_matches('"').to_string())
}

fn stdout_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}


#[cfg(test)]
mod tests {
    use super::test_repo::{git, git_available, init};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_rejects_plain_directory() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let err = GitRepository::open(dir.path()).unwrap_err();
        assert!(matches!(err, DocError::Vcs { ref operation, .. } if operation == "open"));
    }

    #[test]
    fn test_branch_created_then_reused() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", "package a\n")]);
        let repo = GitRepository::open(dir.path()).unwrap();
        let start = repo.current_branch().unwrap();

        repo.create_or_checkout_branch("docs-patch").unwrap();
        assert_eq!(repo.current_branch().unwrap(), "docs-patch");

        git(dir.path(), &["checkout", "--quiet", &start]);
        repo.create_or_checkout_branch("docs-patch").unwrap();
        assert_eq!(repo.current_branch().unwrap(), "docs-patch");
    }

    #[test]
    fn test_commit_only_given_paths() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", "package a\n"), ("b.go", "package b\n")]);
        let repo = GitRepository::open(dir.path()).unwrap();

        std::fs::write(dir.path().join("a.go"), "// Package a.\npackage a\n").unwrap();
        std::fs::write(dir.path().join("b.go"), "package b // changed\n").unwrap();

        let commit = repo
            .stage_and_commit(&["a.go"], "docs: a")
            .unwrap()
            .unwrap();

        let files = git(dir.path(), &["show", "--name-only", "--format=", &commit]);
        assert_eq!(files, "a.go");
        assert_eq!(git(dir.path(), &["log", "-1", "--format=%s"]), "docs: a");
    }

    #[test]
    fn test_nothing_staged_is_not_an_error() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", "package a\n")]);
        let repo = GitRepository::open(dir.path()).unwrap();

        assert_eq!(repo.stage_and_commit(&["a.go"], "docs: none").unwrap(), None);
    }

    #[test]
    fn test_uncommitted_paths_ignores_clean_and_untracked() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", "package a\n"), ("b.go", "package b\n")]);
        let repo = GitRepository::open(dir.path()).unwrap();
        assert!(repo.uncommitted_paths(&["a.go", "b.go"]).unwrap().is_empty());

        std::fs::write(dir.path().join("b.go"), "package b // wip\n").unwrap();
        std::fs::write(dir.path().join("c.go"), "package c\n").unwrap();

        assert_eq!(
            repo.uncommitted_paths(&["a.go", "b.go", "c.go"]).unwrap(),
            vec!["b.go".to_string()]
        );
    }

    #[test]
    fn test_porcelain_path() {
        assert_eq!(porcelain_path(" M a.go"), Some("a.go".to_string()));
        assert_eq!(porcelain_path("R  old.go -> new.go"), Some("new.go".to_string()));
        assert_eq!(porcelain_path("M"), None);
    }

    #[test]
    fn test_invalid_branch_name_is_vcs_error() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init(dir.path(), &[("a.go", "package a\n")]);
        let repo = GitRepository::open(dir.path()).unwrap();

        let err = repo.create_or_checkout_branch("bad..name").unwrap_err();
        assert!(matches!(err, DocError::Vcs { ref operation, .. } if operation == "checkout"));
    }
}
