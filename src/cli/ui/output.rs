use console::style;

use crate::pipeline::delivery::diff_line_counts;
use crate::pipeline::{DeliveryOutcome, RunSummary};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Print a unified diff with added lines green and removed lines red
    pub fn diff(&self, diff: &str) {
        for line in diff.lines() {
            if line.starts_with("+++") || line.starts_with("---") {
                println!("{}", style(line).bold());
            } else if line.starts_with("@@") {
                println!("{}", style(line).cyan());
            } else if line.starts_with('+') {
                println!("{}", style(line).green());
            } else if line.starts_with('-') {
                println!("{}", style(line).red());
            } else {
                println!("{}", line);
            }
        }
    }

    /// Counts line plus whatever delivery did
    pub fn summary(&self, summary: &RunSummary) {
        let report = &summary.report;

        self.section("Summary");
        println!("  Findings:       {} in {} files", summary.findings, summary.files);
        println!("  Dispatched:     {}", report.dispatched);
        println!("  Documented:     {}", style(report.succeeded()).green());
        if report.failed() > 0 {
            println!("  Failed:         {}", style(report.failed()).red());
        } else {
            println!("  Failed:         0");
        }
        if report.not_dispatched > 0 {
            println!("  Not dispatched: {}", report.not_dispatched);
        }
        if report.cancelled {
            self.warning("Run was cancelled before every task was dispatched");
        }
        println!();

        match &summary.delivery {
            DeliveryOutcome::Previewed(diffs) => {
                if diffs.is_empty() {
                    self.info("Dry run: nothing to change");
                }
                for (path, file) in summary.patch.iter() {
                    let (added, removed) = diff_line_counts(&file.original, &file.updated);
                    println!(
                        "  {}  {} {}",
                        path,
                        style(format!("+{}", added)).green(),
                        style(format!("-{}", removed)).red()
                    );
                }
                for diff in diffs.values() {
                    self.diff(diff);
                }
            }
            DeliveryOutcome::Written(paths) => {
                if paths.is_empty() {
                    self.info("Nothing to write");
                } else {
                    self.success(&format!("Wrote {} files", paths.len()));
                }
                for path in paths {
                    println!("  {}", path);
                }
            }
            DeliveryOutcome::Committed {
                branch,
                paths,
                commit,
            } => match commit {
                Some(commit) => self.success(&format!(
                    "Committed {} files on {} ({})",
                    paths.len(),
                    branch,
                    short_id(commit)
                )),
                None => self.info(&format!("Nothing staged on {}, no commit made", branch)),
            },
            DeliveryOutcome::Unchanged => self.info("Nothing to commit"),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

fn short_id(commit: &str) -> &str {
    commit.get(..8).unwrap_or(commit)
}
