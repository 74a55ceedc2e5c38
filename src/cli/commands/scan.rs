//! Scan Command
//!
//! List undocumented symbols without calling any generator.
//!
//! Usage:
//!   docweave scan [ROOT] [-f json] [--include GLOB] [--override]

use std::path::PathBuf;

use crate::analyzer::FsTree;
use crate::cli::util::CommandContext;
use crate::pipeline::{scan_tree, tracing_sink};
use crate::types::{DocError, Inventory, Result};

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub config_file: Option<PathBuf>,
    pub format: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub override_existing: bool,
}

pub fn run(options: ScanOptions) -> Result<()> {
    let ctx = CommandContext::load(&options.root, options.config_file.as_deref())?;
    let mut config = ctx.config;
    if !options.include.is_empty() {
        config.locator.include = options.include.clone();
    }
    if !options.exclude.is_empty() {
        config.locator.exclude = options.exclude.clone();
    }
    if options.override_existing {
        config.locator.override_existing = true;
    }

    let tree = FsTree::new(&ctx.root);
    let inventory = scan_tree(&config, &tree, tracing_sink())?;

    println!("{}", render(&inventory, &options.format)?);
    Ok(())
}

/// Findings as JSON or one `path:line  kind  identifier` row per finding
pub fn render(inventory: &Inventory, format: &str) -> Result<String> {
    match format {
        "json" => {
            let findings: Vec<_> = inventory.iter_findings().collect();
            let value = serde_json::json!({
                "files": inventory.file_count(),
                "total": inventory.total_findings(),
                "findings": findings,
            });
            Ok(serde_json::to_string_pretty(&value)?)
        }
        "text" => {
            let mut out = String::new();
            for finding in inventory.iter_findings() {
                out.push_str(&format!(
                    "{}:{}  {:<8}  {}\n",
                    finding.path, finding.anchor.line, finding.kind, finding.identifier
                ));
            }
            out.push_str(&format!(
                "{} undocumented symbols in {} files",
                inventory.total_findings(),
                inventory.file_count()
            ));
            Ok(out)
        }
        other => Err(DocError::Config(format!(
            "Unknown format: {}. Valid values: text, json",
            other
        ))),
    }
}
