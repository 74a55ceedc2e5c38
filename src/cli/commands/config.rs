//! Config Command
//!
//! Inspect and initialize docweave configuration.
//!
//! Usage:
//!   docweave config show [ROOT] [-f json]
//!   docweave config path [ROOT]
//!   docweave config init [ROOT] [--force]

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, require_directory};
use crate::config::ConfigLoader;
use crate::types::{DocError, Result};

/// Show the effective configuration for `root`
pub fn show(root: &Path, config_file: Option<&Path>, format: &str) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "toml" => false,
        other => {
            return Err(DocError::Config(format!(
                "Unknown format: {}. Valid values: toml, json",
                other
            )));
        }
    };

    let ctx = CommandContext::load(root, config_file)?;
    if !as_json {
        println!("# Effective configuration for {}\n", ctx.root.display());
    }
    println!("{}", ConfigLoader::render(&ctx.config, as_json)?);
    Ok(())
}

/// Show configuration paths
pub fn path(root: &Path) -> Result<()> {
    ConfigLoader::show_path(root);
    Ok(())
}

/// Initialize project configuration
pub fn init(root: &Path, force: bool) -> Result<()> {
    let root = require_directory(root)?;
    let existed = ConfigLoader::project_config_path(&root).exists();

    let config_path = ConfigLoader::init_project(&root, force)?;
    let output = Output::new();
    if existed && !force {
        output.warning(&format!(
            "Config already exists: {} (use --force to overwrite)",
            config_path.display()
        ));
    } else {
        output.success("Initialized project configuration");
        println!("  Config: {}", config_path.display());
    }
    Ok(())
}
