//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docweave/config.toml)
//! 3. Project config (<root>/.docweave.toml)
//! 4. Environment variables (DOCWEAVE_* prefix, `__` separates sections)
//!
//! CLI flags are applied on top by the caller.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DocError, Result};

/// Project config file name, looked up in the tree root
pub const PROJECT_CONFIG_FILE: &str = ".docweave.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load(root: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path(root);
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // e.g. DOCWEAVE_GENERATION__ITEM_LIMIT -> generation.item_limit
        figment = figment.merge(Env::prefixed("DOCWEAVE_").split("__").lowercase(true));

        figment
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/docweave/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("docweave"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path(root: &Path) {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path(root);
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| DocError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented default config into the tree root
    pub fn init_project(root: &Path, force: bool) -> Result<PathBuf> {
        let config_path = Self::project_config_path(root);
        if config_path.exists() && !force {
            info!("Project config exists: {}", config_path.display());
            return Ok(config_path);
        }

        fs::write(&config_path, Self::default_project_config())?;
        info!("Created project config: {}", config_path.display());
        Ok(config_path)
    }

    fn default_project_config() -> &'static str {
        r#"# docweave project configuration
# Environment variables override these (DOCWEAVE_GENERATION__ITEM_LIMIT=10).

[generation]
per_file_concurrency = 4
per_tree_concurrency = 4
item_limit = 0
task_timeout_secs = 120
failure_policy = "best-effort"

[locator]
exclude_dirs = ["testdata", "vendor"]
include = []
exclude = []
override_existing = false

[llm]
provider = "openai"
timeout_secs = 60
temperature = 0.0
max_content_chars = 12000
max_retries = 3

[delivery]
branch = ""
dry_run = false
"#
    }
}
