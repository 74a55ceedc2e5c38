//! CLI Common Utilities
//!
//! Shared initialization for command handlers: resolve the tree root and load
//! the layered configuration for it.

use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigLoader};
use crate::types::{DocError, Result};

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Tree root the command operates on
    pub root: PathBuf,
    /// Loaded configuration, before CLI overrides
    pub config: Config,
}

impl CommandContext {
    /// Resolve `root` and load configuration for it.
    ///
    /// An explicit `config_file` replaces the global and project files.
    pub fn load(root: &Path, config_file: Option<&Path>) -> Result<Self> {
        let root = require_directory(root)?;
        let config = match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(DocError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                ConfigLoader::load_from_file(path)?
            }
            None => ConfigLoader::load(&root)?,
        };
        Ok(Self { root, config })
    }
}

/// Fail with a readable error when `root` is not a directory
pub fn require_directory(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(DocError::Read {
            path: root.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }
    Ok(root.to_path_buf())
}
