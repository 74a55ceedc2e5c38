//! Generate Command
//!
//! Locate undocumented Go symbols under a root, generate docs for them and
//! deliver the result as a diff, a write to disk or a commit on a branch.
//!
//! Usage:
//!   docweave generate [ROOT] [--dry-run | --branch NAME] [--limit N]
//!   docweave generate --include 'pkg/**' --exclude '**/*_gen.go'

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ai::provider::{ProviderConfig, create_provider};
use crate::analyzer::FsTree;
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::{Config, FailurePolicy};
use crate::pipeline::{GitRepository, Pipeline, VersionControl, tracing_sink};
use crate::types::Result;

/// Flags of `docweave generate`; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub root: PathBuf,
    pub config_file: Option<PathBuf>,
    /// Commit on this branch (empty disables commit)
    pub branch: Option<String>,
    pub limit: Option<usize>,
    pub dry_run: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Files processed concurrently
    pub file_concurrency: Option<usize>,
    /// Generation requests in flight within one file
    pub symbol_concurrency: Option<usize>,
    pub override_existing: bool,
    pub fail_fast: bool,
    /// Whole-run deadline in seconds
    pub timeout_secs: Option<u64>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

impl GenerateOptions {
    /// Layer the flags over the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(branch) = &self.branch {
            config.delivery.branch = branch.clone();
        }
        if self.dry_run {
            config.delivery.dry_run = true;
        }
        if let Some(limit) = self.limit {
            config.generation.item_limit = limit;
        }
        if let Some(n) = self.file_concurrency {
            config.generation.per_tree_concurrency = n;
        }
        if let Some(n) = self.symbol_concurrency {
            config.generation.per_file_concurrency = n;
        }
        if self.fail_fast {
            config.generation.failure_policy = FailurePolicy::FailFast;
        }
        if let Some(secs) = self.timeout_secs {
            config.generation.deadline_secs = Some(secs);
        }
        if !self.include.is_empty() {
            config.locator.include = self.include.clone();
        }
        if !self.exclude.is_empty() {
            config.locator.exclude = self.exclude.clone();
        }
        if self.override_existing {
            config.locator.override_existing = true;
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
    }
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let ctx = CommandContext::load(&options.root, options.config_file.as_deref())?;
    let mut config = ctx.config;
    options.apply_to(&mut config);
    config.validate()?;

    let provider_config = ProviderConfig::from_llm_config(&config.llm, options.api_key.clone());
    let generator = create_provider(&provider_config)?;
    info!("Using {} ({})", generator.name(), generator.model());

    let repo = if config.delivery.commit_enabled() {
        Some(GitRepository::open(&ctx.root)?)
    } else {
        None
    };

    let pipeline = Pipeline::new(config, generator, tracing_sink())?;
    let rt = Runtime::new()?;
    rt.block_on(run_pipeline(&pipeline, &ctx.root, repo.as_ref()))
}

async fn run_pipeline(
    pipeline: &Pipeline,
    root: &Path,
    repo: Option<&GitRepository>,
) -> Result<()> {
    let output = Output::new();
    let tree = FsTree::new(root);
    let cancel = CancellationToken::new();

    let signal_token = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight requests");
            signal_token.cancel();
        }
    });

    let start = Instant::now();
    let result = pipeline
        .run(&tree, repo.map(|r| r as &dyn VersionControl), &cancel)
        .await;
    signal.abort();

    let summary = result?;
    for (key, err) in summary.report.failures() {
        debug!("{} not documented: {}", key, err);
    }

    output.summary(&summary);
    info!("Finished in {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocError;

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.locator.include = vec!["from-file/**".to_string()];

        let options = GenerateOptions {
            branch: Some("docs-patch".to_string()),
            limit: Some(2),
            include: vec!["pkg/**".to_string()],
            file_concurrency: Some(8),
            symbol_concurrency: Some(1),
            fail_fast: true,
            timeout_secs: Some(30),
            override_existing: true,
            model: Some("llama3".to_string()),
            ..Default::default()
        };
        options.apply_to(&mut config);

        assert_eq!(config.delivery.branch, "docs-patch");
        assert_eq!(config.generation.item_limit, 2);
        assert_eq!(config.generation.per_tree_concurrency, 8);
        assert_eq!(config.generation.per_file_concurrency, 1);
        assert_eq!(config.generation.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.generation.deadline_secs, Some(30));
        assert_eq!(config.locator.include, vec!["pkg/**"]);
        assert!(config.locator.override_existing);
        assert_eq!(config.llm.model.as_deref(), Some("llama3"));
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = Config::default();
        config.generation.item_limit = 9;
        config.locator.exclude = vec!["**/*_gen.go".to_string()];

        GenerateOptions::default().apply_to(&mut config);

        assert_eq!(config.generation.item_limit, 9);
        assert_eq!(config.locator.exclude, vec!["**/*_gen.go"]);
        assert!(!config.delivery.dry_run);
    }

    #[test]
    fn test_dry_run_with_branch_is_rejected() {
        let mut config = Config::default();
        GenerateOptions {
            dry_run: true,
            branch: Some("docs".to_string()),
            ..Default::default()
        }
        .apply_to(&mut config);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_fails_before_traversal() {
        let options = GenerateOptions {
            root: PathBuf::from("/definitely/not/here"),
            symbol_concurrency: Some(0),
            ..Default::default()
        };
        assert!(matches!(run(options), Err(DocError::Read { .. })));

        let dir = tempfile::TempDir::new().unwrap();
        let options = GenerateOptions {
            root: dir.path().to_path_buf(),
            symbol_concurrency: Some(0),
            ..Default::default()
        };
        assert!(matches!(run(options), Err(DocError::Config(_))));
    }
}
