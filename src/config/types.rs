//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/docweave/) and project (<root>/.docweave.toml) files.

use serde::{Deserialize, Serialize};

use crate::constants::{generation as gen_defaults, network};
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduler settings
    pub generation: GenerationConfig,

    /// Source tree traversal
    pub locator: LocatorConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Dry run / apply / commit
    pub delivery: DeliveryConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.generation.per_file_concurrency == 0 {
            return Err(DocError::Config(
                "generation.per_file_concurrency must be at least 1".to_string(),
            ));
        }

        if self.generation.per_tree_concurrency == 0 {
            return Err(DocError::Config(
                "generation.per_tree_concurrency must be at least 1".to_string(),
            ));
        }

        if self.generation.task_timeout_secs == 0 {
            return Err(DocError::Config(
                "generation.task_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.generation.deadline_secs == Some(0) {
            return Err(DocError::Config(
                "generation.deadline_secs must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DocError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(DocError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.delivery.dry_run && self.delivery.commit_enabled() {
            return Err(DocError::Config(
                "dry run and commit are mutually exclusive (drop --dry-run or --branch)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Generation (Scheduler) Configuration
// =============================================================================

/// What happens to the run when individual generation tasks fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Keep going; failed symbols are reported as not documented
    #[default]
    BestEffort,
    /// Fail the run if tasks were dispatched and none succeeded
    RequireAny,
    /// First failure stops dispatch and fails the run
    FailFast,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::BestEffort => write!(f, "best-effort"),
            FailurePolicy::RequireAny => write!(f, "require-any"),
            FailurePolicy::FailFast => write!(f, "fail-fast"),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "best-effort" => Ok(FailurePolicy::BestEffort),
            "require-any" => Ok(FailurePolicy::RequireAny),
            "fail-fast" => Ok(FailurePolicy::FailFast),
            _ => Err(format!(
                "Unknown failure policy: {}. Valid values: best-effort, require-any, fail-fast",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Concurrent generation requests within one file
    pub per_file_concurrency: usize,

    /// Files processed concurrently
    pub per_tree_concurrency: usize,

    /// Maximum symbols to dispatch (0 = no limit)
    pub item_limit: usize,

    /// Timeout for a single symbol's generation
    pub task_timeout_secs: u64,

    /// Whole-run deadline; when reached no new tasks are dispatched
    pub deadline_secs: Option<u64>,

    pub failure_policy: FailurePolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            per_file_concurrency: gen_defaults::DEFAULT_PER_FILE_CONCURRENCY,
            per_tree_concurrency: gen_defaults::DEFAULT_PER_TREE_CONCURRENCY,
            item_limit: 0,
            task_timeout_secs: gen_defaults::DEFAULT_TASK_TIMEOUT_SECS,
            deadline_secs: None,
            failure_policy: FailurePolicy::default(),
        }
    }
}

// =============================================================================
// Locator Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Directory names never descended into
    pub exclude_dirs: Vec<String>,

    /// Glob patterns a file path must match (empty = all)
    pub include: Vec<String>,

    /// Glob patterns that drop a file path
    pub exclude: Vec<String>,

    /// Regenerate docs for declarations that already have them
    pub override_existing: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: vec!["testdata".to_string(), "vendor".to_string()],
            include: Vec::new(),
            exclude: Vec::new(),
            override_existing: false,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for LLM generation (0.0 = deterministic)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// File content sent with each request is cut to this many characters
    pub max_content_chars: usize,

    /// Retries for retryable failures (rate limits, transport errors)
    pub max_retries: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            max_tokens: 512,
            max_content_chars: gen_defaults::DEFAULT_MAX_CONTENT_CHARS,
            max_retries: network::DEFAULT_MAX_RETRIES,
        }
    }
}

// =============================================================================
// Delivery Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Branch to commit to; empty disables committing
    pub branch: String,

    /// Report diffs only
    pub dry_run: bool,
}

impl DeliveryConfig {
    pub fn commit_enabled(&self) -> bool {
        !self.branch.trim().is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
