//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Scheduler defaults
pub mod generation {
    /// Concurrent generation requests within one file
    pub const DEFAULT_PER_FILE_CONCURRENCY: usize = 4;

    /// Files processed concurrently
    pub const DEFAULT_PER_TREE_CONCURRENCY: usize = 4;

    /// Timeout for a single symbol's generation (seconds)
    pub const DEFAULT_TASK_TIMEOUT_SECS: u64 = 120;

    /// Characters of file content sent per request
    pub const DEFAULT_MAX_CONTENT_CHARS: usize = 12_000;
}

/// Network constants
pub mod network {
    /// Default HTTP request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Retries for retryable provider failures
    pub const DEFAULT_MAX_RETRIES: usize = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;
}

/// Delivery constants
pub mod delivery {
    /// Lines of context around each hunk in dry-run diffs
    pub const DIFF_CONTEXT_LINES: usize = 3;

    /// Subject line prefix of generated commits
    pub const COMMIT_SUBJECT_PREFIX: &str = "docs:";
}
