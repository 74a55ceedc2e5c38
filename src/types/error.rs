//! Unified Error Type System
//!
//! Centralized error types for the whole pipeline.
//!
//! ## Error Classes
//!
//! - **Fatal**: traversal, parse, write and version-control failures abort the run
//! - **Per-task**: [`LlmError`] is recorded against a single symbol and never
//!   thrown past the scheduler
//! - **Configuration**: rejected before any traversal begins
//!
//! [`ErrorCategory`] decides whether a provider retries a request.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Generation Failures
// =============================================================================

/// Why a single symbol could not be documented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RateLimit,
    /// Prompt (source window) too large for the model
    TokenLimit,
    Auth,
    /// Transport failure or task timeout
    Network,
    /// Endpoint or model not there
    Unavailable,
    BadRequest,
    /// Reply arrived but carried no usable doc text
    InvalidResponse,
    /// Server-side 5xx
    Transient,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate-limit",
            Self::TokenLimit => "token-limit",
            Self::Auth => "auth",
            Self::Network => "network",
            Self::Unavailable => "unavailable",
            Self::BadRequest => "bad-request",
            Self::InvalidResponse => "invalid-response",
            Self::Transient => "transient",
            Self::Unknown => "unknown",
        }
    }

    /// Worth another attempt against the same provider
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::Network | Self::Transient | Self::InvalidResponse
        )
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-symbol generation failure, stored in the report and never thrown
#[derive(Debug, Clone, PartialEq)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "{} ({}): {}", self.category, provider, self.message),
            None => write!(f, "{}: {}", self.category, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            ..Self::new(category, message)
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidResponse, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

/// Maps HTTP and transport failures onto [`ErrorCategory`]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            413 => ErrorCategory::TokenLimit,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500..=599 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }

    /// Decode failures are invalid responses; anything else without a status
    /// is a network problem
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        if err.is_decode() {
            return LlmError::with_provider(
                ErrorCategory::InvalidResponse,
                err.to_string(),
                provider,
            );
        }
        match err.status() {
            Some(status) => Self::classify_http_status(status.as_u16(), &err.to_string(), provider),
            None => LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Locator Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("Generation failed: {message} ({failed} failed, {succeeded} succeeded)")]
    Generation {
        message: String,
        failed: usize,
        succeeded: usize,
    },

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("Run cancelled: {0}")]
    Cancelled(String),

    // -------------------------------------------------------------------------
    // Delivery Errors
    // -------------------------------------------------------------------------
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {message}")]
    Vcs { operation: String, message: String },

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),
}

impl From<LlmError> for DocError {
    fn from(err: LlmError) -> Self {
        DocError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, DocError>;

impl DocError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn vcs(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Vcs {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Convert into the per-task error recorded in a generation report
    pub fn into_llm_error(self, provider: &str) -> LlmError {
        match self {
            DocError::Llm(err) => err,
            DocError::Timeout { .. } => {
                LlmError::with_provider(ErrorCategory::Network, self.to_string(), provider)
            }
            other => LlmError::with_provider(ErrorCategory::Unknown, other.to_string(), provider),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
