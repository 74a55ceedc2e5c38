//! Documentation Generation Providers
//!
//! Defines the [`DocGenerator`] capability the scheduler calls once per
//! symbol, and the HTTP-backed implementations.
//!
//! Providers own everything between "here is a symbol" and "here is its doc
//! text": prompt construction, content windowing, retries on retryable
//! categories, and response cleanup. The scheduler only sees text or an
//! [`LlmError`].

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::LlmConfig;
use crate::constants::network;
use crate::types::{DocError, Finding, Result, SymbolKind};

// =============================================================================
// Request
// =============================================================================

/// Everything a provider needs to document one symbol
#[derive(Debug, Clone)]
pub struct SymbolRequest {
    pub path: String,
    pub identifier: String,
    pub kind: SymbolKind,
    /// Full source of the file, shared with sibling requests
    pub content: Arc<str>,
    /// Byte offset of the declaration's anchor in `content`
    pub anchor_offset: usize,
}

impl SymbolRequest {
    pub fn for_finding(finding: &Finding, content: Arc<str>) -> Self {
        Self {
            path: finding.path.clone(),
            identifier: finding.identifier.clone(),
            kind: finding.kind,
            content,
            anchor_offset: finding.anchor.offset,
        }
    }
}

// =============================================================================
// Generation Capability
// =============================================================================

/// Produces documentation text for one symbol
#[async_trait]
pub trait DocGenerator: Send + Sync {
    /// Return trimmed, non-empty doc text without comment markers
    async fn summarize(&self, request: &SymbolRequest) -> std::result::Result<String, LlmError>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Shared generator for concurrent access across scheduler tasks
pub type SharedGenerator = Arc<dyn DocGenerator>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// The API key is redacted in debug output and converted to `SecretString`
/// inside the provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider type: "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Temperature for LLM generation (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// File content per request is windowed to this many characters
    pub max_content_chars: usize,
    /// Retries for retryable failures
    pub max_retries: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .field("max_content_chars", &self.max_content_chars)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from_llm_config(&LlmConfig::default(), None)
    }
}

impl ProviderConfig {
    pub fn from_llm_config(config: &LlmConfig, api_key: Option<String>) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            temperature: config.temperature,
            api_key,
            api_base: config.api_base.clone(),
            max_tokens: config.max_tokens,
            max_content_chars: config.max_content_chars,
            max_retries: config.max_retries,
        }
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(network::BASE_DELAY_MS))
            .with_max_delay(Duration::from_secs(network::MAX_DELAY_SECS))
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}

/// Create a shared generator from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedGenerator> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(DocError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            config.provider
        ))),
    }
}

/// Run one provider request, retrying only retryable categories
async fn with_retry<F, Fut>(
    provider: &str,
    identifier: &str,
    backoff: ExponentialBuilder,
    request: F,
) -> std::result::Result<String, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<String, LlmError>>,
{
    request
        .retry(backoff)
        .when(|e: &LlmError| e.is_retryable())
        .notify(|e: &LlmError, delay: Duration| {
            warn!(
                "{} request for {} failed ({}), retrying in {:?}",
                provider, identifier, e.category, delay
            );
        })
        .await
}
