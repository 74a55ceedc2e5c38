//! Ollama Local LLM Provider
//!
//! Documentation generation with locally-running Ollama models.

use async_trait::async_trait;
use backon::ExponentialBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{DocGenerator, ProviderConfig, SymbolRequest, with_retry};
use crate::ai::prompt::PromptTemplates;
use crate::ai::response::clean_generated_text;
use crate::types::{DocError, ErrorCategory, ErrorClassifier, LlmError, Result};

const PROVIDER: &str = "ollama";
const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    max_content_chars: usize,
    backoff: ExponentialBuilder,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = config.http_client()?;
        let backoff = config.backoff();

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        // Validate endpoint URL for security (SSRF prevention)
        let api_base = Self::validate_endpoint(&api_base)?;

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_content_chars: config.max_content_chars,
            backoff,
            client,
        })
    }

    /// Only allows http/https schemes and warns for non-localhost endpoints.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            DocError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DocError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    fn build_request(&self, request: &SymbolRequest) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: PromptTemplates::symbol_doc(request, self.max_content_chars),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        }
    }

    async fn send(&self, body: &OllamaRequest) -> std::result::Result<String, LlmError> {
        let url = format!("{}/api/generate", self.api_base);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::with_provider(
                        ErrorCategory::Unavailable,
                        format!(
                            "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                            self.api_base
                        ),
                        PROVIDER,
                    )
                } else {
                    ErrorClassifier::classify_transport(&e, PROVIDER)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, text),
                PROVIDER,
            ));
        }

        let response_body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        clean_generated_text(&response_body.response).map_err(|mut e| {
            e.provider = Some(PROVIDER.to_string());
            e
        })
    }
}

#[async_trait]
impl DocGenerator for OllamaProvider {
    async fn summarize(&self, request: &SymbolRequest) -> std::result::Result<String, LlmError> {
        debug!(
            "Generating docs for {}:{} with Ollama (model: {})",
            request.path, request.identifier, self.model
        );

        let body = self.build_request(request);
        let body = &body;
        with_retry(PROVIDER, &request.identifier, self.backoff, move || {
            self.send(body)
        })
        .await
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}
