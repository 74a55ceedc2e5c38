//! AI Integration Layer
//!
//! Provides the documentation generation capability the scheduler calls once
//! per symbol.

pub mod prompt;
pub mod provider;
pub mod response;
pub mod timeout;

pub use prompt::{PromptBuilder, PromptSection, PromptTemplates, prepare_content};
pub use provider::{
    DocGenerator, OllamaProvider, OpenAiProvider, ProviderConfig, SharedGenerator, SymbolRequest,
    create_provider,
};
pub use response::clean_generated_text;
pub use timeout::{with_task_timeout, with_timeout};
